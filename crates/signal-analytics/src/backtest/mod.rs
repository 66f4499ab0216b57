//! 백테스팅 모듈
//!
//! 분류기 확률이 붙은 바 시계열로 단일 포지션 전략을 시뮬레이션합니다.
//!
//! # 주요 구성요소
//!
//! - [`BacktestEngine`]: FLAT / IN-TRADE 상태 기계
//! - [`ScoredBar`]: 종가, ATR, 매수/매도 확률이 붙은 바
//! - [`BacktestReport`]: 거래 원장, 누적 손익 곡선, CSV 내보내기

pub mod engine;
pub mod report;

pub use engine::{
    score_rows, BacktestEngine, BacktestError, BacktestResult, PositionState, ScoredBar,
};
pub use report::{BacktestReport, BacktestSummary, TradeRecord};

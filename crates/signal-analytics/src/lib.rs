//! 분석 및 백테스팅 엔진.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - 기술적 지표 (EMA, MACD, RSI, ATR, 엔벨로프)
//! - 피처 엔진, 라벨러, 예측기, 분류기 및 학습
//! - 시그널 판정과 손절/익절 계산
//! - 단일 포지션 백테스팅 엔진과 리포트
//!
//! # Re-exports
//!
//! - [`ml`]: 피처 추출, 라벨링, 분류기
//! - [`backtest`]: 백테스트 엔진 및 리포트

pub mod backtest;
pub mod decision;
pub mod indicators;
pub mod ml;
pub mod stop_target;

// Backtest 모듈 re-exports
pub use backtest::{
    score_rows, BacktestEngine, BacktestError, BacktestReport, BacktestResult, BacktestSummary,
    PositionState, ScoredBar, TradeRecord,
};

// Decision 모듈 re-exports
pub use decision::{decide, SignalDecision, DEFAULT_DECISION_THRESHOLD};
pub use stop_target::{StopTarget, StopTargetCalculator};

// Indicators 모듈 re-exports
pub use indicators::{IndicatorEngine, IndicatorError, IndicatorResult};

// ML 모듈 re-exports
pub use ml::{
    ClassProbabilities, Classifier, FeatureEngine, FeatureRow, FeatureVector, Forecaster,
    Labeler, LinearTrendForecaster, MlError, MlResult, MockClassifier, MockForecaster,
    SoftmaxClassifier, SoftmaxParams, Trainer, TrainingReport,
};

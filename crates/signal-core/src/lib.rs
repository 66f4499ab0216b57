//! # Signal Core
//!
//! 시그널 엔진의 핵심 도메인 모델 및 타입을 제공합니다.
//!
//! 이 크레이트는 파이프라인 전반에서 사용되는 기본 타입을 제공합니다:
//! - OHLCV 바 및 바 병합
//! - 매매 방향, 시그널, 라벨
//! - 백테스트 거래 기록
//! - 설정 관리
//! - 로깅 인프라

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;

pub use config::*;
pub use domain::*;
pub use error::*;
pub use logging::*;

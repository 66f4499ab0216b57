//! 머신러닝 파이프라인.
//!
//! - **Feature Engineering**: 바 시계열에서 고정 순서의 feature 벡터 추출
//! - **Labeling**: 전방 수익률 기반 NEUTRAL / UP / DOWN 라벨
//! - **Forecast**: `delta` feature를 위한 플러그형 예측기
//! - **Classifier**: 3-클래스 확률 추정기 (소프트맥스, mock)
//! - **Training**: 학습 파이프라인과 정확도 리포트
//!
//! # 아키텍처
//!
//! ```text
//! Bars (OHLCV)
//!        │
//!        ▼
//! ┌─────────────────┐     ┌────────────┐
//! │ Feature Engine  │ ←── │ Forecaster │
//! └────────┬────────┘     └────────────┘
//!          │
//!    ┌─────┴──────┐
//!    ▼            ▼
//! ┌─────────┐  ┌────────────┐
//! │ Labeler │  │ Classifier │ ← 학습된 모델
//! └────┬────┘  └─────┬──────┘
//!      ▼             ▼
//!   Trainer     Backtest / Live
//! ```

pub mod classifier;
pub mod error;
pub mod features;
pub mod forecast;
pub mod labeler;
pub mod training;
pub mod types;

pub use classifier::{Classifier, MockClassifier, SoftmaxClassifier, SoftmaxParams, StandardScaler};
pub use error::{MlError, MlResult};
pub use features::FeatureEngine;
pub use forecast::{Forecaster, LinearTrendForecaster, MockForecaster};
pub use labeler::Labeler;
pub use training::{accuracy, ClassCounts, Trainer, TrainingReport};
pub use types::{ClassProbabilities, FeatureRow, FeatureVector, LabeledSample};

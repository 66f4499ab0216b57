//! 기술적 지표 모듈.
//!
//! 피처 엔진이 사용하는 지표들을 `f64` 시계열 위에서 계산합니다.
//! 모든 지표는 입력과 같은 길이의 `Vec<Option<f64>>`를 반환하며,
//! 워밍업 구간은 `None`입니다.
//!
//! # 지원 지표
//!
//! ## 추세 지표
//! - **EMA**: 지수 이동평균 (첫 값은 SMA로 시작)
//! - **MACD**: 이동평균 수렴/확산 (히스토그램 포함)
//! - **Envelope**: EMA 기반 상/하단 밴드
//!
//! ## 모멘텀 지표
//! - **RSI**: 상대강도지수 (Wilder 평활)
//!
//! ## 변동성 지표
//! - **ATR**: 평균 실제 범위 (Wilder 평활)
//! - **Rolling Std**: 이동 표본 표준편차
//!
//! # 사용 예시
//!
//! ```ignore
//! use signal_analytics::indicators::{IndicatorEngine, RsiParams};
//!
//! let engine = IndicatorEngine::new();
//! let rsi = engine.rsi(&closes, RsiParams { period: 14 })?;
//! ```

pub mod momentum;
pub mod trend;
pub mod volatility;

use thiserror::Error;

pub use momentum::{MomentumCalculator, RsiParams};
pub use trend::{EmaParams, EnvelopeParams, EnvelopeResult, MacdParams, MacdResult, TrendIndicators};
pub use volatility::{AtrParams, RollingStdParams, VolatilityIndicators};

/// 지표 계산 오류.
#[derive(Debug, Error)]
pub enum IndicatorError {
    /// 데이터 부족 오류
    #[error("데이터가 부족합니다: 필요 {required}개, 제공 {provided}개")]
    InsufficientData { required: usize, provided: usize },

    /// 잘못된 파라미터
    #[error("잘못된 파라미터: {0}")]
    InvalidParameter(String),
}

/// 지표 계산 결과 타입.
pub type IndicatorResult<T> = Result<T, IndicatorError>;

/// 기간 파라미터 검증.
pub(crate) fn check_period(period: usize) -> IndicatorResult<()> {
    if period == 0 {
        return Err(IndicatorError::InvalidParameter(
            "기간은 0보다 커야 합니다".to_string(),
        ));
    }
    Ok(())
}

/// 데이터 길이 검증.
pub(crate) fn check_len(provided: usize, required: usize) -> IndicatorResult<()> {
    if provided < required {
        return Err(IndicatorError::InsufficientData { required, provided });
    }
    Ok(())
}

/// 통합 지표 엔진.
///
/// 추세, 모멘텀, 변동성 계산기를 하나의 인터페이스로 묶습니다.
#[derive(Debug, Default)]
pub struct IndicatorEngine {
    trend: TrendIndicators,
    momentum: MomentumCalculator,
    volatility: VolatilityIndicators,
}

impl IndicatorEngine {
    /// 새로운 지표 엔진 생성.
    pub fn new() -> Self {
        Self::default()
    }

    /// EMA 계산.
    pub fn ema(&self, prices: &[f64], params: EmaParams) -> IndicatorResult<Vec<Option<f64>>> {
        self.trend.ema(prices, params)
    }

    /// MACD 계산.
    pub fn macd(&self, prices: &[f64], params: MacdParams) -> IndicatorResult<Vec<MacdResult>> {
        self.trend.macd(prices, params)
    }

    /// EMA 엔벨로프 계산.
    pub fn envelope(
        &self,
        prices: &[f64],
        params: EnvelopeParams,
    ) -> IndicatorResult<Vec<EnvelopeResult>> {
        self.trend.envelope(prices, params)
    }

    /// RSI 계산.
    pub fn rsi(&self, prices: &[f64], params: RsiParams) -> IndicatorResult<Vec<Option<f64>>> {
        self.momentum.rsi(prices, params)
    }

    /// ATR 계산.
    pub fn atr(
        &self,
        high: &[f64],
        low: &[f64],
        close: &[f64],
        params: AtrParams,
    ) -> IndicatorResult<Vec<Option<f64>>> {
        self.volatility.atr(high, low, close, params)
    }

    /// 이동 표본 표준편차 계산.
    pub fn rolling_std(
        &self,
        values: &[Option<f64>],
        params: RollingStdParams,
    ) -> IndicatorResult<Vec<Option<f64>>> {
        self.volatility.rolling_std(values, params)
    }
}

//! 변동성 지표 (Volatility Indicators).
//!
//! - ATR (Average True Range)
//! - 이동 표본 표준편차

use serde::{Deserialize, Serialize};

use super::{check_len, check_period, IndicatorError, IndicatorResult};

/// ATR 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AtrParams {
    /// ATR 기간 (기본: 14).
    pub period: usize,
}

impl Default for AtrParams {
    fn default() -> Self {
        Self { period: 14 }
    }
}

/// 이동 표준편차 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RollingStdParams {
    /// 윈도우 크기 (기본: 20).
    pub window: usize,
}

impl Default for RollingStdParams {
    fn default() -> Self {
        Self { window: 20 }
    }
}

/// 변동성 지표 계산기.
#[derive(Debug, Default)]
pub struct VolatilityIndicators;

impl VolatilityIndicators {
    /// 새로운 변동성 지표 계산기 생성.
    pub fn new() -> Self {
        Self
    }

    /// ATR (Average True Range) 계산.
    ///
    /// True Range = max(고가 - 저가, |고가 - 이전 종가|, |저가 - 이전 종가|)
    /// 첫 번째 TR은 당일 범위입니다.
    ///
    /// # 반환
    /// 인덱스 `period - 1`부터 정의되는 ATR 값들
    pub fn atr(
        &self,
        high: &[f64],
        low: &[f64],
        close: &[f64],
        params: AtrParams,
    ) -> IndicatorResult<Vec<Option<f64>>> {
        let period = params.period;
        check_period(period)?;
        if high.len() != low.len() || low.len() != close.len() {
            return Err(IndicatorError::InvalidParameter(
                "고가/저가/종가 길이가 다릅니다".to_string(),
            ));
        }
        let len = close.len();
        check_len(len, period)?;

        let mut true_ranges = Vec::with_capacity(len);
        true_ranges.push(high[0] - low[0]);
        for i in 1..len {
            let hl = high[i] - low[i];
            let hc = (high[i] - close[i - 1]).abs();
            let lc = (low[i] - close[i - 1]).abs();
            true_ranges.push(hl.max(hc).max(lc));
        }

        // 초기 ATR은 단순 평균, 이후 Wilder 평활
        let p = period as f64;
        let mut result = vec![None; len];
        let mut atr = true_ranges[..period].iter().sum::<f64>() / p;
        result[period - 1] = Some(atr);
        for i in period..len {
            atr = (atr * (p - 1.0) + true_ranges[i]) / p;
            result[i] = Some(atr);
        }

        Ok(result)
    }

    /// 이동 표본 표준편차 (ddof = 1).
    ///
    /// 윈도우 안에 `None`이 하나라도 있으면 해당 시점은 `None`입니다.
    pub fn rolling_std(
        &self,
        values: &[Option<f64>],
        params: RollingStdParams,
    ) -> IndicatorResult<Vec<Option<f64>>> {
        let window = params.window;
        if window < 2 {
            return Err(IndicatorError::InvalidParameter(
                "표본 표준편차 윈도우는 2 이상이어야 합니다".to_string(),
            ));
        }

        let result = (0..values.len())
            .map(|i| {
                if i + 1 < window {
                    return None;
                }
                let slice = &values[i + 1 - window..=i];
                let defined: Option<Vec<f64>> = slice.iter().copied().collect();
                defined.map(|xs| sample_std(&xs))
            })
            .collect();

        Ok(result)
    }
}

/// 표본 표준편차.
fn sample_std(xs: &[f64]) -> f64 {
    let n = xs.len() as f64;
    let mean = xs.iter().sum::<f64>() / n;
    let var = xs.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1.0);
    var.sqrt()
}

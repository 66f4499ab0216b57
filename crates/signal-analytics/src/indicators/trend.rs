//! 추세 지표 (Trend Indicators).
//!
//! 이동평균 기반의 추세 지표들을 제공합니다.
//! - EMA (Exponential Moving Average)
//! - MACD (Moving Average Convergence Divergence)
//! - EMA Envelope

use serde::{Deserialize, Serialize};

use super::{check_len, check_period, IndicatorError, IndicatorResult};

/// EMA 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EmaParams {
    /// 이동평균 기간.
    pub period: usize,
}

impl Default for EmaParams {
    fn default() -> Self {
        Self { period: 20 }
    }
}

/// MACD 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MacdParams {
    /// 단기 EMA 기간 (기본: 12).
    pub fast_period: usize,
    /// 장기 EMA 기간 (기본: 26).
    pub slow_period: usize,
    /// 시그널 라인 기간 (기본: 9).
    pub signal_period: usize,
}

impl Default for MacdParams {
    fn default() -> Self {
        Self {
            fast_period: 12,
            slow_period: 26,
            signal_period: 9,
        }
    }
}

impl MacdParams {
    /// 히스토그램이 처음 정의되는 인덱스.
    pub fn first_histogram_index(&self) -> usize {
        (self.fast_period.max(self.slow_period) + self.signal_period).saturating_sub(2)
    }
}

/// MACD 결과.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct MacdResult {
    /// MACD 라인 (단기 EMA - 장기 EMA).
    pub macd: Option<f64>,
    /// 시그널 라인 (MACD의 EMA).
    pub signal: Option<f64>,
    /// 히스토그램 (MACD - 시그널).
    pub histogram: Option<f64>,
}

/// 엔벨로프 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EnvelopeParams {
    /// 중심 EMA 기간 (기본: 20).
    pub period: usize,
    /// 밴드 폭 비율 (기본: 0.003 = ±0.3%).
    pub pct: f64,
}

impl Default for EnvelopeParams {
    fn default() -> Self {
        Self {
            period: 20,
            pct: 0.003,
        }
    }
}

/// 엔벨로프 결과.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct EnvelopeResult {
    /// 하단 밴드.
    pub lower: Option<f64>,
    /// 상단 밴드.
    pub upper: Option<f64>,
}

/// 추세 지표 계산기.
#[derive(Debug, Default)]
pub struct TrendIndicators;

impl TrendIndicators {
    /// 새로운 추세 지표 계산기 생성.
    pub fn new() -> Self {
        Self
    }

    /// 지수 이동평균 (EMA) 계산.
    ///
    /// EMA = (현재가 × k) + (이전 EMA × (1 - k))
    /// k = 2 / (period + 1)
    ///
    /// # 인자
    /// * `prices` - 가격 데이터
    /// * `params` - EMA 파라미터
    ///
    /// # 반환
    /// 각 시점의 EMA 값 (처음 period-1개는 None, 첫 값은 SMA)
    pub fn ema(&self, prices: &[f64], params: EmaParams) -> IndicatorResult<Vec<Option<f64>>> {
        let period = params.period;
        check_period(period)?;
        check_len(prices.len(), period)?;

        let mut result = Vec::with_capacity(prices.len());
        let multiplier = 2.0 / (period as f64 + 1.0);

        // 처음 period-1개는 None
        result.extend(std::iter::repeat(None).take(period - 1));

        // 첫 EMA는 SMA로 시작
        let initial_sma = prices[..period].iter().sum::<f64>() / period as f64;
        result.push(Some(initial_sma));

        let mut prev_ema = initial_sma;
        for price in prices.iter().skip(period) {
            let ema = price * multiplier + prev_ema * (1.0 - multiplier);
            result.push(Some(ema));
            prev_ema = ema;
        }

        Ok(result)
    }

    /// MACD 계산.
    ///
    /// MACD 라인 = 단기 EMA - 장기 EMA
    /// 시그널 라인 = MACD 라인의 EMA
    /// 히스토그램 = MACD 라인 - 시그널 라인
    ///
    /// 기본 파라미터에서 히스토그램은 인덱스 33부터 정의됩니다.
    pub fn macd(&self, prices: &[f64], params: MacdParams) -> IndicatorResult<Vec<MacdResult>> {
        check_period(params.fast_period)?;
        check_period(params.slow_period)?;
        check_period(params.signal_period)?;
        if params.fast_period > params.slow_period {
            return Err(IndicatorError::InvalidParameter(
                "단기 기간은 장기 기간보다 클 수 없습니다".to_string(),
            ));
        }
        check_len(prices.len(), params.first_histogram_index() + 1)?;

        let fast_ema = self.ema(
            prices,
            EmaParams {
                period: params.fast_period,
            },
        )?;
        let slow_ema = self.ema(
            prices,
            EmaParams {
                period: params.slow_period,
            },
        )?;

        let macd_line: Vec<Option<f64>> = fast_ema
            .iter()
            .zip(slow_ema.iter())
            .map(|(fast, slow)| match (fast, slow) {
                (Some(f), Some(s)) => Some(f - s),
                _ => None,
            })
            .collect();

        // 시그널 라인 (정의된 MACD 값들의 EMA)
        let offset = params.slow_period - 1;
        let macd_values: Vec<f64> = macd_line.iter().flatten().copied().collect();
        let signal_ema = self.ema(
            &macd_values,
            EmaParams {
                period: params.signal_period,
            },
        )?;

        let result = macd_line
            .iter()
            .enumerate()
            .map(|(i, macd)| {
                let signal = if i >= offset {
                    signal_ema.get(i - offset).copied().flatten()
                } else {
                    None
                };
                let histogram = match (*macd, signal) {
                    (Some(m), Some(s)) => Some(m - s),
                    _ => None,
                };
                MacdResult {
                    macd: *macd,
                    signal,
                    histogram,
                }
            })
            .collect();

        Ok(result)
    }

    /// EMA 엔벨로프 계산.
    ///
    /// 하단 = EMA × (1 - pct), 상단 = EMA × (1 + pct)
    pub fn envelope(
        &self,
        prices: &[f64],
        params: EnvelopeParams,
    ) -> IndicatorResult<Vec<EnvelopeResult>> {
        if !(params.pct >= 0.0 && params.pct < 1.0) {
            return Err(IndicatorError::InvalidParameter(format!(
                "엔벨로프 비율은 [0, 1) 범위여야 합니다: {}",
                params.pct
            )));
        }

        let ema = self.ema(
            prices,
            EmaParams {
                period: params.period,
            },
        )?;

        Ok(ema
            .into_iter()
            .map(|value| EnvelopeResult {
                lower: value.map(|e| e * (1.0 - params.pct)),
                upper: value.map(|e| e * (1.0 + params.pct)),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_prices() -> Vec<f64> {
        vec![100.0, 102.0, 101.0, 103.0, 105.0, 104.0, 106.0, 108.0, 107.0, 109.0]
    }

    #[test]
    fn test_ema_basic() {
        let trend = TrendIndicators::new();
        let prices = sample_prices();

        let ema = trend.ema(&prices, EmaParams { period: 3 }).unwrap();

        assert_eq!(ema.len(), prices.len());
        assert!(ema[0].is_none());
        assert!(ema[1].is_none());
        // 3번째 값: SMA (100 + 102 + 101) / 3 = 101
        assert!((ema[2].unwrap() - 101.0).abs() < 1e-12);
        // k = 0.5: 103 * 0.5 + 101 * 0.5 = 102
        assert!((ema[3].unwrap() - 102.0).abs() < 1e-12);
    }

    #[test]
    fn test_ema_insufficient_data() {
        let trend = TrendIndicators::new();
        let result = trend.ema(&[1.0, 2.0], EmaParams { period: 3 });
        assert!(matches!(
            result,
            Err(IndicatorError::InsufficientData {
                required: 3,
                provided: 2
            })
        ));
    }

    #[test]
    fn test_ema_zero_period() {
        let trend = TrendIndicators::new();
        let result = trend.ema(&sample_prices(), EmaParams { period: 0 });
        assert!(matches!(result, Err(IndicatorError::InvalidParameter(_))));
    }

    #[test]
    fn test_macd_histogram_starts_at_index_33() {
        let trend = TrendIndicators::new();
        let prices: Vec<f64> = (0..50).map(|i| 100.0 + (i as f64 * 0.7).sin()).collect();

        let macd = trend.macd(&prices, MacdParams::default()).unwrap();

        assert_eq!(macd.len(), prices.len());
        assert!(macd[24].macd.is_none());
        assert!(macd[25].macd.is_some());
        assert!(macd[32].histogram.is_none());
        assert!(macd[33].histogram.is_some());
    }

    #[test]
    fn test_macd_minimum_length() {
        let trend = TrendIndicators::new();
        let prices: Vec<f64> = (0..34).map(|i| 100.0 + i as f64).collect();
        assert!(trend.macd(&prices, MacdParams::default()).is_ok());
        assert!(trend.macd(&prices[..33], MacdParams::default()).is_err());
    }

    #[test]
    fn test_macd_rejects_zero_signal_period() {
        let trend = TrendIndicators::new();
        let params = MacdParams {
            fast_period: 1,
            slow_period: 1,
            signal_period: 0,
        };
        assert_eq!(params.first_histogram_index(), 0);
        assert!(trend.macd(&[1.0, 2.0, 3.0], params).is_err());
    }

    #[test]
    fn test_macd_flat_series_is_zero() {
        let trend = TrendIndicators::new();
        let prices = vec![50.0; 40];

        let macd = trend.macd(&prices, MacdParams::default()).unwrap();

        assert!(macd[39].histogram.unwrap().abs() < 1e-12);
    }

    #[test]
    fn test_envelope_bands() {
        let trend = TrendIndicators::new();
        let prices = vec![100.0; 25];

        let env = trend.envelope(&prices, EnvelopeParams::default()).unwrap();

        assert!(env[18].lower.is_none());
        assert!((env[19].lower.unwrap() - 99.7).abs() < 1e-9);
        assert!((env[19].upper.unwrap() - 100.3).abs() < 1e-9);
    }
}

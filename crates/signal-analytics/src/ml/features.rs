//! 피처 엔진.
//!
//! 정렬된 OHLCV 바 시계열을 feature 행으로 변환합니다.
//! 모든 지표가 정의되는 바에 대해서만 행을 만들고 워밍업 구간은 버립니다.
//! 입력 바는 변경하지 않으며, 같은 입력과 같은 예측기에 대해 결과는 항상 같습니다.

use std::sync::Arc;

use signal_core::{validate_series, Bar, FeatureConfig};
use tracing::debug;

use crate::indicators::{
    AtrParams, EnvelopeParams, IndicatorEngine, MacdParams, RollingStdParams, RsiParams,
};
use crate::ml::forecast::{Forecaster, LinearTrendForecaster};
use crate::ml::{FeatureRow, FeatureVector, MlError, MlResult};

/// 바 시계열을 feature 행으로 변환하는 엔진.
#[derive(Clone)]
pub struct FeatureEngine {
    config: FeatureConfig,
    forecaster: Arc<dyn Forecaster>,
    indicators: Arc<IndicatorEngine>,
}

impl std::fmt::Debug for FeatureEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeatureEngine")
            .field("config", &self.config)
            .field("forecaster", &self.forecaster.name())
            .finish()
    }
}

impl FeatureEngine {
    /// 주어진 설정과 예측기로 피처 엔진 생성.
    pub fn new(config: FeatureConfig, forecaster: Arc<dyn Forecaster>) -> Self {
        Self {
            config,
            forecaster,
            indicators: Arc::new(IndicatorEngine::new()),
        }
    }

    /// 기본 설정과 선형 추세 예측기로 생성.
    pub fn with_defaults() -> Self {
        Self::new(FeatureConfig::default(), Arc::new(LinearTrendForecaster::new()))
    }

    /// 설정 반환.
    pub fn config(&self) -> &FeatureConfig {
        &self.config
    }

    /// 첫 feature 행을 만들기 위해 필요한 최소 바 수.
    pub fn min_bars_required(&self) -> usize {
        self.config.min_bars_required()
    }

    /// 바 시계열에서 feature 행을 계산합니다.
    ///
    /// 바가 부족하면 빈 벡터를 반환합니다 (에러 아님).
    /// 예측기 실패는 `MlError::Forecast`로 전파됩니다.
    pub fn engineer(&self, bars: &[Bar]) -> MlResult<Vec<FeatureRow>> {
        let n = bars.len();
        if n < self.min_bars_required() {
            debug!(bars = n, required = self.min_bars_required(), "워밍업 구간보다 짧은 시계열");
            return Ok(Vec::new());
        }
        validate_series(bars).map_err(|e| MlError::InvalidInput(e.to_string()))?;

        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let highs: Vec<f64> = bars.iter().map(|b| b.high).collect();
        let lows: Vec<f64> = bars.iter().map(|b| b.low).collect();

        let z_spike = self.return_spike(&closes)?;

        let macd = self.indicators.macd(
            &closes,
            MacdParams {
                fast_period: self.config.macd_fast,
                slow_period: self.config.macd_slow,
                signal_period: self.config.macd_signal,
            },
        )?;
        let rsi = self.indicators.rsi(
            &closes,
            RsiParams {
                period: self.config.rsi_period,
            },
        )?;
        let atr = self.indicators.atr(
            &highs,
            &lows,
            &closes,
            AtrParams {
                period: self.config.atr_period,
            },
        )?;
        let envelope = self.indicators.envelope(
            &closes,
            EnvelopeParams {
                period: self.config.envelope_period,
                pct: self.config.envelope_pct,
            },
        )?;

        let delta = self.forecast_delta(&closes)?;

        let rows: Vec<FeatureRow> = (0..n)
            .filter_map(|i| {
                Some(FeatureRow {
                    timestamp: bars[i].timestamp,
                    close: closes[i],
                    features: FeatureVector {
                        z_spike: z_spike[i]?,
                        macd: macd[i].histogram?,
                        rsi: rsi[i]?,
                        atr: atr[i]?,
                        env_low: envelope[i].lower?,
                        env_up: envelope[i].upper?,
                        delta: delta[i],
                    },
                })
            })
            .collect();

        debug!(bars = n, rows = rows.len(), "feature 계산 완료");
        Ok(rows)
    }

    /// 정규화된 수익률 스파이크 `r[i] / max(std, floor)`.
    fn return_spike(&self, closes: &[f64]) -> MlResult<Vec<Option<f64>>> {
        let returns: Vec<Option<f64>> = std::iter::once(None)
            .chain(closes.windows(2).map(|w| Some(w[1] - w[0])))
            .collect();

        let std = self.indicators.rolling_std(
            &returns,
            RollingStdParams {
                window: self.config.spike_window,
            },
        )?;

        let floor = self.config.std_floor;
        Ok(returns
            .iter()
            .zip(std.iter())
            .map(|(r, s)| match (r, s) {
                (Some(r), Some(s)) => Some(r / s.max(floor)),
                _ => None,
            })
            .collect())
    }

    /// 예측값과 종가의 차이. 시계열이 짧으면 0.0이고 예측기를 호출하지 않습니다.
    fn forecast_delta(&self, closes: &[f64]) -> MlResult<Vec<f64>> {
        if closes.len() <= self.config.forecast_min_len {
            return Ok(vec![0.0; closes.len()]);
        }

        let forecast = self.forecaster.forecast(closes)?;
        if forecast.len() != closes.len() {
            return Err(MlError::Forecast(format!(
                "{} 예측 길이 불일치: 기대 {}, 실제 {}",
                self.forecaster.name(),
                closes.len(),
                forecast.len()
            )));
        }

        Ok(forecast
            .iter()
            .zip(closes.iter())
            .map(|(f, c)| f - c)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::forecast::MockForecaster;
    use chrono::{Duration, TimeZone, Utc};
    use signal_core::bars_from_prices;

    fn wave(n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| 100.0 + (i as f64 * 0.3).sin() * 2.0 + i as f64 * 0.01)
            .collect()
    }

    fn engine_with(forecaster: MockForecaster) -> FeatureEngine {
        FeatureEngine::new(FeatureConfig::default(), Arc::new(forecaster))
    }

    #[test]
    fn test_output_length_after_warmup() {
        let engine = FeatureEngine::with_defaults();
        for n in [0, 1, 33, 34, 35, 100] {
            let rows = engine.engineer(&bars_from_prices(&wave(n))).unwrap();
            assert_eq!(rows.len(), n.saturating_sub(33), "n = {n}");
        }
    }

    #[test]
    fn test_zero_macd_signal_is_an_error() {
        let config = FeatureConfig {
            macd_fast: 1,
            macd_slow: 1,
            macd_signal: 0,
            ..Default::default()
        };
        let engine = FeatureEngine::new(config, Arc::new(MockForecaster::with_offset(0.0)));

        assert!(engine.engineer(&bars_from_prices(&wave(10))).unwrap().is_empty());
        assert!(engine.engineer(&bars_from_prices(&wave(50))).is_err());
    }

    #[test]
    fn test_rows_keep_bar_timestamps() {
        let engine = FeatureEngine::with_defaults();
        let bars = bars_from_prices(&wave(40));

        let rows = engine.engineer(&bars).unwrap();

        assert_eq!(rows[0].timestamp, bars[33].timestamp);
        assert_eq!(rows.last().unwrap().close, bars[39].close);
    }

    #[test]
    fn test_flat_series_uses_std_floor() {
        let engine = FeatureEngine::with_defaults();
        let mut prices = vec![100.0; 40];
        prices[39] = 100.5;

        let rows = engine.engineer(&bars_from_prices(&prices)).unwrap();
        let last = rows.last().unwrap().features;

        // 마지막 diff만 0이 아님: std > floor 이므로 유한한 값
        assert!(last.z_spike.is_finite());
        // 변화가 없는 구간은 z = 0
        assert_eq!(rows[0].features.z_spike, 0.0);
        assert_eq!(rows[0].features.rsi, 50.0);
    }

    #[test]
    fn test_forecast_disabled_for_short_series() {
        let engine = engine_with(MockForecaster::failing("호출되면 안 됨"));

        let rows = engine.engineer(&bars_from_prices(&wave(200))).unwrap();

        assert_eq!(rows.len(), 167);
        assert!(rows.iter().all(|r| r.features.delta == 0.0));
    }

    #[test]
    fn test_forecast_delta_for_long_series() {
        let engine = engine_with(MockForecaster::with_offset(0.25));

        let rows = engine.engineer(&bars_from_prices(&wave(201))).unwrap();

        assert!(rows.iter().all(|r| (r.features.delta - 0.25).abs() < 1e-9));
    }

    #[test]
    fn test_forecaster_failure_propagates() {
        let engine = engine_with(MockForecaster::failing("모델 없음"));

        let result = engine.engineer(&bars_from_prices(&wave(250)));

        assert!(matches!(result, Err(MlError::Forecast(_))));
    }

    #[test]
    fn test_deterministic() {
        let engine = FeatureEngine::with_defaults();
        let bars = bars_from_prices(&wave(300));

        assert_eq!(engine.engineer(&bars).unwrap(), engine.engineer(&bars).unwrap());
    }

    #[test]
    fn test_unordered_bars_rejected() {
        let engine = FeatureEngine::with_defaults();
        let mut bars = bars_from_prices(&wave(40));
        bars[10].timestamp = Utc.timestamp_opt(0, 0).unwrap() - Duration::minutes(5);

        assert!(matches!(
            engine.engineer(&bars),
            Err(MlError::InvalidInput(_))
        ));
    }
}

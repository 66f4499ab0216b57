//! 모멘텀 지표 (Momentum Indicators).

use serde::{Deserialize, Serialize};

use super::{check_len, check_period, IndicatorResult};

/// RSI 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RsiParams {
    /// RSI 기간 (기본: 14).
    pub period: usize,
}

impl Default for RsiParams {
    fn default() -> Self {
        Self { period: 14 }
    }
}

/// 모멘텀 지표 계산기.
#[derive(Debug, Default)]
pub struct MomentumCalculator;

impl MomentumCalculator {
    /// 새로운 모멘텀 계산기 생성.
    pub fn new() -> Self {
        Self
    }

    /// RSI (Relative Strength Index) 계산.
    ///
    /// RSI = 100 - (100 / (1 + RS))
    /// RS = 평균 상승폭 / 평균 하락폭
    ///
    /// 첫 평균은 처음 `period`개 변화량의 단순 평균이고,
    /// 이후는 Wilder 평활 `avg = (prev × (p - 1) + 현재) / p`를 따릅니다.
    ///
    /// # 반환
    /// 0-100 사이의 RSI 값들 (인덱스 `period`부터 정의)
    pub fn rsi(&self, prices: &[f64], params: RsiParams) -> IndicatorResult<Vec<Option<f64>>> {
        let period = params.period;
        check_period(period)?;
        check_len(prices.len(), period + 1)?;

        let mut result = vec![None; prices.len()];
        let p = period as f64;

        let (mut avg_gain, mut avg_loss) = (0.0, 0.0);
        for i in 1..=period {
            let delta = prices[i] - prices[i - 1];
            avg_gain += delta.max(0.0);
            avg_loss += (-delta).max(0.0);
        }
        avg_gain /= p;
        avg_loss /= p;
        result[period] = Some(rsi_value(avg_gain, avg_loss));

        for i in (period + 1)..prices.len() {
            let delta = prices[i] - prices[i - 1];
            avg_gain = (avg_gain * (p - 1.0) + delta.max(0.0)) / p;
            avg_loss = (avg_loss * (p - 1.0) + (-delta).max(0.0)) / p;
            result[i] = Some(rsi_value(avg_gain, avg_loss));
        }

        Ok(result)
    }
}

/// 평균 상승/하락폭으로 RSI 값을 계산합니다.
///
/// 변화가 전혀 없으면 중립값 50을 반환합니다.
fn rsi_value(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        if avg_gain == 0.0 {
            50.0
        } else {
            100.0
        }
    } else {
        let rs = avg_gain / avg_loss;
        100.0 - 100.0 / (1.0 + rs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rsi_warmup() {
        let calc = MomentumCalculator::new();
        let prices: Vec<f64> = (0..20).map(|i| 100.0 + (i % 3) as f64).collect();

        let rsi = calc.rsi(&prices, RsiParams::default()).unwrap();

        assert_eq!(rsi.len(), 20);
        assert!(rsi[13].is_none());
        assert!(rsi[14].is_some());
    }

    #[test]
    fn test_rsi_monotonic_series() {
        let calc = MomentumCalculator::new();
        let up: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
        let down: Vec<f64> = (0..30).map(|i| 100.0 - i as f64).collect();

        let rsi_up = calc.rsi(&up, RsiParams::default()).unwrap();
        let rsi_down = calc.rsi(&down, RsiParams::default()).unwrap();

        assert_eq!(rsi_up[29], Some(100.0));
        assert_eq!(rsi_down[29], Some(0.0));
    }

    #[test]
    fn test_rsi_flat_series_is_neutral() {
        let calc = MomentumCalculator::new();
        let rsi = calc.rsi(&[10.0; 16], RsiParams::default()).unwrap();
        assert_eq!(rsi[15], Some(50.0));
    }

    #[test]
    fn test_rsi_bounded() {
        let calc = MomentumCalculator::new();
        let prices: Vec<f64> = (0..100).map(|i| 100.0 + (i as f64 * 1.3).sin() * 5.0).collect();

        let rsi = calc.rsi(&prices, RsiParams::default()).unwrap();

        for value in rsi.iter().flatten() {
            assert!((0.0..=100.0).contains(value));
        }
    }

    #[test]
    fn test_rsi_insufficient_data() {
        let calc = MomentumCalculator::new();
        assert!(calc.rsi(&[1.0; 14], RsiParams::default()).is_err());
    }
}

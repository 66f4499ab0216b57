//! 가격 예측기 (forecaster).
//!
//! 종가 시계열을 받아 각 타임스탬프마다 하나의 예측값을 돌려줍니다.
//! 피처 엔진은 `forecast[i] - close[i]`를 `delta` feature로 사용합니다.

use serde::{Deserialize, Serialize};

use crate::ml::{MlError, MlResult};

/// 플러그형 예측기 인터페이스.
///
/// 구현체는 입력과 같은 길이의 벡터를 반환해야 합니다.
pub trait Forecaster: Send + Sync {
    /// 각 시점의 예측값 계산.
    fn forecast(&self, prices: &[f64]) -> MlResult<Vec<f64>>;

    /// 예측기 이름 반환.
    fn name(&self) -> &str;
}

/// 선형 추세 예측기.
///
/// 시간 인덱스에 대한 최소제곱 직선을 적합하고 각 시점의 적합값을 반환합니다.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct LinearTrendForecaster;

impl LinearTrendForecaster {
    /// 새 선형 추세 예측기 생성.
    pub fn new() -> Self {
        Self
    }
}

impl Forecaster for LinearTrendForecaster {
    fn forecast(&self, prices: &[f64]) -> MlResult<Vec<f64>> {
        if prices.is_empty() {
            return Ok(Vec::new());
        }
        if let Some(i) = prices.iter().position(|p| !p.is_finite()) {
            return Err(MlError::Forecast(format!(
                "유한하지 않은 가격 (인덱스 {i})"
            )));
        }

        let n = prices.len() as f64;
        let mean_x = (n - 1.0) / 2.0;
        let mean_y = prices.iter().sum::<f64>() / n;

        let (mut sxy, mut sxx) = (0.0, 0.0);
        for (i, y) in prices.iter().enumerate() {
            let dx = i as f64 - mean_x;
            sxy += dx * (y - mean_y);
            sxx += dx * dx;
        }

        let slope = if sxx > 0.0 { sxy / sxx } else { 0.0 };
        let intercept = mean_y - slope * mean_x;

        Ok((0..prices.len())
            .map(|i| intercept + slope * i as f64)
            .collect())
    }

    fn name(&self) -> &str {
        "linear_trend"
    }
}

/// 테스트용 결정적 예측기.
///
/// 종가에 고정 오프셋을 더하거나, 항상 실패하도록 설정할 수 있습니다.
#[derive(Debug, Clone)]
pub struct MockForecaster {
    offset: f64,
    failure: Option<String>,
}

impl MockForecaster {
    /// `price + offset`을 반환하는 mock 예측기 생성.
    pub fn with_offset(offset: f64) -> Self {
        Self {
            offset,
            failure: None,
        }
    }

    /// 항상 실패하는 mock 예측기 생성.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            offset: 0.0,
            failure: Some(message.into()),
        }
    }
}

impl Forecaster for MockForecaster {
    fn forecast(&self, prices: &[f64]) -> MlResult<Vec<f64>> {
        if let Some(message) = &self.failure {
            return Err(MlError::Forecast(message.clone()));
        }
        Ok(prices.iter().map(|p| p + self.offset).collect())
    }

    fn name(&self) -> &str {
        "mock_forecaster"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_trend_exact_line() {
        let prices: Vec<f64> = (0..10).map(|i| 5.0 + 2.0 * i as f64).collect();

        let fitted = LinearTrendForecaster::new().forecast(&prices).unwrap();

        assert_eq!(fitted.len(), prices.len());
        for (f, p) in fitted.iter().zip(prices.iter()) {
            assert!((f - p).abs() < 1e-9);
        }
    }

    #[test]
    fn test_linear_trend_single_point() {
        let fitted = LinearTrendForecaster::new().forecast(&[42.0]).unwrap();
        assert_eq!(fitted, vec![42.0]);
    }

    #[test]
    fn test_linear_trend_rejects_nan() {
        let result = LinearTrendForecaster::new().forecast(&[1.0, f64::NAN, 3.0]);
        assert!(matches!(result, Err(MlError::Forecast(_))));
    }

    #[test]
    fn test_mock_forecaster() {
        let fc = MockForecaster::with_offset(1.5);
        assert_eq!(fc.forecast(&[1.0, 2.0]).unwrap(), vec![2.5, 3.5]);

        let fc = MockForecaster::failing("down");
        assert!(fc.forecast(&[1.0]).is_err());
    }
}

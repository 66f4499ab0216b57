//! OHLCV 바 타입 및 병합.
//!
//! - `Bar` - 1분봉 OHLCV 데이터
//! - `merge_bars` - 신규 바를 기존 이력에 병합 (타임스탬프 중복 시 최신 값 유지)

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{SignalError, SignalResult};

/// OHLCV 캔들스틱 데이터.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// 바 시작 시간 (UTC)
    pub timestamp: DateTime<Utc>,
    /// 시가
    pub open: f64,
    /// 고가
    pub high: f64,
    /// 저가
    pub low: f64,
    /// 종가
    pub close: f64,
    /// 거래량
    pub volume: f64,
}

impl Bar {
    /// 새 바를 생성합니다.
    pub fn new(
        timestamp: DateTime<Utc>,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    ) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// 단일 가격으로 바를 생성합니다 (시가=고가=저가=종가, 거래량 0).
    pub fn flat(timestamp: DateTime<Utc>, price: f64) -> Self {
        Self::new(timestamp, price, price, price, price, 0.0)
    }

    /// 캔들 범위(고가 - 저가)를 반환합니다.
    pub fn range(&self) -> f64 {
        self.high - self.low
    }

    /// 모든 가격 필드가 유한한 값인지 확인합니다.
    pub fn is_finite(&self) -> bool {
        [self.open, self.high, self.low, self.close, self.volume]
            .iter()
            .all(|v| v.is_finite())
    }
}

/// 가격 시퀀스에서 1분 간격 바 시계열을 합성합니다.
///
/// 타임스탬프는 Unix epoch부터 1분씩 증가합니다.
pub fn bars_from_prices(prices: &[f64]) -> Vec<Bar> {
    let epoch = Utc.timestamp_opt(0, 0).single().unwrap_or_default();
    prices
        .iter()
        .enumerate()
        .map(|(i, &price)| Bar::flat(epoch + Duration::minutes(i as i64), price))
        .collect()
}

/// 바 시계열이 타임스탬프 기준 엄격한 오름차순인지 검증합니다.
pub fn validate_series(bars: &[Bar]) -> SignalResult<()> {
    for (i, window) in bars.windows(2).enumerate() {
        if window[0].timestamp >= window[1].timestamp {
            return Err(SignalError::Data(format!(
                "바 {}의 타임스탬프({})가 이전 바({})보다 크지 않습니다",
                i + 1,
                window[1].timestamp,
                window[0].timestamp
            )));
        }
    }
    if let Some(bar) = bars.iter().find(|b| !b.is_finite()) {
        return Err(SignalError::Data(format!(
            "유한하지 않은 가격이 포함된 바: {}",
            bar.timestamp
        )));
    }
    Ok(())
}

/// 신규 바를 기존 이력에 병합합니다.
///
/// 결과는 타임스탬프 오름차순이며, 동일 타임스탬프가 여러 번 나오면
/// 나중에 나온 값(`incoming` 쪽)을 유지합니다.
pub fn merge_bars(existing: &[Bar], incoming: &[Bar]) -> Vec<Bar> {
    let mut merged: Vec<(usize, Bar)> = existing
        .iter()
        .chain(incoming.iter())
        .copied()
        .enumerate()
        .collect();

    // 같은 타임스탬프 안에서는 나중 항목이 뒤에 오도록 안정 정렬
    merged.sort_by(|a, b| a.1.timestamp.cmp(&b.1.timestamp).then(a.0.cmp(&b.0)));

    let mut result: Vec<Bar> = Vec::with_capacity(merged.len());
    for (_, bar) in merged {
        match result.last_mut() {
            Some(last) if last.timestamp == bar.timestamp => *last = bar,
            _ => result.push(bar),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(minute: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + minute * 60, 0).unwrap()
    }

    #[test]
    fn test_flat_bar() {
        let bar = Bar::flat(ts(0), 101.5);
        assert_eq!(bar.open, 101.5);
        assert_eq!(bar.high, 101.5);
        assert_eq!(bar.low, 101.5);
        assert_eq!(bar.close, 101.5);
        assert_eq!(bar.volume, 0.0);
        assert_eq!(bar.range(), 0.0);
    }

    #[test]
    fn test_bars_from_prices_are_minute_spaced() {
        let bars = bars_from_prices(&[1.0, 2.0, 3.0]);
        assert_eq!(bars.len(), 3);
        assert_eq!(
            (bars[1].timestamp - bars[0].timestamp).num_seconds(),
            60
        );
        assert!(validate_series(&bars).is_ok());
    }

    #[test]
    fn test_validate_series_rejects_duplicates() {
        let bars = vec![Bar::flat(ts(0), 1.0), Bar::flat(ts(0), 2.0)];
        assert!(validate_series(&bars).is_err());
    }

    #[test]
    fn test_validate_series_rejects_nan() {
        let bars = vec![Bar::flat(ts(0), 1.0), Bar::flat(ts(1), f64::NAN)];
        assert!(validate_series(&bars).is_err());
    }

    #[test]
    fn test_merge_keeps_latest_duplicate() {
        let existing = vec![Bar::flat(ts(0), 1.0), Bar::flat(ts(1), 2.0)];
        let incoming = vec![Bar::flat(ts(1), 2.5), Bar::flat(ts(2), 3.0)];

        let merged = merge_bars(&existing, &incoming);

        assert_eq!(merged.len(), 3);
        assert_eq!(merged[1].close, 2.5);
        assert_eq!(merged[2].close, 3.0);
    }

    #[test]
    fn test_merge_sorts_out_of_order_input() {
        let existing = vec![Bar::flat(ts(5), 5.0)];
        let incoming = vec![Bar::flat(ts(3), 3.0), Bar::flat(ts(4), 4.0)];

        let merged = merge_bars(&existing, &incoming);
        let closes: Vec<f64> = merged.iter().map(|b| b.close).collect();
        assert_eq!(closes, vec![3.0, 4.0, 5.0]);
    }

    #[test]
    fn test_merge_empty() {
        assert!(merge_bars(&[], &[]).is_empty());
    }
}

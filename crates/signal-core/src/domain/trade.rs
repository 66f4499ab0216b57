//! 백테스트 포지션 및 거래 기록.
//!
//! - `OpenPosition` - 진입 후 청산 전까지 유지되는 단일 포지션
//! - `Trade` - 청산이 끝난 거래 (원장에 추가된 후 변경되지 않음)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::signal::Side;

/// 청산 사유.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ExitReason {
    /// 손절가 도달
    Stop,
    /// 익절가 도달
    Target,
}

impl std::fmt::Display for ExitReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExitReason::Stop => write!(f, "STOP"),
            ExitReason::Target => write!(f, "TARGET"),
        }
    }
}

/// 열린 포지션.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OpenPosition {
    /// 방향
    pub side: Side,
    /// 진입가
    pub entry_price: f64,
    /// 진입 시각
    pub entry_time: DateTime<Utc>,
    /// 손절가
    pub stop: f64,
    /// 익절가
    pub target: f64,
}

impl OpenPosition {
    /// 주어진 종가에서 청산 조건을 확인합니다.
    ///
    /// 손절을 먼저 확인하므로 두 조건이 동시에 성립하면 항상 `Stop`입니다.
    pub fn exit_trigger(&self, close: f64) -> Option<ExitReason> {
        let (stop_hit, target_hit) = match self.side {
            Side::Buy => (close <= self.stop, close >= self.target),
            Side::Sell => (close >= self.stop, close <= self.target),
        };

        if stop_hit {
            Some(ExitReason::Stop)
        } else if target_hit {
            Some(ExitReason::Target)
        } else {
            None
        }
    }

    /// 청산 사유에 해당하는 가격 레벨.
    pub fn exit_level(&self, reason: ExitReason) -> f64 {
        match reason {
            ExitReason::Stop => self.stop,
            ExitReason::Target => self.target,
        }
    }
}

/// 완료된 거래.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    /// 방향
    pub side: Side,
    /// 진입가
    pub entry_price: f64,
    /// 진입 시각
    pub entry_time: DateTime<Utc>,
    /// 손절가
    pub stop: f64,
    /// 익절가
    pub target: f64,
    /// 청산가
    pub exit_price: f64,
    /// 청산 시각
    pub exit_time: DateTime<Utc>,
    /// 청산 사유
    pub reason: ExitReason,
    /// 실현 손익 (비용 차감 후)
    pub pnl: f64,
}

impl Trade {
    /// 수익 거래인지 확인합니다.
    pub fn is_win(&self) -> bool {
        self.pnl > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn position(side: Side, stop: f64, target: f64) -> OpenPosition {
        OpenPosition {
            side,
            entry_price: 100.0,
            entry_time: Utc.timestamp_opt(0, 0).unwrap(),
            stop,
            target,
        }
    }

    #[test]
    fn test_buy_exit_conditions() {
        let pos = position(Side::Buy, 98.0, 104.0);
        assert_eq!(pos.exit_trigger(100.0), None);
        assert_eq!(pos.exit_trigger(98.0), Some(ExitReason::Stop));
        assert_eq!(pos.exit_trigger(97.0), Some(ExitReason::Stop));
        assert_eq!(pos.exit_trigger(104.0), Some(ExitReason::Target));
    }

    #[test]
    fn test_sell_exit_conditions() {
        let pos = position(Side::Sell, 102.0, 96.0);
        assert_eq!(pos.exit_trigger(100.0), None);
        assert_eq!(pos.exit_trigger(102.0), Some(ExitReason::Stop));
        assert_eq!(pos.exit_trigger(95.0), Some(ExitReason::Target));
    }

    #[test]
    fn test_stop_wins_when_both_trigger() {
        // ATR이 0이면 손절가 = 익절가 = 진입가
        let pos = position(Side::Buy, 100.0, 100.0);
        assert_eq!(pos.exit_trigger(100.0), Some(ExitReason::Stop));

        let pos = position(Side::Sell, 100.0, 100.0);
        assert_eq!(pos.exit_trigger(100.0), Some(ExitReason::Stop));
    }

    #[test]
    fn test_exit_level() {
        let pos = position(Side::Buy, 98.0, 104.0);
        assert_eq!(pos.exit_level(ExitReason::Stop), 98.0);
        assert_eq!(pos.exit_level(ExitReason::Target), 104.0);
    }
}

//! 손절/익절가 계산.

use serde::{Deserialize, Serialize};
use signal_core::{Side, SignalConfig};

/// 손절가와 익절가.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StopTarget {
    /// 손절가
    pub stop: f64,
    /// 익절가
    pub target: f64,
}

/// 변동성 배수 기반 손절/익절 계산기.
///
/// 매수: `stop = entry - sl × vol`, `target = entry + tp × vol`
/// 매도: `stop = entry + sl × vol`, `target = entry - tp × vol`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StopTargetCalculator {
    /// 손절 배수
    pub sl_mult: f64,
    /// 익절 배수
    pub tp_mult: f64,
}

impl Default for StopTargetCalculator {
    fn default() -> Self {
        Self {
            sl_mult: 1.0,
            tp_mult: 2.0,
        }
    }
}

impl StopTargetCalculator {
    /// 새 계산기 생성.
    pub fn new(sl_mult: f64, tp_mult: f64) -> Self {
        Self { sl_mult, tp_mult }
    }

    /// 시그널 설정에서 생성.
    pub fn from_config(config: &SignalConfig) -> Self {
        Self::new(config.sl_mult, config.tp_mult)
    }

    /// 진입가, 방향, 변동성으로 손절/익절가를 계산합니다.
    pub fn levels(&self, entry: f64, side: Side, volatility: f64) -> StopTarget {
        let sign = side.sign();
        StopTarget {
            stop: entry - sign * self.sl_mult * volatility,
            target: entry + sign * self.tp_mult * volatility,
        }
    }
}

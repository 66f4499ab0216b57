//! 시그널 판정.
//!
//! 매수/매도 확률을 BUY / SELL / WAIT로 변환합니다.
//! 두 확률이 모두 임계값을 넘으면 BUY가 우선합니다.

use serde::{Deserialize, Serialize};
use signal_core::{SignalConfig, SignalSide};

use crate::ml::ClassProbabilities;

/// 기본 판정 임계값.
pub const DEFAULT_DECISION_THRESHOLD: f64 = 0.55;

/// 확률 쌍으로 시그널 방향을 결정합니다.
pub fn decide(p_buy: f64, p_sell: f64, threshold: f64) -> SignalSide {
    if p_buy > threshold {
        SignalSide::Buy
    } else if p_sell > threshold {
        SignalSide::Sell
    } else {
        SignalSide::Wait
    }
}

/// 임계값을 보관하는 시그널 판정기.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalDecision {
    /// 진입 확률 임계값
    pub threshold: f64,
}

impl Default for SignalDecision {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_DECISION_THRESHOLD,
        }
    }
}

impl SignalDecision {
    /// 새 판정기 생성.
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    /// 시그널 설정에서 생성.
    pub fn from_config(config: &SignalConfig) -> Self {
        Self::new(config.decision_threshold)
    }

    /// 매수/매도 확률로 판정.
    pub fn decide(&self, p_buy: f64, p_sell: f64) -> SignalSide {
        decide(p_buy, p_sell, self.threshold)
    }

    /// 분류기 출력으로 판정.
    pub fn decide_probabilities(&self, probs: &ClassProbabilities) -> SignalSide {
        self.decide(probs.buy, probs.sell)
    }
}

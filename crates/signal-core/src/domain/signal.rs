//! 매매 방향과 시그널 타입.

use serde::{Deserialize, Serialize};

/// 포지션 방향.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    /// 매수
    Buy,
    /// 매도
    Sell,
}

impl Side {
    /// 반대 방향을 반환합니다.
    pub fn opposite(&self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }

    /// 손익 계산용 부호 (+1 매수, -1 매도).
    pub fn sign(&self) -> f64 {
        match self {
            Side::Buy => 1.0,
            Side::Sell => -1.0,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

/// 시그널 판정 결과.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SignalSide {
    /// 매수 진입
    Buy,
    /// 매도 진입
    Sell,
    /// 관망
    #[default]
    Wait,
}

impl SignalSide {
    /// 진입 방향으로 변환합니다. 관망이면 `None`.
    pub fn as_side(&self) -> Option<Side> {
        match self {
            SignalSide::Buy => Some(Side::Buy),
            SignalSide::Sell => Some(Side::Sell),
            SignalSide::Wait => None,
        }
    }
}

impl From<Side> for SignalSide {
    fn from(side: Side) -> Self {
        match side {
            Side::Buy => SignalSide::Buy,
            Side::Sell => SignalSide::Sell,
        }
    }
}

impl std::fmt::Display for SignalSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SignalSide::Buy => write!(f, "BUY"),
            SignalSide::Sell => write!(f, "SELL"),
            SignalSide::Wait => write!(f, "WAIT"),
        }
    }
}

/// 라이브 추론 결과 시그널.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    /// 판정 방향
    pub side: SignalSide,
    /// 손절가
    pub stop: f64,
    /// 익절가
    pub target: f64,
    /// 신뢰도 (0.0 ~ 1.0)
    pub confidence: f64,
}

//! ML 기능을 위한 공통 타입.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use signal_core::Label;

/// 바 하나에 대한 고정 순서의 feature 벡터.
///
/// 필드 순서는 분류기 입력 순서와 같고 학습과 추론 모두에서 동일해야 합니다.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    /// 정규화된 수익률 스파이크
    pub z_spike: f64,
    /// 추세 강도 (MACD 히스토그램)
    pub macd: f64,
    /// 모멘텀 (RSI)
    pub rsi: f64,
    /// 변동성 (ATR)
    pub atr: f64,
    /// 하단 엔벨로프
    pub env_low: f64,
    /// 상단 엔벨로프
    pub env_up: f64,
    /// 예측값 - 종가
    pub delta: f64,
}

impl FeatureVector {
    /// feature 개수.
    pub const LEN: usize = 7;

    /// 입력 순서대로의 feature 이름.
    pub const NAMES: [&'static str; Self::LEN] =
        ["z_spike", "macd", "rsi", "atr", "env_low", "env_up", "delta"];

    /// 분류기 입력 배열로 변환합니다.
    pub fn to_array(&self) -> [f64; Self::LEN] {
        [
            self.z_spike,
            self.macd,
            self.rsi,
            self.atr,
            self.env_low,
            self.env_up,
            self.delta,
        ]
    }

    /// 배열에서 생성합니다.
    pub fn from_array(values: [f64; Self::LEN]) -> Self {
        Self {
            z_spike: values[0],
            macd: values[1],
            rsi: values[2],
            atr: values[3],
            env_low: values[4],
            env_up: values[5],
            delta: values[6],
        }
    }

    /// 모든 값이 유한한지 확인.
    pub fn is_finite(&self) -> bool {
        self.to_array().iter().all(|v| v.is_finite())
    }
}

/// 피처 엔진의 출력 행.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureRow {
    /// 바 타임스탬프
    pub timestamp: DateTime<Utc>,
    /// 바 종가
    pub close: f64,
    /// feature 값
    pub features: FeatureVector,
}

/// 라벨이 붙은 학습 샘플.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LabeledSample {
    /// feature 값
    pub features: FeatureVector,
    /// 정답 라벨
    pub label: Label,
}

/// 분류기 클래스 확률 `[p_neutral, p_up, p_down]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassProbabilities {
    /// NEUTRAL (관망) 확률
    pub neutral: f64,
    /// UP (매수) 확률
    pub buy: f64,
    /// DOWN (매도) 확률
    pub sell: f64,
}

impl ClassProbabilities {
    /// 클래스 인덱스 순서의 배열에서 생성합니다.
    pub fn from_array(probs: [f64; Label::COUNT]) -> Self {
        Self {
            neutral: probs[Label::Neutral.index()],
            buy: probs[Label::Up.index()],
            sell: probs[Label::Down.index()],
        }
    }

    /// 방향성 클래스 중 큰 확률 (신뢰도).
    pub fn confidence(&self) -> f64 {
        self.buy.max(self.sell)
    }

    /// 가장 확률이 높은 라벨.
    pub fn argmax(&self) -> Label {
        if self.buy >= self.neutral && self.buy >= self.sell {
            Label::Up
        } else if self.sell >= self.neutral {
            Label::Down
        } else {
            Label::Neutral
        }
    }
}

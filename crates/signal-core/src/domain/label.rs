//! 학습용 라벨.

use serde::{Deserialize, Serialize};

/// 바의 미래 가격 경로로 결정되는 클래스 라벨.
///
/// 클래스 인덱스는 분류기 출력 순서와 같습니다: 0 = NEUTRAL, 1 = UP, 2 = DOWN.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Label {
    /// 임계값 이내
    Neutral,
    /// 상승
    Up,
    /// 하락
    Down,
}

impl Label {
    /// 전체 클래스 수.
    pub const COUNT: usize = 3;

    /// 분류기 클래스 인덱스.
    pub fn index(&self) -> usize {
        match self {
            Label::Neutral => 0,
            Label::Up => 1,
            Label::Down => 2,
        }
    }

    /// 클래스 인덱스에서 변환합니다.
    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Label::Neutral),
            1 => Some(Label::Up),
            2 => Some(Label::Down),
            _ => None,
        }
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Label::Neutral => write!(f, "NEUTRAL"),
            Label::Up => write!(f, "UP"),
            Label::Down => write!(f, "DOWN"),
        }
    }
}

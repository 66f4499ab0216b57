//! 학습 라벨 생성.
//!
//! `LOOKAHEAD` 바 이후의 수익률로 각 바에 NEUTRAL / UP / DOWN 라벨을 붙입니다.
//! 미래 바가 부족한 마지막 `LOOKAHEAD`개 바는 라벨이 정의되지 않으며 제외됩니다.

use serde::{Deserialize, Serialize};
use signal_core::{Label, SignalConfig};

use crate::ml::{FeatureRow, LabeledSample};

/// 전방 수익률 기반 라벨러.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Labeler {
    /// 전방 바 수
    pub lookahead: usize,
    /// 수익률 임계값
    pub threshold: f64,
}

impl Default for Labeler {
    fn default() -> Self {
        Self {
            lookahead: 10,
            threshold: 0.0015,
        }
    }
}

impl Labeler {
    /// 새 라벨러 생성.
    pub fn new(lookahead: usize, threshold: f64) -> Self {
        Self {
            lookahead,
            threshold,
        }
    }

    /// 시그널 설정에서 생성.
    pub fn from_config(config: &SignalConfig) -> Self {
        Self::new(config.lookahead, config.label_threshold)
    }

    /// 단일 수익률을 라벨로 변환합니다.
    ///
    /// 경계값(`±threshold`와 정확히 같은 경우)은 NEUTRAL입니다.
    pub fn classify(&self, forward_return: f64) -> Label {
        if forward_return > self.threshold {
            Label::Up
        } else if forward_return < -self.threshold {
            Label::Down
        } else {
            Label::Neutral
        }
    }

    /// 종가 시계열에 라벨을 붙입니다.
    ///
    /// 결과 길이는 `max(0, n - lookahead)`이고 `labels[i]`는 `closes[i]`에 대응합니다.
    pub fn label(&self, closes: &[f64]) -> Vec<Label> {
        if closes.len() <= self.lookahead {
            return Vec::new();
        }

        (0..closes.len() - self.lookahead)
            .map(|i| {
                let base = closes[i];
                let forward = closes[i + self.lookahead];
                self.classify((forward - base) / base)
            })
            .collect()
    }

    /// feature 행에 라벨을 붙여 학습 샘플을 만듭니다.
    pub fn label_rows(&self, rows: &[FeatureRow]) -> Vec<LabeledSample> {
        let closes: Vec<f64> = rows.iter().map(|r| r.close).collect();
        self.label(&closes)
            .into_iter()
            .zip(rows.iter())
            .map(|(label, row)| LabeledSample {
                features: row.features,
                label,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_boundaries() {
        let labeler = Labeler::default();

        assert_eq!(labeler.classify(0.0015), Label::Neutral);
        assert_eq!(labeler.classify(-0.0015), Label::Neutral);
        assert_eq!(labeler.classify(0.0016), Label::Up);
        assert_eq!(labeler.classify(-0.0016), Label::Down);
        assert_eq!(labeler.classify(0.0), Label::Neutral);
    }

    #[test]
    fn test_label_series() {
        let labeler = Labeler::new(2, 0.01);
        let closes = [100.0, 100.0, 102.0, 99.0, 100.0, 100.5];

        let labels = labeler.label(&closes);

        assert_eq!(labels.len(), 4);
        // 100 -> 102: +2%
        assert_eq!(labels[0], Label::Up);
        // 100 -> 99: -1% (경계)
        assert_eq!(labels[1], Label::Neutral);
        // 102 -> 100: -1.96%
        assert_eq!(labels[2], Label::Down);
        // 99 -> 100.5: +1.5%
        assert_eq!(labels[3], Label::Up);
    }

    #[test]
    fn test_short_series_has_no_labels() {
        let labeler = Labeler::default();
        assert!(labeler.label(&[1.0; 10]).is_empty());
        assert_eq!(labeler.label(&[1.0; 11]).len(), 1);
    }
}

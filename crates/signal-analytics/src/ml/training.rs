//! 분류기 학습 파이프라인.
//!
//! 바 → feature → 라벨 → 소프트맥스 학습 순서로 진행하며,
//! 시간 순서를 유지한 채 마지막 구간을 검증용으로 떼어 둡니다.

use serde::{Deserialize, Serialize};
use signal_core::{Bar, Label};
use tracing::info;

use crate::ml::classifier::{Classifier, SoftmaxClassifier, SoftmaxParams};
use crate::ml::features::FeatureEngine;
use crate::ml::labeler::Labeler;
use crate::ml::{LabeledSample, MlError, MlResult};

/// 클래스별 샘플 수.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassCounts {
    /// NEUTRAL
    pub neutral: usize,
    /// UP
    pub up: usize,
    /// DOWN
    pub down: usize,
}

impl ClassCounts {
    /// 샘플에서 집계합니다.
    pub fn from_samples(samples: &[LabeledSample]) -> Self {
        samples.iter().fold(Self::default(), |mut acc, s| {
            match s.label {
                Label::Neutral => acc.neutral += 1,
                Label::Up => acc.up += 1,
                Label::Down => acc.down += 1,
            }
            acc
        })
    }
}

/// 학습 결과 요약.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    /// 전체 라벨 샘플 수
    pub samples: usize,
    /// 학습 구간 샘플 수
    pub train_samples: usize,
    /// 검증 구간 샘플 수
    pub holdout_samples: usize,
    /// 클래스 분포
    pub class_counts: ClassCounts,
    /// 학습 구간 정확도
    pub train_accuracy: f64,
    /// 검증 구간 정확도 (검증 구간이 비어 있으면 `None`)
    pub holdout_accuracy: Option<f64>,
}

/// 분류기 학습기.
#[derive(Debug, Clone)]
pub struct Trainer {
    engine: FeatureEngine,
    labeler: Labeler,
    params: SoftmaxParams,
    holdout_ratio: f64,
}

impl Trainer {
    /// 새 학습기 생성. 검증 비율 기본값은 0.2입니다.
    pub fn new(engine: FeatureEngine, labeler: Labeler, params: SoftmaxParams) -> Self {
        Self {
            engine,
            labeler,
            params,
            holdout_ratio: 0.2,
        }
    }

    /// 검증 구간 비율 설정 (0.0 ~ 0.9).
    pub fn with_holdout_ratio(mut self, ratio: f64) -> Self {
        self.holdout_ratio = ratio.clamp(0.0, 0.9);
        self
    }

    /// 바 시계열로 분류기를 학습합니다.
    pub fn train(&self, bars: &[Bar]) -> MlResult<(SoftmaxClassifier, TrainingReport)> {
        let rows = self.engine.engineer(bars)?;
        let samples = self.labeler.label_rows(&rows);
        if samples.is_empty() {
            return Err(MlError::InsufficientData {
                required: self.engine.min_bars_required() + self.labeler.lookahead + 1,
                actual: bars.len(),
            });
        }

        let holdout = (samples.len() as f64 * self.holdout_ratio).floor() as usize;
        let split = samples.len() - holdout;
        let (train_set, holdout_set) = samples.split_at(split);

        let model = SoftmaxClassifier::fit(train_set, self.params)?;

        let report = TrainingReport {
            samples: samples.len(),
            train_samples: train_set.len(),
            holdout_samples: holdout_set.len(),
            class_counts: ClassCounts::from_samples(&samples),
            train_accuracy: accuracy(&model, train_set)?,
            holdout_accuracy: if holdout_set.is_empty() {
                None
            } else {
                Some(accuracy(&model, holdout_set)?)
            },
        };

        info!(
            samples = report.samples,
            train_accuracy = report.train_accuracy,
            holdout_accuracy = ?report.holdout_accuracy,
            "분류기 학습 완료"
        );

        Ok((model, report))
    }
}

/// 가장 높은 확률의 클래스가 라벨과 일치하는 비율.
pub fn accuracy(model: &dyn Classifier, samples: &[LabeledSample]) -> MlResult<f64> {
    if samples.is_empty() {
        return Ok(0.0);
    }
    let mut correct = 0usize;
    for sample in samples {
        if model.predict_probabilities(&sample.features)?.argmax() == sample.label {
            correct += 1;
        }
    }
    Ok(correct as f64 / samples.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::MockClassifier;
    use crate::ml::FeatureVector;
    use signal_core::bars_from_prices;

    fn trending_prices(n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| 100.0 + (i as f64 * 0.15).sin() * 3.0 + (i as f64 * 0.9).cos() * 0.4)
            .collect()
    }

    fn trainer() -> Trainer {
        Trainer::new(
            FeatureEngine::with_defaults(),
            Labeler::default(),
            SoftmaxParams {
                epochs: 50,
                ..Default::default()
            },
        )
    }

    #[test]
    fn test_train_report_counts() {
        let bars = bars_from_prices(&trending_prices(150));

        let (_, report) = trainer().train(&bars).unwrap();

        // 150 - 33 = 117 행, 마지막 10개는 라벨 없음
        assert_eq!(report.samples, 107);
        assert_eq!(report.holdout_samples, 21);
        assert_eq!(report.train_samples, 86);
        let counts = report.class_counts;
        assert_eq!(counts.neutral + counts.up + counts.down, 107);
        assert!((0.0..=1.0).contains(&report.train_accuracy));
        assert!(report.holdout_accuracy.is_some());
    }

    #[test]
    fn test_train_without_holdout() {
        let bars = bars_from_prices(&trending_prices(100));

        let (_, report) = trainer().with_holdout_ratio(0.0).train(&bars).unwrap();

        assert_eq!(report.holdout_samples, 0);
        assert_eq!(report.holdout_accuracy, None);
    }

    #[test]
    fn test_train_insufficient_data() {
        let bars = bars_from_prices(&trending_prices(40));

        assert!(matches!(
            trainer().train(&bars),
            Err(MlError::InsufficientData { .. })
        ));
    }

    #[test]
    fn test_accuracy() {
        let samples = vec![
            LabeledSample {
                features: FeatureVector::default(),
                label: Label::Up,
            },
            LabeledSample {
                features: FeatureVector::default(),
                label: Label::Down,
            },
        ];
        let mock = MockClassifier::fixed(0.1, 0.8, 0.1);

        assert_eq!(accuracy(&mock, &samples).unwrap(), 0.5);
    }
}

//! 3-클래스 분류기.
//!
//! feature 벡터 하나를 `[p_neutral, p_up, p_down]` 확률로 변환합니다.
//! 학습된 분류기는 한 번 로드된 뒤 읽기 전용으로 공유됩니다
//! (`Arc<dyn Classifier>`).

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};
use signal_core::Label;
use tracing::{debug, info};

use crate::ml::{ClassProbabilities, FeatureVector, LabeledSample, MlError, MlResult};

const N_FEATURES: usize = FeatureVector::LEN;
const N_CLASSES: usize = Label::COUNT;

/// 플러그형 분류기 인터페이스.
pub trait Classifier: Send + Sync {
    /// 클래스 확률 계산.
    fn predict_probabilities(&self, features: &FeatureVector) -> MlResult<ClassProbabilities>;

    /// 모델 이름 반환.
    fn model_name(&self) -> &str;
}

/// feature별 표준화 (평균 0, 분산 1).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    mean: Vec<f64>,
    std: Vec<f64>,
}

impl Default for StandardScaler {
    fn default() -> Self {
        Self {
            mean: vec![0.0; N_FEATURES],
            std: vec![1.0; N_FEATURES],
        }
    }
}

impl StandardScaler {
    /// 샘플에서 평균과 모표준편차를 추정합니다.
    ///
    /// 분산이 0인 feature는 표준편차 1.0으로 둡니다.
    pub fn fit(rows: &[[f64; N_FEATURES]]) -> Self {
        if rows.is_empty() {
            return Self::default();
        }
        let n = rows.len() as f64;

        let mut mean = vec![0.0; N_FEATURES];
        for row in rows {
            for (m, x) in mean.iter_mut().zip(row.iter()) {
                *m += x / n;
            }
        }

        let mut std = vec![0.0; N_FEATURES];
        for row in rows {
            for j in 0..N_FEATURES {
                std[j] += (row[j] - mean[j]).powi(2) / n;
            }
        }
        for s in std.iter_mut() {
            *s = if *s > 1e-12 { s.sqrt() } else { 1.0 };
        }

        Self { mean, std }
    }

    /// 표준화 변환.
    pub fn transform(&self, x: &[f64; N_FEATURES]) -> [f64; N_FEATURES] {
        let mut out = [0.0; N_FEATURES];
        for j in 0..N_FEATURES {
            out[j] = (x[j] - self.mean[j]) / self.std[j];
        }
        out
    }

    fn is_valid(&self) -> bool {
        self.mean.len() == N_FEATURES
            && self.std.len() == N_FEATURES
            && self.std.iter().all(|s| s.is_finite() && *s > 0.0)
    }
}

/// 소프트맥스 분류기 학습 파라미터.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SoftmaxParams {
    /// 학습률
    pub learning_rate: f64,
    /// 전체 배치 반복 횟수
    pub epochs: usize,
    /// L2 정규화 강도
    pub l2: f64,
}

impl Default for SoftmaxParams {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            epochs: 500,
            l2: 1e-4,
        }
    }
}

/// 다항 로지스틱 회귀 분류기.
///
/// 입력은 `StandardScaler`로 표준화되고, 가중치는 0에서 시작하는
/// 배치 경사하강법으로 학습되므로 같은 데이터에 대해 결과가 결정적입니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoftmaxClassifier {
    scaler: StandardScaler,
    /// 클래스별 가중치 (`[클래스][feature]`)
    weights: Vec<Vec<f64>>,
    /// 클래스별 절편
    bias: Vec<f64>,
    /// 학습 파라미터
    params: SoftmaxParams,
}

impl SoftmaxClassifier {
    /// 라벨된 샘플로 분류기를 학습합니다.
    pub fn fit(samples: &[LabeledSample], params: SoftmaxParams) -> MlResult<Self> {
        if samples.is_empty() {
            return Err(MlError::Training("학습 샘플이 없습니다".to_string()));
        }
        let valid = params.learning_rate.is_finite()
            && params.learning_rate > 0.0
            && params.epochs > 0
            && params.l2 >= 0.0;
        if !valid {
            return Err(MlError::Training(format!("잘못된 학습 파라미터: {params:?}")));
        }
        if samples.iter().any(|s| !s.features.is_finite()) {
            return Err(MlError::Training(
                "유한하지 않은 feature 값이 포함되어 있습니다".to_string(),
            ));
        }

        let raw: Vec<[f64; N_FEATURES]> = samples.iter().map(|s| s.features.to_array()).collect();
        let scaler = StandardScaler::fit(&raw);
        let xs: Vec<[f64; N_FEATURES]> = raw.iter().map(|x| scaler.transform(x)).collect();
        let ys: Vec<usize> = samples.iter().map(|s| s.label.index()).collect();

        let mut model = Self {
            scaler,
            weights: vec![vec![0.0; N_FEATURES]; N_CLASSES],
            bias: vec![0.0; N_CLASSES],
            params,
        };

        let n = xs.len() as f64;
        for epoch in 0..params.epochs {
            let mut grad_w = vec![vec![0.0; N_FEATURES]; N_CLASSES];
            let mut grad_b = vec![0.0; N_CLASSES];
            let mut loss = 0.0;

            for (x, &y) in xs.iter().zip(ys.iter()) {
                let probs = model.softmax(x);
                loss -= probs[y].max(1e-15).ln();
                for k in 0..N_CLASSES {
                    let g = probs[k] - if k == y { 1.0 } else { 0.0 };
                    for j in 0..N_FEATURES {
                        grad_w[k][j] += g * x[j];
                    }
                    grad_b[k] += g;
                }
            }

            for k in 0..N_CLASSES {
                for j in 0..N_FEATURES {
                    let g = grad_w[k][j] / n + params.l2 * model.weights[k][j];
                    model.weights[k][j] -= params.learning_rate * g;
                }
                model.bias[k] -= params.learning_rate * grad_b[k] / n;
            }

            if epoch % 100 == 0 || epoch + 1 == params.epochs {
                debug!(epoch, loss = loss / n, "소프트맥스 학습 진행");
            }
        }

        Ok(model)
    }

    /// 표준화된 입력에 대한 소프트맥스 확률.
    fn softmax(&self, x: &[f64; N_FEATURES]) -> [f64; N_CLASSES] {
        let mut logits = [0.0; N_CLASSES];
        for k in 0..N_CLASSES {
            logits[k] = self.bias[k]
                + self.weights[k]
                    .iter()
                    .zip(x.iter())
                    .map(|(w, xi)| w * xi)
                    .sum::<f64>();
        }

        let max = logits.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let mut probs = [0.0; N_CLASSES];
        let mut total = 0.0;
        for k in 0..N_CLASSES {
            probs[k] = (logits[k] - max).exp();
            total += probs[k];
        }
        for p in probs.iter_mut() {
            *p /= total;
        }
        probs
    }

    /// 모델 구조가 올바른지 확인.
    fn check_shape(&self) -> MlResult<()> {
        let weights_ok = self.weights.len() == N_CLASSES
            && self.weights.iter().all(|w| w.len() == N_FEATURES);
        if !weights_ok || self.bias.len() != N_CLASSES || !self.scaler.is_valid() {
            return Err(MlError::ModelIo(format!(
                "모델 구조 불일치: 클래스 {N_CLASSES}개, feature {N_FEATURES}개가 필요합니다"
            )));
        }
        Ok(())
    }

    /// JSON 파일로 저장.
    pub fn save(&self, path: impl AsRef<Path>) -> MlResult<()> {
        let path = path.as_ref();
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, self)?;
        info!(path = %path.display(), "모델 저장 완료");
        Ok(())
    }

    /// JSON 파일에서 로드.
    pub fn load(path: impl AsRef<Path>) -> MlResult<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            MlError::ModelIo(format!("모델 파일 열기 실패 ({}): {e}", path.display()))
        })?;
        let model: Self = serde_json::from_reader(BufReader::new(file))?;
        model.check_shape()?;
        info!(path = %path.display(), "모델 로드 완료");
        Ok(model)
    }

    /// 학습 파라미터 반환.
    pub fn params(&self) -> &SoftmaxParams {
        &self.params
    }
}

impl Classifier for SoftmaxClassifier {
    fn predict_probabilities(&self, features: &FeatureVector) -> MlResult<ClassProbabilities> {
        if !features.is_finite() {
            return Err(MlError::Inference(
                "유한하지 않은 feature 값".to_string(),
            ));
        }
        let x = self.scaler.transform(&features.to_array());
        let probs = self.softmax(&x);
        if !probs.iter().all(|p| p.is_finite()) {
            return Err(MlError::Inference(
                "로짓이 유한하지 않습니다 (feature 값이 너무 큼)".to_string(),
            ));
        }
        Ok(ClassProbabilities::from_array(probs))
    }

    fn model_name(&self) -> &str {
        "softmax"
    }
}

/// 테스트용 mock 분류기.
#[derive(Debug, Clone)]
pub struct MockClassifier {
    probabilities: [f64; N_CLASSES],
    failure: Option<String>,
}

impl MockClassifier {
    /// 항상 같은 확률을 반환하는 분류기 생성.
    pub fn fixed(p_neutral: f64, p_buy: f64, p_sell: f64) -> Self {
        Self {
            probabilities: [p_neutral, p_buy, p_sell],
            failure: None,
        }
    }

    /// 항상 실패하는 분류기 생성.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            probabilities: [1.0, 0.0, 0.0],
            failure: Some(message.into()),
        }
    }
}

impl Classifier for MockClassifier {
    fn predict_probabilities(&self, _features: &FeatureVector) -> MlResult<ClassProbabilities> {
        match &self.failure {
            Some(message) => Err(MlError::Inference(message.clone())),
            None => Ok(ClassProbabilities::from_array(self.probabilities)),
        }
    }

    fn model_name(&self) -> &str {
        "mock_classifier"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(z: f64, label: Label) -> LabeledSample {
        LabeledSample {
            features: FeatureVector {
                z_spike: z,
                rsi: 50.0 + z * 10.0,
                ..Default::default()
            },
            label,
        }
    }

    fn separable() -> Vec<LabeledSample> {
        let mut samples = Vec::new();
        for i in 0..30 {
            let jitter = (i % 5) as f64 * 0.05;
            samples.push(sample(2.0 + jitter, Label::Up));
            samples.push(sample(-2.0 - jitter, Label::Down));
            samples.push(sample(jitter - 0.1, Label::Neutral));
        }
        samples
    }

    #[test]
    fn test_scaler_constant_feature() {
        let scaler = StandardScaler::fit(&[[1.0; N_FEATURES], [1.0; N_FEATURES]]);
        assert_eq!(scaler.transform(&[1.0; N_FEATURES]), [0.0; N_FEATURES]);
    }

    #[test]
    fn test_probabilities_sum_to_one() {
        let model = SoftmaxClassifier::fit(&separable(), SoftmaxParams::default()).unwrap();

        let probs = model
            .predict_probabilities(&sample(0.7, Label::Up).features)
            .unwrap();

        let total = probs.neutral + probs.buy + probs.sell;
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_learns_separable_classes() {
        let model = SoftmaxClassifier::fit(&separable(), SoftmaxParams::default()).unwrap();

        let up = model.predict_probabilities(&sample(2.1, Label::Up).features).unwrap();
        let down = model.predict_probabilities(&sample(-2.1, Label::Down).features).unwrap();

        assert_eq!(up.argmax(), Label::Up);
        assert_eq!(down.argmax(), Label::Down);
    }

    #[test]
    fn test_fit_rejects_empty() {
        assert!(matches!(
            SoftmaxClassifier::fit(&[], SoftmaxParams::default()),
            Err(MlError::Training(_))
        ));
    }

    #[test]
    fn test_predict_rejects_nan() {
        let model = SoftmaxClassifier::fit(&separable(), SoftmaxParams::default()).unwrap();
        let mut features = FeatureVector::default();
        features.atr = f64::NAN;

        assert!(matches!(
            model.predict_probabilities(&features),
            Err(MlError::Inference(_))
        ));
    }

    #[test]
    fn test_predict_rejects_overflowing_logits() {
        let model = SoftmaxClassifier {
            scaler: StandardScaler::default(),
            weights: vec![
                vec![0.0; N_FEATURES],
                [vec![1.0], vec![0.0; N_FEATURES - 1]].concat(),
                [vec![2.0], vec![0.0; N_FEATURES - 1]].concat(),
            ],
            bias: vec![0.0; N_CLASSES],
            params: SoftmaxParams::default(),
        };
        let features = FeatureVector {
            z_spike: 1e308,
            ..Default::default()
        };

        assert!(matches!(
            model.predict_probabilities(&features),
            Err(MlError::Inference(_))
        ));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        let model = SoftmaxClassifier::fit(&separable(), SoftmaxParams::default()).unwrap();

        model.save(&path).unwrap();
        let loaded = SoftmaxClassifier::load(&path).unwrap();

        let features = sample(1.3, Label::Up).features;
        let a = model.predict_probabilities(&features).unwrap();
        let b = loaded.predict_probabilities(&features).unwrap();
        assert!((a.buy - b.buy).abs() < 1e-9);
        assert!((a.sell - b.sell).abs() < 1e-9);
    }

    #[test]
    fn test_load_missing_file() {
        let result = SoftmaxClassifier::load("/nonexistent/model.json");
        assert!(matches!(result, Err(MlError::ModelIo(_))));
    }

    #[test]
    fn test_load_rejects_wrong_shape() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        let model = SoftmaxClassifier::fit(&separable(), SoftmaxParams::default()).unwrap();
        let mut value = serde_json::to_value(&model).unwrap();
        value["bias"] = serde_json::json!([0.0, 0.0]);
        std::fs::write(&path, value.to_string()).unwrap();

        assert!(matches!(
            SoftmaxClassifier::load(&path),
            Err(MlError::ModelIo(_))
        ));
    }

    #[test]
    fn test_mock_classifier() {
        let mock = MockClassifier::fixed(0.2, 0.7, 0.1);
        let probs = mock.predict_probabilities(&FeatureVector::default()).unwrap();
        assert_eq!(probs.buy, 0.7);

        let mock = MockClassifier::failing("boom");
        assert!(mock
            .predict_probabilities(&FeatureVector::default())
            .is_err());
    }
}

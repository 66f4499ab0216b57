//! ML 모듈 에러 타입.

use thiserror::Error;

use crate::indicators::IndicatorError;

/// ML 작업에서 발생할 수 있는 에러.
#[derive(Debug, Error)]
pub enum MlError {
    /// 모델 파일 로드/저장 에러
    #[error("Model io error: {0}")]
    ModelIo(String),

    /// 분류기 추론 에러
    #[error("Inference error: {0}")]
    Inference(String),

    /// 예측기(forecaster) 에러
    #[error("Forecast error: {0}")]
    Forecast(String),

    /// 바 데이터에서 feature 추출 에러
    #[error("Feature extraction error: {0}")]
    FeatureExtraction(String),

    /// 학습 에러
    #[error("Training error: {0}")]
    Training(String),

    /// 유효하지 않은 입력 데이터
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// 분석을 위한 데이터 부족
    #[error("Insufficient data: need {required} samples, got {actual}")]
    InsufficientData { required: usize, actual: usize },
}

/// ML 작업을 위한 Result 타입.
pub type MlResult<T> = Result<T, MlError>;

impl MlError {
    /// 입력 데이터 문제로 인한 에러인지 확인 (다른 데이터로 재시도 가능).
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            MlError::InsufficientData { .. } | MlError::InvalidInput(_)
        )
    }

    /// 플러그형 구성요소(예측기/분류기)의 실패인지 확인.
    pub fn is_capability_failure(&self) -> bool {
        matches!(self, MlError::Forecast(_) | MlError::Inference(_))
    }
}

impl From<IndicatorError> for MlError {
    fn from(err: IndicatorError) -> Self {
        match err {
            IndicatorError::InsufficientData { required, provided } => MlError::InsufficientData {
                required,
                actual: provided,
            },
            other => MlError::FeatureExtraction(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for MlError {
    fn from(err: serde_json::Error) -> Self {
        MlError::ModelIo(err.to_string())
    }
}

impl From<std::io::Error> for MlError {
    fn from(err: std::io::Error) -> Self {
        MlError::ModelIo(err.to_string())
    }
}

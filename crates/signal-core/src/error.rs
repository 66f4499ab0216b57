//! 시그널 엔진의 에러 타입.
//!
//! 이 모듈은 크레이트 전반에서 공유되는 에러 타입을 정의합니다.

use thiserror::Error;

/// 핵심 에러.
#[derive(Debug, Error)]
pub enum SignalError {
    /// 설정 에러
    #[error("설정 에러: {0}")]
    Config(String),

    /// 데이터 에러 (정렬되지 않은 바, 잘못된 가격 등)
    #[error("데이터 에러: {0}")]
    Data(String),

    /// 직렬화 에러
    #[error("직렬화 에러: {0}")]
    Serialization(String),

    /// 잘못된 입력
    #[error("잘못된 입력: {0}")]
    InvalidInput(String),

    /// 파일 입출력 에러
    #[error("입출력 에러: {0}")]
    Io(#[from] std::io::Error),
}

/// 핵심 작업을 위한 Result 타입.
pub type SignalResult<T> = Result<T, SignalError>;

impl SignalError {
    /// 입력을 고치면 재시도할 수 있는 에러인지 확인합니다.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            SignalError::InvalidInput(_) | SignalError::Data(_) | SignalError::Serialization(_)
        )
    }
}

impl From<serde_json::Error> for SignalError {
    fn from(err: serde_json::Error) -> Self {
        SignalError::Serialization(err.to_string())
    }
}

impl From<config::ConfigError> for SignalError {
    fn from(err: config::ConfigError) -> Self {
        SignalError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SignalError::Config("lookahead must be positive".to_string());
        assert_eq!(err.to_string(), "설정 에러: lookahead must be positive");
    }

    #[test]
    fn test_input_errors() {
        assert!(SignalError::InvalidInput("x".to_string()).is_input_error());
        assert!(SignalError::Data("unsorted".to_string()).is_input_error());
        assert!(!SignalError::Config("x".to_string()).is_input_error());
    }

    #[test]
    fn test_from_serde_json() {
        let err: SignalError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert!(matches!(err, SignalError::Serialization(_)));
    }
}

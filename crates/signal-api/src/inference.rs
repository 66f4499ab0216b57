//! 라이브 추론 핸들러.
//!
//! 원시 요청 바디를 받아 항상 응답을 돌려줍니다. 입력이 잘못되었거나
//! 예측기/분류기가 실패하면 에러 대신 안전 기본값(WAIT, sl = tp = 0.0)을 반환합니다.
//!
//! # 처리 순서
//!
//! ```text
//! body ─▶ 2단계 파싱 ─▶ 검증 ─▶ 합성 바 ─▶ FeatureEngine ─▶ Classifier
//!                                                              │
//!                       response ◀─ Stop/Target ◀─ Decision ◀──┘
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use signal_analytics::{
    Classifier, FeatureEngine, MlError, SignalDecision, StopTargetCalculator,
};
use signal_core::{bars_from_prices, Side, Signal, SignalConfig, SignalSide};
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// `/analyze` 응답.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    /// BUY / SELL / WAIT
    pub signal: SignalSide,
    /// 손절가 (소수점 5자리)
    pub sl: f64,
    /// 익절가 (소수점 5자리)
    pub tp: f64,
    /// 신뢰도 (소수점 2자리). 안전 기본값에는 없음
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub conf: Option<f64>,
}

impl AnalyzeResponse {
    /// 안전 기본값 `{signal: WAIT, sl: 0.0, tp: 0.0}`.
    pub fn safe_default() -> Self {
        Self {
            signal: SignalSide::Wait,
            sl: 0.0,
            tp: 0.0,
            conf: None,
        }
    }

    /// 안전 기본값인지 확인.
    pub fn is_safe_default(&self) -> bool {
        *self == Self::safe_default()
    }
}

impl From<Signal> for AnalyzeResponse {
    fn from(signal: Signal) -> Self {
        Self {
            signal: signal.side,
            sl: round_to(signal.stop, 5),
            tp: round_to(signal.target, 5),
            conf: Some(round_to(signal.confidence, 2)),
        }
    }
}

/// 소수점 `digits`자리 반올림.
fn round_to(value: f64, digits: i32) -> f64 {
    let scale = 10f64.powi(digits);
    (value * scale).round() / scale
}

/// 추론 실패 사유.
#[derive(Debug, Error)]
pub enum InferenceError {
    /// JSON으로 해석할 수 없는 바디
    #[error("요청 바디 파싱 실패: {0}")]
    Parse(String),

    /// 형식은 맞지만 내용이 잘못된 페이로드
    #[error("잘못된 페이로드: {0}")]
    InvalidPayload(String),

    /// feature 행을 만들기에 가격이 부족함
    #[error("가격 이력 부족: {provided}개 제공, 최소 {required}개 필요")]
    InsufficientHistory { provided: usize, required: usize },

    /// 예측기 또는 분류기 실패
    #[error("모델 실패: {0}")]
    Capability(#[from] MlError),
}

impl InferenceError {
    /// 메트릭 라벨.
    pub fn outcome(&self) -> AnalyzeOutcome {
        match self {
            InferenceError::Parse(_) => AnalyzeOutcome::MalformedBody,
            InferenceError::InvalidPayload(_) => AnalyzeOutcome::InvalidPayload,
            InferenceError::InsufficientHistory { .. } => AnalyzeOutcome::InsufficientHistory,
            InferenceError::Capability(_) => AnalyzeOutcome::CapabilityFailure,
        }
    }
}

/// 요청 처리 결과 분류.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnalyzeOutcome {
    /// 시그널 생성 (WAIT 포함)
    Signal,
    /// 바디 읽기 실패 (크기 제한 초과 등)
    BodyRejected,
    /// 파싱 실패
    MalformedBody,
    /// 검증 실패
    InvalidPayload,
    /// 이력 부족
    InsufficientHistory,
    /// 모델 실패
    CapabilityFailure,
    /// 시간 초과 또는 작업 실패
    Timeout,
}

impl AnalyzeOutcome {
    /// 메트릭 라벨 문자열.
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalyzeOutcome::Signal => "signal",
            AnalyzeOutcome::BodyRejected => "body_rejected",
            AnalyzeOutcome::MalformedBody => "malformed_body",
            AnalyzeOutcome::InvalidPayload => "invalid_payload",
            AnalyzeOutcome::InsufficientHistory => "insufficient_history",
            AnalyzeOutcome::CapabilityFailure => "capability_failure",
            AnalyzeOutcome::Timeout => "timeout",
        }
    }
}

/// 바디를 JSON 값으로 해석합니다.
///
/// 전체 바디를 엄격하게 파싱하고, 실패하면 바디 앞부분의 첫 JSON 값만 읽습니다
/// (뒤따르는 바이트는 무시).
pub fn parse_body(body: &[u8]) -> Result<Value, InferenceError> {
    match serde_json::from_slice::<Value>(body) {
        Ok(value) => Ok(value),
        Err(strict_err) => {
            debug!(error = %strict_err, "엄격 파싱 실패, 첫 JSON 값만 읽기 시도");
            match serde_json::Deserializer::from_slice(body)
                .into_iter::<Value>()
                .next()
            {
                Some(Ok(value)) => Ok(value),
                Some(Err(e)) => Err(InferenceError::Parse(e.to_string())),
                None => Err(InferenceError::Parse(strict_err.to_string())),
            }
        }
    }
}

/// 검증된 추론 요청.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzeRequest {
    /// 종목명
    pub symbol: String,
    /// 최근 가격 (오래된 것부터)
    pub prices: Vec<f64>,
}

/// 라이브 추론 핸들러.
///
/// 분류기는 로드된 뒤 읽기 전용으로 공유되며, 요청 간 상태를 갖지 않습니다.
#[derive(Clone)]
pub struct LiveInference {
    instrument: String,
    min_prices: usize,
    engine: FeatureEngine,
    classifier: Arc<dyn Classifier>,
    decision: SignalDecision,
    calculator: StopTargetCalculator,
}

impl std::fmt::Debug for LiveInference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LiveInference")
            .field("instrument", &self.instrument)
            .field("min_prices", &self.min_prices)
            .field("classifier", &self.classifier.model_name())
            .finish()
    }
}

impl LiveInference {
    /// 시그널 설정, 피처 엔진, 분류기로 생성합니다.
    pub fn new(config: &SignalConfig, engine: FeatureEngine, classifier: Arc<dyn Classifier>) -> Self {
        Self {
            instrument: config.instrument.clone(),
            min_prices: config.lookahead,
            engine,
            classifier,
            decision: SignalDecision::from_config(config),
            calculator: StopTargetCalculator::from_config(config),
        }
    }

    /// 설정된 종목명.
    pub fn instrument(&self) -> &str {
        &self.instrument
    }

    /// 분류기 이름.
    pub fn model_name(&self) -> &str {
        self.classifier.model_name()
    }

    /// 요청 바디를 처리합니다. 실패하면 안전 기본값을 반환하며 절대 패닉하지 않습니다.
    pub fn analyze(&self, body: &[u8]) -> AnalyzeResponse {
        self.analyze_with_outcome(body).0
    }

    /// 응답과 처리 결과 분류를 함께 반환합니다.
    pub fn analyze_with_outcome(&self, body: &[u8]) -> (AnalyzeResponse, AnalyzeOutcome) {
        debug!(body = %String::from_utf8_lossy(body), "analyze 요청 수신");

        match self.evaluate(body) {
            Ok(signal) => {
                info!(
                    signal = %signal.side,
                    stop = signal.stop,
                    target = signal.target,
                    confidence = signal.confidence,
                    "시그널 생성"
                );
                (AnalyzeResponse::from(signal), AnalyzeOutcome::Signal)
            }
            Err(e) => {
                match &e {
                    InferenceError::Capability(_) => error!(error = %e, "추론 실패, WAIT 반환"),
                    _ => warn!(error = %e, "요청 거부, WAIT 반환"),
                }
                (AnalyzeResponse::safe_default(), e.outcome())
            }
        }
    }

    /// 바디를 시그널로 변환합니다.
    pub fn evaluate(&self, body: &[u8]) -> Result<Signal, InferenceError> {
        let value = parse_body(body)?;
        let request = self.validate(&value)?;
        self.infer(&request.prices)
    }

    /// 파싱된 값을 검증합니다.
    pub fn validate(&self, value: &Value) -> Result<AnalyzeRequest, InferenceError> {
        let object = value
            .as_object()
            .ok_or_else(|| InferenceError::InvalidPayload("최상위 값이 객체가 아닙니다".into()))?;

        let symbol = object
            .get("symbol")
            .and_then(Value::as_str)
            .ok_or_else(|| InferenceError::InvalidPayload("symbol 문자열이 없습니다".into()))?;
        if symbol != self.instrument {
            return Err(InferenceError::InvalidPayload(format!(
                "지원하지 않는 종목: {symbol}"
            )));
        }

        let raw_prices = object
            .get("prices")
            .and_then(Value::as_array)
            .ok_or_else(|| InferenceError::InvalidPayload("prices 배열이 없습니다".into()))?;
        if raw_prices.len() < self.min_prices {
            return Err(InferenceError::InvalidPayload(format!(
                "가격이 {}개뿐입니다 (최소 {}개)",
                raw_prices.len(),
                self.min_prices
            )));
        }

        let prices = raw_prices
            .iter()
            .map(|p| p.as_f64().filter(|v| v.is_finite()))
            .collect::<Option<Vec<f64>>>()
            .ok_or_else(|| InferenceError::InvalidPayload("prices에 숫자가 아닌 값".into()))?;

        Ok(AnalyzeRequest {
            symbol: symbol.to_string(),
            prices,
        })
    }

    /// 가격 시퀀스로 시그널을 계산합니다.
    ///
    /// 가격마다 open = high = low = close, volume = 0인 1분 바를 합성합니다.
    pub fn infer(&self, prices: &[f64]) -> Result<Signal, InferenceError> {
        let bars = bars_from_prices(prices);
        let rows = self.engine.engineer(&bars)?;
        let last = rows.last().ok_or(InferenceError::InsufficientHistory {
            provided: prices.len(),
            required: self.engine.min_bars_required(),
        })?;

        let probs = self.classifier.predict_probabilities(&last.features)?;
        let side = self.decision.decide_probabilities(&probs);

        // WAIT은 매도 방향 공식으로 레벨을 계산
        let level_side = side.as_side().unwrap_or(Side::Sell);
        let levels = self
            .calculator
            .levels(last.close, level_side, last.features.atr);

        Ok(Signal {
            side,
            stop: levels.stop,
            target: levels.target,
            confidence: probs.confidence(),
        })
    }
}

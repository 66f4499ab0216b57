//! 라이브 추론 API 서버.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - 방어적 파싱과 안전 기본값을 갖춘 라이브 추론 핸들러
//! - Axum 기반 `/analyze`, `/health` 엔드포인트
//! - Prometheus 메트릭
//!
//! # 모듈 구성
//!
//! - [`inference`]: 요청 바디 → 시그널 변환
//! - [`state`]: 애플리케이션 공유 상태 (AppState)
//! - [`routes`]: REST API 엔드포인트
//! - [`metrics`]: Prometheus 메트릭 수집

pub mod inference;
pub mod metrics;
pub mod routes;
pub mod state;

pub use inference::{AnalyzeOutcome, AnalyzeResponse, InferenceError, LiveInference};
pub use metrics::setup_metrics_recorder;
pub use routes::create_router;
pub use state::AppState;

//! API 라우트.
//!
//! # 라우트 구조
//!
//! - `POST /analyze` - 라이브 추론 (항상 200)
//! - `GET /health` - 헬스 체크
//! - `GET /metrics` - Prometheus 메트릭

pub mod analyze;
pub mod health;

use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, State},
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub use analyze::analyze;
pub use health::{health_check, HealthResponse};

/// 전체 라우터를 생성합니다.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(
            "/analyze",
            post(analyze).layer(DefaultBodyLimit::max(state.max_body_bytes)),
        )
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Prometheus 메트릭 렌더링.
async fn metrics_handler(State(state): State<Arc<AppState>>) -> String {
    state
        .metrics_handle
        .as_ref()
        .map(|handle| handle.render())
        .unwrap_or_default()
}

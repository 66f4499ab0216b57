//! `POST /analyze` endpoint.
//!
//! 바디를 그대로 받아 블로킹 작업으로 추론을 실행합니다.
//! 응답은 항상 HTTP 200이며, 바디 크기 초과, 시간 초과, 작업 실패도 안전 기본값으로 응답합니다.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    Json,
};
use tracing::{error, warn};

use crate::inference::{AnalyzeOutcome, AnalyzeResponse};
use crate::metrics::{record_analyze, record_analyze_duration};
use crate::state::AppState;

/// `POST /analyze`
pub async fn analyze(
    State(state): State<Arc<AppState>>,
    body: Result<Bytes, BytesRejection>,
) -> Json<AnalyzeResponse> {
    let started = Instant::now();

    let body = match body {
        Ok(body) => body,
        Err(rejection) => {
            warn!(error = %rejection, "요청 바디를 읽을 수 없음, WAIT 반환");
            let response = AnalyzeResponse::safe_default();
            record_analyze(AnalyzeOutcome::BodyRejected, &response.signal.to_string());
            record_analyze_duration(started.elapsed().as_secs_f64());
            return Json(response);
        }
    };
    let inference = Arc::clone(&state.inference);

    let task = tokio::task::spawn_blocking(move || inference.analyze_with_outcome(&body));

    let (response, outcome) = match tokio::time::timeout(state.request_timeout, task).await {
        Ok(Ok(result)) => result,
        Ok(Err(join_err)) => {
            error!(error = %join_err, "추론 작업 실패, WAIT 반환");
            (AnalyzeResponse::safe_default(), AnalyzeOutcome::Timeout)
        }
        Err(_) => {
            error!(
                timeout_ms = state.request_timeout.as_millis() as u64,
                "추론 시간 초과, WAIT 반환"
            );
            (AnalyzeResponse::safe_default(), AnalyzeOutcome::Timeout)
        }
    };

    record_analyze(outcome, &response.signal.to_string());
    record_analyze_duration(started.elapsed().as_secs_f64());

    Json(response)
}

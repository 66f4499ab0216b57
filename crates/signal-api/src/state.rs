//! 모든 핸들러에서 공유되는 애플리케이션 상태.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use metrics_exporter_prometheus::PrometheusHandle;

use crate::inference::LiveInference;

/// 기본 요청 바디 최대 크기 (16 MiB).
pub const DEFAULT_MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

/// 애플리케이션 공유 상태.
///
/// Axum의 State extractor를 통해 `Arc<AppState>`로 주입됩니다.
#[derive(Clone)]
pub struct AppState {
    /// 라이브 추론 핸들러 (읽기 전용)
    pub inference: Arc<LiveInference>,

    /// 요청당 추론 제한 시간
    pub request_timeout: Duration,

    /// `/analyze` 요청 바디 최대 크기 (바이트)
    pub max_body_bytes: usize,

    /// Prometheus 핸들 (설치되지 않았으면 `None`)
    pub metrics_handle: Option<PrometheusHandle>,

    /// API 버전
    pub version: String,

    /// 서버 시작 시각
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// 새 상태 생성.
    pub fn new(inference: LiveInference, request_timeout: Duration) -> Self {
        Self {
            inference: Arc::new(inference),
            request_timeout,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            metrics_handle: None,
            version: env!("CARGO_PKG_VERSION").to_string(),
            started_at: Utc::now(),
        }
    }

    /// 요청 바디 최대 크기 설정.
    pub fn with_body_limit(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }

    /// Prometheus 핸들 설정.
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics_handle = Some(handle);
        self
    }

    /// 서버 업타임(초).
    pub fn uptime_secs(&self) -> i64 {
        (Utc::now() - self.started_at).num_seconds()
    }
}

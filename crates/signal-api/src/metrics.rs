//! Prometheus 메트릭 설정 및 유틸리티.
//!
//! `/analyze` 처리 결과와 지연 시간을 수집하고 `/metrics` 엔드포인트로 노출합니다.

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, Matcher, PrometheusBuilder, PrometheusHandle};

use crate::inference::AnalyzeOutcome;

/// Prometheus 메트릭 레코더를 설치하고 핸들을 반환합니다.
///
/// 레코더가 이미 설치되어 있으면 에러를 반환합니다.
pub fn setup_metrics_recorder() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("analyze_duration_seconds".to_string()),
            &[0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5],
        )?
        .install_recorder()
}

/// 처리 결과별 analyze 카운터 증가.
pub fn record_analyze(outcome: AnalyzeOutcome, signal: &str) {
    counter!(
        "analyze_requests_total",
        "outcome" => outcome.as_str(),
        "signal" => signal.to_string()
    )
    .increment(1);
}

/// analyze 처리 시간 기록.
pub fn record_analyze_duration(duration_secs: f64) {
    histogram!("analyze_duration_seconds").record(duration_secs);
}

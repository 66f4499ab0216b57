//! 시그널 API 서버.
//!
//! 학습된 분류기를 로드하고 `/analyze` 엔드포인트를 제공합니다.
//! 설정 파일 경로는 `SIGNAL_CONFIG` 환경변수로 지정할 수 있습니다.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context};
use signal_analytics::{FeatureEngine, LinearTrendForecaster, SoftmaxClassifier};
use signal_api::{create_router, setup_metrics_recorder, AppState, LiveInference};
use signal_core::{init_logging, AppConfig};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env 파일 로드 (있는 경우)
    let _ = dotenvy::dotenv();

    let config_path = std::env::var_os("SIGNAL_CONFIG").map(PathBuf::from);
    let config = AppConfig::load(config_path.as_deref()).context("설정 로드 실패")?;

    init_logging(&config.logging).map_err(|e| anyhow!(e))?;
    info!(instrument = %config.signal.instrument, "Starting signal API server...");

    let metrics_handle = setup_metrics_recorder().context("Prometheus 레코더 설치 실패")?;
    info!("Prometheus metrics recorder initialized");

    // 모델이 없으면 서버를 시작하지 않음
    let model = SoftmaxClassifier::load(&config.paths.model).with_context(|| {
        format!(
            "모델 로드 실패: {} (먼저 `signal train`을 실행하세요)",
            config.paths.model.display()
        )
    })?;

    let engine = FeatureEngine::new(
        config.features.clone(),
        Arc::new(LinearTrendForecaster::new()),
    );
    let inference = LiveInference::new(&config.signal, engine, Arc::new(model));
    info!(model = inference.model_name(), "Live inference handler initialized");

    let state = AppState::new(
        inference,
        Duration::from_millis(config.server.request_timeout_ms),
    )
    .with_body_limit(config.server.max_body_bytes)
    .with_metrics(metrics_handle);

    let app = create_router(Arc::new(state));

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .with_context(|| {
            format!(
                "소켓 주소가 유효하지 않습니다: {}:{}",
                config.server.host, config.server.port
            )
        })?;

    info!(%addr, "API server listening");
    info!("Metrics available at http://{}/metrics", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("바인딩 실패: {addr}"))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped gracefully");
    Ok(())
}

/// Graceful shutdown 시그널 대기.
///
/// Ctrl+C 또는 SIGTERM 시그널을 수신하면 반환합니다.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Ctrl+C 핸들러 설치 실패");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "SIGTERM 핸들러 설치 실패");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            warn!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            warn!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}

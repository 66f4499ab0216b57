//! 라우터 통합 테스트

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use signal_analytics::{
    ClassProbabilities, Classifier, FeatureEngine, FeatureVector, MlResult, MockClassifier,
};
use signal_api::{create_router, AnalyzeResponse, AppState, LiveInference};
use signal_core::{SignalConfig, SignalSide, DEFAULT_INSTRUMENT};
use tower::ServiceExt;

/// 응답을 지연시키는 분류기.
struct SlowClassifier(Duration);

impl Classifier for SlowClassifier {
    fn predict_probabilities(&self, _features: &FeatureVector) -> MlResult<ClassProbabilities> {
        std::thread::sleep(self.0);
        Ok(ClassProbabilities::from_array([0.0, 1.0, 0.0]))
    }

    fn model_name(&self) -> &str {
        "slow"
    }
}

fn state_with(classifier: Arc<dyn Classifier>, timeout: Duration) -> AppState {
    let inference = LiveInference::new(
        &SignalConfig::default(),
        FeatureEngine::with_defaults(),
        classifier,
    );
    AppState::new(inference, timeout)
}

fn app_with(classifier: Arc<dyn Classifier>, timeout: Duration) -> Router {
    create_router(Arc::new(state_with(classifier, timeout)))
}

fn prices(n: usize) -> Vec<f64> {
    (0..n).map(|i| 500.0 + (i as f64 * 0.25).cos() * 2.0).collect()
}

async fn post_analyze(app: Router, body: Vec<u8>) -> (StatusCode, serde_json::Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/analyze")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn payload(symbol: &str, n: usize) -> Vec<u8> {
    serde_json::to_vec(&serde_json::json!({ "symbol": symbol, "prices": prices(n) })).unwrap()
}

#[tokio::test]
async fn analyze_returns_signal() {
    let app = app_with(
        Arc::new(MockClassifier::fixed(0.1, 0.8, 0.1)),
        Duration::from_secs(5),
    );

    let (status, json) = post_analyze(app, payload(DEFAULT_INSTRUMENT, 60)).await;

    assert_eq!(status, StatusCode::OK);
    let response: AnalyzeResponse = serde_json::from_value(json).unwrap();
    assert_eq!(response.signal, SignalSide::Buy);
    assert_eq!(response.conf, Some(0.8));
}

#[tokio::test]
async fn analyze_accepts_trailing_garbage() {
    let app = app_with(
        Arc::new(MockClassifier::fixed(0.1, 0.1, 0.8)),
        Duration::from_secs(5),
    );
    let mut body = payload(DEFAULT_INSTRUMENT, 60);
    body.extend_from_slice(b"\0\0\0trailing bytes");

    let (status, json) = post_analyze(app, body).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["signal"], "SELL");
    assert!(json.get("conf").is_some());
}

#[tokio::test]
async fn analyze_wrong_symbol_is_safe_default() {
    let app = app_with(
        Arc::new(MockClassifier::fixed(0.1, 0.8, 0.1)),
        Duration::from_secs(5),
    );

    let (status, json) = post_analyze(app, payload("Crash 1000 Index", 60)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, serde_json::json!({ "signal": "WAIT", "sl": 0.0, "tp": 0.0 }));
}

#[tokio::test]
async fn analyze_short_prices_is_safe_default() {
    let app = app_with(
        Arc::new(MockClassifier::fixed(0.1, 0.8, 0.1)),
        Duration::from_secs(5),
    );

    let (status, json) = post_analyze(app, payload(DEFAULT_INSTRUMENT, 5)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, serde_json::json!({ "signal": "WAIT", "sl": 0.0, "tp": 0.0 }));
}

#[tokio::test]
async fn analyze_malformed_body_is_safe_default() {
    let app = app_with(
        Arc::new(MockClassifier::fixed(0.1, 0.8, 0.1)),
        Duration::from_secs(5),
    );

    let (status, json) = post_analyze(app, b"{{{ not json".to_vec()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["signal"], "WAIT");
    assert!(json.get("conf").is_none());
}

#[tokio::test]
async fn analyze_accepts_body_over_two_megabytes() {
    let app = app_with(
        Arc::new(MockClassifier::fixed(0.1, 0.8, 0.1)),
        Duration::from_secs(60),
    );
    let body = payload(DEFAULT_INSTRUMENT, 150_000);
    assert!(body.len() > 2 * 1024 * 1024);

    let (status, json) = post_analyze(app, body).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["signal"], "BUY");
}

#[tokio::test]
async fn analyze_body_over_limit_is_safe_default() {
    let state = state_with(
        Arc::new(MockClassifier::fixed(0.1, 0.8, 0.1)),
        Duration::from_secs(5),
    )
    .with_body_limit(1024);
    let app = create_router(Arc::new(state));
    let body = payload(DEFAULT_INSTRUMENT, 200);
    assert!(body.len() > 1024);

    let (status, json) = post_analyze(app, body).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, serde_json::json!({ "signal": "WAIT", "sl": 0.0, "tp": 0.0 }));
}

#[tokio::test]
async fn analyze_timeout_is_safe_default() {
    let app = app_with(
        Arc::new(SlowClassifier(Duration::from_millis(300))),
        Duration::from_millis(20),
    );

    let (status, json) = post_analyze(app, payload(DEFAULT_INSTRUMENT, 60)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, serde_json::json!({ "signal": "WAIT", "sl": 0.0, "tp": 0.0 }));
}

#[tokio::test]
async fn health_returns_ok() {
    let app = app_with(
        Arc::new(MockClassifier::fixed(1.0, 0.0, 0.0)),
        Duration::from_secs(1),
    );

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let health: signal_api::routes::HealthResponse = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(health.status, "healthy");
    assert_eq!(health.instrument, DEFAULT_INSTRUMENT);
    assert_eq!(health.model, "mock_classifier");
}

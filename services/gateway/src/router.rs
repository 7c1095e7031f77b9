use crate::handlers::{calibrate, health, ingest, recommend, signals, stats, ws};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/ingest/market_snapshot", post(ingest::ingest_snapshot))
        .route("/ws/vision", get(ws::ws_handler))
        .route("/recommend", post(recommend::recommend))
        .route("/signals", get(signals::list_signals))
        .route("/signals/{ticker}", get(signals::get_signal))
        .route(
            "/calibrate",
            get(calibrate::get_calibration).post(calibrate::save_calibration),
        )
        .route("/stats", get(stats::stats));

    Router::new()
        .route("/health", get(health::health))
        .nest("/v1", api_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::explain::{ExplainError, Explainer, Explanation};
    use futures::StreamExt;
    use async_trait::async_trait;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use chrono::{Duration, TimeZone, Utc};
    use persistence::CalibrationStore;
    use serde_json::{Value, json};
    use signal_engine::{SignalEngine, StaticProvider};
    use snapshot_feed::{FeedConfig, SnapshotIngestor};
    use std::sync::Arc;
    use tempfile::TempDir;
    use tower::ServiceExt;
    use types::series::PriceFrame;
    use types::signal::Recommendation;

    fn frame(points: usize) -> PriceFrame {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        PriceFrame::new((0..points).map(|i| start + Duration::days(i as i64)).collect())
            .with_column("Close", (0..points).map(|i| Some(100.0 + i as f64)).collect())
    }

    struct CannedExplainer;

    #[async_trait]
    impl Explainer for CannedExplainer {
        async fn explain(&self, rec: &Recommendation) -> Result<Explanation, ExplainError> {
            Ok(Explanation {
                explanation: format!("{} looks {}", rec.ticker, rec.action.as_str()),
                kb_sources: vec!["trend_following.md".to_string()],
            })
        }
    }

    fn app(tmp: &TempDir) -> Router {
        let provider = StaticProvider::new()
            .with_frame("TEST", frame(60))
            .with_frame("SHORT", frame(30));
        let engine = SignalEngine::new(Arc::new(provider));
        let ingestor = SnapshotIngestor::new(engine, FeedConfig::default());
        let store = CalibrationStore::new(tmp.path().join("calibration.json"));
        create_router(AppState::new(ingestor, store).with_explainer(Arc::new(CannedExplainer)))
    }

    async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    #[tokio::test]
    async fn test_health() {
        let tmp = TempDir::new().unwrap();
        let (status, body) = call(&app(&tmp), "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert!(body["time"].as_str().is_some());
    }

    #[tokio::test]
    async fn test_ingest_then_read_signal() {
        let tmp = TempDir::new().unwrap();
        let app = app(&tmp);

        let (status, body) = call(
            &app,
            "POST",
            "/v1/ingest/market_snapshot",
            Some(json!({
                "source": "screen_capture",
                "symbol": "TEST",
                "timestamp": "2024-05-01T09:30:00Z",
                "last_price": 159.0,
                "extra": {"vwap": 158.2}
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "analyzed");
        assert_eq!(body["sequence"], 1);

        let (status, body) = call(&app, "GET", "/v1/signals/TEST", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["action"], "BUY");
        assert_eq!(body["regime"], "Bull-Low-Vol");

        let (_, body) = call(&app, "GET", "/v1/signals", None).await;
        assert_eq!(body.as_array().unwrap().len(), 1);

        let (_, body) = call(&app, "GET", "/v1/stats", None).await;
        assert_eq!(body["history"], 1);
        assert_eq!(body["metrics"]["snapshots_ingested"], 1);
    }

    #[tokio::test]
    async fn test_ingest_failed_analysis_is_acknowledged() {
        let tmp = TempDir::new().unwrap();
        let (status, body) = call(
            &app(&tmp),
            "POST",
            "/v1/ingest/market_snapshot",
            Some(json!({"source": "screen_capture", "symbol": "NOPE", "timestamp": "2024-05-01T09:30:00Z"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "failed");
        assert_eq!(body["reason"], "data_unavailable");
    }

    #[tokio::test]
    async fn test_malformed_snapshot_rejected() {
        let tmp = TempDir::new().unwrap();
        let app = app(&tmp);

        let (status, body) = call(
            &app,
            "POST",
            "/v1/ingest/market_snapshot",
            Some(json!({"source": "screen_capture", "symbol": "TEST"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "MALFORMED_SNAPSHOT");

        let (status, body) = call(
            &app,
            "POST",
            "/v1/ingest/market_snapshot",
            Some(json!({"timestamp": "2024-05-01T09:30:00Z", "last_price": "high"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "MALFORMED_SNAPSHOT");

        let (_, body) = call(&app, "GET", "/v1/stats", None).await;
        assert_eq!(body["history"], 0);
    }

    #[tokio::test]
    async fn test_recommend_with_explanation() {
        let tmp = TempDir::new().unwrap();
        let (status, body) = call(
            &app(&tmp),
            "POST",
            "/v1/recommend",
            Some(json!({"ticker": "TEST", "period": "6mo"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["recommendation"]["ticker"], "TEST");
        assert_eq!(body["recommendation"]["period"], "6mo");
        assert_eq!(body["recommendation"]["interval"], "1d");
        assert_eq!(body["explanation"], "TEST looks BUY");
        assert_eq!(body["kb_sources"][0], "trend_following.md");
    }

    #[tokio::test]
    async fn test_recommend_errors() {
        let tmp = TempDir::new().unwrap();
        let app = app(&tmp);

        let (status, body) = call(&app, "POST", "/v1/recommend", Some(json!({"ticker": "NOPE"}))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "DATA_UNAVAILABLE");

        let (status, body) = call(&app, "POST", "/v1/recommend", Some(json!({"ticker": "SHORT"}))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "INSUFFICIENT_DATA");

        let (status, _) = call(&app, "POST", "/v1/recommend", Some(json!({"ticker": "  "}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unknown_signal_is_not_found() {
        let tmp = TempDir::new().unwrap();
        let (status, body) = call(&app(&tmp), "GET", "/v1/signals/ZZZ", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_calibration_roundtrip() {
        let tmp = TempDir::new().unwrap();
        let app = app(&tmp);

        let (status, body) = call(&app, "GET", "/v1/calibrate", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"left": 200, "top": 100, "width": 1200, "height": 700}));

        let (status, body) = call(
            &app,
            "POST",
            "/v1/calibrate",
            Some(json!({"x": 12.7, "y": 40.0, "width": 800.2, "height": 600.9})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "saved");
        assert_eq!(body["region"]["left"], 12);

        let (_, body) = call(&app, "GET", "/v1/calibrate", None).await;
        assert_eq!(body, json!({"left": 12, "top": 40, "width": 800, "height": 600}));
    }

    #[tokio::test]
    async fn test_negative_calibration_rejected() {
        let tmp = TempDir::new().unwrap();
        let (status, body) = call(
            &app(&tmp),
            "POST",
            "/v1/calibrate",
            Some(json!({"x": -5.0, "y": 0.0, "width": 10.0, "height": 10.0})),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "INVALID_REGION");
    }

    #[tokio::test]
    async fn test_calibration_io_failure() {
        let tmp = TempDir::new().unwrap();
        let blocker = tmp.path().join("blocker");
        std::fs::write(&blocker, b"not a directory").unwrap();

        let engine = SignalEngine::new(Arc::new(StaticProvider::new()));
        let ingestor = SnapshotIngestor::new(engine, FeedConfig::default());
        let store = CalibrationStore::new(blocker.join("calibration.json"));
        let app = create_router(AppState::new(ingestor, store));

        let (status, body) = call(
            &app,
            "POST",
            "/v1/calibrate",
            Some(json!({"x": 1.0, "y": 1.0, "width": 10.0, "height": 10.0})),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "CALIBRATION_IO");
    }

    #[tokio::test]
    async fn test_ws_pushes_snapshot_and_unsubscribes_on_close() {
        let tmp = TempDir::new().unwrap();
        let engine = SignalEngine::new(Arc::new(StaticProvider::new().with_frame("TEST", frame(60))));
        let ingestor = SnapshotIngestor::new(engine, FeedConfig::default());
        let state = AppState::new(ingestor, CalibrationStore::new(tmp.path().join("calibration.json")));
        let app = create_router(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = {
            let app = app.clone();
            tokio::spawn(async move { axum::serve(listener, app).await })
        };

        let (mut socket, _) = tokio_tungstenite::connect_async(format!("ws://{addr}/v1/ws/vision"))
            .await
            .unwrap();
        wait_for_subscribers(&state, 1).await;

        let (status, body) = call(
            &app,
            "POST",
            "/v1/ingest/market_snapshot",
            Some(json!({"source": "screen_capture", "symbol": "TEST", "timestamp": "2024-05-01T09:30:00Z", "last_price": 159.0})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "analyzed");

        let message = tokio::time::timeout(std::time::Duration::from_secs(5), socket.next())
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        let pushed: Value = serde_json::from_str(message.to_text().unwrap()).unwrap();
        assert_eq!(pushed["source"], "screen_capture");
        assert_eq!(pushed["symbol"], "TEST");
        assert_eq!(pushed["last_price"], 159.0);

        socket.close(None).await.unwrap();
        wait_for_subscribers(&state, 0).await;
        assert_eq!(state.ingestor.metrics().export()["subscribers_evicted"], 0);

        server.abort();
    }

    async fn wait_for_subscribers(state: &AppState, count: usize) {
        tokio::time::timeout(std::time::Duration::from_secs(5), async {
            while state.ingestor.broadcaster().subscriber_count() != count {
                tokio::time::sleep(std::time::Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap();
    }
}

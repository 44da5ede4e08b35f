#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;
use vidsum_core::analyzer::MockAnalyzer;
use vidsum_core::retry::RetryPolicy;
use vidsum_db::MemoryStore;
use vidsum_pipeline::{UploadStore, VideoManager};
use vidsum_worker::JobScheduler;

use vidsum_api::config::{LogFormat, ServerConfig, StoreKind};
use vidsum_api::router::build_app_router;
use vidsum_api::state::AppState;

/// Upload limit used by tests, small enough to exceed cheaply.
pub const TEST_MAX_UPLOAD_BYTES: usize = 64 * 1024;

/// Build a test `ServerConfig` over an in-memory store and `data_dir`.
pub fn test_config(data_dir: PathBuf) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        store: StoreKind::Memory,
        database_url: None,
        data_dir,
        max_upload_bytes: TEST_MAX_UPLOAD_BYTES,
        retry: RetryPolicy::none(),
        log_format: LogFormat::Text,
    }
}

/// A fully assembled app plus handles on its store and storage root.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    pub dir: tempfile::TempDir,
}

impl TestApp {
    /// A scheduler over the same store, with the mock analyzer and no delay.
    pub fn scheduler(&self) -> JobScheduler {
        JobScheduler::new(
            self.store.clone(),
            Arc::new(MockAnalyzer::new(Duration::ZERO, 4)),
            Duration::from_millis(10),
        )
    }

    pub fn data_dir(&self) -> &std::path::Path {
        self.dir.path()
    }
}

/// Build the full application router with all middleware layers.
///
/// Mirrors the router construction in `main.rs` so tests exercise the
/// same middleware stack production uses.
pub fn build_test_app() -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path().to_path_buf());
    let store = Arc::new(MemoryStore::new());
    let manager = Arc::new(VideoManager::new(
        store.clone(),
        UploadStore::new(dir.path(), RetryPolicy::none()),
    ));

    let state = AppState {
        store: store.clone(),
        manager,
        config: Arc::new(config.clone()),
    };
    let router = build_app_router(state, &config).unwrap();

    TestApp { router, store, dir }
}

pub async fn send(app: &TestApp, request: Request<Body>) -> Response<Body> {
    app.router.clone().oneshot(request).await.unwrap()
}

pub async fn get(app: &TestApp, uri: &str) -> Response<Body> {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

pub async fn delete(app: &TestApp, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::DELETE)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn post_json(app: &TestApp, uri: &str, body: serde_json::Value) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn post_bytes(app: &TestApp, uri: &str, bytes: Vec<u8>) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/octet-stream")
        .body(Body::from(bytes))
        .unwrap();
    send(app, request).await
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response.into_body().collect().await.unwrap().to_bytes().to_vec()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

/// Register `file_name` and return the new video id.
pub async fn register(app: &TestApp, file_name: &str) -> String {
    let response = post_json(
        app,
        "/api/videos",
        serde_json::json!({ "fileName": file_name, "contentType": "video/mp4" }),
    )
    .await;
    assert_eq!(response.status(), 201);
    body_json(response).await["id"].as_str().unwrap().to_string()
}

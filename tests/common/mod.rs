#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use showsync::api::AppState;
use showsync::config::Config;
use std::sync::Arc;
use tower::ServiceExt;

pub const TEST_API_KEY: &str = "test-secret";

/// App backed by a fresh SQLite file, with ingestion pointed at `upstream`.
pub async fn spawn_app(upstream: &str) -> (Router, Arc<AppState>) {
    let db_path = std::env::temp_dir().join(format!("showsync_test_{}.db", uuid::Uuid::new_v4()));

    let mut config = Config::default();
    config.general.database_path = format!("sqlite:{}?mode=rwc", db_path.display());
    config.upstream.api_url = upstream.to_string();
    config.upstream.request_timeout_seconds = 5;
    config.security.api_key = TEST_API_KEY.to_string();

    let state = showsync::api::create_app_state_from_config(config, None)
        .await
        .expect("Failed to create app state");
    let app = showsync::api::router(state.clone()).await;
    (app, state)
}

pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<serde_json::Value>,
    api_key: Option<&str>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(key) = api_key {
        builder = builder.header("x-api-key", key);
    }

    let request = match body {
        Some(json) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(serde_json::to_string(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
    };
    (status, json)
}

pub async fn run_job(app: &Router) -> (StatusCode, serde_json::Value) {
    send(app, "POST", "/api/job/run", None, Some(TEST_API_KEY)).await
}

pub async fn list_shows(app: &Router) -> Vec<serde_json::Value> {
    let (status, body) = send(app, "GET", "/api/shows", None, None).await;
    assert_eq!(status, StatusCode::OK);
    body["data"].as_array().cloned().unwrap_or_default()
}

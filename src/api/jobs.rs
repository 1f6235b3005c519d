use axum::{
    Json,
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState};
use crate::ingest::IngestReport;
use crate::services::ShowService;

pub const API_KEY_HEADER: &str = "x-api-key";

/// Rejects requests whose `x-api-key` header does not match the configured key.
pub async fn api_key_middleware(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let expected = state.config().read().await.security.api_key.clone();

    let provided = headers
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok());

    match provided {
        Some(key) if !expected.is_empty() && key == expected => Ok(next.run(request).await),
        _ => {
            tracing::warn!("Rejected job request with missing or invalid API key");
            Err(ApiError::Unauthorized("Invalid API key".to_string()))
        }
    }
}

/// `POST /api/job/run`
///
/// Runs one ingestion batch and reports what it did.
pub async fn run_job(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<IngestReport>>, ApiError> {
    let report = state.show_service().run_ingestion().await?;
    Ok(Json(ApiResponse::success(report)))
}

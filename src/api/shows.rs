use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState};
use crate::api::validation::{validate_show_id, validate_show_input};
use crate::models::show::{Show, ShowInput};
use crate::services::ShowService;

/// `GET /api/shows`
pub async fn list_shows(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<Show>>>, ApiError> {
    let shows = state.show_service().list_shows().await?;
    Ok(Json(ApiResponse::success(shows)))
}

/// `GET /api/shows/{id}`
pub async fn get_show(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<Show>>, ApiError> {
    let id = validate_show_id(id)?;
    let show = state.show_service().get_show(id).await?;
    Ok(Json(ApiResponse::success(show)))
}

/// `POST /api/shows`
pub async fn create_show(
    State(state): State<Arc<AppState>>,
    Json(input): Json<ShowInput>,
) -> Result<(StatusCode, Json<ApiResponse<Show>>), ApiError> {
    if input.id.is_none() {
        return Err(ApiError::validation("Show ID is required"));
    }
    validate_show_input(&input)?;

    let show = state.show_service().create_show(input).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(show))))
}

/// `PUT /api/shows/{id}`
pub async fn update_show(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(input): Json<ShowInput>,
) -> Result<StatusCode, ApiError> {
    let id = validate_show_id(id)?;
    validate_show_input(&input)?;

    state.show_service().update_show(id, input).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /api/shows/{id}`
pub async fn delete_show(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    let id = validate_show_id(id)?;
    state.show_service().delete_show(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

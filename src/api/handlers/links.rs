//! Handlers for link management endpoints.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde_json::json;
use validator::Validate;

use crate::api::dto::links::{CreateLinkRequest, LinkListResponse, LinkResponse, UpdateLinkRequest};
use crate::api::dto::pagination::{PaginationMeta, PaginationParams};
use crate::error::AppError;
use crate::state::AppState;

/// Creates a short link.
///
/// # Endpoint
///
/// `POST /api/links`
///
/// # Request Body
///
/// ```json
/// {
///   "original_url": "https://example.com/very/long/path",
///   "custom_alias": "summer-sale",          // optional
///   "title": "Summer sale",                 // optional
///   "description": "Landing page",         // optional
///   "expires_at": "2030-01-01T00:00:00Z"    // optional
/// }
/// ```
///
/// # Errors
///
/// - 400 Bad Request for an invalid URL, alias or expiry
/// - 409 Conflict if the alias is already in use
/// - 503 Service Unavailable if no short code could be allocated
pub async fn create_link_handler(
    State(state): State<AppState>,
    Json(payload): Json<CreateLinkRequest>,
) -> Result<(StatusCode, Json<LinkResponse>), AppError> {
    payload.validate()?;

    let link = state.link_service.create_link(payload.into()).await?;

    Ok((
        StatusCode::CREATED,
        Json(LinkResponse::from_link(link, &state.base_url)),
    ))
}

/// Lists links, newest first, with their click totals.
///
/// # Endpoint
///
/// `GET /api/links?page=1&page_size=20`
///
/// # Errors
///
/// Returns 400 Bad Request if pagination parameters are invalid.
pub async fn list_links_handler(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<LinkListResponse>, AppError> {
    let (page, page_size) = params
        .validate()
        .map_err(|e| AppError::bad_request(e, json!({})))?;

    let (items, total) = state
        .link_service
        .list_links(i64::from(page), i64::from(page_size))
        .await?;

    Ok(Json(LinkListResponse {
        pagination: PaginationMeta::new(page, page_size, total),
        items: items
            .into_iter()
            .map(|item| LinkResponse::with_clicks(item, &state.base_url))
            .collect(),
    }))
}

/// `GET /api/links/{id}`
pub async fn get_link_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<LinkResponse>, AppError> {
    let link = state.link_service.get_link(id).await?;

    Ok(Json(LinkResponse::from_link(link, &state.base_url)))
}

/// Partially updates a link.
///
/// # Endpoint
///
/// `PATCH /api/links/{id}`
///
/// Only `title`, `description`, `is_active` and `expires_at` can change.
/// Codes, aliases and the destination are fixed at creation.
pub async fn update_link_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateLinkRequest>,
) -> Result<Json<LinkResponse>, AppError> {
    let patch = payload.into_patch()?;
    let link = state.link_service.update_link(id, patch).await?;

    Ok(Json(LinkResponse::from_link(link, &state.base_url)))
}

/// Deletes a link and all of its clicks.
///
/// # Endpoint
///
/// `DELETE /api/links/{id}`
///
/// Returns 204 No Content on success, 404 if the link does not exist.
pub async fn delete_link_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    state.link_service.delete_link(id).await?;

    Ok(StatusCode::NO_CONTENT)
}

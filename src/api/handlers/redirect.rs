//! Handlers for short URL redirect and preview.

use axum::{
    Json,
    extract::{ConnectInfo, Path, Query, State},
    http::HeaderMap,
    response::{IntoResponse, Redirect, Response},
};
use serde_json::json;
use std::collections::HashMap;
use std::net::SocketAddr;

use crate::api::dto::preview::PreviewResponse;
use crate::application::services::RedirectOutcome;
use crate::domain::request_context::{QR_QUERY_PARAM, RequestContext};
use crate::error::AppError;
use crate::state::AppState;

/// Redirects a short code or custom alias to its original URL.
///
/// # Endpoint
///
/// `GET /{code}`
///
/// # Request Flow
///
/// 1. Resolve the token against codes and aliases
/// 2. Check expiry, then the active flag
/// 3. Queue a click job for the background worker
/// 4. Return 307 Temporary Redirect
///
/// # Click Tracking
///
/// Click jobs are sent to a bounded channel for async processing.
/// If the queue is full, the click is dropped (fire-and-forget).
/// A `qr` query parameter or an `X-QR-Scan` header marks the click as a QR scan.
///
/// # Errors
///
/// - 404 Not Found if no link has this code or alias
/// - 410 Gone if the link expired
/// - 403 Forbidden if the link was deactivated
pub async fn redirect_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
) -> Result<Response, AppError> {
    let ctx = RequestContext::new(headers, Some(addr.ip()), params.contains_key(QR_QUERY_PARAM));

    match state.redirect_service.resolve(&code, ctx).await? {
        RedirectOutcome::Redirect(url) => Ok(Redirect::temporary(&url).into_response()),
        RedirectOutcome::NotFound => Err(AppError::not_found(
            "Short link not found",
            json!({ "code": code }),
        )),
        RedirectOutcome::Expired => Err(AppError::gone(
            "Short link has expired",
            json!({ "code": code }),
        )),
        RedirectOutcome::Forbidden => Err(AppError::forbidden(
            "Short link is inactive",
            json!({ "code": code }),
        )),
    }
}

/// Describes where a short link leads without following it.
///
/// # Endpoint
///
/// `GET /{code}/preview`
///
/// Expired and inactive links are still described; their `status` says so.
/// No click is recorded.
///
/// # Errors
///
/// Returns 404 Not Found if no link has this code or alias.
pub async fn preview_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<PreviewResponse>, AppError> {
    let link = state
        .redirect_service
        .preview(&code)
        .await?
        .ok_or_else(|| AppError::not_found("Short link not found", json!({ "code": code })))?;

    Ok(Json(PreviewResponse::from_link(link, &state.base_url)))
}

//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET  /{code}`          - Short link redirect (public)
//! - `GET  /{code}/preview`  - Link preview without click tracking (public)
//! - `GET  /health`          - Health check: DB, click queue (public)
//! - `/api/*`                - Link management and analytics (rate limited)
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Rate limiting** - Per-IP token bucket on `/api`
//! - **Path normalization** - Trailing slash handling

use crate::api;
use crate::api::middleware::{rate_limit, tracing};
use crate::error::AppError;
use crate::state::AppState;
use axum::Router;
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// Token bucket settings for the `/api` routes.
#[derive(Debug, Clone, Copy)]
pub struct RateLimitSettings {
    pub per_second: u64,
    pub burst: u32,
}

/// Constructs the application router with all routes and middleware.
///
/// # Errors
///
/// Returns an error if the rate limit settings are invalid.
pub fn app_router(
    state: AppState,
    rate_limit: RateLimitSettings,
) -> Result<NormalizePath<Router>, AppError> {
    let api_router = api::routes::api_routes()
        .layer(rate_limit::layer(rate_limit.per_second, rate_limit.burst)?);

    let router = Router::new()
        .merge(api::routes::public_routes())
        .nest("/api", api_router)
        .with_state(state)
        .layer(tracing::layer());

    Ok(NormalizePathLayer::trim_trailing_slash().layer(router))
}

//! API route configuration.

use crate::api::handlers::{
    alias_check_handler, analytics_handler, chart_data_handler, create_link_handler,
    delete_link_handler, get_link_handler, health_handler, list_links_handler, preview_handler,
    recent_clicks_handler, redirect_handler, reserved_aliases_handler, update_link_handler,
};
use crate::state::AppState;
use axum::{Router, routing::get};

/// Management and analytics routes, mounted under `/api`.
///
/// # Endpoints
///
/// - `GET    /links`                 - List links with click totals (paginated)
/// - `POST   /links`                 - Create a short link
/// - `GET    /links/{id}`            - Fetch a link
/// - `PATCH  /links/{id}`            - Update title, description, active flag, expiry
/// - `DELETE /links/{id}`            - Delete a link and its clicks
/// - `GET    /links/{id}/analytics`  - Click totals and breakdowns
/// - `GET    /links/{id}/chart-data` - Per-day series and top lists
/// - `GET    /links/{id}/clicks`     - Most recent clicks
/// - `GET    /aliases/reserved`      - Reserved alias words
/// - `GET    /aliases/{alias}`       - Check whether an alias is usable
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/links", get(list_links_handler).post(create_link_handler))
        .route(
            "/links/{id}",
            get(get_link_handler)
                .patch(update_link_handler)
                .delete(delete_link_handler),
        )
        .route("/links/{id}/analytics", get(analytics_handler))
        .route("/links/{id}/chart-data", get(chart_data_handler))
        .route("/links/{id}/clicks", get(recent_clicks_handler))
        .route("/aliases/reserved", get(reserved_aliases_handler))
        .route("/aliases/{alias}", get(alias_check_handler))
}

/// Public routes: health, redirects and previews.
///
/// Static paths take priority over the `/{code}` capture, so `/health` never
/// reaches the redirect handler.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_handler))
        .route("/{code}", get(redirect_handler))
        .route("/{code}/preview", get(preview_handler))
}

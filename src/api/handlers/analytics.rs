//! Handlers for click analytics.

use axum::{
    Json,
    extract::{Path, Query, State},
};

use crate::api::dto::analytics::{
    AnalyticsResponse, ChartDataQuery, ClickResponse, DEFAULT_CHART_DAYS, DEFAULT_RECENT_CLICKS,
    RecentClicksQuery, RecentClicksResponse,
};
use crate::application::services::analytics_service::ChartData;
use crate::error::AppError;
use crate::state::AppState;

/// Click totals and breakdowns for one link.
///
/// # Endpoint
///
/// `GET /api/links/{id}/analytics`
///
/// # Response
///
/// ```json
/// {
///   "link_id": 1,
///   "total_clicks": 42,
///   "qr_clicks": 10,
///   "direct_clicks": 32,
///   "clicks_by_date": [{ "date": "2025-01-15", "count": 7 }],
///   "clicks_by_country": [{ "label": "Germany", "count": 12 }],
///   "clicks_by_device": [{ "label": "mobile", "count": 30 }],
///   "clicks_by_referrer": [{ "domain": "www.google.com", "source": "Google", "count": 9 }]
/// }
/// ```
pub async fn analytics_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<AnalyticsResponse>, AppError> {
    let summary = state.analytics_service.summary(id).await?;

    Ok(Json(summary.into()))
}

/// Chart series over the last `days` days (default 30, at most 365).
///
/// # Endpoint
///
/// `GET /api/links/{id}/chart-data?days=N`
pub async fn chart_data_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<ChartDataQuery>,
) -> Result<Json<ChartData>, AppError> {
    let days = query.days.unwrap_or(DEFAULT_CHART_DAYS);
    let chart = state.analytics_service.chart_data(id, days).await?;

    Ok(Json(chart))
}

/// Latest clicks of a link, newest first (default 10, at most 100).
///
/// # Endpoint
///
/// `GET /api/links/{id}/clicks?limit=N`
pub async fn recent_clicks_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<RecentClicksQuery>,
) -> Result<Json<RecentClicksResponse>, AppError> {
    let limit = query.limit.unwrap_or(DEFAULT_RECENT_CLICKS);
    let clicks = state.analytics_service.recent_clicks(id, limit).await?;

    Ok(Json(RecentClicksResponse {
        link_id: id,
        items: clicks.into_iter().map(ClickResponse::from).collect(),
    }))
}

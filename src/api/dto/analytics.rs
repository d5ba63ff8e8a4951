//! DTOs for click analytics endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, serde_as};

use crate::application::services::analytics_service::{AnalyticsSummary, ReferrerCount};
use crate::domain::entities::Click;
use crate::domain::repositories::{DateCount, LabelCount};

pub const DEFAULT_CHART_DAYS: i64 = 30;
pub const DEFAULT_RECENT_CLICKS: i64 = 10;

/// Query for `GET /api/links/{id}/chart-data`.
#[serde_as]
#[derive(Debug, Default, Deserialize)]
pub struct ChartDataQuery {
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub days: Option<i64>,
}

/// Query for `GET /api/links/{id}/clicks`.
#[serde_as]
#[derive(Debug, Default, Deserialize)]
pub struct RecentClicksQuery {
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub limit: Option<i64>,
}

/// Response for `GET /api/links/{id}/analytics`.
#[derive(Debug, Serialize)]
pub struct AnalyticsResponse {
    pub link_id: i64,
    pub total_clicks: i64,
    pub qr_clicks: i64,
    pub direct_clicks: i64,
    pub clicks_by_date: Vec<DateCount>,
    pub clicks_by_country: Vec<LabelCount>,
    pub clicks_by_device: Vec<LabelCount>,
    pub clicks_by_referrer: Vec<ReferrerCount>,
}

impl From<AnalyticsSummary> for AnalyticsResponse {
    fn from(summary: AnalyticsSummary) -> Self {
        Self {
            link_id: summary.link_id,
            total_clicks: summary.totals.total,
            qr_clicks: summary.totals.qr,
            direct_clicks: summary.totals.direct,
            clicks_by_date: summary.clicks_by_date,
            clicks_by_country: summary.clicks_by_country,
            clicks_by_device: summary.clicks_by_device,
            clicks_by_referrer: summary.clicks_by_referrer,
        }
    }
}

/// A single recorded click.
#[derive(Debug, Serialize)]
pub struct ClickResponse {
    pub id: i64,
    pub clicked_at: DateTime<Utc>,
    pub ip_address: Option<String>,
    pub country: Option<String>,
    pub country_name: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
    pub device_type: String,
    pub browser: Option<String>,
    pub browser_version: Option<String>,
    pub platform: Option<String>,
    pub referrer: Option<String>,
    pub referrer_domain: Option<String>,
    pub referrer_source: String,
    pub is_qr_code: bool,
}

impl From<Click> for ClickResponse {
    fn from(click: Click) -> Self {
        let referrer_source = click.referrer_source();

        Self {
            id: click.id,
            clicked_at: click.clicked_at,
            ip_address: click.ip_address,
            country: click.country,
            country_name: click.country_name,
            city: click.city,
            region: click.region,
            device_type: click.device_type.as_str().to_string(),
            browser: click.browser,
            browser_version: click.browser_version,
            platform: click.platform,
            referrer: click.referrer,
            referrer_domain: click.referrer_domain,
            referrer_source,
            is_qr_code: click.is_qr_code,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RecentClicksResponse {
    pub link_id: i64,
    pub items: Vec<ClickResponse>,
}

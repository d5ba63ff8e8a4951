//! Click analytics for a single link and site-wide daily reports.

use chrono::{Duration, NaiveDate, Utc};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;

use crate::domain::entities::Click;
use crate::domain::repositories::{
    ClickRepository, ClickTotals, DailyReport, DateCount, LabelCount, LinkRepository,
};
use crate::enrichment::referrer::domain_label;
use crate::error::AppError;

/// Days shown in the summary's per-day breakdown.
const SUMMARY_DAYS: i64 = 30;
const SUMMARY_TOP: i64 = 10;
const CHART_TOP: i64 = 5;
pub const MAX_CHART_DAYS: i64 = 365;
pub const MAX_RECENT_CLICKS: i64 = 100;

/// A referring domain with its display label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReferrerCount {
    pub domain: String,
    pub source: String,
    pub count: i64,
}

impl From<LabelCount> for ReferrerCount {
    fn from(lc: LabelCount) -> Self {
        let source = domain_label(&lc.label).unwrap_or_else(|| lc.label.clone());
        Self {
            domain: lc.label,
            source,
            count: lc.count,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalyticsSummary {
    pub link_id: i64,
    pub totals: ClickTotals,
    /// Newest day first, days without clicks omitted.
    pub clicks_by_date: Vec<DateCount>,
    pub clicks_by_country: Vec<LabelCount>,
    pub clicks_by_device: Vec<LabelCount>,
    pub clicks_by_referrer: Vec<ReferrerCount>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChartData {
    pub link_id: i64,
    pub days: i64,
    /// Oldest day first.
    pub clicks_over_time: Vec<DateCount>,
    pub devices: Vec<LabelCount>,
    pub top_countries: Vec<LabelCount>,
    pub top_referrers: Vec<ReferrerCount>,
}

/// Read-only aggregations over recorded clicks.
pub struct AnalyticsService {
    links: Arc<dyn LinkRepository>,
    clicks: Arc<dyn ClickRepository>,
}

impl AnalyticsService {
    pub fn new(links: Arc<dyn LinkRepository>, clicks: Arc<dyn ClickRepository>) -> Self {
        Self { links, clicks }
    }

    async fn ensure_link(&self, link_id: i64) -> Result<(), AppError> {
        match self.links.find_by_id(link_id).await? {
            Some(_) => Ok(()),
            None => Err(AppError::not_found(
                "Link not found",
                json!({ "id": link_id }),
            )),
        }
    }

    /// Totals plus per-day, country, device and referrer breakdowns.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the link does not exist.
    pub async fn summary(&self, link_id: i64) -> Result<AnalyticsSummary, AppError> {
        self.ensure_link(link_id).await?;

        let since = Utc::now() - Duration::days(SUMMARY_DAYS);

        Ok(AnalyticsSummary {
            link_id,
            totals: self.clicks.totals(link_id).await?,
            clicks_by_date: self
                .clicks
                .clicks_by_date(link_id, Some(since), SUMMARY_DAYS)
                .await?,
            clicks_by_country: self.clicks.clicks_by_country(link_id, SUMMARY_TOP).await?,
            clicks_by_device: self.clicks.clicks_by_device(link_id).await?,
            clicks_by_referrer: self
                .clicks
                .clicks_by_referrer(link_id, SUMMARY_TOP)
                .await?
                .into_iter()
                .map(ReferrerCount::from)
                .collect(),
        })
    }

    /// Series for charts over the last `days` days (clamped to 1..=365).
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the link does not exist.
    pub async fn chart_data(&self, link_id: i64, days: i64) -> Result<ChartData, AppError> {
        self.ensure_link(link_id).await?;

        let days = days.clamp(1, MAX_CHART_DAYS);
        let since = Utc::now() - Duration::days(days);

        let mut clicks_over_time = self
            .clicks
            .clicks_by_date(link_id, Some(since), days + 1)
            .await?;
        clicks_over_time.reverse();

        Ok(ChartData {
            link_id,
            days,
            clicks_over_time,
            devices: self.clicks.clicks_by_device(link_id).await?,
            top_countries: self.clicks.clicks_by_country(link_id, CHART_TOP).await?,
            top_referrers: self
                .clicks
                .clicks_by_referrer(link_id, CHART_TOP)
                .await?
                .into_iter()
                .map(ReferrerCount::from)
                .collect(),
        })
    }

    /// Latest clicks, newest first (`limit` clamped to 1..=100).
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the link does not exist.
    pub async fn recent_clicks(&self, link_id: i64, limit: i64) -> Result<Vec<Click>, AppError> {
        self.ensure_link(link_id).await?;
        self.clicks
            .recent_clicks(link_id, limit.clamp(1, MAX_RECENT_CLICKS))
            .await
    }

    pub async fn daily_report(&self, day: NaiveDate) -> Result<DailyReport, AppError> {
        self.clicks.daily_report(day).await
    }
}

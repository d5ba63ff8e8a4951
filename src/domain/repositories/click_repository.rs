//! Repository trait for click storage and analytics aggregation.

use crate::domain::entities::{Click, NewClick};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

/// Total, QR and direct click counts for one link.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ClickTotals {
    pub total: i64,
    pub qr: i64,
    pub direct: i64,
}

/// Number of clicks on one calendar day (UTC).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DateCount {
    pub date: NaiveDate,
    pub count: i64,
}

/// Number of clicks sharing one value of a grouped column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelCount {
    pub label: String,
    pub count: i64,
}

/// Site-wide click activity for one day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DailyReport {
    pub total_clicks: i64,
    pub unique_links: i64,
}

/// Repository interface for click events.
///
/// Writes happen only through [`ClickRepository::record_click`]; everything
/// else is a read-only aggregation.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgClickRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClickRepository: Send + Sync {
    /// Inserts one click.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors, including a link
    /// deleted between the redirect and the insert.
    async fn record_click(&self, new_click: NewClick) -> Result<Click, AppError>;

    /// Counts all, QR-originated and direct clicks of a link.
    async fn totals(&self, link_id: i64) -> Result<ClickTotals, AppError>;

    /// Clicks per day, newest day first.
    ///
    /// When `since` is set, only clicks at or after it are counted.
    async fn clicks_by_date(
        &self,
        link_id: i64,
        since: Option<DateTime<Utc>>,
        limit: i64,
    ) -> Result<Vec<DateCount>, AppError>;

    /// Top countries by click count, labelled with the country name.
    /// Clicks without a country name are skipped.
    async fn clicks_by_country(&self, link_id: i64, limit: i64)
    -> Result<Vec<LabelCount>, AppError>;

    /// Click count per device type.
    async fn clicks_by_device(&self, link_id: i64) -> Result<Vec<LabelCount>, AppError>;

    /// Top referring domains; clicks without a referrer are skipped.
    async fn clicks_by_referrer(
        &self,
        link_id: i64,
        limit: i64,
    ) -> Result<Vec<LabelCount>, AppError>;

    /// Latest clicks of a link, newest first.
    async fn recent_clicks(&self, link_id: i64, limit: i64) -> Result<Vec<Click>, AppError>;

    /// Click totals across all links for one UTC day.
    async fn daily_report(&self, day: NaiveDate) -> Result<DailyReport, AppError>;
}

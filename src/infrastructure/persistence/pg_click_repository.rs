//! PostgreSQL implementation of click repository.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgPool};
use std::sync::Arc;

use crate::domain::entities::{Click, DeviceType, NewClick};
use crate::domain::repositories::{
    ClickRepository, ClickTotals, DailyReport, DateCount, LabelCount,
};
use crate::error::AppError;

/// PostgreSQL repository for click tracking and analytics.
///
/// All aggregations run as `GROUP BY` queries over the `clicks` table.
pub struct PgClickRepository {
    pool: Arc<PgPool>,
}

impl PgClickRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    async fn grouped(
        &self,
        sql: &'static str,
        link_id: i64,
        limit: i64,
    ) -> Result<Vec<LabelCount>, AppError> {
        let rows = sqlx::query_as::<_, (String, i64)>(sql)
            .bind(link_id)
            .bind(limit)
            .fetch_all(self.pool.as_ref())
            .await?;

        Ok(rows
            .into_iter()
            .map(|(label, count)| LabelCount { label, count })
            .collect())
    }
}

#[derive(FromRow)]
struct ClickRow {
    id: i64,
    link_id: i64,
    clicked_at: DateTime<Utc>,
    ip_address: Option<String>,
    country: Option<String>,
    country_name: Option<String>,
    city: Option<String>,
    region: Option<String>,
    device_type: String,
    browser: Option<String>,
    browser_version: Option<String>,
    platform: Option<String>,
    referrer: Option<String>,
    referrer_domain: Option<String>,
    is_qr_code: bool,
    user_agent: Option<String>,
}

impl From<ClickRow> for Click {
    fn from(r: ClickRow) -> Self {
        Click {
            id: r.id,
            link_id: r.link_id,
            clicked_at: r.clicked_at,
            ip_address: r.ip_address,
            country: r.country,
            country_name: r.country_name,
            city: r.city,
            region: r.region,
            device_type: r.device_type.parse().unwrap_or(DeviceType::Desktop),
            browser: r.browser,
            browser_version: r.browser_version,
            platform: r.platform,
            referrer: r.referrer,
            referrer_domain: r.referrer_domain,
            is_qr_code: r.is_qr_code,
            user_agent: r.user_agent,
        }
    }
}

#[derive(FromRow)]
struct TotalsRow {
    total: i64,
    qr: i64,
}

#[async_trait]
impl ClickRepository for PgClickRepository {
    async fn record_click(&self, new_click: NewClick) -> Result<Click, AppError> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO clicks (
                link_id, clicked_at, ip_address, country, country_name, city, region,
                device_type, browser, browser_version, platform,
                referrer, referrer_domain, is_qr_code, user_agent
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            RETURNING id
            "#,
        )
        .bind(new_click.link_id)
        .bind(new_click.clicked_at)
        .bind(&new_click.ip_address)
        .bind(&new_click.country)
        .bind(&new_click.country_name)
        .bind(&new_click.city)
        .bind(&new_click.region)
        .bind(new_click.device_type.as_str())
        .bind(&new_click.browser)
        .bind(&new_click.browser_version)
        .bind(&new_click.platform)
        .bind(&new_click.referrer)
        .bind(&new_click.referrer_domain)
        .bind(new_click.is_qr_code)
        .bind(&new_click.user_agent)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(new_click.into_click(id))
    }

    async fn totals(&self, link_id: i64) -> Result<ClickTotals, AppError> {
        let row = sqlx::query_as::<_, TotalsRow>(
            r#"
            SELECT
                COUNT(*) AS total,
                COUNT(*) FILTER (WHERE is_qr_code) AS qr
            FROM clicks
            WHERE link_id = $1
            "#,
        )
        .bind(link_id)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(ClickTotals {
            total: row.total,
            qr: row.qr,
            direct: row.total - row.qr,
        })
    }

    async fn clicks_by_date(
        &self,
        link_id: i64,
        since: Option<DateTime<Utc>>,
        limit: i64,
    ) -> Result<Vec<DateCount>, AppError> {
        let rows = sqlx::query_as::<_, (NaiveDate, i64)>(
            r#"
            SELECT (clicked_at AT TIME ZONE 'UTC')::date AS day, COUNT(*) AS count
            FROM clicks
            WHERE link_id = $1
              AND ($2::timestamptz IS NULL OR clicked_at >= $2)
            GROUP BY day
            ORDER BY day DESC
            LIMIT $3
            "#,
        )
        .bind(link_id)
        .bind(since)
        .bind(limit)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows
            .into_iter()
            .map(|(date, count)| DateCount { date, count })
            .collect())
    }

    async fn clicks_by_country(
        &self,
        link_id: i64,
        limit: i64,
    ) -> Result<Vec<LabelCount>, AppError> {
        self.grouped(
            r#"
            SELECT country_name, COUNT(*) AS count
            FROM clicks
            WHERE link_id = $1 AND country_name IS NOT NULL
            GROUP BY country_name
            ORDER BY count DESC, country_name
            LIMIT $2
            "#,
            link_id,
            limit,
        )
        .await
    }

    async fn clicks_by_device(&self, link_id: i64) -> Result<Vec<LabelCount>, AppError> {
        let rows = sqlx::query_as::<_, (String, i64)>(
            r#"
            SELECT device_type, COUNT(*) AS count
            FROM clicks
            WHERE link_id = $1
            GROUP BY device_type
            ORDER BY count DESC, device_type
            "#,
        )
        .bind(link_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows
            .into_iter()
            .map(|(label, count)| LabelCount { label, count })
            .collect())
    }

    async fn clicks_by_referrer(
        &self,
        link_id: i64,
        limit: i64,
    ) -> Result<Vec<LabelCount>, AppError> {
        self.grouped(
            r#"
            SELECT referrer_domain, COUNT(*) AS count
            FROM clicks
            WHERE link_id = $1 AND referrer_domain IS NOT NULL
            GROUP BY referrer_domain
            ORDER BY count DESC, referrer_domain
            LIMIT $2
            "#,
            link_id,
            limit,
        )
        .await
    }

    async fn recent_clicks(&self, link_id: i64, limit: i64) -> Result<Vec<Click>, AppError> {
        let rows = sqlx::query_as::<_, ClickRow>(
            r#"
            SELECT *
            FROM clicks
            WHERE link_id = $1
            ORDER BY clicked_at DESC, id DESC
            LIMIT $2
            "#,
        )
        .bind(link_id)
        .bind(limit)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().map(Click::from).collect())
    }

    async fn daily_report(&self, day: NaiveDate) -> Result<DailyReport, AppError> {
        let (total_clicks, unique_links) = sqlx::query_as::<_, (i64, i64)>(
            r#"
            SELECT COUNT(*), COUNT(DISTINCT link_id)
            FROM clicks
            WHERE (clicked_at AT TIME ZONE 'UTC')::date = $1
            "#,
        )
        .bind(day)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(DailyReport {
            total_clicks,
            unique_links,
        })
    }
}

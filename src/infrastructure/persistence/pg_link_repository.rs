//! PostgreSQL implementation of link repository.

use async_trait::async_trait;
use serde_json::json;
use sqlx::{FromRow, PgPool};
use std::sync::Arc;

use crate::domain::entities::{Link, LinkPatch, NewLink};
use crate::domain::repositories::{LinkRepository, LinkWithClicks};
use crate::error::AppError;

/// PostgreSQL repository for link storage and retrieval.
///
/// Every code and alias is also written to `link_tokens` inside the creating
/// transaction. Its primary key is what keeps codes and aliases from
/// colliding across namespaces.
pub struct PgLinkRepository {
    pool: Arc<PgPool>,
}

impl PgLinkRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct LinkWithClicksRow {
    #[sqlx(flatten)]
    link: Link,
    total_clicks: i64,
}

/// Re-tags a unique violation with the token field it happened on.
fn token_conflict(err: sqlx::Error, field: &'static str) -> AppError {
    match AppError::from(err) {
        AppError::Conflict { .. } => AppError::conflict(
            format!("{field} is already taken"),
            json!({ "field": field }),
        ),
        other => other,
    }
}

/// Column-level unique violations on `links` name the offending column in
/// the constraint (`links_short_code_key`, `links_custom_alias_key`).
fn link_insert_conflict(err: sqlx::Error) -> AppError {
    let field = match err.as_database_error().and_then(|db| db.constraint()) {
        Some(constraint) if constraint.contains("custom_alias") => "custom_alias",
        _ => "short_code",
    };
    token_conflict(err, field)
}

#[async_trait]
impl LinkRepository for PgLinkRepository {
    async fn create(&self, new_link: NewLink) -> Result<Link, AppError> {
        let mut tx = self.pool.begin().await?;

        let link = sqlx::query_as::<_, Link>(
            r#"
            INSERT INTO links (short_code, custom_alias, original_url, title, description, expires_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(&new_link.short_code)
        .bind(&new_link.custom_alias)
        .bind(&new_link.original_url)
        .bind(&new_link.title)
        .bind(&new_link.description)
        .bind(new_link.expires_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(link_insert_conflict)?;

        sqlx::query("INSERT INTO link_tokens (token, link_id) VALUES ($1, $2)")
            .bind(&link.short_code)
            .bind(link.id)
            .execute(&mut *tx)
            .await
            .map_err(|e| token_conflict(e, "short_code"))?;

        if let Some(alias) = &link.custom_alias {
            sqlx::query("INSERT INTO link_tokens (token, link_id) VALUES ($1, $2)")
                .bind(alias)
                .bind(link.id)
                .execute(&mut *tx)
                .await
                .map_err(|e| token_conflict(e, "custom_alias"))?;
        }

        tx.commit().await?;

        Ok(link)
    }

    async fn find_by_code_or_alias(&self, token: &str) -> Result<Option<Link>, AppError> {
        let link = sqlx::query_as::<_, Link>(
            r#"
            SELECT l.*
            FROM link_tokens t
            JOIN links l ON l.id = t.link_id
            WHERE t.token = $1
            "#,
        )
        .bind(token)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(link)
    }

    async fn exists_by_code_or_alias(&self, token: &str) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM link_tokens WHERE token = $1)",
        )
        .bind(token)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(exists)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Link>, AppError> {
        let link = sqlx::query_as::<_, Link>("SELECT * FROM links WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(link)
    }

    async fn list_with_click_counts(
        &self,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<LinkWithClicks>, AppError> {
        let rows = sqlx::query_as::<_, LinkWithClicksRow>(
            r#"
            SELECT l.*, COALESCE(c.total, 0) AS total_clicks
            FROM links l
            LEFT JOIN (
                SELECT link_id, COUNT(*) AS total
                FROM clicks
                GROUP BY link_id
            ) c ON c.link_id = l.id
            ORDER BY l.created_at DESC, l.id DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| LinkWithClicks {
                link: r.link,
                total_clicks: r.total_clicks,
            })
            .collect())
    }

    async fn count(&self) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM links")
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(count)
    }

    async fn update(&self, id: i64, patch: LinkPatch) -> Result<Link, AppError> {
        let link = sqlx::query_as::<_, Link>(
            r#"
            UPDATE links SET
                title       = CASE WHEN $2 THEN $3 ELSE title END,
                description = CASE WHEN $4 THEN $5 ELSE description END,
                is_active   = COALESCE($6, is_active),
                expires_at  = CASE WHEN $7 THEN $8 ELSE expires_at END,
                updated_at  = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(patch.title.is_some())
        .bind(patch.title.flatten())
        .bind(patch.description.is_some())
        .bind(patch.description.flatten())
        .bind(patch.is_active)
        .bind(patch.expires_at.is_some())
        .bind(patch.expires_at.flatten())
        .fetch_optional(self.pool.as_ref())
        .await?;

        link.ok_or_else(|| AppError::not_found("Link not found", json!({ "id": id })))
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM links WHERE id = $1")
            .bind(id)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn deactivate_expired(&self) -> Result<u64, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE links
            SET is_active = FALSE, updated_at = NOW()
            WHERE is_active AND expires_at IS NOT NULL AND expires_at <= NOW()
            "#,
        )
        .execute(self.pool.as_ref())
        .await?;

        Ok(result.rows_affected())
    }
}

//! Repository trait for short link data access.

use crate::domain::entities::{Link, LinkPatch, NewLink};
use crate::error::AppError;
use async_trait::async_trait;

/// A link together with the number of clicks recorded for it.
#[derive(Debug, Clone)]
pub struct LinkWithClicks {
    pub link: Link,
    pub total_clicks: i64,
}

/// Repository interface for managing short links.
///
/// Codes and aliases share a single token namespace. Implementations must
/// enforce that uniqueness themselves (a constraint, not a prior lookup),
/// because callers check existence and insert without holding a lock.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgLinkRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Creates a new link.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] with `details.field` set to `"short_code"`
    /// or `"custom_alias"` when that token is already taken by any link.
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn create(&self, new_link: NewLink) -> Result<Link, AppError>;

    /// Finds the link whose short code or custom alias equals `token`.
    ///
    /// Matching is case-sensitive.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn find_by_code_or_alias(&self, token: &str) -> Result<Option<Link>, AppError>;

    /// Returns true if `token` is used as any link's short code or custom alias.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn exists_by_code_or_alias(&self, token: &str) -> Result<bool, AppError>;

    /// Finds a link by its id.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn find_by_id(&self, id: i64) -> Result<Option<Link>, AppError>;

    /// Lists links, newest first, with their click totals.
    ///
    /// # Arguments
    ///
    /// - `offset` - Number of links to skip
    /// - `limit` - Maximum number of links to return
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn list_with_click_counts(
        &self,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<LinkWithClicks>, AppError>;

    /// Counts all links.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn count(&self) -> Result<i64, AppError>;

    /// Partially updates a link.
    ///
    /// Only fields present in [`LinkPatch`] are modified.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no link has this id.
    /// Returns [`AppError::Internal`] on database errors.
    async fn update(&self, id: i64, patch: LinkPatch) -> Result<Link, AppError>;

    /// Deletes a link and, by cascade, all of its clicks.
    ///
    /// Returns `Ok(false)` if no link has this id.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn delete(&self, id: i64) -> Result<bool, AppError>;

    /// Switches off every active link whose expiry has passed.
    ///
    /// Returns the number of links deactivated.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn deactivate_expired(&self) -> Result<u64, AppError>;
}

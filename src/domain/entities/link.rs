//! Link entity representing a shortened URL mapping.

use chrono::{DateTime, Utc};

/// Whether a link may currently be followed, and if not, why.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkAccess {
    Accessible,
    Expired,
    Inactive,
}

/// A shortened URL with its lifecycle metadata.
///
/// A link is reachable through its system `short_code` and, optionally, through
/// a user-chosen `custom_alias`. Both live in one namespace: no code may equal
/// any alias and vice versa.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Link {
    pub id: i64,
    pub short_code: String,
    pub custom_alias: Option<String>,
    pub original_url: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub is_active: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Link {
    /// Returns true if the link has an expiry at or before `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|e| now >= e)
    }

    /// Returns true if the link has passed its expiry time.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Classifies the link at `now`.
    ///
    /// Expiry takes precedence over deactivation, so an expired link that was
    /// also switched off reports [`LinkAccess::Expired`].
    pub fn access_at(&self, now: DateTime<Utc>) -> LinkAccess {
        if self.is_expired_at(now) {
            LinkAccess::Expired
        } else if !self.is_active {
            LinkAccess::Inactive
        } else {
            LinkAccess::Accessible
        }
    }

    /// `is_active && (expires_at is None || now < expires_at)`.
    pub fn is_accessible_at(&self, now: DateTime<Utc>) -> bool {
        self.access_at(now) == LinkAccess::Accessible
    }

    /// The token shown to users: the alias when set, otherwise the code.
    pub fn public_token(&self) -> &str {
        self.custom_alias.as_deref().unwrap_or(&self.short_code)
    }

    /// Full short URL under the given base (no trailing slash expected).
    pub fn short_url(&self, base_url: &str) -> String {
        format!("{}/{}", base_url.trim_end_matches('/'), self.public_token())
    }
}

/// Input data for creating a new link.
#[derive(Debug, Clone)]
pub struct NewLink {
    pub short_code: String,
    pub custom_alias: Option<String>,
    pub original_url: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Partial update for an existing link.
///
/// `None` fields are left unchanged.
/// `expires_at: Some(None)` clears the expiry; `Some(Some(t))` sets it.
#[derive(Debug, Clone, Default)]
pub struct LinkPatch {
    pub title: Option<Option<String>>,
    pub description: Option<Option<String>>,
    pub is_active: Option<bool>,
    pub expires_at: Option<Option<DateTime<Utc>>>,
}

impl LinkPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.is_active.is_none()
            && self.expires_at.is_none()
    }
}

#[cfg(test)]
pub(crate) fn sample_link(id: i64, code: &str) -> Link {
    let now = Utc::now();
    Link {
        id,
        short_code: code.to_string(),
        custom_alias: None,
        original_url: "https://example.com/landing".to_string(),
        title: None,
        description: None,
        is_active: true,
        expires_at: None,
        created_at: now,
        updated_at: now,
    }
}

//! DTO for the link preview endpoint.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::entities::{Link, LinkAccess};

/// What a short link points to, without following it.
#[derive(Debug, Serialize)]
pub struct PreviewResponse {
    pub short_code: String,
    pub custom_alias: Option<String>,
    pub short_url: String,
    pub original_url: String,
    pub title: Option<String>,
    pub description: Option<String>,
    /// `active`, `expired` or `inactive`.
    pub status: &'static str,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl PreviewResponse {
    pub fn from_link(link: Link, base_url: &str) -> Self {
        let status = match link.access_at(Utc::now()) {
            LinkAccess::Accessible => "active",
            LinkAccess::Expired => "expired",
            LinkAccess::Inactive => "inactive",
        };
        let short_url = link.short_url(base_url);

        Self {
            short_code: link.short_code,
            custom_alias: link.custom_alias,
            short_url,
            original_url: link.original_url,
            title: link.title,
            description: link.description,
            status,
            expires_at: link.expires_at,
            created_at: link.created_at,
        }
    }
}

//! DTOs for link management endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use validator::Validate;

use crate::api::dto::pagination::PaginationMeta;
use crate::application::services::CreateLink;
use crate::domain::entities::{Link, LinkPatch};
use crate::domain::repositories::LinkWithClicks;
use crate::error::AppError;

const MAX_TITLE_LENGTH: usize = 255;

/// Request body for `POST /api/links`.
///
/// The URL and alias get their full checks in the service; these bounds only
/// reject obviously bad input early.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateLinkRequest {
    #[validate(length(min = 1, max = 2048, message = "URL must be between 1 and 2048 characters"))]
    pub original_url: String,

    pub custom_alias: Option<String>,

    #[validate(length(max = 255, message = "Title must be at most 255 characters"))]
    pub title: Option<String>,

    pub description: Option<String>,

    /// After this time the link answers `410 Gone`.
    pub expires_at: Option<DateTime<Utc>>,
}

impl From<CreateLinkRequest> for CreateLink {
    fn from(req: CreateLinkRequest) -> Self {
        Self {
            original_url: req.original_url,
            custom_alias: req.custom_alias,
            title: req.title,
            description: req.description,
            expires_at: req.expires_at,
        }
    }
}

/// Request body for `PATCH /api/links/{id}`.
///
/// All fields are optional; only provided fields are changed.
///
/// # Nullable fields
///
/// For `title`, `description` and `expires_at`:
/// - **Absent** → leave existing value unchanged
/// - **`null`** → clear the value
/// - **Value** → set it
#[derive(Debug, Default, Deserialize)]
pub struct UpdateLinkRequest {
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub title: Option<Option<String>>,

    #[serde(default, with = "::serde_with::rust::double_option")]
    pub description: Option<Option<String>>,

    /// `false` stops redirection, `true` resumes it if not expired.
    pub is_active: Option<bool>,

    #[serde(default, with = "::serde_with::rust::double_option")]
    pub expires_at: Option<Option<DateTime<Utc>>>,
}

impl UpdateLinkRequest {
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the new title is too long.
    pub fn into_patch(self) -> Result<LinkPatch, AppError> {
        if let Some(Some(title)) = &self.title
            && title.chars().count() > MAX_TITLE_LENGTH
        {
            return Err(AppError::bad_request(
                "Title must be at most 255 characters",
                json!({ "field": "title" }),
            ));
        }

        Ok(LinkPatch {
            title: self.title,
            description: self.description,
            is_active: self.is_active,
            expires_at: self.expires_at,
        })
    }
}

/// JSON representation of a link.
#[derive(Debug, Serialize)]
pub struct LinkResponse {
    pub id: i64,
    pub short_code: String,
    pub custom_alias: Option<String>,
    pub short_url: String,
    pub original_url: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub is_active: bool,
    /// Whether a redirect would currently succeed.
    pub is_accessible: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_clicks: Option<i64>,
}

impl LinkResponse {
    pub fn from_link(link: Link, base_url: &str) -> Self {
        let short_url = link.short_url(base_url);
        let is_accessible = link.is_accessible_at(Utc::now());

        Self {
            id: link.id,
            short_code: link.short_code,
            custom_alias: link.custom_alias,
            short_url,
            original_url: link.original_url,
            title: link.title,
            description: link.description,
            is_active: link.is_active,
            is_accessible,
            expires_at: link.expires_at,
            created_at: link.created_at,
            updated_at: link.updated_at,
            total_clicks: None,
        }
    }

    pub fn with_clicks(item: LinkWithClicks, base_url: &str) -> Self {
        Self {
            total_clicks: Some(item.total_clicks),
            ..Self::from_link(item.link, base_url)
        }
    }
}

/// Paginated list of links with click totals.
#[derive(Debug, Serialize)]
pub struct LinkListResponse {
    pub pagination: PaginationMeta,
    pub items: Vec<LinkResponse>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::link::sample_link;

    #[test]
    fn test_update_request_distinguishes_null_and_absent() {
        let req: UpdateLinkRequest =
            serde_json::from_str(r#"{"title": null, "is_active": false}"#).unwrap();

        assert_eq!(req.title, Some(None));
        assert_eq!(req.description, None);
        assert_eq!(req.expires_at, None);
        assert_eq!(req.is_active, Some(false));
    }

    #[test]
    fn test_update_request_sets_expiry() {
        let req: UpdateLinkRequest =
            serde_json::from_str(r#"{"expires_at": "2030-01-01T00:00:00Z"}"#).unwrap();

        assert!(matches!(req.expires_at, Some(Some(_))));
    }

    #[test]
    fn test_update_request_rejects_long_title() {
        let req = UpdateLinkRequest {
            title: Some(Some("t".repeat(256))),
            ..Default::default()
        };

        assert!(req.into_patch().is_err());
    }

    #[test]
    fn test_create_request_validation() {
        let req = CreateLinkRequest {
            original_url: String::new(),
            custom_alias: None,
            title: None,
            description: None,
            expires_at: None,
        };

        assert!(req.validate().is_err());
    }

    #[test]
    fn test_response_prefers_alias_in_short_url() {
        let mut link = sample_link(1, "7xQ9pL");
        link.custom_alias = Some("summer-sale".to_string());

        let response = LinkResponse::from_link(link, "https://s.example.com");

        assert_eq!(response.short_url, "https://s.example.com/summer-sale");
        assert!(response.is_accessible);
        assert!(response.total_clicks.is_none());
    }
}

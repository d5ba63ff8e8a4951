//! Link creation and management service.

use chrono::{DateTime, Utc};
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

use crate::application::services::CodeGenerator;
use crate::domain::entities::{Link, LinkPatch, NewLink};
use crate::domain::repositories::{LinkRepository, LinkWithClicks};
use crate::error::AppError;
use crate::utils::url_normalizer::validate_destination_url;

/// Insert attempts when a freshly generated code loses a race.
const MAX_INSERT_ATTEMPTS: usize = 3;

/// Validated-at-the-edge input for a new link.
#[derive(Debug, Clone, Default)]
pub struct CreateLink {
    pub original_url: String,
    pub custom_alias: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Service for creating, listing, updating and deleting short links.
pub struct LinkService {
    links: Arc<dyn LinkRepository>,
    code_generator: Arc<CodeGenerator>,
}

impl LinkService {
    pub fn new(links: Arc<dyn LinkRepository>, code_generator: Arc<CodeGenerator>) -> Self {
        Self {
            links,
            code_generator,
        }
    }

    /// Creates a short link.
    ///
    /// Every link receives a generated short code; a custom alias is an
    /// additional token pointing at the same link.
    ///
    /// # Code collisions
    ///
    /// A generated code can still be taken by a concurrent insert after the
    /// generator checked it. Such a conflict is retried with a new code up to
    /// [`MAX_INSERT_ATTEMPTS`] times. A conflict on the custom alias is final.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if:
    /// - URL is not an absolute http(s) URL of at most 2048 characters
    /// - Custom alias has a bad length or format, or is reserved
    /// - Expiry is not in the future
    ///
    /// Returns [`AppError::Conflict`] if the custom alias is already taken.
    /// Returns [`AppError::Unavailable`] if no free short code could be found.
    pub async fn create_link(&self, input: CreateLink) -> Result<Link, AppError> {
        let original_url = validate_destination_url(&input.original_url).map_err(|e| {
            AppError::bad_request(
                "Invalid URL",
                json!({ "field": "original_url", "reason": e.to_string() }),
            )
        })?;

        if let Some(expires_at) = input.expires_at
            && expires_at <= Utc::now()
        {
            return Err(AppError::bad_request(
                "Expiry must be in the future",
                json!({ "field": "expires_at" }),
            ));
        }

        let custom_alias = match input.custom_alias.map(|a| a.trim().to_string()) {
            Some(alias) if !alias.is_empty() => {
                let validation = self.code_generator.validate_custom_alias(&alias).await?;
                if let Some(error) = validation.error {
                    return Err(error.into_app_error(&alias));
                }
                Some(alias)
            }
            _ => None,
        };

        let title = input.title.filter(|t| !t.trim().is_empty());
        let description = input.description.filter(|d| !d.trim().is_empty());

        for attempt in 1..=MAX_INSERT_ATTEMPTS {
            let short_code = self.code_generator.generate().await?;

            let new_link = NewLink {
                short_code,
                custom_alias: custom_alias.clone(),
                original_url: original_url.clone(),
                title: title.clone(),
                description: description.clone(),
                expires_at: input.expires_at,
            };

            match self.links.create(new_link).await {
                Ok(link) => {
                    info!(
                        link_id = link.id,
                        short_code = %link.short_code,
                        custom_alias = ?link.custom_alias,
                        "Link created"
                    );
                    return Ok(link);
                }
                Err(e) if e.is_conflict_on("short_code") => {
                    warn!(attempt, "Generated short code was taken concurrently, retrying");
                }
                Err(e) => return Err(e),
            }
        }

        Err(AppError::unavailable(
            "Could not allocate a unique short code",
            json!({ "attempts": MAX_INSERT_ATTEMPTS }),
        ))
    }

    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no link has this id.
    pub async fn get_link(&self, id: i64) -> Result<Link, AppError> {
        self.links
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Link not found", json!({ "id": id })))
    }

    /// Returns one page of links with click totals, plus the overall link count.
    ///
    /// `page` is 1-based.
    pub async fn list_links(
        &self,
        page: i64,
        page_size: i64,
    ) -> Result<(Vec<LinkWithClicks>, i64), AppError> {
        let offset = (page.max(1) - 1) * page_size;
        let items = self.links.list_with_click_counts(offset, page_size).await?;
        let total = self.links.count().await?;

        Ok((items, total))
    }

    pub async fn total_links(&self) -> Result<i64, AppError> {
        self.links.count().await
    }

    /// Applies a partial update. An empty patch returns the link unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no link has this id.
    pub async fn update_link(&self, id: i64, patch: LinkPatch) -> Result<Link, AppError> {
        if patch.is_empty() {
            return self.get_link(id).await;
        }

        let link = self.links.update(id, patch).await?;
        info!(link_id = id, is_active = link.is_active, "Link updated");

        Ok(link)
    }

    /// Deletes a link together with its clicks.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no link has this id.
    pub async fn delete_link(&self, id: i64) -> Result<(), AppError> {
        if !self.links.delete(id).await? {
            return Err(AppError::not_found("Link not found", json!({ "id": id })));
        }

        info!(link_id = id, "Link deleted");
        Ok(())
    }

    /// Deactivates every active link past its expiry. Returns how many changed.
    pub async fn deactivate_expired(&self) -> Result<u64, AppError> {
        let count = self.links.deactivate_expired().await?;

        if count > 0 {
            info!(count, "Deactivated expired links");
            metrics::counter!("links_deactivated_total").increment(count);
        }

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CodeGeneratorConfig;
    use crate::domain::entities::link::sample_link;
    use crate::domain::repositories::MockLinkRepository;
    use chrono::Duration;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn service(repo: MockLinkRepository) -> LinkService {
        let repo: Arc<dyn LinkRepository> = Arc::new(repo);
        let generator = Arc::new(CodeGenerator::new(
            CodeGeneratorConfig::default(),
            repo.clone(),
        ));
        LinkService::new(repo, generator)
    }

    fn input(url: &str) -> CreateLink {
        CreateLink {
            original_url: url.to_string(),
            ..Default::default()
        }
    }

    fn link_from(new_link: &NewLink, id: i64) -> Link {
        let mut link = sample_link(id, &new_link.short_code);
        link.custom_alias = new_link.custom_alias.clone();
        link.original_url = new_link.original_url.clone();
        link.title = new_link.title.clone();
        link.expires_at = new_link.expires_at;
        link
    }

    #[tokio::test]
    async fn test_create_link_success() {
        let mut repo = MockLinkRepository::new();
        repo.expect_exists_by_code_or_alias()
            .times(1)
            .returning(|_| Ok(false));
        repo.expect_create()
            .withf(|l| l.original_url == "https://example.com/page" && l.custom_alias.is_none())
            .times(1)
            .returning(|l| Ok(link_from(&l, 10)));

        let link = service(repo)
            .create_link(input("  https://example.com/page "))
            .await
            .unwrap();

        assert_eq!(link.id, 10);
        assert_eq!(link.short_code.len(), 6);
        assert_eq!(link.original_url, "https://example.com/page");
    }

    #[tokio::test]
    async fn test_create_link_with_alias() {
        let mut repo = MockLinkRepository::new();
        repo.expect_exists_by_code_or_alias()
            .times(2)
            .returning(|_| Ok(false));
        repo.expect_create()
            .withf(|l| l.custom_alias.as_deref() == Some("summer-sale"))
            .times(1)
            .returning(|l| Ok(link_from(&l, 11)));

        let link = service(repo)
            .create_link(CreateLink {
                custom_alias: Some(" summer-sale ".to_string()),
                ..input("https://example.com")
            })
            .await
            .unwrap();

        assert_eq!(link.custom_alias.as_deref(), Some("summer-sale"));
        assert_eq!(link.public_token(), "summer-sale");
    }

    #[tokio::test]
    async fn test_create_link_blank_alias_is_ignored() {
        let mut repo = MockLinkRepository::new();
        repo.expect_exists_by_code_or_alias()
            .times(1)
            .returning(|_| Ok(false));
        repo.expect_create()
            .withf(|l| l.custom_alias.is_none())
            .times(1)
            .returning(|l| Ok(link_from(&l, 12)));

        let result = service(repo)
            .create_link(CreateLink {
                custom_alias: Some("   ".to_string()),
                ..input("https://example.com")
            })
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_create_link_invalid_url() {
        for url in ["not-a-url", "ftp://example.com", "javascript:alert(1)"] {
            let err = service(MockLinkRepository::new())
                .create_link(input(url))
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::Validation { .. }), "{url}");
        }
    }

    #[tokio::test]
    async fn test_create_link_rejects_past_expiry() {
        let mut repo = MockLinkRepository::new();
        repo.expect_create().never();

        let err = service(repo)
            .create_link(CreateLink {
                expires_at: Some(Utc::now() - Duration::hours(1)),
                ..input("https://example.com")
            })
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_create_link_reserved_alias() {
        let mut repo = MockLinkRepository::new();
        repo.expect_create().never();

        let err = service(repo)
            .create_link(CreateLink {
                custom_alias: Some("api".to_string()),
                ..input("https://example.com")
            })
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation { .. }));
        assert_eq!(err.to_error_info().details["reason"], "reserved");
    }

    #[tokio::test]
    async fn test_create_link_alias_taken() {
        let mut repo = MockLinkRepository::new();
        repo.expect_exists_by_code_or_alias()
            .withf(|t| t == "taken-alias")
            .returning(|_| Ok(true));
        repo.expect_create().never();

        let err = service(repo)
            .create_link(CreateLink {
                custom_alias: Some("taken-alias".to_string()),
                ..input("https://example.com")
            })
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Conflict { .. }));
    }

    #[tokio::test]
    async fn test_create_link_retries_on_code_conflict() {
        let inserts = Arc::new(AtomicUsize::new(0));
        let counter = inserts.clone();

        let mut repo = MockLinkRepository::new();
        repo.expect_exists_by_code_or_alias()
            .returning(|_| Ok(false));
        repo.expect_create().times(2).returning(move |l| {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(AppError::conflict(
                    "short_code is already taken",
                    json!({ "field": "short_code" }),
                ))
            } else {
                Ok(link_from(&l, 20))
            }
        });

        let link = service(repo)
            .create_link(input("https://example.com"))
            .await
            .unwrap();

        assert_eq!(link.id, 20);
        assert_eq!(inserts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_create_link_gives_up_after_repeated_code_conflicts() {
        let mut repo = MockLinkRepository::new();
        repo.expect_exists_by_code_or_alias()
            .returning(|_| Ok(false));
        repo.expect_create().times(3).returning(|_| {
            Err(AppError::conflict(
                "short_code is already taken",
                json!({ "field": "short_code" }),
            ))
        });

        let err = service(repo)
            .create_link(input("https://example.com"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Unavailable { .. }));
    }

    #[tokio::test]
    async fn test_create_link_alias_conflict_at_insert_is_final() {
        let mut repo = MockLinkRepository::new();
        repo.expect_exists_by_code_or_alias()
            .returning(|_| Ok(false));
        repo.expect_create().times(1).returning(|_| {
            Err(AppError::conflict(
                "custom_alias is already taken",
                json!({ "field": "custom_alias" }),
            ))
        });

        let err = service(repo)
            .create_link(CreateLink {
                custom_alias: Some("raced-alias".to_string()),
                ..input("https://example.com")
            })
            .await
            .unwrap_err();

        assert!(err.is_conflict_on("custom_alias"));
    }

    #[tokio::test]
    async fn test_get_link_not_found() {
        let mut repo = MockLinkRepository::new();
        repo.expect_find_by_id().returning(|_| Ok(None));

        let err = service(repo).get_link(404).await.unwrap_err();

        assert!(matches!(err, AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_list_links_offset() {
        let mut repo = MockLinkRepository::new();
        repo.expect_list_with_click_counts()
            .withf(|offset, limit| *offset == 20 && *limit == 10)
            .times(1)
            .returning(|_, _| {
                Ok(vec![LinkWithClicks {
                    link: sample_link(1, "abc123"),
                    total_clicks: 7,
                }])
            });
        repo.expect_count().times(1).returning(|| Ok(21));

        let (items, total) = service(repo).list_links(3, 10).await.unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].total_clicks, 7);
        assert_eq!(total, 21);
    }

    #[tokio::test]
    async fn test_update_with_empty_patch_skips_store_write() {
        let mut repo = MockLinkRepository::new();
        repo.expect_update().never();
        repo.expect_find_by_id()
            .returning(|id| Ok(Some(sample_link(id, "abc123"))));

        let link = service(repo)
            .update_link(3, LinkPatch::default())
            .await
            .unwrap();

        assert_eq!(link.id, 3);
    }

    #[tokio::test]
    async fn test_update_deactivates() {
        let mut repo = MockLinkRepository::new();
        repo.expect_update()
            .withf(|id, patch| *id == 3 && patch.is_active == Some(false))
            .times(1)
            .returning(|id, _| {
                let mut link = sample_link(id, "abc123");
                link.is_active = false;
                Ok(link)
            });

        let link = service(repo)
            .update_link(
                3,
                LinkPatch {
                    is_active: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert!(!link.is_active);
    }

    #[tokio::test]
    async fn test_delete_missing_link() {
        let mut repo = MockLinkRepository::new();
        repo.expect_delete().returning(|_| Ok(false));

        let err = service(repo).delete_link(9).await.unwrap_err();

        assert!(matches!(err, AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_deactivate_expired_returns_count() {
        let mut repo = MockLinkRepository::new();
        repo.expect_deactivate_expired().times(1).returning(|| Ok(4));

        assert_eq!(service(repo).deactivate_expired().await.unwrap(), 4);
    }
}

//! Persists enriched clicks.

use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::domain::entities::{Click, NewClick};
use crate::domain::repositories::ClickRepository;
use crate::enrichment::EnrichedClick;
use crate::error::AppError;

/// Writes exactly one click row per accepted redirect.
///
/// Called from the click worker only. Errors are returned to the worker,
/// which logs and counts them; there is no retry.
pub struct ClickRecorder {
    clicks: Arc<dyn ClickRepository>,
}

impl ClickRecorder {
    pub fn new(clicks: Arc<dyn ClickRepository>) -> Self {
        Self { clicks }
    }

    /// # Errors
    ///
    /// Returns [`AppError::Internal`] if the insert fails, for example when
    /// the link was deleted after the redirect.
    pub async fn record(
        &self,
        link_id: i64,
        enriched: EnrichedClick,
        is_qr_code: bool,
        clicked_at: DateTime<Utc>,
    ) -> Result<Click, AppError> {
        let new_click = NewClick {
            link_id,
            clicked_at,
            ip_address: enriched.ip_address,
            country: enriched.geo.country,
            country_name: enriched.geo.country_name,
            city: enriched.geo.city,
            region: enriched.geo.region,
            device_type: enriched.device_type,
            browser: enriched.browser,
            browser_version: enriched.browser_version,
            platform: enriched.platform,
            referrer: enriched.referrer,
            referrer_domain: enriched.referrer_domain,
            is_qr_code,
            user_agent: enriched.user_agent,
        }
        .fit_to_columns();

        self.clicks.record_click(new_click).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::DeviceType;
    use crate::domain::repositories::MockClickRepository;
    use crate::enrichment::GeoLocation;
    use serde_json::json;

    #[tokio::test]
    async fn test_record_maps_enriched_fields() {
        let mut repo = MockClickRepository::new();
        repo.expect_record_click()
            .withf(|c| {
                c.link_id == 7
                    && c.is_qr_code
                    && c.country.as_deref() == Some("XX")
                    && c.device_type == DeviceType::Tablet
                    && c.referrer_domain.as_deref() == Some("t.co")
            })
            .times(1)
            .returning(|c| Ok(c.into_click(100)));

        let recorder = ClickRecorder::new(Arc::new(repo));
        let enriched = EnrichedClick {
            ip_address: Some("10.0.0.1".to_string()),
            geo: GeoLocation::local(),
            device_type: DeviceType::Tablet,
            referrer: Some("https://t.co/abc".to_string()),
            referrer_domain: Some("t.co".to_string()),
            ..Default::default()
        };
        let clicked_at = Utc::now();

        let click = recorder.record(7, enriched, true, clicked_at).await.unwrap();

        assert_eq!(click.id, 100);
        assert_eq!(click.clicked_at, clicked_at);
        assert_eq!(click.referrer_source(), "Twitter/X");
    }

    #[tokio::test]
    async fn test_record_fits_values_to_columns() {
        let mut repo = MockClickRepository::new();
        repo.expect_record_click()
            .withf(|c| {
                c.platform.as_ref().is_some_and(|p| p.chars().count() == 100)
                    && c.browser_version.as_ref().is_some_and(|v| v.len() == 50)
                    && c.user_agent.as_ref().is_some_and(|ua| ua.len() == 500)
            })
            .times(1)
            .returning(|c| Ok(c.into_click(1)));

        let recorder = ClickRecorder::new(Arc::new(repo));
        let enriched = EnrichedClick {
            platform: Some("p".repeat(120)),
            browser_version: Some("9".repeat(80)),
            user_agent: Some("u".repeat(500)),
            ..Default::default()
        };

        assert!(recorder.record(7, enriched, false, Utc::now()).await.is_ok());
    }

    #[tokio::test]
    async fn test_record_propagates_store_error() {
        let mut repo = MockClickRepository::new();
        repo.expect_record_click()
            .times(1)
            .returning(|_| Err(AppError::internal("Database error", json!({}))));

        let recorder = ClickRecorder::new(Arc::new(repo));

        let result = recorder
            .record(7, EnrichedClick::default(), false, Utc::now())
            .await;

        assert!(result.is_err());
    }
}

//! Click job passed from the redirect path to the background worker.

use chrono::{DateTime, Utc};

use crate::domain::request_context::RequestContext;

/// An accepted redirect awaiting enrichment and persistence.
///
/// Created by [`crate::application::services::RedirectService`] once a link
/// resolved and passed the accessibility check, then sent through a bounded
/// channel to [`crate::domain::click_worker::run_click_worker`]. This decouples
/// the redirect response from geolocation and database latency.
///
/// # Usage Flow
///
/// 1. Created in the resolver with the captured request context
/// 2. Sent to the channel (non-blocking `try_send`)
/// 3. Enriched by [`crate::enrichment::RequestEnricher`]
/// 4. Stored by [`crate::application::services::ClickRecorder`]
#[derive(Debug, Clone)]
pub struct ClickJob {
    pub link_id: i64,
    pub is_qr_code: bool,
    /// Moment the redirect was accepted; stored as the click time.
    pub accepted_at: DateTime<Utc>,
    pub context: RequestContext,
}

impl ClickJob {
    pub fn new(link_id: i64, context: RequestContext) -> Self {
        Self {
            link_id,
            is_qr_code: context.is_qr_scan(),
            accepted_at: Utc::now(),
            context,
        }
    }
}

//! Short code resolution on the redirect hot path.

use chrono::Utc;
use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, warn};

use crate::domain::click_event::ClickJob;
use crate::domain::entities::{Link, LinkAccess};
use crate::domain::repositories::LinkRepository;
use crate::domain::request_context::RequestContext;
use crate::error::AppError;
use crate::utils::code_generator::is_token_charset;

/// Result of resolving a token for a redirect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedirectOutcome {
    /// The link is accessible; redirect to this URL.
    Redirect(String),
    NotFound,
    /// Expiry has passed, whatever the active flag says.
    Expired,
    /// The link was switched off.
    Forbidden,
}

/// Resolves short codes and aliases and hands accepted clicks to the worker.
///
/// Only reads from the store. Click recording happens on the background
/// worker after the caller has already sent its response.
pub struct RedirectService {
    links: Arc<dyn LinkRepository>,
    click_sender: mpsc::Sender<ClickJob>,
}

impl RedirectService {
    pub fn new(links: Arc<dyn LinkRepository>, click_sender: mpsc::Sender<ClickJob>) -> Self {
        Self {
            links,
            click_sender,
        }
    }

    /// Resolves `token` and, when the link is accessible, enqueues a click.
    ///
    /// Tokens with characters outside `[A-Za-z0-9-]` cannot exist and are
    /// answered without a store lookup.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] if the store lookup fails. Queueing
    /// problems are never returned.
    pub async fn resolve(
        &self,
        token: &str,
        ctx: RequestContext,
    ) -> Result<RedirectOutcome, AppError> {
        let Some(link) = self.lookup(token).await? else {
            debug!(token, "Short link not found");
            return Ok(RedirectOutcome::NotFound);
        };

        match link.access_at(Utc::now()) {
            LinkAccess::Expired => Ok(RedirectOutcome::Expired),
            LinkAccess::Inactive => Ok(RedirectOutcome::Forbidden),
            LinkAccess::Accessible => {
                self.dispatch(ClickJob::new(link.id, ctx));
                Ok(RedirectOutcome::Redirect(link.original_url))
            }
        }
    }

    /// Looks up the link behind a token without recording anything.
    pub async fn preview(&self, token: &str) -> Result<Option<Link>, AppError> {
        self.lookup(token).await
    }

    async fn lookup(&self, token: &str) -> Result<Option<Link>, AppError> {
        if !is_token_charset(token) {
            return Ok(None);
        }

        self.links.find_by_code_or_alias(token).await
    }

    fn dispatch(&self, job: ClickJob) {
        let link_id = job.link_id;

        match self.click_sender.try_send(job) {
            Ok(()) => {
                metrics::counter!("clicks_enqueued_total").increment(1);
            }
            Err(TrySendError::Full(_)) => {
                warn!(link_id, "Click queue full, dropping click");
                metrics::counter!("clicks_dropped_total").increment(1);
            }
            Err(TrySendError::Closed(_)) => {
                warn!(link_id, "Click queue closed, dropping click");
                metrics::counter!("clicks_dropped_total").increment(1);
            }
        }
    }

    /// True once the worker side of the click channel is gone.
    pub fn is_click_queue_closed(&self) -> bool {
        self.click_sender.is_closed()
    }

    /// Free slots in the click queue.
    pub fn click_queue_capacity(&self) -> usize {
        self.click_sender.capacity()
    }
}

//! Shared application state injected into every handler.

use std::sync::Arc;
use tokio::sync::mpsc;

use crate::application::services::{AnalyticsService, CodeGenerator, LinkService, RedirectService};
use crate::config::CodeGeneratorConfig;
use crate::domain::click_event::ClickJob;
use crate::domain::repositories::{ClickRepository, LinkRepository};

/// Services and settings shared by all routes.
///
/// Cheap to clone: every service sits behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub link_service: Arc<LinkService>,
    pub redirect_service: Arc<RedirectService>,
    pub analytics_service: Arc<AnalyticsService>,
    pub code_generator: Arc<CodeGenerator>,
    /// Prefix for rendered short URLs, without a trailing slash.
    pub base_url: String,
}

impl AppState {
    /// Wires the services on top of the given stores.
    ///
    /// `click_sender` is the producer side of the click worker's channel.
    pub fn new(
        links: Arc<dyn LinkRepository>,
        clicks: Arc<dyn ClickRepository>,
        code_config: CodeGeneratorConfig,
        click_sender: mpsc::Sender<ClickJob>,
        base_url: impl Into<String>,
    ) -> Self {
        let code_generator = Arc::new(CodeGenerator::new(code_config, links.clone()));

        Self {
            link_service: Arc::new(LinkService::new(links.clone(), code_generator.clone())),
            redirect_service: Arc::new(RedirectService::new(links.clone(), click_sender)),
            analytics_service: Arc::new(AnalyticsService::new(links, clicks)),
            code_generator,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

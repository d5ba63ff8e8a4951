//! Click enrichment from raw request data.
//!
//! [`RequestEnricher`] turns a captured [`RequestContext`] into the analytics
//! fields of a click: client IP, geolocation, device class, browser, platform
//! and referrer host. Every sub-step is best effort. A failing step leaves its
//! fields empty and is logged, the enrichment as a whole never fails.

pub mod client_ip;
pub mod geo;
pub mod referrer;
pub mod user_agent;

use std::net::IpAddr;
use std::sync::Arc;

use tokio::time::timeout;
use tracing::{debug, warn};

use crate::config::EnrichmentConfig;
use crate::domain::entities::DeviceType;
use crate::domain::request_context::RequestContext;

pub use geo::{GeoError, GeoLocation, GeoLocator};
pub use user_agent::{ParsedUserAgent, UserAgentParser, WootheeParser};

/// Analytics fields derived from one request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnrichedClick {
    pub ip_address: Option<String>,
    pub geo: GeoLocation,
    pub device_type: DeviceType,
    pub browser: Option<String>,
    pub browser_version: Option<String>,
    pub platform: Option<String>,
    pub referrer: Option<String>,
    pub referrer_domain: Option<String>,
    pub user_agent: Option<String>,
}

pub struct RequestEnricher {
    config: EnrichmentConfig,
    geo: Arc<dyn GeoLocator>,
    ua_parser: Arc<dyn UserAgentParser>,
}

impl RequestEnricher {
    pub fn new(
        config: EnrichmentConfig,
        geo: Arc<dyn GeoLocator>,
        ua_parser: Arc<dyn UserAgentParser>,
    ) -> Self {
        Self {
            config,
            geo,
            ua_parser,
        }
    }

    pub async fn enrich(&self, ctx: &RequestContext) -> EnrichedClick {
        let client_addr = client_ip::resolve_client_ip(ctx, &self.config.client_ip_headers);

        let geo = match client_addr {
            Some(ip) => self.locate(ip).await,
            None => GeoLocation::default(),
        };

        let user_agent = ctx.user_agent().map(str::to_string);
        let parsed = user_agent
            .as_deref()
            .map(|ua| self.ua_parser.parse(ua))
            .unwrap_or_default();

        let referrer = ctx.referer().map(str::to_string);
        let referrer_domain = referrer.as_deref().and_then(referrer::extract_domain);

        EnrichedClick {
            ip_address: client_addr.map(|ip| ip.to_string()),
            geo,
            device_type: parsed.device_type(),
            browser: parsed.browser,
            browser_version: parsed.browser_version,
            platform: parsed.platform,
            referrer,
            referrer_domain,
            user_agent,
        }
    }

    async fn locate(&self, addr: IpAddr) -> GeoLocation {
        let ip = addr.to_string();
        if geo::is_local_ip(&ip) {
            return GeoLocation::local();
        }

        match timeout(self.config.geo_timeout, self.geo.lookup(addr)).await {
            Ok(Ok(Some(location))) => location,
            Ok(Ok(None)) => {
                debug!(%ip, locator = self.geo.name(), "No geolocation data");
                GeoLocation::default()
            }
            Ok(Err(e)) => {
                warn!(%ip, locator = self.geo.name(), error = %e, "Geolocation failed");
                metrics::counter!("geo_lookup_failures_total").increment(1);
                GeoLocation::default()
            }
            Err(_) => {
                warn!(
                    %ip,
                    locator = self.geo.name(),
                    timeout_ms = self.config.geo_timeout.as_millis() as u64,
                    "Geolocation timed out"
                );
                metrics::counter!("geo_lookup_failures_total").increment(1);
                GeoLocation::default()
            }
        }
    }
}

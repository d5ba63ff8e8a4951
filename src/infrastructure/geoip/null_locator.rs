//! No-op geolocation for deployments without a lookup service.

use async_trait::async_trait;
use std::net::IpAddr;
use tracing::debug;

use crate::enrichment::{GeoError, GeoLocation, GeoLocator};

/// A locator that knows nothing.
///
/// Every lookup succeeds with `None`, so public addresses are stored without
/// geographic fields. Local addresses still get the placeholder because the
/// enricher handles them before any locator is asked.
pub struct NullGeoLocator;

impl NullGeoLocator {
    pub fn new() -> Self {
        debug!("Using NullGeoLocator (geolocation disabled)");
        Self
    }
}

impl Default for NullGeoLocator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GeoLocator for NullGeoLocator {
    async fn lookup(&self, _ip: IpAddr) -> Result<Option<GeoLocation>, GeoError> {
        Ok(None)
    }

    fn name(&self) -> &'static str {
        "null"
    }
}

//! Geolocation lookup abstraction.

use async_trait::async_trait;
use std::net::IpAddr;

/// Geographic fields attached to a click.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeoLocation {
    /// ISO 3166-1 alpha-2 code.
    pub country: Option<String>,
    pub country_name: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
}

impl GeoLocation {
    /// Placeholder stored for loopback and private addresses.
    pub fn local() -> Self {
        Self {
            country: Some("XX".to_string()),
            country_name: Some("Local".to_string()),
            city: Some("Local".to_string()),
            region: Some("Local".to_string()),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GeoError {
    #[error("geolocation request failed: {0}")]
    Request(String),
    #[error("malformed geolocation response: {0}")]
    Response(String),
}

/// Source of IP geolocation data.
///
/// # Implementations
///
/// - [`crate::infrastructure::geoip::HttpGeoLocator`] - JSON web service
/// - [`crate::infrastructure::geoip::NullGeoLocator`] - lookups disabled
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GeoLocator: Send + Sync {
    /// Looks up an address. `Ok(None)` means the source has no data for it.
    async fn lookup(&self, ip: IpAddr) -> Result<Option<GeoLocation>, GeoError>;

    /// Short name for logs.
    fn name(&self) -> &'static str;
}

/// True for addresses that never leave the local network.
///
/// Matches loopback, `10.0.0.0/8`, the whole `172.0.0.0/8` block and
/// `192.168.0.0/16`, plus the literal `localhost`.
pub fn is_local_ip(ip: &str) -> bool {
    let ip = ip.trim();
    ip.eq_ignore_ascii_case("localhost")
        || ip == "::1"
        || ip.starts_with("127.")
        || ip.starts_with("10.")
        || ip.starts_with("172.")
        || ip.starts_with("192.168.")
}

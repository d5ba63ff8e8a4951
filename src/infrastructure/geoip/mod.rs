//! Geolocation sources for click enrichment.
//!
//! Provides two [`GeoLocator`](crate::enrichment::GeoLocator) implementations:
//! - [`HttpGeoLocator`] - JSON web service such as ip-api.com
//! - [`NullGeoLocator`] - No-op implementation when no service is configured

mod http_locator;
mod null_locator;

pub use http_locator::HttpGeoLocator;
pub use null_locator::NullGeoLocator;

//! Geolocation through an HTTP JSON service.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::net::IpAddr;
use std::time::Duration;
use tracing::{info, trace};

use crate::enrichment::{GeoError, GeoLocation, GeoLocator};

/// Response shape of ip-api.com. The snake_case aliases accept services that
/// report `country_code`, `country_name` and `region` instead.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeoResponse {
    status: Option<String>,
    message: Option<String>,
    #[serde(alias = "country_code")]
    country_code: Option<String>,
    #[serde(alias = "country_name")]
    country: Option<String>,
    city: Option<String>,
    #[serde(alias = "region")]
    region_name: Option<String>,
}

impl GeoResponse {
    fn into_location(self) -> Result<Option<GeoLocation>, GeoError> {
        if self.status.as_deref() == Some("fail") {
            // ip-api answers "fail" for reserved ranges and unknown addresses.
            trace!(message = ?self.message, "Geolocation service has no data");
            return Ok(None);
        }

        let country = match self.country_code {
            Some(code) if code.len() == 2 => Some(code.to_ascii_uppercase()),
            Some(code) => {
                return Err(GeoError::Response(format!("invalid country code {code:?}")));
            }
            None => None,
        };

        let location = GeoLocation {
            country,
            country_name: non_empty(self.country),
            city: non_empty(self.city),
            region: non_empty(self.region_name),
        };

        if location == GeoLocation::default() {
            Ok(None)
        } else {
            Ok(Some(location))
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Queries a JSON geolocation endpoint.
///
/// The URL template must contain `{ip}`, for example
/// `http://ip-api.com/json/{ip}?fields=status,message,countryCode,country,city,regionName`.
pub struct HttpGeoLocator {
    client: Client,
    url_template: String,
}

impl HttpGeoLocator {
    /// Builds the locator with its own HTTP client.
    ///
    /// The client timeout mirrors the enrichment timeout so abandoned
    /// requests do not linger in the connection pool.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError::Request`] if the HTTP client cannot be built.
    pub fn new(url_template: impl Into<String>, timeout: Duration) -> Result<Self, GeoError> {
        let client = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| GeoError::Request(e.to_string()))?;

        let url_template = url_template.into();
        info!(url = %url_template, "Geolocation enabled (HTTP)");

        Ok(Self {
            client,
            url_template,
        })
    }

    fn url_for(&self, ip: IpAddr) -> String {
        self.url_template.replace("{ip}", &ip.to_string())
    }
}

#[async_trait]
impl GeoLocator for HttpGeoLocator {
    async fn lookup(&self, ip: IpAddr) -> Result<Option<GeoLocation>, GeoError> {
        let response = self
            .client
            .get(self.url_for(ip))
            .send()
            .await
            .map_err(|e| GeoError::Request(e.to_string()))?
            .error_for_status()
            .map_err(|e| GeoError::Request(e.to_string()))?;

        let body: GeoResponse = response
            .json()
            .await
            .map_err(|e| GeoError::Response(e.to_string()))?;

        body.into_location()
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    fn parse(json: &str) -> Result<Option<GeoLocation>, GeoError> {
        serde_json::from_str::<GeoResponse>(json)
            .expect("valid json")
            .into_location()
    }

    #[test]
    fn test_ip_api_success() {
        let location = parse(
            r#"{"status":"success","countryCode":"DE","country":"Germany","city":"Berlin","regionName":"Land Berlin"}"#,
        )
        .unwrap()
        .unwrap();

        assert_eq!(location.country.as_deref(), Some("DE"));
        assert_eq!(location.country_name.as_deref(), Some("Germany"));
        assert_eq!(location.city.as_deref(), Some("Berlin"));
        assert_eq!(location.region.as_deref(), Some("Land Berlin"));
    }

    #[test]
    fn test_ip_api_fail_status() {
        let location =
            parse(r#"{"status":"fail","message":"reserved range"}"#).unwrap();
        assert_eq!(location, None);
    }

    #[test]
    fn test_snake_case_payload() {
        let location = parse(
            r#"{"country_code":"fr","country_name":"France","city":"Paris","region":"Ile-de-France"}"#,
        )
        .unwrap()
        .unwrap();

        assert_eq!(location.country.as_deref(), Some("FR"));
        assert_eq!(location.country_name.as_deref(), Some("France"));
        assert_eq!(location.region.as_deref(), Some("Ile-de-France"));
    }

    #[test]
    fn test_malformed_country_code() {
        let result = parse(r#"{"countryCode":"Germany"}"#);
        assert!(matches!(result, Err(GeoError::Response(_))));
    }

    #[test]
    fn test_empty_payload_has_no_data() {
        assert_eq!(parse("{}").unwrap(), None);
    }

    #[test]
    fn test_url_template() {
        let locator = HttpGeoLocator::new(
            "http://ip-api.com/json/{ip}?fields=status",
            Duration::from_secs(2),
        )
        .unwrap();

        assert_eq!(
            locator.url_for(IpAddr::V4(Ipv4Addr::new(8, 8, 4, 4))),
            "http://ip-api.com/json/8.8.4.4?fields=status"
        );
    }
}

//! Click entity representing a single accepted redirect.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Device class derived from the user agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceType {
    Mobile,
    Tablet,
    #[default]
    Desktop,
}

impl DeviceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mobile => "mobile",
            Self::Tablet => "tablet",
            Self::Desktop => "desktop",
        }
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeviceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mobile" => Ok(Self::Mobile),
            "tablet" => Ok(Self::Tablet),
            "desktop" => Ok(Self::Desktop),
            other => Err(format!("unknown device type: {other}")),
        }
    }
}

/// A click recorded when a short link redirect was accepted.
///
/// Immutable once stored. Geographic and browser fields are best-effort and
/// may all be `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct Click {
    pub id: i64,
    pub link_id: i64,
    pub clicked_at: DateTime<Utc>,
    pub ip_address: Option<String>,
    pub country: Option<String>,
    pub country_name: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
    pub device_type: DeviceType,
    pub browser: Option<String>,
    pub browser_version: Option<String>,
    pub platform: Option<String>,
    pub referrer: Option<String>,
    pub referrer_domain: Option<String>,
    pub is_qr_code: bool,
    pub user_agent: Option<String>,
}

impl Click {
    /// Human-readable traffic source (`Direct`, `Google`, a bare domain, ...).
    pub fn referrer_source(&self) -> String {
        crate::enrichment::referrer::source_label(
            self.referrer.as_deref(),
            self.referrer_domain.as_deref(),
        )
    }
}

/// Input data for recording a new click.
///
/// `link_id` must reference an existing link.
#[derive(Debug, Clone, PartialEq)]
pub struct NewClick {
    pub link_id: i64,
    pub clicked_at: DateTime<Utc>,
    pub ip_address: Option<String>,
    pub country: Option<String>,
    pub country_name: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
    pub device_type: DeviceType,
    pub browser: Option<String>,
    pub browser_version: Option<String>,
    pub platform: Option<String>,
    pub referrer: Option<String>,
    pub referrer_domain: Option<String>,
    pub is_qr_code: bool,
    pub user_agent: Option<String>,
}

impl NewClick {
    /// Cuts enriched strings down to the widths of their `clicks` columns.
    ///
    /// Widths count characters, so cuts always land on a char boundary.
    pub fn fit_to_columns(mut self) -> Self {
        truncate(&mut self.ip_address, 45);
        truncate(&mut self.country, 2);
        truncate(&mut self.country_name, 100);
        truncate(&mut self.city, 100);
        truncate(&mut self.region, 100);
        truncate(&mut self.browser, 100);
        truncate(&mut self.browser_version, 50);
        truncate(&mut self.platform, 100);
        truncate(&mut self.referrer_domain, 255);
        self
    }

    /// Materializes the stored click once the store assigned its id.
    pub fn into_click(self, id: i64) -> Click {
        Click {
            id,
            link_id: self.link_id,
            clicked_at: self.clicked_at,
            ip_address: self.ip_address,
            country: self.country,
            country_name: self.country_name,
            city: self.city,
            region: self.region,
            device_type: self.device_type,
            browser: self.browser,
            browser_version: self.browser_version,
            platform: self.platform,
            referrer: self.referrer,
            referrer_domain: self.referrer_domain,
            is_qr_code: self.is_qr_code,
            user_agent: self.user_agent,
        }
    }
}

fn truncate(value: &mut Option<String>, max_chars: usize) {
    let cut = value
        .as_deref()
        .and_then(|s| s.char_indices().nth(max_chars))
        .map(|(at, _)| at);
    if let (Some(s), Some(cut)) = (value.as_mut(), cut) {
        s.truncate(cut);
    }
}

//! Snapshot of the inbound request needed for click enrichment.

use axum::http::{HeaderMap, HeaderName, header};
use std::net::IpAddr;

/// Header set by QR-scanning clients to flag the visit as a scan.
pub const QR_SCAN_HEADER: HeaderName = HeaderName::from_static("x-qr-scan");

/// Query parameter appended to URLs encoded into QR images.
pub const QR_QUERY_PARAM: &str = "qr";

/// The parts of a redirect request that analytics care about.
///
/// Captured by the HTTP handler and moved to the click worker, so enrichment
/// can run after the response has been sent.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    /// All request headers (forwarding headers, `User-Agent`, `Referer`, ...).
    pub headers: HeaderMap,
    /// Address of the TCP peer.
    pub peer_ip: Option<IpAddr>,
    /// True when the query string carried the QR marker parameter.
    pub qr_param: bool,
}

impl RequestContext {
    pub fn new(headers: HeaderMap, peer_ip: Option<IpAddr>, qr_param: bool) -> Self {
        Self {
            headers,
            peer_ip,
            qr_param,
        }
    }

    /// Returns the header value as a string, ignoring empty or non-UTF-8 values.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }

    pub fn user_agent(&self) -> Option<&str> {
        self.header(header::USER_AGENT.as_str())
    }

    pub fn referer(&self) -> Option<&str> {
        self.header(header::REFERER.as_str())
    }

    /// True when the visit originates from a scanned QR code.
    pub fn is_qr_scan(&self) -> bool {
        self.qr_param || self.header(QR_SCAN_HEADER.as_str()).is_some()
    }
}

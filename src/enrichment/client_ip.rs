//! Proxy-aware client IP resolution.

use std::net::{IpAddr, SocketAddr};

use crate::domain::request_context::RequestContext;

/// Resolves the visitor address.
///
/// Headers are tried in the given order; the first one with a non-empty value
/// wins and its first comma-separated entry is used. Without any forwarding
/// header the TCP peer address is used.
///
/// The winning entry must parse as an IP address, optionally with a port or
/// in brackets (`[2001:db8::1]:443`). Anything else yields `None` rather than
/// storing whatever a proxy put there.
pub fn resolve_client_ip(ctx: &RequestContext, headers: &[String]) -> Option<IpAddr> {
    let forwarded = headers
        .iter()
        .filter_map(|name| ctx.header(name))
        .find_map(|value| {
            value
                .split(',')
                .next()
                .map(str::trim)
                .filter(|first| !first.is_empty())
        });

    match forwarded {
        Some(entry) => parse_entry(entry),
        None => ctx.peer_ip,
    }
}

fn parse_entry(entry: &str) -> Option<IpAddr> {
    if let Ok(ip) = entry.parse::<IpAddr>() {
        return Some(ip);
    }
    if let Ok(addr) = entry.parse::<SocketAddr>() {
        return Some(addr.ip());
    }
    entry
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .and_then(|inner| inner.parse().ok())
}

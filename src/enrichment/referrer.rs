//! Referrer host extraction and traffic source labels.

use url::Url;

/// Hosts folded into a named source. Matched by substring, except the
/// entries in [`EXACT_HOSTS`] which are too short to match safely that way.
const SOURCE_KEYWORDS: &[(&str, &str)] = &[
    ("google", "Google"),
    ("bing", "Bing"),
    ("duckduckgo", "DuckDuckGo"),
    ("yahoo", "Yahoo"),
    ("facebook", "Facebook"),
    ("instagram", "Instagram"),
    ("twitter", "Twitter/X"),
    ("linkedin", "LinkedIn"),
    ("reddit", "Reddit"),
    ("youtube", "YouTube"),
    ("whatsapp", "WhatsApp"),
    ("telegram", "Telegram"),
];

/// Matched as the whole host or a dot-separated suffix of it.
const EXACT_HOSTS: &[(&str, &str)] = &[
    ("x.com", "Twitter/X"),
    ("t.co", "Twitter/X"),
    ("fb.com", "Facebook"),
    ("youtu.be", "YouTube"),
    ("t.me", "Telegram"),
];

/// Returns the lowercase host of a referring URL, if it has one.
pub fn extract_domain(referrer: &str) -> Option<String> {
    let url = Url::parse(referrer.trim()).ok()?;
    url.host_str()
        .filter(|h| !h.is_empty())
        .map(|h| h.to_ascii_lowercase())
}

/// Classifies a referrer into a display label.
///
/// - no referrer: `Direct`
/// - well-known host: its label (`Google`, `Twitter/X`, ...)
/// - other host: the host itself
/// - no host could be derived: `Unknown`
pub fn source_label(referrer: Option<&str>, referrer_domain: Option<&str>) -> String {
    let Some(referrer) = referrer.filter(|r| !r.trim().is_empty()) else {
        return "Direct".to_string();
    };

    let domain = match referrer_domain {
        Some(d) => Some(d.to_ascii_lowercase()),
        None => extract_domain(referrer),
    };

    match domain {
        Some(domain) => domain_label(&domain).unwrap_or(domain),
        None => "Unknown".to_string(),
    }
}

/// Label for a known host, or `None` for anything unrecognized.
pub fn domain_label(domain: &str) -> Option<String> {
    let host = domain.strip_prefix("www.").unwrap_or(domain);

    if let Some((_, label)) = EXACT_HOSTS
        .iter()
        .find(|(h, _)| host == *h || host.ends_with(&format!(".{h}")))
    {
        return Some(label.to_string());
    }

    SOURCE_KEYWORDS
        .iter()
        .find(|(keyword, _)| host.contains(keyword))
        .map(|(_, label)| label.to_string())
}

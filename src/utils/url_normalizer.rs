//! Destination URL validation.

use url::Url;

/// Longest destination URL accepted for a link.
pub const MAX_URL_LENGTH: usize = 2048;

/// Errors returned when a destination URL is rejected.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum UrlValidationError {
    #[error("URL must not be empty")]
    Empty,

    #[error("URL must be at most {MAX_URL_LENGTH} characters")]
    TooLong,

    #[error("URL must not contain control characters")]
    ControlCharacter,

    #[error("Invalid URL format: {0}")]
    InvalidFormat(String),

    #[error("Only HTTP and HTTPS protocols are allowed")]
    UnsupportedProtocol,

    #[error("URL must include a host")]
    MissingHost,
}

/// Checks a destination URL and returns it trimmed.
///
/// The URL is stored as the user wrote it; parsing only decides whether it
/// is acceptable. Rejects anything other than absolute `http`/`https` URLs
/// with a host, which also keeps `javascript:` and `data:` targets out.
///
/// Control characters are rejected up front. The parser would silently drop
/// tabs and newlines, but the stored text ends up in a `Location` header
/// where they are not allowed.
///
/// # Errors
///
/// Returns the first [`UrlValidationError`] that applies.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(
///     validate_destination_url("  https://example.com/a?b=c ").unwrap(),
///     "https://example.com/a?b=c"
/// );
/// assert!(validate_destination_url("ftp://example.com").is_err());
/// ```
pub fn validate_destination_url(input: &str) -> Result<String, UrlValidationError> {
    let input = input.trim();

    if input.is_empty() {
        return Err(UrlValidationError::Empty);
    }

    if input.chars().count() > MAX_URL_LENGTH {
        return Err(UrlValidationError::TooLong);
    }

    if input.chars().any(char::is_control) {
        return Err(UrlValidationError::ControlCharacter);
    }

    let url = Url::parse(input).map_err(|e| UrlValidationError::InvalidFormat(e.to_string()))?;

    match url.scheme() {
        "http" | "https" => {}
        _ => return Err(UrlValidationError::UnsupportedProtocol),
    }

    if url.host_str().is_none_or(str::is_empty) {
        return Err(UrlValidationError::MissingHost);
    }

    Ok(input.to_string())
}

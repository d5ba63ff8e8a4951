//! User-agent classification.

use woothee::parser::Parser;

use crate::domain::entities::DeviceType;

/// Parsed view of a user-agent string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedUserAgent {
    pub is_mobile: bool,
    pub is_tablet: bool,
    pub browser: Option<String>,
    pub browser_version: Option<String>,
    pub platform: Option<String>,
}

impl ParsedUserAgent {
    /// Tablet wins over mobile; anything else counts as desktop.
    pub fn device_type(&self) -> DeviceType {
        if self.is_tablet {
            DeviceType::Tablet
        } else if self.is_mobile {
            DeviceType::Mobile
        } else {
            DeviceType::Desktop
        }
    }
}

#[cfg_attr(test, mockall::automock)]
pub trait UserAgentParser: Send + Sync {
    fn parse(&self, user_agent: &str) -> ParsedUserAgent;
}

/// Substrings that mark a tablet even when the parser reports a smartphone.
const TABLET_MARKERS: &[&str] = &["ipad", "tablet", "kindle", "silk/", "playbook"];

/// [`UserAgentParser`] backed by the `woothee` rule set.
pub struct WootheeParser {
    parser: Parser,
}

impl WootheeParser {
    pub fn new() -> Self {
        Self {
            parser: Parser::new(),
        }
    }
}

impl Default for WootheeParser {
    fn default() -> Self {
        Self::new()
    }
}

fn known(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() || value.eq_ignore_ascii_case("UNKNOWN") {
        None
    } else {
        Some(value.to_string())
    }
}

impl UserAgentParser for WootheeParser {
    fn parse(&self, user_agent: &str) -> ParsedUserAgent {
        let Some(result) = self.parser.parse(user_agent) else {
            return ParsedUserAgent::default();
        };

        let lower = user_agent.to_ascii_lowercase();
        // Android tablets ship without the "Mobile" token.
        let android_tablet = lower.contains("android") && !lower.contains("mobile");
        let is_tablet = android_tablet || TABLET_MARKERS.iter().any(|m| lower.contains(m));
        let is_mobile =
            !is_tablet && matches!(result.category, "smartphone" | "mobilephone");

        ParsedUserAgent {
            is_mobile,
            is_tablet,
            browser: known(result.name),
            browser_version: known(result.version),
            platform: known(result.os),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHROME_WINDOWS: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
    const SAFARI_IPHONE: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Mobile/15E148 Safari/604.1";
    const SAFARI_IPAD: &str = "Mozilla/5.0 (iPad; CPU OS 17_0 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Mobile/15E148 Safari/604.1";
    const ANDROID_TABLET: &str = "Mozilla/5.0 (Linux; Android 13; SM-X700) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
    const ANDROID_PHONE: &str = "Mozilla/5.0 (Linux; Android 13; Pixel 7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Mobile Safari/537.36";

    #[test]
    fn test_desktop_chrome() {
        let parsed = WootheeParser::new().parse(CHROME_WINDOWS);
        assert_eq!(parsed.device_type(), DeviceType::Desktop);
        assert_eq!(parsed.browser.as_deref(), Some("Chrome"));
        assert_eq!(parsed.browser_version.as_deref(), Some("120.0.0.0"));
        assert!(parsed.platform.is_some());
    }

    #[test]
    fn test_iphone_is_mobile() {
        let parsed = WootheeParser::new().parse(SAFARI_IPHONE);
        assert_eq!(parsed.device_type(), DeviceType::Mobile);
        assert_eq!(parsed.platform.as_deref(), Some("iPhone"));
    }

    #[test]
    fn test_ipad_is_tablet() {
        let parsed = WootheeParser::new().parse(SAFARI_IPAD);
        assert!(parsed.is_tablet);
        assert_eq!(parsed.device_type(), DeviceType::Tablet);
    }

    #[test]
    fn test_android_without_mobile_token_is_tablet() {
        let parser = WootheeParser::new();
        assert_eq!(parser.parse(ANDROID_TABLET).device_type(), DeviceType::Tablet);
        assert_eq!(parser.parse(ANDROID_PHONE).device_type(), DeviceType::Mobile);
    }

    #[test]
    fn test_unknown_user_agent() {
        let parsed = WootheeParser::new().parse("");
        assert_eq!(parsed.device_type(), DeviceType::Desktop);
        assert_eq!(parsed.browser, None);
        assert_eq!(parsed.browser_version, None);
        assert_eq!(parsed.platform, None);
    }

    #[test]
    fn test_tablet_precedes_mobile() {
        let both = ParsedUserAgent {
            is_mobile: true,
            is_tablet: true,
            ..Default::default()
        };
        assert_eq!(both.device_type(), DeviceType::Tablet);
    }
}

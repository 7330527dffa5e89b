//! Query validation.
//!
//! The validated string is exactly what later goes on the WHOIS wire, so the
//! control-character check here is the sole defense against request-line
//! injection. Validation is pure; nothing here touches the network.

use std::net::IpAddr;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::{Result, WhoisRelayError};

/// Classification of an accepted query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    Ipv4,
    Ipv6,
    Domain,
}

impl QueryKind {
    pub fn is_ip(&self) -> bool {
        matches!(self, QueryKind::Ipv4 | QueryKind::Ipv6)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            QueryKind::Ipv4 => "ipv4",
            QueryKind::Ipv6 => "ipv6",
            QueryKind::Domain => "domain",
        }
    }
}

// Labels are 1-63 characters of letters/digits/hyphens with no leading or
// trailing hyphen; the final label (the TLD) is 2-63 alphabetic characters.
static DOMAIN_SHAPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^([a-z0-9]([a-z0-9-]{0,61}[a-z0-9])?\.)+[a-z]{2,63}$")
        .unwrap()
});

/// Check a raw query and classify it, with a reason on rejection.
///
/// Surrounding whitespace is trimmed first (so a trailing newline from a form
/// post is tolerated); embedded control characters are rejected outright.
pub fn check_query(raw: &str) -> Result<QueryKind> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(WhoisRelayError::invalid_query(raw, "empty query"));
    }
    if trimmed.chars().any(|c| c <= '\u{1f}') {
        return Err(WhoisRelayError::invalid_query(
            trimmed,
            "control character in query",
        ));
    }
    if let Ok(ip) = trimmed.parse::<IpAddr>() {
        return Ok(match ip {
            IpAddr::V4(_) => QueryKind::Ipv4,
            IpAddr::V6(_) => QueryKind::Ipv6,
        });
    }
    if DOMAIN_SHAPE.is_match(trimmed) {
        return Ok(QueryKind::Domain);
    }
    Err(WhoisRelayError::invalid_query(
        trimmed,
        "neither an IP address nor a domain name",
    ))
}

/// Pure predicate form of [`check_query`].
pub fn validate(raw: &str) -> bool {
    check_query(raw).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_ipv4_literals() {
        assert_eq!(check_query("1.2.3.4").unwrap(), QueryKind::Ipv4);
        assert_eq!(check_query("192.0.2.255").unwrap(), QueryKind::Ipv4);
        assert!(validate("  8.8.8.8  "));
    }

    #[test]
    fn accepts_ipv6_literals() {
        assert_eq!(check_query("2001:db8::1").unwrap(), QueryKind::Ipv6);
        assert_eq!(check_query("::1").unwrap(), QueryKind::Ipv6);
    }

    #[test]
    fn accepts_domain_shapes() {
        assert_eq!(check_query("example.com").unwrap(), QueryKind::Domain);
        assert_eq!(check_query("sub.example.co.uk").unwrap(), QueryKind::Domain);
        assert_eq!(check_query("xn--c1yn36f.example").unwrap(), QueryKind::Domain);
        assert_eq!(check_query("a-1.b-2.org").unwrap(), QueryKind::Domain);
        // Case is accepted as-is; lowercasing is the resolver's concern.
        assert!(validate("Example.COM"));
    }

    #[test]
    fn rejects_empty_and_whitespace() {
        assert!(!validate(""));
        assert!(!validate("   "));
        assert!(!validate("\t\n"));
    }

    #[test]
    fn rejects_embedded_control_characters() {
        assert!(!validate("exa\nmple.com"));
        assert!(!validate("exa\rmple.com"));
        assert!(!validate("example.com\r\nX-Injected: 1"));
        assert!(!validate("foo\u{01}bar.com"));
    }

    #[test]
    fn surrounding_newline_is_trimmed() {
        assert!(validate("example.com\n"));
        assert!(validate("\r\nexample.com"));
    }

    #[test]
    fn rejects_malformed_domains() {
        assert!(!validate("-bad.com"));
        assert!(!validate("bad-.com"));
        assert!(!validate("bad..com"));
        assert!(!validate("exam ple.com"));
        assert!(!validate("example.c"));
        assert!(!validate("example.123"));
        assert!(!validate("justoneword"));
        assert!(!validate("http://example.com"));
        assert!(!validate("example.com/path"));
    }

    #[test]
    fn label_length_boundaries() {
        let label63 = "a".repeat(63);
        let label64 = "a".repeat(64);
        assert!(validate(&format!("{label63}.com")));
        assert!(!validate(&format!("{label64}.com")));
        // TLD boundary: 2 alphabetic minimum, 63 maximum.
        assert!(validate(&format!("example.{label63}")));
        assert!(!validate(&format!("example.{label64}")));
    }

    #[test]
    fn rejection_reasons_are_reported() {
        let err = check_query("exa\nmple.com").unwrap_err();
        assert!(err.to_string().contains("control character"));
        let err = check_query("").unwrap_err();
        assert!(err.to_string().contains("empty"));
    }
}

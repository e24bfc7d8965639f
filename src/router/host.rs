//! Host patterns for virtual-host routers.
//!
//! A pattern is a dotted host name matched label by label from the right:
//!
//! - `example.com` matches exactly that host (case-insensitive)
//! - `.example.com` requires at least one more label in front
//!   (`api.example.com`, `a.b.example.com`, but not `example.com`)
//! - labels containing any of `? | ( ) * [ ]` are anchored regular
//!   expressions with `*` standing for `.*` (`api-*.example.com`)
//!
//! Matching consumes the labels the pattern covers and hands back whatever is
//! left on the left, so nested routers see only the subdomain part.

use regex::Regex;

use crate::error::RouteError;

const WILDCARD_CHARS: &[char] = &['?', '|', '(', ')', '*', '[', ']'];

#[derive(Debug, Clone)]
enum HostLabel {
    Exact(String),
    Wildcard(Regex),
}

impl HostLabel {
    fn matches(&self, label: &str) -> bool {
        match self {
            HostLabel::Exact(text) => text.eq_ignore_ascii_case(label),
            HostLabel::Wildcard(regex) => regex.is_match(label),
        }
    }
}

/// Compiled host pattern
#[derive(Debug, Clone)]
pub struct HostPattern {
    source: String,
    labels: Vec<HostLabel>,
    any_subdomain: bool,
}

impl HostPattern {
    /// Compile `pattern`.
    ///
    /// Empty patterns, empty labels (`a..b`) and wildcard labels that do not
    /// compile are rejected with [`RouteError::InvalidHost`].
    pub fn parse(pattern: &str) -> Result<Self, RouteError> {
        let invalid = |reason: &str| RouteError::InvalidHost {
            host: pattern.to_string(),
            reason: reason.to_string(),
        };

        let trimmed = pattern.trim().trim_end_matches('.').to_ascii_lowercase();
        let (any_subdomain, body) = match trimmed.strip_prefix('.') {
            Some(rest) => (true, rest),
            None => (false, trimmed.as_str()),
        };
        if body.is_empty() {
            return Err(invalid("empty host"));
        }

        let mut labels = Vec::new();
        for label in body.split('.') {
            if label.is_empty() {
                return Err(invalid("empty label"));
            }
            if label.contains(WILDCARD_CHARS) {
                let source = format!("^(?:{})$", label.replace('*', ".*"));
                let regex = Regex::new(&source).map_err(|e| invalid(&e.to_string()))?;
                labels.push(HostLabel::Wildcard(regex));
            } else {
                labels.push(HostLabel::Exact(label.to_string()));
            }
        }

        Ok(Self {
            source: pattern.trim().to_string(),
            labels,
            any_subdomain,
        })
    }

    /// The pattern as written
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// True for leading-dot patterns
    #[must_use]
    pub fn any_subdomain(&self) -> bool {
        self.any_subdomain
    }

    /// Match the right end of `host` and return the unconsumed left part.
    ///
    /// `api.example.com` against `example.com` leaves `api`; an exact match
    /// leaves `""`. Leading-dot patterns only match when something is left.
    #[must_use]
    pub fn strip<'h>(&self, host: &'h str) -> Option<&'h str> {
        let host = host.trim_end_matches('.');
        if host.is_empty() {
            return None;
        }

        let mut rest = host;
        for label in self.labels.iter().rev() {
            let (left, last) = match rest.rfind('.') {
                Some(dot) => (&rest[..dot], &rest[dot + 1..]),
                None => ("", rest),
            };
            if last.is_empty() || !label.matches(last) {
                return None;
            }
            rest = left;
        }

        if self.any_subdomain && rest.is_empty() {
            return None;
        }
        Some(rest)
    }

    /// True when `host` is exactly covered (or, for leading-dot patterns,
    /// covered with at least one extra label).
    #[must_use]
    pub fn matches(&self, host: &str) -> bool {
        match self.strip(host) {
            Some(rest) => rest.is_empty() || self.any_subdomain,
            None => false,
        }
    }
}

/// Lower-case `host` and drop any `:port` suffix (IPv6 brackets kept).
#[must_use]
pub fn normalize_host(host: &str) -> String {
    let host = host.trim();
    let without_port = if let Some(end) = host.strip_prefix('[').and_then(|h| h.find(']')) {
        &host[..end + 2]
    } else {
        match host.rfind(':') {
            Some(colon) if host[colon + 1..].bytes().all(|b| b.is_ascii_digit()) => &host[..colon],
            _ => host,
        }
    };
    without_port.trim_end_matches('.').to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_host() {
        let p = HostPattern::parse("Example.com").unwrap();
        assert!(p.matches("example.com"));
        assert!(p.matches("EXAMPLE.COM"));
        assert!(!p.matches("api.example.com"));
        assert!(!p.matches("example.org"));
        assert_eq!(p.strip("api.example.com"), Some("api"));
        assert_eq!(p.strip("example.com"), Some(""));
    }

    #[test]
    fn test_leading_dot_needs_a_subdomain() {
        let p = HostPattern::parse(".example.com").unwrap();
        assert!(p.matches("api.example.com"));
        assert!(p.matches("a.b.example.com"));
        assert!(!p.matches("example.com"));
        assert!(!p.matches("notexample.com"));
        assert!(!p.matches("xexample.com"));
        assert_eq!(p.strip("a.b.example.com"), Some("a.b"));
    }

    #[test]
    fn test_wildcard_labels() {
        let p = HostPattern::parse("api-*.example.com").unwrap();
        assert!(p.matches("api-eu.example.com"));
        assert!(!p.matches("web-eu.example.com"));

        let p = HostPattern::parse("(eu|us).example.com").unwrap();
        assert!(p.matches("eu.example.com"));
        assert!(!p.matches("asia.example.com"));

        let p = HostPattern::parse("*.example.com").unwrap();
        assert!(p.matches("x.example.com"));
        assert!(!p.matches("example.com"));
    }

    #[test]
    fn test_invalid_patterns() {
        assert!(matches!(
            HostPattern::parse(""),
            Err(RouteError::InvalidHost { .. })
        ));
        assert!(HostPattern::parse(".").is_err());
        assert!(HostPattern::parse("a..b").is_err());
        assert!(HostPattern::parse("[.example.com").is_err());
    }

    #[test]
    fn test_normalize_host() {
        assert_eq!(normalize_host("API.Example.com:8080"), "api.example.com");
        assert_eq!(normalize_host("example.com."), "example.com");
        assert_eq!(normalize_host("[::1]:8080"), "[::1]");
        assert_eq!(normalize_host("localhost"), "localhost");
    }
}

//! Request matchers that scope a router to part of the request space.
//!
//! Matchers run in registration order. Each one either rejects the request or
//! accepts it and narrows the shared [`MatchState`] so that nested routers only
//! see what is left: the host matcher consumes labels from the right of the
//! host, the path-prefix matcher consumes leading path segments.

use std::fmt::Debug;

use super::host::HostPattern;
use super::segment::split_path;
use crate::request::RouteRequest;

/// Name of the built-in host matcher
pub const HOST_MATCHER: &str = "host";
/// Name of the built-in path-prefix matcher
pub const PATH_PREFIX_MATCHER: &str = "pathprefix";

/// What is left of the request after the matchers of a router chain ran
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchState {
    /// Path still to be matched by children or the trie
    pub path_to_match: String,
    /// Host labels not consumed yet; `None` until a host matcher runs
    pub host_to_match: Option<String>,
    /// The last host pattern applied was a leading-dot pattern
    pub host_open: bool,
}

impl MatchState {
    #[must_use]
    pub fn new(request: &RouteRequest) -> Self {
        Self {
            path_to_match: request.path().to_string(),
            host_to_match: None,
            host_open: false,
        }
    }

    /// Whether the host is settled enough for a router's own routes.
    ///
    /// True when no host matcher ran, when every label was consumed, or when
    /// the last host pattern accepts any subdomain.
    #[must_use]
    pub fn host_settled(&self) -> bool {
        match &self.host_to_match {
            None => true,
            Some(rest) => rest.is_empty() || self.host_open,
        }
    }

    /// Unconsumed host labels, empty when none
    #[must_use]
    pub fn subdomain(&self) -> &str {
        self.host_to_match.as_deref().unwrap_or("")
    }
}

/// A predicate that decides whether a router applies to a request
pub trait Matcher: Send + Sync + Debug {
    fn name(&self) -> &str;

    /// Accept and narrow `state`, or return `false` to reject.
    ///
    /// Implementations must leave `state` alone when they reject.
    fn apply(&self, request: &RouteRequest, state: &mut MatchState) -> bool;
}

/// Matches the request host against a [`HostPattern`]
#[derive(Debug, Clone)]
pub struct HostMatcher {
    pattern: HostPattern,
}

impl HostMatcher {
    #[must_use]
    pub fn new(pattern: HostPattern) -> Self {
        Self { pattern }
    }

    #[must_use]
    pub fn pattern(&self) -> &HostPattern {
        &self.pattern
    }
}

impl Matcher for HostMatcher {
    fn name(&self) -> &str {
        HOST_MATCHER
    }

    fn apply(&self, request: &RouteRequest, state: &mut MatchState) -> bool {
        let current = state.host_to_match.as_deref().unwrap_or(request.host());
        match self.pattern.strip(current) {
            Some(rest) => {
                state.host_to_match = Some(rest.to_string());
                state.host_open = self.pattern.any_subdomain();
                true
            }
            None => false,
        }
    }
}

/// Matches a segment-aligned literal path prefix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPrefixMatcher {
    prefix: String,
    segments: Vec<String>,
}

impl PathPrefixMatcher {
    /// `prefix` is normalised: repeated and trailing slashes are ignored, so
    /// `/api/`, `api` and `/api` are the same prefix.
    #[must_use]
    pub fn new(prefix: &str) -> Self {
        let (segments, _) = split_path(prefix);
        let segments: Vec<String> = segments.into_iter().map(str::to_string).collect();
        Self {
            prefix: format!("/{}", segments.join("/")),
            segments,
        }
    }

    /// Normalised prefix, always starting with `/` and never ending with one
    /// (except for the empty prefix `/`)
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Strip the prefix from `path`, returning the remainder.
    ///
    /// `/api/users/` minus `/api` is `/users/`; `/api` minus `/api` is `""`
    /// and `/api/` minus `/api` is `/`, so the trie still sees the difference.
    #[must_use]
    pub fn strip(&self, path: &str) -> Option<String> {
        let (segments, trailing) = split_path(path);
        if segments.len() < self.segments.len()
            || !self.segments.iter().zip(&segments).all(|(p, s)| p == s)
        {
            return None;
        }
        let rest = &segments[self.segments.len()..];
        let mut out = String::with_capacity(path.len());
        for segment in rest {
            out.push('/');
            out.push_str(segment);
        }
        if trailing {
            out.push('/');
        }
        Some(out)
    }
}

impl Matcher for PathPrefixMatcher {
    fn name(&self) -> &str {
        PATH_PREFIX_MATCHER
    }

    fn apply(&self, _request: &RouteRequest, state: &mut MatchState) -> bool {
        match self.strip(&state.path_to_match) {
            Some(rest) => {
                state.path_to_match = rest;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Method;

    fn request(host: &str, path: &str) -> RouteRequest {
        RouteRequest::new(Method::GET, path).with_host(host)
    }

    #[test]
    fn test_host_matcher_narrows_state() {
        let matcher = HostMatcher::new(HostPattern::parse("example.com").unwrap());
        let req = request("api.example.com", "/");
        let mut state = MatchState::new(&req);
        assert!(state.host_settled());
        assert!(matcher.apply(&req, &mut state));
        assert_eq!(state.subdomain(), "api");
        assert!(!state.host_settled());

        let child = HostMatcher::new(HostPattern::parse("api").unwrap());
        assert!(child.apply(&req, &mut state));
        assert!(state.host_settled());
    }

    #[test]
    fn test_rejecting_matcher_leaves_state() {
        let matcher = HostMatcher::new(HostPattern::parse("example.org").unwrap());
        let req = request("example.com", "/x");
        let mut state = MatchState::new(&req);
        let before = state.clone();
        assert!(!matcher.apply(&req, &mut state));
        assert_eq!(state, before);

        let prefix = PathPrefixMatcher::new("/api");
        assert!(!prefix.apply(&req, &mut state));
        assert_eq!(state, before);
    }

    #[test]
    fn test_leading_dot_keeps_host_open() {
        let matcher = HostMatcher::new(HostPattern::parse(".example.com").unwrap());
        let req = request("a.b.example.com", "/");
        let mut state = MatchState::new(&req);
        assert!(matcher.apply(&req, &mut state));
        assert!(state.host_settled());
        assert_eq!(state.subdomain(), "a.b");
    }

    #[test]
    fn test_path_prefix_is_segment_aligned() {
        let prefix = PathPrefixMatcher::new("/api/");
        assert_eq!(prefix.prefix(), "/api");
        assert_eq!(prefix.strip("/api/users/5").as_deref(), Some("/users/5"));
        assert_eq!(prefix.strip("/api/users/").as_deref(), Some("/users/"));
        assert_eq!(prefix.strip("/api").as_deref(), Some(""));
        assert_eq!(prefix.strip("/api/").as_deref(), Some("/"));
        assert_eq!(prefix.strip("/apis/users"), None);
        assert_eq!(prefix.strip("/"), None);
    }
}

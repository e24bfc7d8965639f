//! Origin policy evaluation for cross-origin requests.
//!
//! A policy is described by a string-keyed header map, usually attached to an
//! endpoint or set as a router-wide default:
//!
//! ```yaml
//! Access-Control-Allow-Origin: "https://a.com, https://b.com"
//! Access-Control-Allow-Headers: "*"
//! Access-Control-Max-Age: "600"
//! ```
//!
//! `Access-Control-Allow-Origin` holds the allow-list (comma or space
//! separated, case-insensitive, `*` for any origin). The remaining
//! `Access-Control-*` entries are sent as configured, with two dynamic rules:
//!
//! - `Access-Control-Allow-Headers: *` mirrors the request's
//!   `Access-Control-Request-Headers`
//! - when the request asks with `Access-Control-Request-Method` and no
//!   `Access-Control-Allow-Methods` is configured or already set, the common
//!   methods are advertised
//!
//! Origins outside the list never receive `Access-Control-Allow-Origin`.

mod builder;
mod error;
mod route_config;

pub use builder::OriginPolicyBuilder;
pub use error::CorsConfigError;
pub use route_config::CorsPolicy;

use http::header::{
    HeaderMap, HeaderName, HeaderValue, ACCESS_CONTROL_ALLOW_CREDENTIALS,
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    ACCESS_CONTROL_REQUEST_HEADERS, ACCESS_CONTROL_REQUEST_METHOD, ORIGIN, VARY,
};
use tracing::{debug, warn};

/// Advertised when a preflight asks for a method and nothing else says which
pub const DEFAULT_ALLOW_METHODS: &str = "GET, POST, PUT, PATCH, DELETE, HEAD, OPTIONS";

/// Origin validation strategy
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OriginValidation {
    /// The list is exactly `*`: answer with a literal `*`
    Wildcard,
    /// Explicit origins (lower-cased); `any` is set when `*` appears among
    /// other entries, in which case the request origin is echoed
    Exact { origins: Vec<String>, any: bool },
}

impl OriginValidation {
    /// Parse an allow-list. Malformed entries are dropped, so a list with
    /// nothing usable allows nothing.
    #[must_use]
    pub fn parse(list: &str) -> Self {
        let entries: Vec<&str> = list
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|s| !s.is_empty())
            .collect();
        if entries == ["*"] {
            return OriginValidation::Wildcard;
        }
        let mut origins = Vec::with_capacity(entries.len());
        let mut any = false;
        for entry in entries {
            if entry == "*" {
                any = true;
            } else if entry.eq_ignore_ascii_case("null") || entry.contains("://") {
                origins.push(entry.to_ascii_lowercase());
            } else {
                warn!(origin = %entry, "CORS: ignoring malformed origin in allow-list");
            }
        }
        OriginValidation::Exact { origins, any }
    }

    /// Value for `Access-Control-Allow-Origin`, or `None` when not allowed
    fn allow<'o>(&self, origin: &'o str) -> Option<&'o str> {
        match self {
            OriginValidation::Wildcard => Some("*"),
            OriginValidation::Exact { origins, any } => {
                if *any || origins.iter().any(|o| o.eq_ignore_ascii_case(origin)) {
                    Some(origin)
                } else {
                    None
                }
            }
        }
    }

    fn allows_any(&self) -> bool {
        matches!(
            self,
            OriginValidation::Wildcard | OriginValidation::Exact { any: true, .. }
        )
    }
}

/// Per-endpoint (or per-router) CORS configuration
#[derive(Debug, Clone)]
pub struct OriginPolicy {
    origins: OriginValidation,
    allow_headers: Option<HeaderValue>,
    allow_methods: Option<HeaderValue>,
    /// Other configured `Access-Control-*` headers, sent verbatim
    extra: Vec<(HeaderName, HeaderValue)>,
}

impl OriginPolicy {
    /// Build a policy from a string-keyed header map.
    ///
    /// Keys are case-insensitive. `Access-Control-Allow-Origin` is required.
    pub fn from_headers<I, K, V>(headers: I) -> Result<Self, CorsConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut origins = None;
        let mut allow_headers = None;
        let mut allow_methods = None;
        let mut extra = Vec::new();
        let mut credentials = false;

        for (key, value) in headers {
            let (key, value) = (key.as_ref(), value.as_ref().trim());
            let invalid = || CorsConfigError::InvalidHeader {
                name: key.to_string(),
            };
            let name = HeaderName::from_bytes(key.trim().as_bytes()).map_err(|_| invalid())?;
            let header_value = HeaderValue::from_str(value).map_err(|_| invalid())?;

            if name == ACCESS_CONTROL_ALLOW_ORIGIN {
                origins = Some(OriginValidation::parse(value));
            } else if name == ACCESS_CONTROL_ALLOW_HEADERS {
                allow_headers = Some(header_value);
            } else if name == ACCESS_CONTROL_ALLOW_METHODS {
                allow_methods = Some(header_value);
            } else {
                if name == ACCESS_CONTROL_ALLOW_CREDENTIALS {
                    credentials = value.eq_ignore_ascii_case("true");
                }
                extra.push((name, header_value));
            }
        }

        let origins = origins.ok_or(CorsConfigError::MissingAllowOrigin)?;
        if credentials && origins.allows_any() {
            return Err(CorsConfigError::WildcardWithCredentials);
        }

        Ok(Self {
            origins,
            allow_headers,
            allow_methods,
            extra,
        })
    }

    /// Policy that allows every origin, answering with `*`.
    #[must_use]
    pub fn permissive() -> Self {
        Self {
            origins: OriginValidation::Wildcard,
            allow_headers: Some(HeaderValue::from_static("*")),
            allow_methods: None,
            extra: Vec::new(),
        }
    }

    #[must_use]
    pub fn origins(&self) -> &OriginValidation {
        &self.origins
    }

    /// Write CORS response headers for `request` into `response`.
    ///
    /// Returns whether the request origin was allowed. A request without an
    /// `Origin` header, or with one outside the list, leaves no
    /// `Access-Control-Allow-Origin` behind.
    pub fn apply(&self, request: &HeaderMap, response: &mut HeaderMap) -> bool {
        let Some(origin) = request.get(ORIGIN).and_then(|v| v.to_str().ok()) else {
            response.remove(ACCESS_CONTROL_ALLOW_ORIGIN);
            return false;
        };

        let allowed = match self
            .origins
            .allow(origin)
            .and_then(|v| HeaderValue::from_str(v).ok())
        {
            Some(value) => value,
            None => {
                debug!(origin = %origin, "CORS: origin not allowed");
                response.remove(ACCESS_CONTROL_ALLOW_ORIGIN);
                return false;
            }
        };

        if self.origins != OriginValidation::Wildcard {
            response.append(VARY, HeaderValue::from_static("Origin"));
        }
        response.insert(ACCESS_CONTROL_ALLOW_ORIGIN, allowed);

        for (name, value) in &self.extra {
            response.insert(name.clone(), value.clone());
        }
        if let Some(methods) = &self.allow_methods {
            response.insert(ACCESS_CONTROL_ALLOW_METHODS, methods.clone());
        }
        if let Some(headers) = &self.allow_headers {
            let mirrored = match request.get(ACCESS_CONTROL_REQUEST_HEADERS) {
                Some(requested) if headers == "*" => requested.clone(),
                _ => headers.clone(),
            };
            response.insert(ACCESS_CONTROL_ALLOW_HEADERS, mirrored);
        }
        if request.contains_key(ACCESS_CONTROL_REQUEST_METHOD)
            && !response.contains_key(ACCESS_CONTROL_ALLOW_METHODS)
        {
            response.insert(
                ACCESS_CONTROL_ALLOW_METHODS,
                HeaderValue::from_static(DEFAULT_ALLOW_METHODS),
            );
        }
        true
    }
}

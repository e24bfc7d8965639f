//! The request view the router works on.
//!
//! Routing only needs the method, the host, the path and the headers, so the
//! transport layer converts whatever it has into a [`RouteRequest`] once and the
//! router never touches bodies.

use http::header::{HeaderMap, HeaderName, HeaderValue, HOST};
use http::Method;

use crate::router::host::normalize_host;

/// Method, host, path and headers of an incoming request
#[derive(Debug, Clone)]
pub struct RouteRequest {
    method: Method,
    host: String,
    path: String,
    headers: HeaderMap,
}

impl RouteRequest {
    /// A request for `path` with no host and no headers.
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            host: String::new(),
            path: path.into(),
            headers: HeaderMap::new(),
        }
    }

    /// Set the host. The port is dropped and the name lower-cased.
    #[must_use]
    pub fn with_host(mut self, host: &str) -> Self {
        self.host = normalize_host(host);
        self
    }

    #[must_use]
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    /// Build the view from an `http::Request`.
    ///
    /// The host comes from the `Host` header, or from the URI authority for
    /// absolute-form requests.
    #[must_use]
    pub fn from_http<B>(request: &http::Request<B>) -> Self {
        let host = request
            .headers()
            .get(HOST)
            .and_then(|v| v.to_str().ok())
            .or_else(|| request.uri().authority().map(|a| a.as_str()))
            .map(normalize_host)
            .unwrap_or_default();
        Self {
            method: request.method().clone(),
            host,
            path: request.uri().path().to_string(),
            headers: request.headers().clone(),
        }
    }

    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Normalised host, empty when the request carried none
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_http_uses_host_header() {
        let req = http::Request::builder()
            .method(Method::POST)
            .uri("/users/5?x=1")
            .header(HOST, "API.example.com:8443")
            .header("origin", "https://a.com")
            .body(())
            .unwrap();
        let view = RouteRequest::from_http(&req);
        assert_eq!(view.method(), Method::POST);
        assert_eq!(view.host(), "api.example.com");
        assert_eq!(view.path(), "/users/5");
        assert_eq!(view.headers()["origin"], "https://a.com");
    }

    #[test]
    fn test_from_http_falls_back_to_authority() {
        let req = http::Request::builder()
            .uri("http://Example.com:80/a")
            .body(())
            .unwrap();
        let view = RouteRequest::from_http(&req);
        assert_eq!(view.host(), "example.com");
        assert_eq!(view.path(), "/a");
    }
}

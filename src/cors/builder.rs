use http::Method;

use super::{CorsConfigError, OriginPolicy};

/// Builder for an [`OriginPolicy`] with a fluent API
///
/// The builder produces the same header map a route table would carry and
/// hands it to [`OriginPolicy::from_headers`], so both paths validate alike.
///
/// # Example
///
/// ```rust
/// use canopy::cors::OriginPolicyBuilder;
/// use http::Method;
///
/// let policy = OriginPolicyBuilder::new()
///     .allowed_origins(&["https://example.com", "https://api.example.com"])
///     .allowed_methods(&[Method::GET, Method::POST])
///     .allowed_headers(&["Content-Type", "Authorization"])
///     .allow_credentials(true)
///     .expose_headers(&["X-Total-Count"])
///     .max_age(3600)
///     .build()
///     .expect("valid CORS policy");
/// ```
#[derive(Debug, Clone, Default)]
pub struct OriginPolicyBuilder {
    allowed_origins: Vec<String>,
    allowed_headers: Vec<String>,
    allowed_methods: Vec<Method>,
    allow_credentials: bool,
    expose_headers: Vec<String>,
    max_age: Option<u32>,
}

impl OriginPolicyBuilder {
    /// Create a builder that allows no origins.
    ///
    /// Headers and methods are left unset, so the dynamic defaults of
    /// [`OriginPolicy::apply`] take over until they are configured.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set allowed origins
    ///
    /// Use `&["*"]` to allow all origins. Cannot be combined with
    /// `allow_credentials(true)`; `build()` returns an error in that case.
    #[must_use]
    pub fn allowed_origins(mut self, origins: &[&str]) -> Self {
        self.allowed_origins = origins.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Set allowed HTTP methods
    #[must_use]
    pub fn allowed_methods(mut self, methods: &[Method]) -> Self {
        self.allowed_methods = methods.to_vec();
        self
    }

    /// Set allowed headers. `&["*"]` mirrors whatever the request asks for.
    #[must_use]
    pub fn allowed_headers(mut self, headers: &[&str]) -> Self {
        self.allowed_headers = headers.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Enable or disable credentials
    #[must_use]
    pub fn allow_credentials(mut self, allow: bool) -> Self {
        self.allow_credentials = allow;
        self
    }

    /// Set headers exposed to JavaScript
    #[must_use]
    pub fn expose_headers(mut self, headers: &[&str]) -> Self {
        self.expose_headers = headers.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Set the preflight cache duration in seconds
    #[must_use]
    pub fn max_age(mut self, seconds: u32) -> Self {
        self.max_age = Some(seconds);
        self
    }

    /// The header map this builder describes
    #[must_use]
    pub fn to_headers(&self) -> Vec<(&'static str, String)> {
        let mut headers = vec![("Access-Control-Allow-Origin", self.allowed_origins.join(", "))];
        if !self.allowed_headers.is_empty() {
            headers.push(("Access-Control-Allow-Headers", self.allowed_headers.join(", ")));
        }
        if !self.allowed_methods.is_empty() {
            let methods: Vec<&str> = self.allowed_methods.iter().map(Method::as_str).collect();
            headers.push(("Access-Control-Allow-Methods", methods.join(", ")));
        }
        if self.allow_credentials {
            headers.push(("Access-Control-Allow-Credentials", "true".to_string()));
        }
        if !self.expose_headers.is_empty() {
            headers.push(("Access-Control-Expose-Headers", self.expose_headers.join(", ")));
        }
        if let Some(age) = self.max_age {
            headers.push(("Access-Control-Max-Age", age.to_string()));
        }
        headers
    }

    /// Build the policy, validating it like a header map from configuration
    pub fn build(self) -> Result<OriginPolicy, CorsConfigError> {
        OriginPolicy::from_headers(self.to_headers())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::header::{HeaderMap, HeaderValue};

    #[test]
    fn test_builder_round_trips_through_header_map() {
        let policy = OriginPolicyBuilder::new()
            .allowed_origins(&["https://a.com"])
            .allowed_methods(&[Method::GET, Method::PUT])
            .max_age(60)
            .build()
            .unwrap();

        let mut request = HeaderMap::new();
        request.insert("origin", HeaderValue::from_static("https://a.com"));
        let mut response = HeaderMap::new();
        assert!(policy.apply(&request, &mut response));
        assert_eq!(response["access-control-allow-methods"], "GET, PUT");
        assert_eq!(response["access-control-max-age"], "60");
    }

    #[test]
    fn test_wildcard_with_credentials_rejected() {
        let err = OriginPolicyBuilder::new()
            .allowed_origins(&["*"])
            .allow_credentials(true)
            .build()
            .unwrap_err();
        assert_eq!(err, CorsConfigError::WildcardWithCredentials);
    }

    #[test]
    fn test_default_builder_denies_everything() {
        let policy = OriginPolicyBuilder::new().build().unwrap();
        let mut request = HeaderMap::new();
        request.insert("origin", HeaderValue::from_static("https://a.com"));
        let mut response = HeaderMap::new();
        assert!(!policy.apply(&request, &mut response));
    }
}

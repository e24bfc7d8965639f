use super::OriginPolicy;

/// Endpoint-level CORS policy
///
/// Determines which origin policy answers for a specific endpoint:
/// - `Inherit`: use the nearest router default (the endpoint's router, then
///   its ancestors); with no default anywhere, cross-origin requests are denied
/// - `Disabled`: never emit CORS headers for this endpoint
/// - `Custom`: use the endpoint's own policy
#[derive(Debug, Clone, Default)]
pub enum CorsPolicy {
    /// Use the router default
    #[default]
    Inherit,
    /// No CORS headers for this endpoint
    Disabled,
    /// Endpoint-specific policy
    Custom(OriginPolicy),
}

impl CorsPolicy {
    /// Build a `Custom` policy from a string-keyed header map.
    pub fn from_headers<I, K, V>(headers: I) -> Result<Self, super::CorsConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        OriginPolicy::from_headers(headers).map(CorsPolicy::Custom)
    }

    /// The policy to use given the inherited router default.
    #[must_use]
    pub fn resolve<'a>(&'a self, inherited: Option<&'a OriginPolicy>) -> Option<&'a OriginPolicy> {
        match self {
            CorsPolicy::Inherit => inherited,
            CorsPolicy::Disabled => None,
            CorsPolicy::Custom(policy) => Some(policy),
        }
    }
}

use std::fmt;

/// CORS configuration error
///
/// Returned by [`OriginPolicy::from_headers`](super::OriginPolicy::from_headers)
/// and [`OriginPolicyBuilder::build`](super::OriginPolicyBuilder::build) when the
/// header map cannot describe a safe origin policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorsConfigError {
    /// Wildcard origin (`*`) cannot be used with credentials
    ///
    /// Browsers reject `Access-Control-Allow-Origin: *` on credentialed
    /// requests, so the combination is refused up front.
    WildcardWithCredentials,
    /// The header map has no `Access-Control-Allow-Origin` entry
    MissingAllowOrigin,
    /// A header name or value cannot be sent on the wire
    InvalidHeader {
        /// The header name as given
        name: String,
    },
}

impl fmt::Display for CorsConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CorsConfigError::WildcardWithCredentials => {
                write!(
                    f,
                    "CORS configuration error: Cannot use wildcard origin (*) with credentials. \
                    When Access-Control-Allow-Credentials is true, you must list exact origins."
                )
            }
            CorsConfigError::MissingAllowOrigin => {
                write!(
                    f,
                    "CORS configuration error: Access-Control-Allow-Origin is required \
                    (use a comma or space separated origin list, or *)"
                )
            }
            CorsConfigError::InvalidHeader { name } => {
                write!(
                    f,
                    "CORS configuration error: header '{}' has an invalid name or value",
                    name
                )
            }
        }
    }
}

impl std::error::Error for CorsConfigError {}

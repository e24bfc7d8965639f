use std::fmt;

use crate::cors::CorsConfigError;

/// Route registration error
///
/// Returned when a route pattern, method list, host pattern or CORS header
/// map cannot be turned into routing state. Routes are fixed for the life of
/// the process, so callers are expected to fail startup on any of these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    /// A segment contains braces that do not form a single `{...}` token
    UnbalancedBraces {
        /// The full pattern being registered
        pattern: String,
        /// The offending segment
        segment: String,
    },
    /// A variable segment has no name (`{}`, `{:int}`, `{*}`)
    EmptyVariable {
        /// The full pattern being registered
        pattern: String,
    },
    /// A `{name:kind}` kind is neither a numeric kind nor a valid regex
    InvalidRegex {
        /// The kind text as written in the pattern
        kind: String,
        /// Message from the regex compiler
        reason: String,
    },
    /// The method cannot be stored on an endpoint (OPTIONS, TRACE, unknown verbs)
    UnsupportedMethod {
        /// The method name as given by the caller
        method: String,
    },
    /// A host pattern is empty or contains an invalid wildcard label
    InvalidHost {
        /// The host pattern as given by the caller
        host: String,
        /// What is wrong with it
        reason: String,
    },
    /// The router id does not refer to a live router in the tree
    UnknownRouter {
        /// The raw id
        id: usize,
    },
    /// The CORS header map could not be turned into an origin policy
    Cors(CorsConfigError),
}

impl fmt::Display for RouteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteError::UnbalancedBraces { pattern, segment } => write!(
                f,
                "route pattern '{}': segment '{}' has unbalanced braces",
                pattern, segment
            ),
            RouteError::EmptyVariable { pattern } => {
                write!(f, "route pattern '{}': variable segment without a name", pattern)
            }
            RouteError::InvalidRegex { kind, reason } => {
                write!(f, "invalid segment kind '{}': {}", kind, reason)
            }
            RouteError::UnsupportedMethod { method } => write!(
                f,
                "method '{}' cannot be bound to an endpoint \
                (expected GET, POST, PUT, PATCH, DELETE or HEAD)",
                method
            ),
            RouteError::InvalidHost { host, reason } => {
                write!(f, "invalid host pattern '{}': {}", host, reason)
            }
            RouteError::UnknownRouter { id } => write!(f, "no router with id {}", id),
            RouteError::Cors(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for RouteError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RouteError::Cors(err) => Some(err),
            _ => None,
        }
    }
}

impl From<CorsConfigError> for RouteError {
    fn from(err: CorsConfigError) -> Self {
        RouteError::Cors(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_mentions_offending_segment() {
        let err = RouteError::UnbalancedBraces {
            pattern: "/a/{b".to_string(),
            segment: "{b".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("/a/{b"));
        assert!(msg.contains("unbalanced"));
    }

    #[test]
    fn test_cors_error_is_source() {
        use std::error::Error;
        let err = RouteError::from(CorsConfigError::MissingAllowOrigin);
        assert!(err.source().is_some());
    }
}

//! Terminal routing targets.
//!
//! An [`Endpoint`] sits in a hard-end or soft-end slot of a trie node and owns
//! one handler per HTTP method. Registering the same path again updates the
//! existing endpoint in place: listed methods are replaced, the rest are kept.

use http::Method;
use std::sync::Arc;

use crate::cors::CorsPolicy;
use crate::error::RouteError;

/// Methods that can carry a handler, in table order.
///
/// OPTIONS is answered by the router itself (see [`Endpoint::set_options_responder`]
/// for the override), and TRACE/CONNECT are never routed.
pub const HANDLED_METHODS: [Method; 6] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::PATCH,
    Method::DELETE,
    Method::HEAD,
];

/// Methods bound when `set_handler` is called without an explicit list
pub const DEFAULT_METHODS: [Method; 5] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::PATCH,
    Method::DELETE,
];

fn slot(method: &Method) -> Option<usize> {
    HANDLED_METHODS.iter().position(|m| m == method)
}

/// Parse a case-insensitive method name that may be bound to an endpoint.
pub fn parse_method(name: &str) -> Result<Method, RouteError> {
    let unsupported = || RouteError::UnsupportedMethod {
        method: name.to_string(),
    };
    let method = Method::from_bytes(name.trim().to_ascii_uppercase().as_bytes())
        .map_err(|_| unsupported())?;
    if slot(&method).is_some() {
        Ok(method)
    } else {
        Err(unsupported())
    }
}

/// Per-method handler table for one routable path
#[derive(Debug, Clone)]
pub struct Endpoint<H> {
    handlers: [Option<H>; 6],
    options: Option<H>,
    variable_names: Vec<Arc<str>>,
    pattern: String,
    cors: CorsPolicy,
}

impl<H> Endpoint<H> {
    pub(crate) fn new(pattern: &str, variable_names: Vec<Arc<str>>) -> Self {
        Self {
            handlers: Default::default(),
            options: None,
            variable_names,
            pattern: pattern.to_string(),
            cors: CorsPolicy::Inherit,
        }
    }

    /// Record the pattern and variable names of the latest registration.
    pub(crate) fn rebind(&mut self, pattern: &str, variable_names: Vec<Arc<str>>) {
        self.pattern.clear();
        self.pattern.push_str(pattern);
        self.variable_names = variable_names;
    }

    /// Bind `handler` to `methods`, or to GET/POST/PUT/PATCH/DELETE when
    /// `methods` is empty.
    ///
    /// The whole list is validated before anything is stored, so a bad method
    /// name leaves the endpoint untouched.
    pub fn set_handler<S: AsRef<str>>(
        &mut self,
        handler: H,
        methods: &[S],
    ) -> Result<&mut Self, RouteError>
    where
        H: Clone,
    {
        let methods: Vec<Method> = if methods.is_empty() {
            DEFAULT_METHODS.to_vec()
        } else {
            methods
                .iter()
                .map(|m| parse_method(m.as_ref()))
                .collect::<Result<_, _>>()?
        };
        self.bind(handler, &methods);
        Ok(self)
    }

    /// Store `handler` for already-validated methods.
    pub(crate) fn bind(&mut self, handler: H, methods: &[Method])
    where
        H: Clone,
    {
        for method in methods {
            if let Some(i) = slot(method) {
                self.handlers[i] = Some(handler.clone());
            }
        }
    }

    /// Answer OPTIONS with `handler` instead of the synthesized `Allow` response.
    pub fn set_options_responder(&mut self, handler: H) -> &mut Self {
        self.options = Some(handler);
        self
    }

    #[must_use]
    pub fn options_responder(&self) -> Option<&H> {
        self.options.as_ref()
    }

    /// Handler for `method`. HEAD falls back to GET when no HEAD handler is set.
    #[must_use]
    pub fn handler(&self, method: &Method) -> Option<&H> {
        let found = slot(method).and_then(|i| self.handlers[i].as_ref());
        if found.is_none() && *method == Method::HEAD {
            return self.handler(&Method::GET);
        }
        found
    }

    /// Effective handlers per method, HEAD fallback included.
    #[must_use]
    pub fn handlers(&self) -> Vec<(Method, &H)> {
        HANDLED_METHODS
            .iter()
            .filter_map(|m| self.handler(m).map(|h| (m.clone(), h)))
            .collect()
    }

    /// Methods that have an explicitly bound handler.
    #[must_use]
    pub fn methods(&self) -> Vec<Method> {
        HANDLED_METHODS
            .iter()
            .zip(self.handlers.iter())
            .filter(|(_, h)| h.is_some())
            .map(|(m, _)| m.clone())
            .collect()
    }

    /// Value for `Allow` / `Access-Control-Allow-Methods`.
    ///
    /// HEAD is listed whenever GET is, and OPTIONS is always listed.
    #[must_use]
    pub fn allow_header(&self) -> String {
        let mut allowed: Vec<&str> = HANDLED_METHODS
            .iter()
            .filter(|m| self.handler(m).is_some())
            .map(Method::as_str)
            .collect();
        allowed.push(Method::OPTIONS.as_str());
        allowed.join(", ")
    }

    /// Names of the variables captured on the way to this endpoint, root first.
    #[must_use]
    pub fn variable_names(&self) -> &[Arc<str>] {
        &self.variable_names
    }

    /// Pattern of the most recent registration that reached this endpoint.
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    #[must_use]
    pub fn cors(&self) -> &CorsPolicy {
        &self.cors
    }

    pub fn set_cors(&mut self, policy: CorsPolicy) -> &mut Self {
        self.cors = policy;
        self
    }
}

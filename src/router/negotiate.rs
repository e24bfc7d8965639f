//! Method and CORS negotiation on top of a resolved endpoint.
//!
//! After [`RouterTree::resolve`] found an endpoint, [`RouterTree::handle_headers`]
//! decides what happens to the request:
//!
//! - OPTIONS is answered by the router: `Allow` lists the endpoint's methods
//!   (HEAD next to GET, OPTIONS always), unless the endpoint has its own
//!   OPTIONS responder
//! - other methods are dispatched to their handler, or refused with 405
//!
//! In every case the origin policy of the endpoint (or the nearest router
//! default) contributes the `Access-Control-*` response headers.

use http::header::{HeaderMap, HeaderValue, ACCESS_CONTROL_ALLOW_METHODS, ALLOW, ORIGIN};
use http::{Method, StatusCode};
use tracing::debug;

use super::core::{Resolved, RouterTree};
use crate::cors::OriginPolicy;
use crate::request::RouteRequest;

/// What the caller should do with a resolved request
#[derive(Debug, Clone)]
pub enum Negotiation<'a, H> {
    /// The router answered the request itself (synthesized OPTIONS)
    Served { status: StatusCode, headers: HeaderMap },
    /// Run the endpoint's OPTIONS responder, adding `headers` to its response
    Options { handler: &'a H, headers: HeaderMap },
    /// Run `handler`, adding `headers` to its response
    Dispatch { handler: &'a H, headers: HeaderMap },
    /// No handler for the method; respond 405 with `headers` (including `Allow`)
    MethodNotAllowed { headers: HeaderMap },
}

impl<'a, H> Negotiation<'a, H> {
    /// Status of the response the router produced, or 200 for handler paths
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Negotiation::Served { status, .. } => *status,
            Negotiation::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            Negotiation::Options { .. } | Negotiation::Dispatch { .. } => StatusCode::OK,
        }
    }

    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        match self {
            Negotiation::Served { headers, .. }
            | Negotiation::Options { headers, .. }
            | Negotiation::Dispatch { headers, .. }
            | Negotiation::MethodNotAllowed { headers } => headers,
        }
    }

    /// The handler to run, if the request goes on to the application
    #[must_use]
    pub fn handler(&self) -> Option<&'a H> {
        match self {
            Negotiation::Options { handler, .. } | Negotiation::Dispatch { handler, .. } => {
                Some(*handler)
            }
            Negotiation::Served { .. } | Negotiation::MethodNotAllowed { .. } => None,
        }
    }
}

impl<H> RouterTree<H> {
    /// The origin policy that answers for `resolved`: the endpoint's own, or
    /// the nearest router default when it inherits. `None` denies.
    #[must_use]
    pub fn origin_policy<'a>(&'a self, resolved: &Resolved<'a, H>) -> Option<&'a OriginPolicy> {
        resolved
            .endpoint
            .cors()
            .resolve(self.router_cors(resolved.router))
    }

    /// Negotiate method and CORS headers for a resolved request.
    pub fn handle_headers<'a>(
        &'a self,
        resolved: &Resolved<'a, H>,
        request: &RouteRequest,
    ) -> Negotiation<'a, H> {
        let endpoint = resolved.endpoint;
        let mut headers = HeaderMap::new();

        if *request.method() == Method::OPTIONS {
            if let Some(handler) = endpoint.options_responder() {
                self.write_origin(resolved, request, &mut headers);
                return Negotiation::Options { handler, headers };
            }
            let allow = allow_value(&endpoint.allow_header());
            headers.insert(ALLOW, allow.clone());
            headers.insert(ACCESS_CONTROL_ALLOW_METHODS, allow);
            self.write_origin(resolved, request, &mut headers);
            return Negotiation::Served {
                status: StatusCode::OK,
                headers,
            };
        }

        if request.headers().contains_key(ORIGIN) {
            self.write_origin(resolved, request, &mut headers);
        }

        match endpoint.handler(request.method()) {
            Some(handler) => Negotiation::Dispatch { handler, headers },
            None => {
                debug!(
                    method = %request.method(),
                    route_pattern = %endpoint.pattern(),
                    allow = %endpoint.allow_header(),
                    "Method not allowed"
                );
                headers.insert(ALLOW, allow_value(&endpoint.allow_header()));
                Negotiation::MethodNotAllowed { headers }
            }
        }
    }

    fn write_origin(&self, resolved: &Resolved<'_, H>, request: &RouteRequest, headers: &mut HeaderMap) {
        match self.origin_policy(resolved) {
            Some(policy) => {
                policy.apply(request.headers(), headers);
            }
            None => {
                if request.headers().contains_key(ORIGIN) {
                    debug!(
                        route_pattern = %resolved.endpoint.pattern(),
                        "CORS: no origin policy, origin denied"
                    );
                }
            }
        }
    }
}

fn allow_value(allow: &str) -> HeaderValue {
    // Built from method names only.
    HeaderValue::from_str(allow).unwrap_or_else(|_| HeaderValue::from_static("OPTIONS"))
}

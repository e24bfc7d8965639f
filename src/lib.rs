//! # canopy
//!
//! **canopy** is a request-routing engine: it maps an HTTP request (method,
//! host, path and headers) to the handler registered for it, extracts the
//! path variables, and negotiates `OPTIONS` and CORS on the way.
//!
//! ## Overview
//!
//! Handlers are generic: the router stores whatever `H` the application hands
//! it (a function pointer, an enum, a handler name) and gives it back on a
//! match. Routing never touches request bodies.
//!
//! ## Architecture
//!
//! - **[`router`]** - Pattern parsing, the segment trie, host and path-prefix
//!   matchers, the router tree and method/CORS negotiation
//! - **[`cors`]** - Origin policies built from `Access-Control-*` header maps
//! - **[`request`]** - The request view the router resolves
//! - **[`config`]** - Declarative route tables (YAML, TOML, JSON)
//! - **[`hot_reload`]** - Swapping in rebuilt router trees when a table changes
//! - **[`logging`]** / **[`runtime_config`]** - Environment driven setup
//! - **[`cli`]** - The `canopy` route table tool
//!
//! ### Request Resolution Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant App as Transport
//!     participant Tree as RouterTree
//!     participant Match as Matchers
//!     participant Trie as RouteTrie
//!     participant Neg as Negotiation
//!
//!     App->>Tree: resolve(RouteRequest)
//!     Tree->>Match: host / path prefix of root
//!     loop children in mount order
//!         Tree->>Match: child matchers on a copy of the state
//!         Match-->>Tree: narrowed host and path
//!         Tree->>Trie: find_endpoint(remaining segments)
//!     end
//!     Tree->>Trie: own routes if no child resolved it
//!     alt No endpoint
//!         Tree-->>App: None (404)
//!     end
//!     Trie-->>Tree: Endpoint + captured values
//!     Tree-->>App: Resolved
//!     App->>Neg: handle_headers(resolved, request)
//!     alt OPTIONS
//!         Neg-->>App: Served 200 (Allow, CORS)
//!     else method bound
//!         Neg-->>App: Dispatch(handler, CORS headers)
//!     else
//!         Neg-->>App: MethodNotAllowed 405 (Allow)
//!     end
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use canopy::{Negotiation, RouteRequest, RouterTree};
//! use http::Method;
//!
//! let mut tree = RouterTree::new();
//! let root = tree.root();
//! let api = tree.sub_router(root, "api").unwrap();
//! tree.set_path_prefix(api, "/v1", None).unwrap();
//! tree.handle(api, "/users/{id:int}", "get_user", &["GET"]).unwrap();
//!
//! let req = RouteRequest::new(Method::GET, "/v1/users/7");
//! let resolved = tree.resolve(&req).unwrap();
//! assert_eq!(resolved.get_path_param("id"), Some("7"));
//! assert!(matches!(
//!     tree.handle_headers(&resolved, &req),
//!     Negotiation::Dispatch { handler: &"get_user", .. }
//! ));
//! ```
//!
//! ## Route Tables
//!
//! The same tree can be described in a file and loaded with
//! [`config::build_route_tree`]; the `canopy` binary lists, checks and
//! resolves against such tables:
//!
//! ```bash
//! canopy resolve --table routes.yaml --host api.example.com /v1/users/7
//! ```

pub mod cli;
pub mod config;
pub mod cors;
pub mod error;
pub mod hot_reload;
pub mod logging;
pub mod request;
pub mod router;
pub mod runtime_config;

pub use cors::{CorsConfigError, CorsPolicy, OriginPolicy, OriginPolicyBuilder};
pub use error::RouteError;
pub use request::RouteRequest;
pub use router::{Endpoint, Negotiation, Resolved, RouterId, RouterTree};

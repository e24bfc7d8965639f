//! # Router Module
//!
//! Path matching and request resolution for canopy.
//!
//! ## Overview
//!
//! The router is responsible for:
//! - Parsing route patterns into typed segments ([`segment`])
//! - Storing per-method handlers for each routable path ([`Endpoint`])
//! - Resolving request paths through a segment trie ([`RouteTrie`])
//! - Scoping routers by host and path prefix ([`matcher`], [`host`])
//! - Composing routers into a tree and resolving requests through it ([`RouterTree`])
//! - Answering OPTIONS and computing CORS headers ([`Negotiation`])
//!
//! ## Pattern grammar
//!
//! | Segment          | Matches                                          |
//! |------------------|--------------------------------------------------|
//! | `users`          | exactly `users`                                  |
//! | `{id}`           | any single segment                               |
//! | `{id:int}`       | a decimal int32 (`int64`, `float`, `float64` too)|
//! | `{code:[a-z]+}`  | a segment matching the regular expression        |
//! | `{rest*}`        | zero or more segments                            |
//!
//! A pattern ending in `/` registers the trailing-slash variant of the path.
//!
//! ## Precedence
//!
//! At every segment: literal, then regex (registration order), then int32,
//! int64, float32, float64, then generic, then a trailing wildcard. Child
//! routers are tried in mount order before a router's own routes.
//!
//! ## Example
//!
//! ```rust
//! use canopy::router::{Negotiation, RouterTree};
//! use canopy::request::RouteRequest;
//! use http::Method;
//!
//! let mut tree = RouterTree::new();
//! let root = tree.root();
//! tree.handle(root, "/pets/{id:int}", "get_pet", &["GET"]).unwrap();
//!
//! let req = RouteRequest::new(Method::GET, "/pets/12");
//! let resolved = tree.resolve(&req).unwrap();
//! assert_eq!(resolved.get_path_param("id"), Some("12"));
//! match tree.handle_headers(&resolved, &req) {
//!     Negotiation::Dispatch { handler, .. } => assert_eq!(*handler, "get_pet"),
//!     other => panic!("unexpected {:?}", other),
//! }
//! ```

mod core;
pub mod endpoint;
pub mod host;
pub mod matcher;
mod negotiate;
pub mod segment;
pub mod trie;

pub use core::{ParamVec, Resolved, RouteInfo, RouterId, RouterTree, MAX_INLINE_PARAMS};
pub use endpoint::Endpoint;
pub use host::HostPattern;
pub use matcher::{HostMatcher, MatchState, Matcher, PathPrefixMatcher};
pub use negotiate::Negotiation;
pub use trie::{RouteTrie, TrieLookup};

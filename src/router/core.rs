//! Router tree core - hot path for request resolution.
//!
//! Routers live in an arena owned by [`RouterTree`] and refer to each other by
//! [`RouterId`]. Every router owns a [`RouteTrie`], an ordered list of
//! [`Matcher`]s and an ordered list of named children. Resolution walks the
//! tree depth-first: a router whose matchers accept the request offers it to
//! its children in mount order and only falls back to its own trie when none
//! of them resolves it.

#![deny(clippy::inefficient_to_string)]
#![deny(clippy::format_push_string)]
#![deny(clippy::unnecessary_to_owned)]

use http::Method;
use smallvec::SmallVec;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::endpoint::Endpoint;
use super::host::HostPattern;
use super::matcher::{
    HostMatcher, MatchState, Matcher, PathPrefixMatcher, HOST_MATCHER, PATH_PREFIX_MATCHER,
};
use super::segment::{split_extension, split_path};
use super::trie::RouteTrie;
use crate::cors::{CorsPolicy, OriginPolicy};
use crate::error::RouteError;
use crate::request::RouteRequest;

/// Maximum number of path parameters before heap allocation.
/// Most routes have ≤4 variables (e.g., /users/{id}/posts/{postId}).
pub const MAX_INLINE_PARAMS: usize = 8;

/// Default threshold above which a resolution is logged as slow
pub const DEFAULT_SLOW_MATCH: Duration = Duration::from_millis(1);

/// Captured path variables, name → value, in declaration order.
///
/// Names are `Arc<str>` shared with the endpoint that declared them, so
/// building the list only copies the per-request values.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// Index of a router in its [`RouterTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RouterId(usize);

impl RouterId {
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for RouterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "router#{}", self.0)
    }
}

/// A host or path-prefix pattern plus the concrete form used for URL building
#[derive(Debug, Clone)]
struct Scope {
    pattern: String,
    canonical: Option<String>,
}

#[derive(Debug)]
struct RouterNode<H> {
    trie: RouteTrie<H>,
    matchers: Vec<Box<dyn Matcher>>,
    host: Option<Scope>,
    path_prefix: Option<Scope>,
    parent: Option<RouterId>,
    children: Vec<(String, RouterId)>,
    cors: Option<OriginPolicy>,
}

impl<H> RouterNode<H> {
    fn new() -> Self {
        Self {
            trie: RouteTrie::new(),
            matchers: Vec::new(),
            host: None,
            path_prefix: None,
            parent: None,
            children: Vec::new(),
            cors: None,
        }
    }

    fn put_matcher(&mut self, matcher: Box<dyn Matcher>) {
        match self.matchers.iter().position(|m| m.name() == matcher.name()) {
            Some(i) => self.matchers[i] = matcher,
            None => self.matchers.push(matcher),
        }
    }
}

/// Result of successfully resolving a request
///
/// Carries everything the dispatch layer needs: the endpoint (and through it
/// the handler per method), the captured variables, and what the router
/// scoping left of the host and path.
#[derive(Debug, Clone)]
pub struct Resolved<'a, H> {
    /// Router whose trie produced the endpoint
    pub router: RouterId,
    pub endpoint: &'a Endpoint<H>,
    /// Path variables zipped with the endpoint's variable names
    pub path_params: ParamVec,
    /// Path as seen by the trie, after path prefixes were stripped
    pub remainder: String,
    /// Format hint taken from the last path segment (`report.pdf` → `pdf`)
    pub extension: Option<String>,
    /// Host labels left over after host matching (`api` for
    /// `api.example.com` under `.example.com`)
    pub subdomain: String,
}

impl<'a, H> Resolved<'a, H> {
    /// Get a path parameter by name
    ///
    /// Uses "last write wins" semantics: if duplicate parameter names exist
    /// at different path depths (e.g., `/org/{id}/team/{team_id}/user/{id}`),
    /// returns the last occurrence (the user id, not the org id).
    #[inline]
    #[must_use]
    pub fn get_path_param(&self, name: &str) -> Option<&str> {
        self.path_params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Convert path_params to a HashMap
    /// Note: This allocates - use get_path_param() in hot paths instead
    #[must_use]
    pub fn path_params_map(&self) -> HashMap<String, String> {
        self.path_params
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    /// Handler for `method` (HEAD falls back to GET)
    #[must_use]
    pub fn handler(&self, method: &Method) -> Option<&'a H> {
        self.endpoint.handler(method)
    }
}

/// One registered route, as listed by [`RouterTree::routes`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteInfo {
    pub router: RouterId,
    /// Slash-separated mount names from the root (`/` for the root)
    pub mount_path: String,
    pub host: String,
    pub path_prefix: String,
    pub pattern: String,
    pub methods: Vec<Method>,
}

/// Arena of routers forming a tree
///
/// The tree is created with a root router. Further routers are created
/// detached and then mounted under a parent; a router can have at most one
/// parent, so the structure is always a tree.
///
/// # Example
///
/// ```rust
/// use canopy::router::RouterTree;
/// use canopy::request::RouteRequest;
/// use http::Method;
///
/// let mut tree = RouterTree::new();
/// let api = tree.sub_router(tree.root(), "api").unwrap();
/// tree.set_path_prefix(api, "/api", None).unwrap();
/// tree.handle(api, "/users/{id:int}", "get_user", &["GET"]).unwrap();
///
/// let req = RouteRequest::new(Method::GET, "/api/users/7");
/// let resolved = tree.resolve(&req).unwrap();
/// assert_eq!(resolved.get_path_param("id"), Some("7"));
/// ```
#[derive(Debug)]
pub struct RouterTree<H> {
    nodes: Vec<RouterNode<H>>,
    root: RouterId,
    slow_match: Duration,
}

impl<H> Default for RouterTree<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> RouterTree<H> {
    /// A tree holding only an empty root router
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: vec![RouterNode::new()],
            root: RouterId(0),
            slow_match: DEFAULT_SLOW_MATCH,
        }
    }

    #[must_use]
    pub fn root(&self) -> RouterId {
        self.root
    }

    /// Resolutions slower than `threshold` are logged at WARN.
    pub fn set_slow_match_threshold(&mut self, threshold: Duration) {
        self.slow_match = threshold;
    }

    fn node(&self, id: RouterId) -> Option<&RouterNode<H>> {
        self.nodes.get(id.0)
    }

    fn node_mut(&mut self, id: RouterId) -> Result<&mut RouterNode<H>, RouteError> {
        self.nodes
            .get_mut(id.0)
            .ok_or(RouteError::UnknownRouter { id: id.0 })
    }

    /// Whether `id` refers to a router of this tree
    #[must_use]
    pub fn contains(&self, id: RouterId) -> bool {
        id.0 < self.nodes.len()
    }

    /// Create a detached router. Mount it with [`RouterTree::mount`].
    #[must_use]
    pub fn create_router(&mut self) -> RouterId {
        self.nodes.push(RouterNode::new());
        RouterId(self.nodes.len() - 1)
    }

    // ----- registration -------------------------------------------------

    /// Register `handler` for `pattern` on router `id`.
    ///
    /// See [`RouteTrie::handle`] for the pattern grammar and method rules.
    pub fn handle<S: AsRef<str>>(
        &mut self,
        id: RouterId,
        pattern: &str,
        handler: H,
        methods: &[S],
    ) -> Result<&mut Endpoint<H>, RouteError>
    where
        H: Clone,
    {
        let node = self.node_mut(id)?;
        let endpoint = node.trie.handle(pattern, handler, methods)?;
        debug!(
            router = %id,
            pattern = %pattern,
            methods = ?endpoint.methods(),
            "Route registered"
        );
        Ok(endpoint)
    }

    /// Set the CORS policy of every endpoint registered through `pattern`
    /// on router `id`, wildcard variants included.
    pub fn set_route_cors(
        &mut self,
        id: RouterId,
        pattern: &str,
        policy: CorsPolicy,
    ) -> Result<usize, RouteError> {
        let node = self.node_mut(id)?;
        Ok(node.trie.update_pattern(pattern, &mut |ep: &mut Endpoint<H>| {
            ep.set_cors(policy.clone());
        }))
    }

    /// Answer OPTIONS on every endpoint registered through `pattern` with
    /// `handler` instead of the synthesized response.
    pub fn set_options_responder(
        &mut self,
        id: RouterId,
        pattern: &str,
        handler: H,
    ) -> Result<usize, RouteError>
    where
        H: Clone,
    {
        let node = self.node_mut(id)?;
        Ok(node.trie.update_pattern(pattern, &mut |ep: &mut Endpoint<H>| {
            ep.set_options_responder(handler.clone());
        }))
    }

    /// Default origin policy for endpoints of this router and its descendants
    /// that do not set their own.
    pub fn set_cors(&mut self, id: RouterId, policy: OriginPolicy) -> Result<(), RouteError> {
        self.node_mut(id)?.cors = Some(policy);
        Ok(())
    }

    /// Scope router `id` to hosts matching `pattern`.
    ///
    /// `canonical` is the concrete host used by [`RouterTree::url_for`]
    /// (`https://www.example.com`); a pattern without wildcards is its own
    /// canonical form when none is given.
    pub fn set_host(
        &mut self,
        id: RouterId,
        pattern: &str,
        canonical: Option<&str>,
    ) -> Result<(), RouteError> {
        let compiled = HostPattern::parse(pattern)?;
        let node = self.node_mut(id)?;
        node.host = Some(Scope {
            pattern: compiled.as_str().to_string(),
            canonical: canonical.map(str::to_string),
        });
        node.put_matcher(Box::new(HostMatcher::new(compiled)));
        Ok(())
    }

    /// Scope router `id` to paths under `prefix`.
    pub fn set_path_prefix(
        &mut self,
        id: RouterId,
        prefix: &str,
        canonical: Option<&str>,
    ) -> Result<(), RouteError> {
        let matcher = PathPrefixMatcher::new(prefix);
        let node = self.node_mut(id)?;
        node.path_prefix = Some(Scope {
            pattern: matcher.prefix().to_string(),
            canonical: canonical.map(str::to_string),
        });
        node.put_matcher(Box::new(matcher));
        Ok(())
    }

    /// Add a custom matcher; a matcher with the same name is replaced in place.
    pub fn add_matcher(
        &mut self,
        id: RouterId,
        matcher: Box<dyn Matcher>,
    ) -> Result<(), RouteError> {
        self.node_mut(id)?.put_matcher(matcher);
        Ok(())
    }

    /// Names of the matchers of router `id`, in evaluation order
    #[must_use]
    pub fn matcher_names(&self, id: RouterId) -> Vec<&str> {
        self.node(id)
            .map(|n| n.matchers.iter().map(|m| m.name()).collect())
            .unwrap_or_default()
    }

    // ----- tree structure -----------------------------------------------

    #[must_use]
    pub fn parent(&self, id: RouterId) -> Option<RouterId> {
        self.node(id).and_then(|n| n.parent)
    }

    /// Children of `id` with their mount names, in mount order
    #[must_use]
    pub fn children(&self, id: RouterId) -> &[(String, RouterId)] {
        self.node(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Mount name of `id` under its parent
    #[must_use]
    pub fn name(&self, id: RouterId) -> Option<&str> {
        let parent = self.parent(id)?;
        self.children(parent)
            .iter()
            .find(|(_, child)| *child == id)
            .map(|(name, _)| name.as_str())
    }

    /// Find a direct child by mount name
    #[must_use]
    pub fn child(&self, parent: RouterId, name: &str) -> Option<RouterId> {
        self.children(parent)
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, id)| *id)
    }

    /// Record `parent` as the parent of `child`.
    ///
    /// Fails when `child` already has a parent, is the tree root, or is
    /// `parent` itself or one of its ancestors. Nothing changes on failure.
    fn set_parent(&mut self, child: RouterId, parent: RouterId) -> bool {
        if !self.contains(child) || !self.contains(parent) || child == self.root {
            return false;
        }
        if self.parent(child).is_some() {
            return false;
        }
        let mut cursor = Some(parent);
        while let Some(id) = cursor {
            if id == child {
                return false;
            }
            cursor = self.parent(id);
        }
        if let Some(node) = self.nodes.get_mut(child.0) {
            node.parent = Some(parent);
        }
        true
    }

    /// Mount `child` under `parent` as `name`.
    ///
    /// Returns `false`, leaving both routers untouched, when `child` already
    /// has a parent or mounting it would create a cycle. Mounting under a
    /// name that is already taken detaches the previous child and puts the
    /// new one in its place.
    #[must_use = "mounting fails when the child already has a parent"]
    pub fn mount(&mut self, parent: RouterId, name: &str, child: RouterId) -> bool {
        if !self.set_parent(child, parent) {
            warn!(
                parent = %parent,
                child = %child,
                name = %name,
                "Router mount rejected: child already has a parent or would form a cycle"
            );
            return false;
        }

        let replaced = match self.nodes.get_mut(parent.0) {
            Some(node) => match node.children.iter_mut().find(|(n, _)| n == name) {
                Some(entry) => Some(std::mem::replace(&mut entry.1, child)),
                None => {
                    node.children.push((name.to_string(), child));
                    None
                }
            },
            None => None,
        };
        if let Some(old) = replaced {
            if let Some(node) = self.nodes.get_mut(old.0) {
                node.parent = None;
            }
            debug!(parent = %parent, name = %name, old = %old, "Replaced mounted router");
        }
        debug!(parent = %parent, child = %child, name = %name, "Router mounted");
        true
    }

    /// Alias of [`RouterTree::mount`]
    #[must_use = "mounting fails when the child already has a parent"]
    pub fn add_router(&mut self, parent: RouterId, name: &str, child: RouterId) -> bool {
        self.mount(parent, name, child)
    }

    /// Create a router and mount it under `parent` as `name`.
    pub fn sub_router(&mut self, parent: RouterId, name: &str) -> Result<RouterId, RouteError> {
        if !self.contains(parent) {
            return Err(RouteError::UnknownRouter { id: parent.0 });
        }
        let child = self.create_router();
        if self.mount(parent, name, child) {
            Ok(child)
        } else {
            Err(RouteError::UnknownRouter { id: parent.0 })
        }
    }

    /// Unmount `child` from `parent`. The child keeps its routes and can be
    /// mounted again.
    pub fn del_router(&mut self, parent: RouterId, child: RouterId) -> bool {
        if self.parent(child) != Some(parent) {
            return false;
        }
        if let Some(node) = self.nodes.get_mut(parent.0) {
            node.children.retain(|(_, id)| *id != child);
        }
        if let Some(node) = self.nodes.get_mut(child.0) {
            node.parent = None;
        }
        debug!(parent = %parent, child = %child, "Router unmounted");
        true
    }

    /// Unmount the child named `name`, returning its id.
    pub fn del_router_by_name(&mut self, parent: RouterId, name: &str) -> Option<RouterId> {
        let child = self.child(parent, name)?;
        self.del_router(parent, child).then_some(child)
    }

    fn ancestry(&self, id: RouterId) -> Vec<RouterId> {
        let mut chain = Vec::new();
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            if !self.contains(current) {
                break;
            }
            chain.push(current);
            cursor = self.parent(current);
        }
        chain
    }

    // ----- composed scopes ----------------------------------------------

    /// Host pattern of `id` composed with its ancestors', most specific first
    /// (`api` under `.example.com` is `api.example.com`). Empty when no
    /// router on the way sets a host.
    #[must_use]
    pub fn full_host(&self, id: RouterId) -> String {
        let mut full = String::new();
        for router in self.ancestry(id) {
            let Some(scope) = self.node(router).and_then(|n| n.host.as_ref()) else {
                continue;
            };
            if full.is_empty() {
                full.push_str(&scope.pattern);
            } else if scope.pattern.starts_with('.') {
                full.push_str(&scope.pattern);
            } else {
                full.push('.');
                full.push_str(&scope.pattern);
            }
        }
        full
    }

    /// Path prefix of `id` appended to its ancestors' (`/api` + `/v1`).
    #[must_use]
    pub fn full_path_prefix(&self, id: RouterId) -> String {
        self.compose_prefix(id, |scope| &scope.pattern)
    }

    fn compose_prefix<F>(&self, id: RouterId, pick: F) -> String
    where
        F: Fn(&Scope) -> &String,
    {
        let mut parts: Vec<&str> = Vec::new();
        for router in self.ancestry(id) {
            if let Some(scope) = self.node(router).and_then(|n| n.path_prefix.as_ref()) {
                parts.push(pick(scope).trim_matches('/'));
            }
        }
        let mut full = String::new();
        for part in parts.into_iter().rev().filter(|p| !p.is_empty()) {
            full.push('/');
            full.push_str(part);
        }
        full
    }

    /// Build a URL for `path` on router `id` from canonical forms.
    ///
    /// The host is the canonical host of the nearest router that has one (a
    /// host pattern without wildcards or a leading dot counts as canonical);
    /// canonical hosts given without a scheme produce a scheme-relative URL.
    /// Prefixes use their canonical form when set. Without a usable host the
    /// result is an absolute path.
    #[must_use]
    pub fn url_for(&self, id: RouterId, path: &str) -> String {
        let host = self.ancestry(id).into_iter().find_map(|router| {
            let scope = self.node(router)?.host.as_ref()?;
            match &scope.canonical {
                Some(canonical) => Some(canonical.trim_end_matches('/').to_string()),
                None => {
                    let full = self.full_host(router);
                    is_concrete_host(&full).then_some(full)
                }
            }
        });
        let prefix = self.compose_prefix(id, |scope| scope.canonical.as_ref().unwrap_or(&scope.pattern));

        let mut url = String::new();
        if let Some(host) = host {
            if !host.contains("://") {
                url.push_str("//");
            }
            url.push_str(&host);
        }
        url.push_str(&prefix);
        if !path.starts_with('/') {
            url.push('/');
        }
        url.push_str(path);
        url
    }

    // ----- resolution ---------------------------------------------------

    /// Run the matchers of `id` and its ancestors, root first.
    ///
    /// Returns the narrowed state when every matcher accepts.
    #[must_use]
    pub fn can_route_request(&self, id: RouterId, request: &RouteRequest) -> Option<MatchState> {
        let mut state = MatchState::new(request);
        for router in self.ancestry(id).into_iter().rev() {
            for matcher in &self.node(router)?.matchers {
                if !matcher.apply(request, &mut state) {
                    return None;
                }
            }
        }
        Some(state)
    }

    /// Resolve `request` to an endpoint.
    ///
    /// Children are offered the request in mount order and the first one that
    /// resolves it wins; otherwise the router's own trie answers. The method is
    /// not checked here, see [`RouterTree::handle_headers`].
    #[must_use]
    pub fn resolve(&self, request: &RouteRequest) -> Option<Resolved<'_, H>> {
        debug!(
            method = %request.method(),
            host = %request.host(),
            path = %request.path(),
            "Route resolution attempt"
        );

        let started = Instant::now();
        let result = self.resolve_from(self.root, request, MatchState::new(request));
        let elapsed = started.elapsed();

        match &result {
            Some(resolved) if elapsed > self.slow_match => {
                warn!(
                    method = %request.method(),
                    host = %request.host(),
                    path = %request.path(),
                    router = %resolved.router,
                    route_pattern = %resolved.endpoint.pattern(),
                    path_params = ?resolved.path_params,
                    duration_us = elapsed.as_micros(),
                    "Slow route resolution detected"
                );
            }
            Some(resolved) => {
                debug!(
                    method = %request.method(),
                    host = %request.host(),
                    path = %request.path(),
                    router = %resolved.router,
                    route_pattern = %resolved.endpoint.pattern(),
                    path_params = ?resolved.path_params,
                    duration_us = elapsed.as_micros(),
                    "Route matched"
                );
            }
            None => {
                debug!(
                    method = %request.method(),
                    host = %request.host(),
                    path = %request.path(),
                    duration_us = elapsed.as_micros(),
                    "No route matched"
                );
            }
        }
        result
    }

    fn resolve_from<'a>(
        &'a self,
        id: RouterId,
        request: &RouteRequest,
        mut state: MatchState,
    ) -> Option<Resolved<'a, H>> {
        let node = self.node(id)?;
        for matcher in &node.matchers {
            if !matcher.apply(request, &mut state) {
                return None;
            }
        }

        for (_, child) in &node.children {
            if let Some(found) = self.resolve_from(*child, request, state.clone()) {
                return Some(found);
            }
        }

        if !state.host_settled() {
            return None;
        }

        let (segments, trailing) = split_path(&state.path_to_match);
        let lookup = node.trie.find_endpoint(&segments, trailing);
        let endpoint = lookup.endpoint?;

        let last = match segments.last() {
            Some(last) => Some(*last),
            None => split_path(request.path()).0.last().copied(),
        };
        let extension = last
            .and_then(split_extension)
            .map(|(_, ext)| ext.to_string());

        let path_params: ParamVec = endpoint
            .variable_names()
            .iter()
            .cloned()
            .zip(lookup.values)
            .collect();

        Some(Resolved {
            router: id,
            endpoint,
            path_params,
            subdomain: state.subdomain().to_string(),
            remainder: state.path_to_match,
            extension,
        })
    }

    /// Default origin policy of `id` or its nearest ancestor that has one
    #[must_use]
    pub fn router_cors(&self, id: RouterId) -> Option<&OriginPolicy> {
        self.ancestry(id)
            .into_iter()
            .find_map(|router| self.node(router).and_then(|n| n.cors.as_ref()))
    }

    // ----- introspection ------------------------------------------------

    /// Every route reachable from the root, depth-first in mount order.
    #[must_use]
    pub fn routes(&self) -> Vec<RouteInfo> {
        let mut out = Vec::new();
        self.collect_routes(self.root, "/".to_string(), &mut out);
        out
    }

    fn collect_routes(&self, id: RouterId, mount_path: String, out: &mut Vec<RouteInfo>) {
        let Some(node) = self.node(id) else {
            return;
        };
        let host = self.full_host(id);
        let path_prefix = self.full_path_prefix(id);
        for endpoint in node.trie.endpoints() {
            out.push(RouteInfo {
                router: id,
                mount_path: mount_path.clone(),
                host: host.clone(),
                path_prefix: path_prefix.clone(),
                pattern: endpoint.pattern().to_string(),
                methods: endpoint.methods(),
            });
        }
        for (name, child) in &node.children {
            let child_path = if mount_path.ends_with('/') {
                format!("{}{}", mount_path, name)
            } else {
                format!("{}/{}", mount_path, name)
            };
            self.collect_routes(*child, child_path, out);
        }
    }

    /// Log a summary of the tree at INFO.
    pub fn log_summary(&self) {
        let routes = self.routes();
        let summary: Vec<String> = routes
            .iter()
            .take(10)
            .map(|r| format!("{}{}{}", r.host, r.path_prefix, r.pattern))
            .collect();
        info!(
            routers = self.nodes.len(),
            routes_count = routes.len(),
            routes_summary = ?summary,
            "Routing tree loaded"
        );
    }
}

fn is_concrete_host(pattern: &str) -> bool {
    !pattern.starts_with('.') && !pattern.contains(['?', '|', '(', ')', '*', '[', ']'])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get(path: &str) -> RouteRequest {
        RouteRequest::new(Method::GET, path)
    }

    fn handler_of<'a>(tree: &'a RouterTree<&'static str>, req: &RouteRequest) -> Option<&'a str> {
        tree.resolve(req)
            .and_then(|r| r.handler(req.method()).copied())
    }

    #[test]
    fn test_root_trie_resolution() {
        let mut tree = RouterTree::new();
        let root = tree.root();
        tree.handle(root, "/users/{id:int}", "user", &["GET"]).unwrap();
        let resolved = tree.resolve(&get("/users/42")).unwrap();
        assert_eq!(resolved.router, root);
        assert_eq!(resolved.get_path_param("id"), Some("42"));
        assert_eq!(resolved.remainder, "/users/42");
        assert!(tree.resolve(&get("/users/abc")).is_none());
    }

    #[test]
    fn test_children_before_own_trie() {
        let mut tree = RouterTree::new();
        let root = tree.root();
        tree.handle(root, "/api/{rest*}", "root", &["GET"]).unwrap();
        let api = tree.sub_router(root, "api").unwrap();
        tree.set_path_prefix(api, "/api", None).unwrap();
        tree.handle(api, "/users", "users", &["GET"]).unwrap();

        assert_eq!(handler_of(&tree, &get("/api/users")), Some("users"));
        assert_eq!(handler_of(&tree, &get("/api/other")), Some("root"));
        let resolved = tree.resolve(&get("/api/users")).unwrap();
        assert_eq!(resolved.remainder, "/users");
    }

    #[test]
    fn test_children_in_mount_order() {
        let mut tree = RouterTree::new();
        let root = tree.root();
        let first = tree.sub_router(root, "first").unwrap();
        let second = tree.sub_router(root, "second").unwrap();
        tree.handle(first, "/{x}", "first", &["GET"]).unwrap();
        tree.handle(second, "/a", "second", &["GET"]).unwrap();
        assert_eq!(handler_of(&tree, &get("/a")), Some("first"));
    }

    #[test]
    fn test_host_scoped_children() {
        let mut tree = RouterTree::new();
        let root = tree.root();
        let site = tree.sub_router(root, "site").unwrap();
        tree.set_host(site, "example.com", None).unwrap();
        tree.handle(site, "/", "site", &["GET"]).unwrap();
        let api = tree.sub_router(site, "api").unwrap();
        tree.set_host(api, "api", None).unwrap();
        tree.handle(api, "/", "api", &["GET"]).unwrap();
        let wild = tree.sub_router(root, "wild").unwrap();
        tree.set_host(wild, ".example.com", None).unwrap();
        tree.handle(wild, "/", "wild", &["GET"]).unwrap();

        assert_eq!(tree.full_host(api), "api.example.com");
        let on = |host: &str| get("/").with_host(host);
        assert_eq!(handler_of(&tree, &on("example.com")), Some("site"));
        assert_eq!(handler_of(&tree, &on("api.example.com")), Some("api"));
        assert_eq!(handler_of(&tree, &on("x.example.com")), Some("wild"));
        let resolved = tree.resolve(&on("a.b.example.com")).unwrap();
        assert_eq!(resolved.subdomain, "a.b");
        assert_eq!(handler_of(&tree, &on("example.org")), None);
    }

    #[test]
    fn test_mount_rejects_second_parent() {
        let mut tree: RouterTree<&str> = RouterTree::new();
        let root = tree.root();
        let a = tree.sub_router(root, "a").unwrap();
        let b = tree.sub_router(root, "b").unwrap();
        let c = tree.sub_router(a, "c").unwrap();

        assert!(!tree.mount(b, "c", c));
        assert_eq!(tree.parent(c), Some(a));
        assert_eq!(tree.children(a).len(), 1);
        assert!(tree.children(b).is_empty());
    }

    #[test]
    fn test_mount_rejects_cycles_and_root() {
        let mut tree: RouterTree<&str> = RouterTree::new();
        let root = tree.root();
        let a = tree.create_router();
        let b = tree.create_router();
        assert!(tree.mount(a, "b", b));
        assert!(!tree.mount(b, "a", a));
        assert!(!tree.mount(a, "self", a));
        assert!(!tree.mount(a, "root", root));
        assert_eq!(tree.parent(a), None);
    }

    #[test]
    fn test_del_router_is_symmetric() {
        let mut tree: RouterTree<&str> = RouterTree::new();
        let root = tree.root();
        let a = tree.sub_router(root, "a").unwrap();
        assert_eq!(tree.del_router_by_name(root, "a"), Some(a));
        assert_eq!(tree.parent(a), None);
        assert!(tree.children(root).is_empty());
        assert!(!tree.del_router(root, a));

        let b = tree.create_router();
        assert!(tree.mount(b, "a", a));
        assert_eq!(tree.name(a), Some("a"));
    }

    #[test]
    fn test_mount_replaces_same_name() {
        let mut tree: RouterTree<&str> = RouterTree::new();
        let root = tree.root();
        let old = tree.sub_router(root, "v1").unwrap();
        let new = tree.create_router();
        assert!(tree.mount(root, "v1", new));
        assert_eq!(tree.child(root, "v1"), Some(new));
        assert_eq!(tree.parent(old), None);
    }

    #[test]
    fn test_full_prefix_and_url_for() {
        let mut tree: RouterTree<&str> = RouterTree::new();
        let root = tree.root();
        let api = tree.sub_router(root, "api").unwrap();
        tree.set_host(api, "api.example.com", Some("https://api.example.com"))
            .unwrap();
        tree.set_path_prefix(api, "/api/", None).unwrap();
        let v1 = tree.sub_router(api, "v1").unwrap();
        tree.set_path_prefix(v1, "v1", None).unwrap();

        assert_eq!(tree.full_path_prefix(v1), "/api/v1");
        assert_eq!(tree.url_for(v1, "/users/5"), "https://api.example.com/api/v1/users/5");

        let local = tree.sub_router(root, "local").unwrap();
        tree.set_path_prefix(local, "/local", None).unwrap();
        assert_eq!(tree.url_for(local, "x"), "/local/x");
    }

    #[test]
    fn test_can_route_request() {
        let mut tree: RouterTree<&str> = RouterTree::new();
        let root = tree.root();
        let api = tree.sub_router(root, "api").unwrap();
        tree.set_path_prefix(api, "/api", None).unwrap();
        tree.set_host(api, "example.com", None).unwrap();
        assert_eq!(tree.matcher_names(api), vec![PATH_PREFIX_MATCHER, HOST_MATCHER]);

        let req = get("/api/x").with_host("example.com");
        let state = tree.can_route_request(api, &req).unwrap();
        assert_eq!(state.path_to_match, "/x");
        assert!(tree
            .can_route_request(api, &get("/api/x").with_host("other.com"))
            .is_none());
    }

    #[test]
    fn test_extension_hint() {
        let mut tree = RouterTree::new();
        let root = tree.root();
        tree.handle(root, "/report", "report", &["GET"]).unwrap();
        let resolved = tree.resolve(&get("/report.pdf")).unwrap();
        assert_eq!(resolved.extension.as_deref(), Some("pdf"));
        assert!(tree.resolve(&get("/report")).unwrap().extension.is_none());
    }

    #[test]
    fn test_routes_listing() {
        let mut tree = RouterTree::new();
        let root = tree.root();
        tree.handle(root, "/", "home", &["GET"]).unwrap();
        let api = tree.sub_router(root, "api").unwrap();
        tree.set_path_prefix(api, "/api", None).unwrap();
        tree.handle(api, "/users", "users", &["GET", "POST"]).unwrap();

        let routes = tree.routes();
        assert_eq!(routes.len(), 2);
        assert_eq!(routes[1].mount_path, "/api");
        assert_eq!(routes[1].path_prefix, "/api");
        assert_eq!(routes[1].methods, vec![Method::GET, Method::POST]);
    }

    #[test]
    fn test_unknown_router_errors() {
        let mut tree: RouterTree<&str> = RouterTree::new();
        let bogus = RouterId(99);
        assert_eq!(
            tree.handle(bogus, "/", "h", &["GET"]).unwrap_err(),
            RouteError::UnknownRouter { id: 99 }
        );
        assert!(tree.set_host(bogus, "example.com", None).is_err());
        assert!(tree.sub_router(bogus, "x").is_err());
    }
}

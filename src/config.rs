//! # Route Table Module
//!
//! Loads a router tree from a declarative route table. Handlers are named by
//! string, so the resulting tree is a `RouterTree<String>`; the application
//! maps names to its own handlers.
//!
//! ## Format
//!
//! YAML, TOML or JSON, chosen by file extension:
//!
//! ```yaml
//! cors:
//!   Access-Control-Allow-Origin: "https://app.example.com"
//! routes:
//!   - pattern: /
//!     handler: home
//!     methods: [GET]
//! routers:
//!   - name: api
//!     host: .example.com
//!     path_prefix: /api
//!     routes:
//!       - pattern: /users/{id:int}
//!         handler: get_user
//!         methods: [GET, DELETE]
//!       - pattern: /files/{rest*}
//!         handler: files
//!         cors_disabled: true
//! ```
//!
//! Routers without a `name` are mounted as `router0`, `router1`, ... in
//! declaration order.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

use crate::cors::{CorsPolicy, OriginPolicy};
use crate::error::RouteError;
use crate::router::{RouterId, RouterTree};

/// One route of a route table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RouteConfig {
    pub pattern: String,
    pub handler: String,
    /// Empty means GET, POST, PUT, PATCH and DELETE
    #[serde(default)]
    pub methods: Vec<String>,
    /// Endpoint origin policy as a header map
    #[serde(default)]
    pub cors: Option<BTreeMap<String, String>>,
    /// Never send CORS headers for this route
    #[serde(default)]
    pub cors_disabled: bool,
    /// Handler answering OPTIONS instead of the synthesized response
    #[serde(default)]
    pub options: Option<String>,
}

/// A router and, recursively, its children
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RouterConfig {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub canonical_host: Option<String>,
    #[serde(default)]
    pub path_prefix: Option<String>,
    #[serde(default)]
    pub canonical_prefix: Option<String>,
    /// Default origin policy for this router's subtree
    #[serde(default)]
    pub cors: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub routes: Vec<RouteConfig>,
    #[serde(default)]
    pub routers: Vec<RouterConfig>,
}

/// A route table file describes the root router
pub type RouteTable = RouterConfig;

/// Serialization format of a route table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Yaml,
    Toml,
    Json,
}

impl TableFormat {
    /// Pick the format from the file extension; anything unknown is YAML.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("toml") => TableFormat::Toml,
            Some("json") => TableFormat::Json,
            _ => TableFormat::Yaml,
        }
    }
}

impl RouterConfig {
    /// Parse a route table from text.
    pub fn parse(content: &str, format: TableFormat) -> Result<Self> {
        let table: Self = match format {
            TableFormat::Yaml => {
                serde_yaml::from_str(content).context("Failed to parse YAML route table")?
            }
            TableFormat::Toml => toml::from_str(content).context("Failed to parse TOML route table")?,
            TableFormat::Json => {
                serde_json::from_str(content).context("Failed to parse JSON route table")?
            }
        };
        Ok(table)
    }

    /// Number of routes in this router and all nested routers
    #[must_use]
    pub fn route_count(&self) -> usize {
        self.routes.len() + self.routers.iter().map(RouterConfig::route_count).sum::<usize>()
    }

    /// Build a router tree with this configuration at the root.
    pub fn build(&self) -> Result<RouterTree<String>, RouteError> {
        let mut tree = RouterTree::new();
        let root = tree.root();
        self.apply(&mut tree, root)?;
        Ok(tree)
    }

    /// Configure router `id` of `tree` from this configuration, creating
    /// and mounting nested routers.
    pub fn apply(&self, tree: &mut RouterTree<String>, id: RouterId) -> Result<(), RouteError> {
        if let Some(host) = &self.host {
            tree.set_host(id, host, self.canonical_host.as_deref())?;
        }
        if let Some(prefix) = &self.path_prefix {
            tree.set_path_prefix(id, prefix, self.canonical_prefix.as_deref())?;
        }
        if let Some(cors) = &self.cors {
            tree.set_cors(id, OriginPolicy::from_headers(cors)?)?;
        }

        for route in &self.routes {
            tree.handle(
                id,
                &route.pattern,
                route.handler.clone(),
                route.methods.as_slice(),
            )?;
            if route.cors_disabled {
                tree.set_route_cors(id, &route.pattern, CorsPolicy::Disabled)?;
            } else if let Some(cors) = &route.cors {
                tree.set_route_cors(id, &route.pattern, CorsPolicy::from_headers(cors)?)?;
            }
            if let Some(options) = &route.options {
                tree.set_options_responder(id, &route.pattern, options.clone())?;
            }
        }

        for (i, child) in self.routers.iter().enumerate() {
            let name = match &child.name {
                Some(name) => name.clone(),
                None => format!("router{}", i),
            };
            let child_id = tree.sub_router(id, &name)?;
            child.apply(tree, child_id)?;
        }
        Ok(())
    }
}

/// Read and parse a route table file.
pub fn load_route_table<P: AsRef<Path>>(path: P) -> Result<RouteTable> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read route table {}", path.display()))?;
    RouteTable::parse(&content, TableFormat::from_path(path))
        .with_context(|| format!("Invalid route table {}", path.display()))
}

/// Read a route table file and build its router tree.
pub fn build_route_tree<P: AsRef<Path>>(path: P) -> Result<RouterTree<String>> {
    let path = path.as_ref();
    let table = load_route_table(path)?;
    let tree = table
        .build()
        .with_context(|| format!("Failed to build routes from {}", path.display()))?;
    info!(
        path = %path.display(),
        routes_count = table.route_count(),
        "Route table loaded"
    );
    Ok(tree)
}

use crate::config::build_route_tree;
use crate::hot_reload::{watch_route_table, SharedRouter};
use crate::request::RouteRequest;
use crate::router::{Negotiation, RouteInfo, RouterTree};
use crate::runtime_config::RuntimeConfig;
use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use http::header::{HeaderValue, ORIGIN};
use http::Method;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// Command-line interface for canopy
///
/// Inspects route tables: lists routes, resolves sample requests and
/// validates tables before they are deployed.
#[derive(Parser)]
#[command(name = "canopy")]
#[command(about = "canopy route table tool", long_about = None)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// List every route of a route table
    Routes {
        /// Route table (YAML, TOML or JSON); defaults to CANOPY_ROUTE_TABLE
        #[arg(short, long)]
        table: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Resolve one request against a route table and print the outcome as JSON
    Resolve {
        /// Route table (YAML, TOML or JSON); defaults to CANOPY_ROUTE_TABLE
        #[arg(short, long)]
        table: Option<PathBuf>,

        /// Request method
        #[arg(short, long, default_value = "GET")]
        method: String,

        /// Request host
        #[arg(long)]
        host: Option<String>,

        /// Value of the Origin header
        #[arg(long)]
        origin: Option<String>,

        /// Request path
        path: String,
    },
    /// Parse and build a route table, failing on the first error
    Check {
        /// Route table (YAML, TOML or JSON); defaults to CANOPY_ROUTE_TABLE
        #[arg(short, long)]
        table: Option<PathBuf>,
    },
    /// Watch a route table and log every successful reload
    Watch {
        /// Route table (YAML, TOML or JSON); defaults to CANOPY_ROUTE_TABLE
        #[arg(short, long)]
        table: Option<PathBuf>,
    },
}

/// Output format of `routes`
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// JSON view of one route
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct RouteRow {
    pub router: usize,
    pub mount_path: String,
    pub host: String,
    pub path_prefix: String,
    pub pattern: String,
    pub methods: Vec<String>,
}

impl From<&RouteInfo> for RouteRow {
    fn from(info: &RouteInfo) -> Self {
        Self {
            router: info.router.index(),
            mount_path: info.mount_path.clone(),
            host: info.host.clone(),
            path_prefix: info.path_prefix.clone(),
            pattern: info.pattern.clone(),
            methods: info.methods.iter().map(ToString::to_string).collect(),
        }
    }
}

/// Outcome of resolving one request, as printed by `resolve`
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct ResolveReport {
    pub matched: bool,
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub router: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mount_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handler: Option<String>,
    pub params: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remainder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subdomain: Option<String>,
    pub headers: BTreeMap<String, String>,
}

impl ResolveReport {
    fn not_found() -> Self {
        Self {
            matched: false,
            status: 404,
            router: None,
            mount_path: None,
            pattern: None,
            handler: None,
            params: BTreeMap::new(),
            remainder: None,
            extension: None,
            subdomain: None,
            headers: BTreeMap::new(),
        }
    }
}

/// Resolve and negotiate `request` against `tree`.
#[must_use]
pub fn resolve_report(tree: &RouterTree<String>, request: &RouteRequest) -> ResolveReport {
    let Some(resolved) = tree.resolve(request) else {
        return ResolveReport::not_found();
    };
    let negotiation = tree.handle_headers(&resolved, request);
    let handler = match &negotiation {
        Negotiation::Dispatch { handler, .. } | Negotiation::Options { handler, .. } => {
            Some((*handler).clone())
        }
        Negotiation::Served { .. } | Negotiation::MethodNotAllowed { .. } => None,
    };
    let headers = negotiation
        .headers()
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect();
    let mount_path = tree
        .routes()
        .into_iter()
        .find(|r| r.router == resolved.router)
        .map(|r| r.mount_path);

    ResolveReport {
        matched: true,
        status: negotiation.status().as_u16(),
        router: Some(resolved.router.index()),
        mount_path,
        pattern: Some(resolved.endpoint.pattern().to_string()),
        handler,
        params: resolved.path_params_map().into_iter().collect(),
        remainder: Some(resolved.remainder.clone()),
        extension: resolved.extension.clone(),
        subdomain: Some(resolved.subdomain.clone()).filter(|s| !s.is_empty()),
        headers,
    }
}

/// Build the request described by the `resolve` arguments.
pub fn build_request(
    method: &str,
    host: Option<&str>,
    origin: Option<&str>,
    path: &str,
) -> Result<RouteRequest> {
    let method = Method::from_bytes(method.to_ascii_uppercase().as_bytes())
        .with_context(|| format!("Invalid method {method}"))?;
    let mut request = RouteRequest::new(method, path);
    if let Some(host) = host {
        request = request.with_host(host);
    }
    if let Some(origin) = origin {
        let value = HeaderValue::from_str(origin)
            .with_context(|| format!("Invalid Origin header {origin}"))?;
        request = request.with_header(ORIGIN, value);
    }
    Ok(request)
}

/// Text table of routes, one per line
#[must_use]
pub fn format_routes(routes: &[RouteInfo]) -> String {
    let mut out = String::new();
    for route in routes {
        let methods: Vec<String> = route.methods.iter().map(ToString::to_string).collect();
        let host = if route.host.is_empty() { "*" } else { route.host.as_str() };
        out.push_str(&format!(
            "{:<24} {:<32} {:<16} {}\n",
            route.mount_path,
            host,
            format!("{}{}", route.path_prefix, route.pattern),
            methods.join(",")
        ));
    }
    out
}

fn table_path(table: Option<&Path>, runtime: &RuntimeConfig) -> Result<PathBuf> {
    table
        .map(Path::to_path_buf)
        .or_else(|| runtime.route_table.clone())
        .ok_or_else(|| anyhow!("No route table given: pass --table or set CANOPY_ROUTE_TABLE"))
}

fn load_tree(path: &Path, runtime: &RuntimeConfig) -> Result<RouterTree<String>> {
    let mut tree = build_route_tree(path)?;
    tree.set_slow_match_threshold(runtime.slow_match);
    Ok(tree)
}

/// Parse the command line and run the selected command.
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    let runtime = RuntimeConfig::from_env();
    run_command(&cli.command, &runtime)
}

/// Run `command`, printing its output to stdout.
pub fn run_command(command: &Commands, runtime: &RuntimeConfig) -> Result<()> {
    match command {
        Commands::Routes { table, format } => {
            let path = table_path(table.as_deref(), runtime)?;
            let tree = load_tree(&path, runtime)?;
            let routes = tree.routes();
            match format {
                OutputFormat::Text => print!("{}", format_routes(&routes)),
                OutputFormat::Json => {
                    let rows: Vec<RouteRow> = routes.iter().map(RouteRow::from).collect();
                    println!("{}", serde_json::to_string_pretty(&rows)?);
                }
            }
            Ok(())
        }
        Commands::Resolve {
            table,
            method,
            host,
            origin,
            path,
        } => {
            let table = table_path(table.as_deref(), runtime)?;
            let tree = load_tree(&table, runtime)?;
            let request = build_request(method, host.as_deref(), origin.as_deref(), path)?;
            let report = resolve_report(&tree, &request);
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
        Commands::Check { table } => {
            let path = table_path(table.as_deref(), runtime)?;
            let tree = load_tree(&path, runtime)?;
            tree.log_summary();
            println!("{}: {} routes OK", path.display(), tree.routes().len());
            Ok(())
        }
        Commands::Watch { table } => {
            let path = table_path(table.as_deref(), runtime)?;
            let tree = load_tree(&path, runtime)?;
            tree.log_summary();
            let shared = Arc::new(SharedRouter::new(tree));
            let _watcher = watch_route_table(&path, Arc::clone(&shared), move |tree| {
                tree.log_summary();
            })?;
            info!(path = %path.display(), "Watching route table");
            loop {
                std::thread::park();
            }
        }
    }
}

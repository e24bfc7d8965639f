//! # CLI Module
//!
//! Command-line tooling for route tables.
//!
//! ## Commands
//!
//! ### `routes`
//!
//! List every route with its mount path, host and full path:
//!
//! ```bash
//! canopy routes --table routes.yaml
//! canopy routes --table routes.yaml --format json
//! ```
//!
//! ### `resolve`
//!
//! Resolve one request and print the matched endpoint, captured parameters
//! and negotiated response headers as JSON:
//!
//! ```bash
//! canopy resolve --table routes.yaml --method OPTIONS \
//!     --host api.example.com --origin https://app.example.com /v1/users/42
//! ```
//!
//! ### `check`
//!
//! Parse and build a route table, exiting non-zero on the first error.
//!
//! ### `watch`
//!
//! Keep a route table loaded and log every reload.
//!
//! `--table` defaults to `CANOPY_ROUTE_TABLE` for every command.

mod commands;


pub use commands::{
    build_request, format_routes, resolve_report, run_cli, run_command, Cli, Commands,
    OutputFormat, ResolveReport, RouteRow,
};

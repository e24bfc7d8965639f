//! # Runtime Configuration Module
//!
//! Environment variable based configuration for the `canopy` binary and for
//! embedders that want the same knobs.
//!
//! ## Environment Variables
//!
//! ### `CANOPY_ROUTE_TABLE`
//!
//! Route table used when no `--table` argument is given.
//!
//! ### `CANOPY_SLOW_MATCH_US`
//!
//! Resolutions slower than this many microseconds are logged at WARN.
//! Default: `1000`
//!
//! ## Usage
//!
//! ```rust
//! use canopy::runtime_config::RuntimeConfig;
//!
//! let config = RuntimeConfig::from_env();
//! println!("Slow match threshold: {:?}", config.slow_match);
//! ```

use std::env;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_SLOW_MATCH_US: u64 = 1000;

/// Runtime configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Default route table path
    pub route_table: Option<PathBuf>,
    /// Slow resolution warning threshold
    pub slow_match: Duration,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            route_table: None,
            slow_match: Duration::from_micros(DEFAULT_SLOW_MATCH_US),
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through `lookup` instead of the process environment.
    ///
    /// Unparseable values fall back to the defaults.
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let route_table = lookup("CANOPY_ROUTE_TABLE")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);
        let slow_match_us = lookup("CANOPY_SLOW_MATCH_US")
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(DEFAULT_SLOW_MATCH_US);
        RuntimeConfig {
            route_table,
            slow_match: Duration::from_micros(slow_match_us),
        }
    }
}

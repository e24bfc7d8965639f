//! # Hot Reload Module
//!
//! Live reloading of a route table without restarting the process.
//!
//! ## Overview
//!
//! [`SharedRouter`] holds the current [`RouterTree`] behind an `ArcSwap`:
//! readers take a cheap snapshot per request and never block, writers swap in
//! a whole new tree. [`watch_route_table`] watches a route table file and,
//! on every change:
//!
//! 1. Rebuilds the tree from the file
//! 2. Swaps it into the shared router
//! 3. Calls the reload hook with the new tree
//!
//! ## Error Handling
//!
//! If the new table fails to parse or build, the error is logged and the
//! previous tree stays active.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use canopy::config::build_route_tree;
//! use canopy::hot_reload::{watch_route_table, SharedRouter};
//! use std::sync::Arc;
//!
//! let shared = Arc::new(SharedRouter::new(build_route_tree("routes.yaml")?));
//! let _watcher = watch_route_table("routes.yaml", shared.clone(), |tree| {
//!     println!("Reloaded {} routes", tree.routes().len());
//! })?;
//! # Ok::<(), anyhow::Error>(())
//! ```

use arc_swap::ArcSwap;
use notify::{Config, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::config;
use crate::router::RouterTree;

/// A router tree that can be replaced while requests are being resolved
pub struct SharedRouter<H> {
    current: ArcSwap<RouterTree<H>>,
}

impl<H> SharedRouter<H> {
    #[must_use]
    pub fn new(tree: RouterTree<H>) -> Self {
        Self {
            current: ArcSwap::from_pointee(tree),
        }
    }

    /// Snapshot of the current tree. In-flight requests keep the snapshot
    /// they started with.
    #[must_use]
    pub fn load(&self) -> Arc<RouterTree<H>> {
        self.current.load_full()
    }

    /// Replace the current tree.
    pub fn store(&self, tree: RouterTree<H>) {
        self.current.store(Arc::new(tree));
    }
}

impl<H> std::fmt::Debug for SharedRouter<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedRouter").finish_non_exhaustive()
    }
}

/// Watch a route table and swap a rebuilt [`RouterTree`] into `shared`
/// whenever the file changes.
///
/// `on_reload` runs after each successful swap. The watcher stops when the
/// returned handle is dropped.
pub fn watch_route_table<P, F>(
    table_path: P,
    shared: Arc<SharedRouter<String>>,
    mut on_reload: F,
) -> notify::Result<RecommendedWatcher>
where
    P: AsRef<Path>,
    F: FnMut(&RouterTree<String>) + Send + 'static,
{
    let path: PathBuf = table_path.as_ref().to_path_buf();
    let watch_path = path.clone();

    let mut watcher = RecommendedWatcher::new(
        move |res: Result<notify::Event, notify::Error>| match res {
            Ok(event) => {
                if !matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) {
                    return;
                }
                match config::build_route_tree(&watch_path) {
                    Ok(tree) => {
                        info!(
                            path = %watch_path.display(),
                            routes_count = tree.routes().len(),
                            "hot-reload: route table applied"
                        );
                        shared.store(tree);
                        on_reload(&shared.load());
                    }
                    Err(e) => warn!(
                        path = %watch_path.display(),
                        error = %format!("{e:#}"),
                        "hot-reload: keeping previous routes"
                    ),
                }
            }
            Err(e) => error!(error = %e, "hot-reload: watch error"),
        },
        Config::default(),
    )?;

    watcher.watch(&path, RecursiveMode::NonRecursive)?;
    Ok(watcher)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::RouteRequest;
    use http::Method;

    #[test]
    fn test_store_replaces_snapshot() {
        let mut first = RouterTree::new();
        let root = first.root();
        first.handle(root, "/a", "a", &["GET"]).unwrap();
        let shared = SharedRouter::new(first);

        let before = shared.load();
        let mut second = RouterTree::new();
        let root = second.root();
        second.handle(root, "/b", "b", &["GET"]).unwrap();
        shared.store(second);

        let req = RouteRequest::new(Method::GET, "/a");
        assert!(before.resolve(&req).is_some());
        assert!(shared.load().resolve(&req).is_none());
        assert!(shared
            .load()
            .resolve(&RouteRequest::new(Method::GET, "/b"))
            .is_some());
    }
}

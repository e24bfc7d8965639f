#![allow(clippy::unwrap_used, clippy::expect_used)]

use canopy::config::build_route_tree;
use canopy::hot_reload::{watch_route_table, SharedRouter};
use canopy::RouteRequest;
use http::Method;
use std::io::Write;
use std::sync::{Arc, Mutex};
use std::time::Duration;

mod common;
use common::temp_files;

const TABLE_V1: &str = r#"
routes:
  - pattern: /foo
    handler: foo_one
    methods: [GET]
"#;

const TABLE_V2: &str = r#"
routes:
  - pattern: /foo
    handler: foo_two
    methods: [GET]
  - pattern: /bar
    handler: bar
    methods: [GET]
"#;

fn handler_for(shared: &SharedRouter<String>, path: &str) -> Option<String> {
    let tree = shared.load();
    let req = RouteRequest::new(Method::GET, path);
    tree.resolve(&req)
        .and_then(|resolved| resolved.handler(&Method::GET).cloned())
}

fn wait_for<F: Fn() -> bool>(condition: F) -> bool {
    for _ in 0..40 {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(50));
    }
    condition()
}

#[test]
fn test_watch_route_table_reload() {
    let path = temp_files::create_temp_yaml(TABLE_V1);
    let shared = Arc::new(SharedRouter::new(build_route_tree(&path).unwrap()));
    assert_eq!(handler_for(&shared, "/foo").as_deref(), Some("foo_one"));

    let updates: Arc<Mutex<Vec<usize>>> = Arc::new(Mutex::new(Vec::new()));
    let updates_clone = Arc::clone(&updates);
    let watcher = watch_route_table(&path, Arc::clone(&shared), move |tree| {
        updates_clone.lock().unwrap().push(tree.routes().len());
    })
    .expect("watch_route_table");

    // allow watcher thread to start
    std::thread::sleep(Duration::from_millis(100));
    std::fs::write(&path, TABLE_V2).unwrap();

    assert!(wait_for(|| handler_for(&shared, "/bar").is_some()));
    assert_eq!(handler_for(&shared, "/foo").as_deref(), Some("foo_two"));
    assert!(updates.lock().unwrap().contains(&2));

    drop(watcher);
    temp_files::cleanup_temp_files(&[path]);
}

#[test]
fn test_invalid_table_keeps_previous_routes() {
    let path = temp_files::create_temp_yaml(TABLE_V1);
    let shared = Arc::new(SharedRouter::new(build_route_tree(&path).unwrap()));
    let watcher = watch_route_table(&path, Arc::clone(&shared), |_| {}).unwrap();
    std::thread::sleep(Duration::from_millis(100));

    // Append so the file never passes through an empty state.
    let mut file = std::fs::OpenOptions::new().append(true).open(&path).unwrap();
    file.write_all(b"  - pattern: /foo/{broken\n    handler: x\n").unwrap();
    drop(file);
    std::thread::sleep(Duration::from_millis(500));
    assert_eq!(handler_for(&shared, "/foo").as_deref(), Some("foo_one"));

    std::fs::write(&path, TABLE_V2).unwrap();
    assert!(wait_for(|| handler_for(&shared, "/foo").as_deref() == Some("foo_two")));

    drop(watcher);
    temp_files::cleanup_temp_files(&[path]);
}

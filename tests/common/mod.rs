#![allow(dead_code)]

pub mod temp_files {
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::{SystemTime, UNIX_EPOCH};

    // Global counter and lock for thread-safe temporary file creation
    static TEMP_COUNTER: AtomicUsize = AtomicUsize::new(0);
    static TEMP_LOCK: Mutex<()> = Mutex::new(());

    /// Creates a temporary route table with a unique name
    pub fn create_temp_table(content: &str, ext: &str) -> PathBuf {
        let _lock = TEMP_LOCK.lock().unwrap();
        let counter = TEMP_COUNTER.fetch_add(1, Ordering::SeqCst);
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();

        let path = std::env::temp_dir().join(format!(
            "canopy_test_{}_{}_{}.{}",
            std::process::id(),
            counter,
            nanos,
            ext
        ));

        std::fs::write(&path, content).unwrap();
        path
    }

    pub fn create_temp_yaml(content: &str) -> PathBuf {
        create_temp_table(content, "yaml")
    }

    /// Cleanup temporary files (best effort)
    pub fn cleanup_temp_files(paths: &[PathBuf]) {
        for path in paths {
            let _ = std::fs::remove_file(path);
        }
    }
}

pub mod requests {
    use canopy::RouteRequest;
    use http::header::{HeaderName, HeaderValue, ORIGIN};
    use http::Method;

    pub fn get(path: &str) -> RouteRequest {
        RouteRequest::new(Method::GET, path)
    }

    pub fn at_host(method: Method, host: &str, path: &str) -> RouteRequest {
        RouteRequest::new(method, path).with_host(host)
    }

    pub fn with_origin(request: RouteRequest, origin: &str) -> RouteRequest {
        header(request, ORIGIN, origin)
    }

    pub fn header(request: RouteRequest, name: HeaderName, value: &str) -> RouteRequest {
        request.with_header(name, HeaderValue::from_str(value).unwrap())
    }
}

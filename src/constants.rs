//! Application constants
//!
//! Centralized location for magic strings and configuration defaults.

/// Key under which the request history is persisted
pub const HISTORY_KEY: &str = "postman-history";

/// Default number of history entries kept
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

/// Timeout applied by the privileged transport
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Origin the sandboxed transport pretends to be served from
pub const DEFAULT_SANDBOX_ORIGIN: &str = "http://localhost:5173";

/// Directory name (under the home directory) holding config, history and logs
pub const DATA_DIR_NAME: &str = ".hermes";

/// Environment variable overriding the data directory
pub const DATA_DIR_ENV: &str = "HERMES_HOME";

pub const CONFIG_FILE: &str = "config.yaml";
pub const LOG_FILE: &str = "hermes.log";

/// statusText recorded when the transport could not complete
pub const FAILED_STATUS_TEXT: &str = "Request Failed";

/// Application name
pub const APP_NAME: &str = "Hermes";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Sample requests offered as shortcuts: (label, method, url, body)
pub const EXAMPLE_REQUESTS: &[(&str, &str, &str, &str)] = &[
    ("List posts", "GET", "https://jsonplaceholder.typicode.com/posts", ""),
    ("Get post #1", "GET", "https://jsonplaceholder.typicode.com/posts/1", ""),
    (
        "Create post",
        "POST",
        "https://jsonplaceholder.typicode.com/posts",
        "{\n  \"title\": \"foo\",\n  \"body\": \"bar\",\n  \"userId\": 1\n}",
    ),
    ("Echo headers", "GET", "https://httpbin.org/headers", ""),
];

//! Client configuration.

use std::path::PathBuf;
use std::time::Duration;

/// Default backend base URL.
const DEFAULT_API_URL: &str = "http://localhost:8000";
/// Default delay between job status polls.
const DEFAULT_POLL_INTERVAL_MS: u64 = 2000;
/// Default delay between concurrency-limit snapshots.
const DEFAULT_LIMITS_INTERVAL_MS: u64 = 15_000;

/// Runtime configuration for the client stack.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend base URL, without a trailing slash.
    pub base_url: String,
    /// Delay between job status polls.
    pub poll_interval: Duration,
    /// Delay between concurrency-limit snapshots.
    pub limits_interval: Duration,
    /// Directory for credential persistence. `None` means no storage
    /// medium is available and credentials live in memory only.
    pub token_dir: Option<PathBuf>,
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// | Env Var                     | Required | Default                 |
    /// |-----------------------------|----------|-------------------------|
    /// | `PIXORA_API_URL`            | no       | `http://localhost:8000` |
    /// | `PIXORA_POLL_INTERVAL_MS`   | no       | `2000`                  |
    /// | `PIXORA_LIMITS_INTERVAL_MS` | no       | `15000`                 |
    /// | `PIXORA_TOKEN_DIR`          | no       | unset = in-memory only  |
    pub fn from_env() -> Self {
        let base_url = std::env::var("PIXORA_API_URL")
            .unwrap_or_else(|_| DEFAULT_API_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let poll_interval_ms: u64 = std::env::var("PIXORA_POLL_INTERVAL_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_POLL_INTERVAL_MS);

        let limits_interval_ms: u64 = std::env::var("PIXORA_LIMITS_INTERVAL_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_LIMITS_INTERVAL_MS);

        let token_dir = std::env::var("PIXORA_TOKEN_DIR").ok().map(PathBuf::from);

        Self {
            base_url,
            poll_interval: Duration::from_millis(poll_interval_ms),
            limits_interval: Duration::from_millis(limits_interval_ms),
            token_dir,
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            limits_interval: Duration::from_millis(DEFAULT_LIMITS_INTERVAL_MS),
            token_dir: None,
        }
    }
}

//! Shared HTTP client construction.

use std::time::Duration;

/// Default timeout for remote API requests (5 minutes).
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Build a reqwest client with the given timeout.
pub fn build_client(timeout: Duration) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("voxdoc/", env!("CARGO_PKG_VERSION")))
        .build()
}

/// Read an API key from the named environment variable, ignoring blank values.
pub fn api_key_from_env(var: &str) -> Option<String> {
    std::env::var(var)
        .ok()
        .map(|key| key.trim().to_string())
        .filter(|key| !key.is_empty())
}

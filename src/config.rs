use std::time::Duration;

pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Runtime settings, read from `DESKBOOK_*` environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub backend_url: String,
    pub timeout: Duration,
    pub metrics_port: Option<u16>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.into(),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            metrics_port: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unparsable values fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let backend_url =
            lookup("DESKBOOK_BACKEND_URL").unwrap_or_else(|| DEFAULT_BACKEND_URL.into());
        let timeout_ms: u64 = lookup("DESKBOOK_TIMEOUT_MS")
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_MS);
        let metrics_port: Option<u16> =
            lookup("DESKBOOK_METRICS_PORT").and_then(|s| s.parse().ok());
        Self {
            backend_url,
            timeout: Duration::from_millis(timeout_ms),
            metrics_port,
        }
    }
}

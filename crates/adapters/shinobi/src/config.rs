//! Monitoring endpoint configuration.

use std::time::Duration;

use serde::Deserialize;

/// Where and how long to wait when notifying the monitoring endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ShinobiConfig {
    /// Base URL of the monitoring service (e.g. `http://127.0.0.1:8080`).
    pub base_url: String,
    /// Per-request timeout in milliseconds.
    pub timeout_ms: u64,
}

impl ShinobiConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for ShinobiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080".to_string(),
            timeout_ms: 3000,
        }
    }
}

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Runtime configuration for the orchestration core.
///
/// Defaults match the documented deployment: a session provider reachable
/// through the local gateway with the provider API on port 40080, and a 30s
/// health sweep over registered execution servers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Base URL of the gateway exposing the session-provider API.
    pub provider_url: String,
    /// Port the session provider itself listens on, passed through as a query
    /// parameter on every provider call.
    pub provider_port: u16,
    /// Bearer token presented to execution servers.
    pub server_token: String,
    /// Delay applied before and after a session start request to tolerate
    /// provider-side latency.
    pub settle_delay_ms: u64,
    /// Attempts when verifying a session reached an active status.
    pub verify_attempts: u32,
    /// Delay between verification attempts.
    pub verify_backoff_ms: u64,
    /// Interval between execution-server health sweeps.
    pub health_interval_secs: u64,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            provider_url: "http://localhost:3001".to_string(),
            provider_port: 40080,
            server_token: String::new(),
            settle_delay_ms: 1000,
            verify_attempts: 5,
            verify_backoff_ms: 500,
            health_interval_secs: 30,
        }
    }
}

impl RunnerConfig {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn verify_backoff(&self) -> Duration {
        Duration::from_millis(self.verify_backoff_ms)
    }

    pub fn health_interval(&self) -> Duration {
        Duration::from_secs(self.health_interval_secs)
    }
}

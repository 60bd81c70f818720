//! Remote session lifecycle management.
//!
//! Talks to the session-provider API to list, start and stop managed browser
//! sessions, allocates debug ports, and keeps the durable port cache in sync
//! so later execution phases can recover a live session's port without
//! re-querying the provider.

use super::cache::PortCache;
use crate::config::RunnerConfig;
use crate::engine::retry::{RetryPolicy, retry};
use crate::models::{ProviderSession, SessionStatus};
use rand::RngExt;
use serde_json::{Value, json};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Ephemeral range debug ports are drawn from. One range for every call
/// site; the band above 32000 stays clear of registered ports.
pub const DEBUG_PORT_MIN: u16 = 32000;
pub const DEBUG_PORT_MAX: u16 = 65535;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session provider request failed: {0}")]
    Provider(#[from] reqwest::Error),
    #[error("failed to start session {session_id}: {reason}")]
    StartRejected { session_id: String, reason: String },
    #[error("session {session_id} failed to start (status: {status:?})")]
    FailedToStart {
        session_id: String,
        status: SessionStatus,
    },
    #[error("failed to stop session {session_id}: {reason}")]
    StopRejected { session_id: String, reason: String },
    #[error(transparent)]
    Cache(#[from] anyhow::Error),
}

pub struct SessionManager {
    client: reqwest::Client,
    base_url: String,
    provider_port: u16,
    verify: RetryPolicy,
    cache: Arc<dyn PortCache>,
}

impl SessionManager {
    pub fn new(config: &RunnerConfig, cache: Arc<dyn PortCache>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.provider_url.trim_end_matches('/').to_string(),
            provider_port: config.provider_port,
            verify: RetryPolicy {
                attempts: config.verify_attempts,
                backoff: config.verify_backoff(),
            },
            cache,
        }
    }

    /// Whether a reported status means the session can run automation.
    pub fn is_session_active(status: SessionStatus) -> bool {
        status.is_active()
    }

    /// List sessions known to the provider.
    pub async fn list_sessions(&self) -> Result<Vec<ProviderSession>, SessionError> {
        let response = self
            .client
            .get(self.endpoint(""))
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }

    /// Current status of one session. Probe failures read as `Unknown`, a
    /// session missing from the listing as `Stopped`.
    pub async fn session_status(&self, session_id: &str) -> SessionStatus {
        match self.list_sessions().await {
            Ok(sessions) => sessions
                .iter()
                .find(|s| s.uuid == session_id)
                .map(|s| s.status)
                .unwrap_or(SessionStatus::Stopped),
            Err(err) => {
                warn!(session_id, error = %err, "Failed to check session status");
                SessionStatus::Unknown
            }
        }
    }

    /// Start a session and return its debug port.
    ///
    /// Idempotent: a session already running keeps its cached port and no
    /// second start request is issued. `Ok(None)` means the session is active
    /// but no port is known for it.
    pub async fn start_session(&self, session_id: &str) -> Result<Option<u16>, SessionError> {
        let status = self.session_status(session_id).await;
        if status.is_active() {
            let cached = self.cache.get(session_id)?;
            match cached {
                Some(port) => debug!(session_id, port, "Session already running, reusing port"),
                None => warn!(session_id, "Session running but no cached debug port"),
            }
            return Ok(cached);
        }

        let debug_port = generate_debug_port();
        info!(session_id, debug_port, "Starting session");

        let response = self
            .client
            .post(self.endpoint("/start"))
            .json(&json!({
                "uuid": session_id,
                "headless": false,
                "debug_port": debug_port,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            let reason = response.text().await.unwrap_or_default();
            return Err(SessionError::StartRejected {
                session_id: session_id.to_string(),
                reason,
            });
        }

        // The provider may assign a different port than the one requested.
        let port = response
            .json::<Value>()
            .await
            .ok()
            .and_then(|v| v.get("port").and_then(Value::as_u64))
            .map(|p| p as u16)
            .unwrap_or(debug_port);

        self.verify_started(session_id).await?;

        self.cache.set(session_id, port)?;
        info!(session_id, port, "Session started");
        Ok(Some(port))
    }

    /// Stop a session. The cached port is cleared even when the remote stop
    /// call fails, so a stale mapping can never outlive the session.
    pub async fn stop_session(&self, session_id: &str) -> Result<(), SessionError> {
        if let Err(err) = self.cache.clear(session_id) {
            warn!(session_id, error = %err, "Failed to clear cached session port");
        }

        let response = self
            .client
            .post(self.endpoint("/stop"))
            .json(&json!({ "uuid": session_id }))
            .send()
            .await?;

        if !response.status().is_success() {
            let reason = response.text().await.unwrap_or_default();
            warn!(session_id, %reason, "Session stop request failed");
            return Err(SessionError::StopRejected {
                session_id: session_id.to_string(),
                reason,
            });
        }

        info!(session_id, "Session stopped");
        Ok(())
    }

    /// Poll until the session reports an active status.
    async fn verify_started(&self, session_id: &str) -> Result<(), SessionError> {
        retry(self.verify, || async move {
            let status = self.session_status(session_id).await;
            if status.is_active() {
                Ok(())
            } else {
                Err(SessionError::FailedToStart {
                    session_id: session_id.to_string(),
                    status,
                })
            }
        })
        .await
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/linken-sphere/sessions{}?port={}",
            self.base_url, path, self.provider_port
        )
    }
}

fn generate_debug_port() -> u16 {
    rand::rng().random_range(DEBUG_PORT_MIN..=DEBUG_PORT_MAX)
}

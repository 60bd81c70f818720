//! Execution server registry and health checks.
//!
//! A server is bound once through its `/register` endpoint, then swept
//! periodically via `/health`. A failed probe marks the record inactive; it
//! is never an error.

use crate::storage::Storage;
use anyhow::{Context, Result};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

pub struct ServerRegistry {
    client: reqwest::Client,
    storage: Arc<Storage>,
}

impl ServerRegistry {
    pub fn new(storage: Arc<Storage>) -> Self {
        Self {
            client: reqwest::Client::new(),
            storage,
        }
    }

    /// Bind a new execution server: exchange the token for a server id and
    /// persist the record.
    pub async fn register(
        &self,
        url: &str,
        name: Option<&str>,
        token: &str,
    ) -> Result<crate::models::Server> {
        let base = url.trim_end_matches('/');
        let response = self
            .client
            .post(format!("{base}/register"))
            .json(&json!({ "token": token }))
            .send()
            .await
            .context("Failed to reach server for registration")?
            .error_for_status()
            .context("Failed to register server")?;

        let body: Value = response.json().await?;
        let server_id = body
            .get("serverId")
            .and_then(Value::as_str)
            .ok_or_else(|| anyhow::anyhow!("Register response missing serverId"))?;

        let server = crate::models::Server::new(server_id, name, base);
        self.storage.servers.upsert_server(&server)?;

        info!(server_id, url = base, "Server registered");
        Ok(server)
    }

    /// Probe one server's `/health` endpoint and persist the outcome.
    pub async fn check_server(&self, server: &crate::models::Server) -> crate::models::Server {
        let success = match self
            .client
            .get(format!("{}/health", server.url))
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(err) => {
                debug!(server_id = %server.id, error = %err, "Server health probe failed");
                false
            }
        };

        let mut updated = server.clone();
        updated.record_check(success);
        if let Err(err) = self.storage.servers.upsert_server(&updated) {
            warn!(server_id = %server.id, error = %err, "Failed to persist server status");
        }

        updated
    }

    /// Probe every registered server.
    pub async fn check_all(&self) -> Result<Vec<crate::models::Server>> {
        let servers = self.storage.servers.list_servers()?;
        let mut updated = Vec::with_capacity(servers.len());
        for server in &servers {
            updated.push(self.check_server(server).await);
        }
        Ok(updated)
    }

    /// Spawn the periodic health sweep over all registered servers.
    pub fn spawn_monitor(self: &Arc<Self>, interval: Duration) -> tokio::task::JoinHandle<()> {
        let registry = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                if let Err(err) = registry.check_all().await {
                    error!(error = %err, "Server health sweep failed");
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn make_registry() -> (Arc<ServerRegistry>, Arc<Storage>, tempfile::TempDir) {
        let temp_dir = tempdir().unwrap();
        let db_path = temp_dir.path().join("test.db");
        let storage = Arc::new(Storage::new(db_path.to_str().unwrap()).unwrap());
        (Arc::new(ServerRegistry::new(storage.clone())), storage, temp_dir)
    }

    #[tokio::test]
    async fn test_register_persists_assigned_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/register"))
            .and(body_partial_json(json!({"token": "tkn"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"serverId": "srv-9"})))
            .expect(1)
            .mount(&server)
            .await;

        let (registry, storage, _tmp) = make_registry();

        let record = registry
            .register(&server.uri(), Some("local"), "tkn")
            .await
            .unwrap();
        assert_eq!(record.id, "srv-9");
        assert!(record.is_active);

        let stored = storage.servers.get_server("srv-9").unwrap();
        assert_eq!(stored.url, server.uri().trim_end_matches('/'));
    }

    #[tokio::test]
    async fn test_register_rejected_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/register"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let (registry, _storage, _tmp) = make_registry();
        let result = registry.register(&server.uri(), None, "bad").await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_failed_health_probe_marks_inactive() {
        let (registry, storage, _tmp) = make_registry();

        let record = crate::models::Server::new("srv-1", None, "http://127.0.0.1:1");
        storage.servers.upsert_server(&record).unwrap();

        let updated = registry.check_server(&record).await;
        assert!(!updated.is_active);
        assert!(!updated.last_status_check_success);

        let stored = storage.servers.get_server("srv-1").unwrap();
        assert!(!stored.is_active);
    }

    #[tokio::test]
    async fn test_check_all_probes_every_server() {
        let healthy = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
            .mount(&healthy)
            .await;

        let (registry, storage, _tmp) = make_registry();
        storage
            .servers
            .upsert_server(&crate::models::Server::new("up", None, &healthy.uri()))
            .unwrap();
        storage
            .servers
            .upsert_server(&crate::models::Server::new("down", None, "http://127.0.0.1:1"))
            .unwrap();

        let updated = registry.check_all().await.unwrap();
        assert_eq!(updated.len(), 2);

        let up = storage.servers.get_server("up").unwrap();
        let down = storage.servers.get_server("down").unwrap();
        assert!(up.is_active);
        assert!(!down.is_active);
    }
}

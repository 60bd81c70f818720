//! Typed server storage wrapper.

use crate::models::Server;
use anyhow::Result;
use botflow_storage::SimpleStore;
use redb::Database;
use std::sync::Arc;

pub struct ServerStorage {
    inner: botflow_storage::ServerStorage,
}

impl ServerStorage {
    pub fn new(db: Arc<Database>) -> Result<Self> {
        Ok(Self {
            inner: botflow_storage::ServerStorage::new(db)?,
        })
    }

    /// Insert or replace a server record
    pub fn upsert_server(&self, server: &Server) -> Result<()> {
        let json_bytes = serde_json::to_vec(server)?;
        self.inner.put_raw(&server.id, &json_bytes)
    }

    /// Get a server by ID
    pub fn get_server(&self, id: &str) -> Result<Server> {
        let bytes = self
            .inner
            .get_raw(id)?
            .ok_or_else(|| anyhow::anyhow!("Server {} not found", id))?;
        let server: Server = serde_json::from_slice(&bytes)?;
        Ok(server)
    }

    /// List all registered servers
    pub fn list_servers(&self) -> Result<Vec<Server>> {
        let raw_servers = self.inner.list_raw()?;
        let mut servers = Vec::new();
        for (_, bytes) in raw_servers {
            let server: Server = serde_json::from_slice(&bytes)?;
            servers.push(server);
        }
        Ok(servers)
    }

    /// Delete a server by ID
    pub fn delete_server(&self, id: &str) -> Result<()> {
        if !self.inner.delete(id)? {
            return Err(anyhow::anyhow!("Server not found"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_upsert_and_list() {
        let temp_dir = tempdir().unwrap();
        let db = Arc::new(Database::create(temp_dir.path().join("test.db")).unwrap());
        let storage = ServerStorage::new(db).unwrap();

        let mut server = Server::new("srv-1", Some("local"), "http://localhost:3001");
        storage.upsert_server(&server).unwrap();

        server.record_check(false);
        storage.upsert_server(&server).unwrap();

        let servers = storage.list_servers().unwrap();
        assert_eq!(servers.len(), 1);
        assert!(!servers[0].is_active);
    }
}

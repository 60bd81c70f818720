//! BotFlow Storage - low-level persistence layer
//!
//! This crate provides the persistence layer for BotFlow, using redb as the
//! embedded database. It exposes byte-level APIs so the orchestration crate
//! can layer its own models on top without circular dependencies.
//!
//! # Tables
//!
//! - `workflows` - Workflow definitions (node/edge graphs)
//! - `tasks` - Persisted task records with their status lifecycle
//! - `servers` - Registered execution server records
//! - `session_ports` - Durable session id -> debug port mappings

pub mod paths;
pub mod port_cache;
pub mod server;
pub mod simple_store;
pub mod task;
pub mod workflow;

pub use port_cache::PortCacheStorage;
pub use server::ServerStorage;
pub use simple_store::SimpleStore;
pub use task::TaskStorage;
pub use workflow::WorkflowStorage;

use anyhow::Result;
use redb::Database;
use std::sync::Arc;

/// Central storage manager that initializes all storage subsystems
pub struct Storage {
    db: Arc<Database>,
    pub workflows: WorkflowStorage,
    pub tasks: TaskStorage,
    pub servers: ServerStorage,
    pub ports: PortCacheStorage,
}

impl Storage {
    pub fn new(path: &str) -> Result<Self> {
        let db = Arc::new(Database::create(path)?);

        let workflows = WorkflowStorage::new(db.clone())?;
        let tasks = TaskStorage::new(db.clone())?;
        let servers = ServerStorage::new(db.clone())?;
        let ports = PortCacheStorage::new(db.clone())?;

        Ok(Self {
            db,
            workflows,
            tasks,
            servers,
            ports,
        })
    }

    pub fn get_db(&self) -> Arc<Database> {
        self.db.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_storage_initializes_all_tables() {
        let temp_dir = tempdir().unwrap();
        let db_path = temp_dir.path().join("test.db");
        let storage = Storage::new(db_path.to_str().unwrap()).unwrap();

        assert!(storage.workflows.list_raw().unwrap().is_empty());
        assert!(storage.tasks.list_raw().unwrap().is_empty());
        assert!(storage.servers.list_raw().unwrap().is_empty());
        assert!(storage.ports.get_port("nope").unwrap().is_none());
    }
}

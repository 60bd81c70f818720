//! Typed wrappers over the raw byte stores in botflow-storage.

pub mod server;
pub mod task;
pub mod workflow;

pub use server::ServerStorage;
pub use task::TaskStorage;
pub use workflow::WorkflowStorage;

use anyhow::Result;
use botflow_storage::PortCacheStorage;
use redb::Database;
use std::sync::Arc;

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

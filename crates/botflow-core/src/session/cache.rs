//! Durable port cache abstraction.
//!
//! The session manager and the execution coordinator both need the
//! session id -> debug port mapping, possibly from different processes. The
//! trait decouples them from the concrete store: redb in production, an
//! in-memory map in tests.

use anyhow::Result;
use std::collections::HashMap;
use std::sync::Mutex;

pub trait PortCache: Send + Sync {
    fn get(&self, session_id: &str) -> Result<Option<u16>>;
    fn set(&self, session_id: &str, port: u16) -> Result<()>;
    fn clear(&self, session_id: &str) -> Result<()>;
}

impl PortCache for botflow_storage::PortCacheStorage {
    fn get(&self, session_id: &str) -> Result<Option<u16>> {
        self.get_port(session_id)
    }

    fn set(&self, session_id: &str, port: u16) -> Result<()> {
        self.set_port(session_id, port)
    }

    fn clear(&self, session_id: &str) -> Result<()> {
        self.clear_port(session_id)?;
        Ok(())
    }
}

/// Process-local cache for tests and single-shot runs.
#[derive(Debug, Default)]
pub struct MemoryPortCache {
    ports: Mutex<HashMap<String, u16>>,
}

impl PortCache for MemoryPortCache {
    fn get(&self, session_id: &str) -> Result<Option<u16>> {
        Ok(self.ports.lock().expect("port cache lock").get(session_id).copied())
    }

    fn set(&self, session_id: &str, port: u16) -> Result<()> {
        self.ports
            .lock()
            .expect("port cache lock")
            .insert(session_id.to_string(), port);
        Ok(())
    }

    fn clear(&self, session_id: &str) -> Result<()> {
        self.ports.lock().expect("port cache lock").remove(session_id);
        Ok(())
    }
}

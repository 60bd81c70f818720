//! Durable session id -> debug port mappings.
//!
//! Once a session is started with a debug port, the mapping is cached here so
//! a later execution phase (possibly in a different process) can recover the
//! port without re-querying the session provider.

use crate::simple_store::{SimpleStore, ensure_table};
use anyhow::Result;
use redb::{Database, TableDefinition};
use std::sync::Arc;

const TABLE: TableDefinition<'static, &'static str, &'static [u8]> =
    TableDefinition::new("session_ports");

#[derive(Debug, Clone)]
pub struct PortCacheStorage {
    db: Arc<Database>,
}

impl PortCacheStorage {
    pub fn new(db: Arc<Database>) -> Result<Self> {
        ensure_table(&db, TABLE)?;
        Ok(Self { db })
    }

    /// Get the cached debug port for a session, if any.
    pub fn get_port(&self, session_id: &str) -> Result<Option<u16>> {
        let Some(bytes) = self.get_raw(session_id)? else {
            return Ok(None);
        };
        let text = String::from_utf8(bytes)?;
        Ok(text.parse::<u16>().ok())
    }

    /// Durably associate a session with its debug port.
    pub fn set_port(&self, session_id: &str, port: u16) -> Result<()> {
        self.put_raw(session_id, port.to_string().as_bytes())
    }

    /// Remove the mapping for a session. Returns true if one existed.
    pub fn clear_port(&self, session_id: &str) -> Result<bool> {
        self.delete(session_id)
    }
}

impl SimpleStore for PortCacheStorage {
    const TABLE: TableDefinition<'static, &'static str, &'static [u8]> = TABLE;

    fn db(&self) -> &Arc<Database> {
        &self.db
    }
}

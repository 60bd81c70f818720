//! Server storage - raw byte-level access to registered execution servers.

use crate::simple_store::{SimpleStore, ensure_table};
use anyhow::Result;
use redb::{Database, TableDefinition};
use std::sync::Arc;

const TABLE: TableDefinition<'static, &'static str, &'static [u8]> =
    TableDefinition::new("servers");

#[derive(Debug, Clone)]
pub struct ServerStorage {
    db: Arc<Database>,
}

impl ServerStorage {
    pub fn new(db: Arc<Database>) -> Result<Self> {
        ensure_table(&db, TABLE)?;
        Ok(Self { db })
    }
}

impl SimpleStore for ServerStorage {
    const TABLE: TableDefinition<'static, &'static str, &'static [u8]> = TABLE;

    fn db(&self) -> &Arc<Database> {
        &self.db
    }
}

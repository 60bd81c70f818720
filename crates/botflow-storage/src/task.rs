//! Task storage - raw byte-level access to persisted task records.
//!
//! Task status transitions are owned by the runner in botflow-core; this
//! layer only stores whatever record the runner hands it.

use crate::simple_store::{SimpleStore, ensure_table};
use anyhow::Result;
use redb::{Database, TableDefinition};
use std::sync::Arc;

const TABLE: TableDefinition<'static, &'static str, &'static [u8]> = TableDefinition::new("tasks");

#[derive(Debug, Clone)]
pub struct TaskStorage {
    db: Arc<Database>,
}

impl TaskStorage {
    pub fn new(db: Arc<Database>) -> Result<Self> {
        ensure_table(&db, TABLE)?;
        Ok(Self { db })
    }
}

impl SimpleStore for TaskStorage {
    const TABLE: TableDefinition<'static, &'static str, &'static [u8]> = TABLE;

    fn db(&self) -> &Arc<Database> {
        &self.db
    }
}

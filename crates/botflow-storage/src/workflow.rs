//! Workflow storage - raw byte-level access to workflow definitions.

use crate::simple_store::{SimpleStore, ensure_table};
use anyhow::Result;
use redb::{Database, TableDefinition};
use std::sync::Arc;

const TABLE: TableDefinition<'static, &'static str, &'static [u8]> =
    TableDefinition::new("workflows");

#[derive(Debug, Clone)]
pub struct WorkflowStorage {
    db: Arc<Database>,
}

impl WorkflowStorage {
    pub fn new(db: Arc<Database>) -> Result<Self> {
        ensure_table(&db, TABLE)?;
        Ok(Self { db })
    }
}

impl SimpleStore for WorkflowStorage {
    const TABLE: TableDefinition<'static, &'static str, &'static [u8]> = TABLE;

    fn db(&self) -> &Arc<Database> {
        &self.db
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_put_get_delete_roundtrip() {
        let temp_dir = tempdir().unwrap();
        let db = Arc::new(Database::create(temp_dir.path().join("test.db")).unwrap());
        let storage = WorkflowStorage::new(db).unwrap();

        storage.put_raw("wf-1", b"{\"id\":\"wf-1\"}").unwrap();
        assert!(storage.exists("wf-1").unwrap());
        assert_eq!(
            storage.get_raw("wf-1").unwrap().unwrap(),
            b"{\"id\":\"wf-1\"}"
        );

        assert!(storage.delete("wf-1").unwrap());
        assert!(!storage.exists("wf-1").unwrap());
        assert!(!storage.delete("wf-1").unwrap());
    }
}

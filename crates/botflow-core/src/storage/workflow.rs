//! Typed workflow storage wrapper.

use crate::models::Workflow;
use anyhow::Result;
use botflow_storage::SimpleStore;
use redb::Database;
use std::sync::Arc;

pub struct WorkflowStorage {
    inner: botflow_storage::WorkflowStorage,
}

impl WorkflowStorage {
    pub fn new(db: Arc<Database>) -> Result<Self> {
        Ok(Self {
            inner: botflow_storage::WorkflowStorage::new(db)?,
        })
    }

    /// Create a new workflow
    pub fn create_workflow(&self, workflow: &Workflow) -> Result<()> {
        let json_bytes = serde_json::to_vec(workflow)?;
        self.inner.put_raw(&workflow.id, &json_bytes)
    }

    /// Get a workflow by ID
    pub fn get_workflow(&self, id: &str) -> Result<Workflow> {
        let bytes = self
            .inner
            .get_raw(id)?
            .ok_or_else(|| anyhow::anyhow!("Workflow {} not found", id))?;
        let workflow: Workflow = serde_json::from_slice(&bytes)?;
        Ok(workflow)
    }

    /// List all workflows
    pub fn list_workflows(&self) -> Result<Vec<Workflow>> {
        let raw_workflows = self.inner.list_raw()?;
        let mut workflows = Vec::new();
        for (_, bytes) in raw_workflows {
            let workflow: Workflow = serde_json::from_slice(&bytes)?;
            workflows.push(workflow);
        }
        Ok(workflows)
    }

    /// Update an existing workflow
    pub fn update_workflow(&self, id: &str, workflow: &Workflow) -> Result<()> {
        if !self.inner.exists(id)? {
            return Err(anyhow::anyhow!("Workflow not found"));
        }
        let json_bytes = serde_json::to_vec(workflow)?;
        self.inner.put_raw(id, &json_bytes)
    }

    /// Delete a workflow by ID
    pub fn delete_workflow(&self, id: &str) -> Result<()> {
        if !self.inner.delete(id)? {
            return Err(anyhow::anyhow!("Workflow not found"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Edge, Node, NodeData, Position, Workflow};
    use tempfile::tempdir;

    fn create_test_workflow(id: &str) -> Workflow {
        Workflow {
            id: id.to_string(),
            name: format!("Test Workflow {}", id),
            nodes: vec![Node {
                id: "node1".to_string(),
                kind: "navigate".to_string(),
                position: Position::default(),
                data: NodeData {
                    label: "Navigate".to_string(),
                    description: None,
                    settings: [("url".to_string(), serde_json::json!("https://example.com"))]
                        .into_iter()
                        .collect(),
                },
            }],
            edges: vec![Edge::new("e1", "node1", "node1")],
        }
    }

    fn setup() -> (WorkflowStorage, tempfile::TempDir) {
        let temp_dir = tempdir().unwrap();
        let db = Arc::new(Database::create(temp_dir.path().join("test.db")).unwrap());
        (WorkflowStorage::new(db).unwrap(), temp_dir)
    }

    #[test]
    fn test_create_and_get_workflow() {
        let (storage, _tmp) = setup();

        storage.create_workflow(&create_test_workflow("wf-001")).unwrap();

        let retrieved = storage.get_workflow("wf-001").unwrap();
        assert_eq!(retrieved.id, "wf-001");
        assert_eq!(retrieved.nodes.len(), 1);
        assert_eq!(retrieved.edges.len(), 1);
    }

    #[test]
    fn test_list_workflows() {
        let (storage, _tmp) = setup();

        for i in 1..=3 {
            storage
                .create_workflow(&create_test_workflow(&format!("wf-{:03}", i)))
                .unwrap();
        }

        let workflows = storage.list_workflows().unwrap();
        assert_eq!(workflows.len(), 3);
    }

    #[test]
    fn test_update_nonexistent_workflow() {
        let (storage, _tmp) = setup();

        let workflow = create_test_workflow("nonexistent");
        let result = storage.update_workflow("nonexistent", &workflow);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("not found"));
    }

    #[test]
    fn test_delete_workflow() {
        let (storage, _tmp) = setup();

        storage.create_workflow(&create_test_workflow("wf-001")).unwrap();
        storage.delete_workflow("wf-001").unwrap();

        assert!(storage.get_workflow("wf-001").is_err());
    }
}

//! Typed task storage wrapper.
//!
//! Tasks are persisted after every status transition so external observers
//! always see the latest state.

use crate::models::{Task, TaskStatus};
use anyhow::Result;
use botflow_storage::SimpleStore;
use redb::Database;
use std::sync::Arc;

pub struct TaskStorage {
    inner: botflow_storage::TaskStorage,
}

impl TaskStorage {
    pub fn new(db: Arc<Database>) -> Result<Self> {
        Ok(Self {
            inner: botflow_storage::TaskStorage::new(db)?,
        })
    }

    /// Create a new task record
    pub fn create_task(&self, task: &Task) -> Result<()> {
        let json_bytes = serde_json::to_vec(task)?;
        self.inner.put_raw(&task.id, &json_bytes)
    }

    /// Get a task by ID
    pub fn get_task(&self, id: &str) -> Result<Task> {
        let bytes = self
            .inner
            .get_raw(id)?
            .ok_or_else(|| anyhow::anyhow!("Task {} not found", id))?;
        let task: Task = serde_json::from_slice(&bytes)?;
        Ok(task)
    }

    /// List tasks, optionally filtered by status
    pub fn list_tasks(&self, status: Option<TaskStatus>) -> Result<Vec<Task>> {
        let raw_tasks = self.inner.list_raw()?;
        let mut tasks = Vec::new();
        for (_, bytes) in raw_tasks {
            let task: Task = serde_json::from_slice(&bytes)?;
            if status.is_none_or(|s| task.status == s) {
                tasks.push(task);
            }
        }
        Ok(tasks)
    }

    /// Update an existing task
    pub fn update_task(&self, task: &Task) -> Result<()> {
        if !self.inner.exists(&task.id)? {
            return Err(anyhow::anyhow!("Task not found"));
        }
        let json_bytes = serde_json::to_vec(task)?;
        self.inner.put_raw(&task.id, &json_bytes)
    }

    /// Delete a task by ID
    pub fn delete_task(&self, id: &str) -> Result<()> {
        if !self.inner.delete(id)? {
            return Err(anyhow::anyhow!("Task not found"));
        }
        Ok(())
    }
}

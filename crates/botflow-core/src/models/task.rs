use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Task status lifecycle: `pending -> in_process -> {done, error}`.
///
/// Stopping a task returns it to `done`; there is no separate stopped state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    InProcess,
    Done,
    Error,
}

/// A persisted unit of work binding one workflow to one or more
/// sessions/servers. Mutated only by the task runner and persisted after
/// every status transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub name: String,
    pub status: TaskStatus,
    pub browser_sessions: Vec<BrowserSessionRef>,
    pub servers: Vec<String>,
    pub workflow_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repeat_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Task {
    pub fn new(name: &str, workflow_id: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            status: TaskStatus::Pending,
            browser_sessions: Vec::new(),
            servers: Vec::new(),
            workflow_id: workflow_id.to_string(),
            repeat_count: None,
            start_time: None,
            updated_at: None,
        }
    }

    /// Mark the task as started.
    pub fn mark_in_process(&mut self) {
        self.status = TaskStatus::InProcess;
        self.start_time = Some(Utc::now());
        self.updated_at = Some(Utc::now());
    }

    /// Mark the task as completed.
    pub fn mark_done(&mut self) {
        self.status = TaskStatus::Done;
        self.updated_at = Some(Utc::now());
    }

    /// Mark the task as failed.
    pub fn mark_error(&mut self) {
        self.status = TaskStatus::Error;
        self.updated_at = Some(Utc::now());
    }
}

/// Reference to a browser a task runs against: either a provider-managed
/// session (port resolved at start time) or a plain browser with a literal
/// debug port.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserSessionRef {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: SessionRefKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SessionRefKind {
    Session,
    Browser,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_task_is_pending() {
        let task = Task::new("Scrape leads", "wf-1");
        assert_eq!(task.status, TaskStatus::Pending);
        assert!(task.start_time.is_none());
        assert!(!task.id.is_empty());
    }

    #[test]
    fn test_status_transitions_stamp_timestamps() {
        let mut task = Task::new("t", "wf-1");

        task.mark_in_process();
        assert_eq!(task.status, TaskStatus::InProcess);
        assert!(task.start_time.is_some());

        task.mark_done();
        assert_eq!(task.status, TaskStatus::Done);
        assert!(task.updated_at.is_some());
    }

    #[test]
    fn test_status_wire_names_are_snake_case() {
        assert_eq!(
            serde_json::to_value(TaskStatus::InProcess).unwrap(),
            json!("in_process")
        );
        assert_eq!(
            serde_json::to_value(TaskStatus::Pending).unwrap(),
            json!("pending")
        );
    }

    #[test]
    fn test_session_ref_kind_wire_names() {
        let sess: BrowserSessionRef = serde_json::from_value(json!({
            "id": "abc",
            "type": "session"
        }))
        .unwrap();
        assert_eq!(sess.kind, SessionRefKind::Session);
        assert!(sess.port.is_none());
    }
}

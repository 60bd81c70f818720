//! Top-level task scheduling.
//!
//! Given a persisted task (sessions x servers x one workflow), sequences
//! session startup, script dispatch, status persistence, and cleanup. The
//! first execution error aborts the remaining server/session pairs and fails
//! the task; sessions and servers are processed sequentially.

use crate::config::RunnerConfig;
use crate::engine::coordinator::{BrowserTarget, BrowserType, ExecutionCoordinator};
use crate::models::{SessionRefKind, Task};
use crate::session::SessionManager;
use crate::storage::Storage;
use anyhow::{Context, Result, bail};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::time::sleep;
use tracing::{error, info, warn};

pub struct TaskRunner {
    storage: Arc<Storage>,
    sessions: Arc<SessionManager>,
    coordinator: Arc<ExecutionCoordinator>,
    config: RunnerConfig,
    executing: Mutex<HashSet<String>>,
}

impl TaskRunner {
    pub fn new(
        storage: Arc<Storage>,
        sessions: Arc<SessionManager>,
        coordinator: Arc<ExecutionCoordinator>,
        config: RunnerConfig,
    ) -> Self {
        Self {
            storage,
            sessions,
            coordinator,
            config,
            executing: Mutex::new(HashSet::new()),
        }
    }

    /// Whether a task is currently being executed by this runner.
    pub fn is_executing(&self, task_id: &str) -> bool {
        lock_set(&self.executing).contains(task_id)
    }

    /// Run a task end to end: start its sessions, dispatch the workflow to
    /// every declared server, and persist the status transitions.
    ///
    /// Re-invoking while the task is already in flight is a no-op. A task
    /// with no browser sessions is rejected without touching its status.
    pub async fn start_task(&self, task: &Task) -> Result<()> {
        let Some(_guard) = ExecutionGuard::acquire(&self.executing, &task.id) else {
            info!(task_id = %task.id, "Task is already running");
            return Ok(());
        };

        if task.browser_sessions.is_empty() {
            bail!("No browser sessions configured for this task");
        }

        match self.execute(task).await {
            Ok(()) => {
                self.persist_status(task, Task::mark_done);
                info!(task_id = %task.id, "Task completed");
                Ok(())
            }
            Err(err) => {
                self.persist_status(task, Task::mark_error);
                error!(task_id = %task.id, error = %err, "Task execution failed");
                Err(err)
            }
        }
    }

    /// Stop every provider session the task declares and mark it done.
    ///
    /// Stopping acts on sessions directly; it does not interrupt an in-flight
    /// `start_task` call.
    pub async fn stop_task(&self, task: &Task) -> Result<()> {
        for session in &task.browser_sessions {
            if session.kind != SessionRefKind::Session {
                continue;
            }
            if let Err(err) = self.sessions.stop_session(&session.id).await {
                warn!(session_id = %session.id, error = %err, "Failed to stop session");
            }
        }

        let mut record = self
            .storage
            .tasks
            .get_task(&task.id)
            .unwrap_or_else(|_| task.clone());
        record.mark_done();
        self.storage
            .tasks
            .update_task(&record)
            .context("Failed to update task status")?;

        info!(task_id = %task.id, "Task stopped");
        Ok(())
    }

    async fn execute(&self, task: &Task) -> Result<()> {
        let ports = self.prepare_sessions(task).await?;

        let workflow = self
            .storage
            .workflows
            .get_workflow(&task.workflow_id)
            .context("Failed to fetch workflow")?;

        // Flush the in_process transition before any dispatch so external
        // observers see it ahead of long-running remote executions.
        let mut record = task.clone();
        record.mark_in_process();
        self.storage
            .tasks
            .update_task(&record)
            .context("Failed to update task status")?;

        for server_id in &task.servers {
            let server = match self.storage.servers.get_server(server_id) {
                Ok(server) => Some(server),
                Err(err) => {
                    warn!(server_id, error = %err, "Server record missing");
                    None
                }
            };

            for session in &task.browser_sessions {
                let Some(port) = ports.get(&session.id).copied() else {
                    warn!(session_id = %session.id, "No debug port for session, skipping");
                    continue;
                };

                info!(
                    server_id,
                    session_id = %session.id,
                    port,
                    "Executing workflow"
                );

                let target = match session.kind {
                    SessionRefKind::Session => BrowserTarget {
                        browser_type: BrowserType::LinkenSphere,
                        browser_port: port,
                        session_id: Some(session.id.clone()),
                    },
                    SessionRefKind::Browser => BrowserTarget {
                        browser_type: BrowserType::Chrome,
                        browser_port: port,
                        session_id: None,
                    },
                };

                self.coordinator
                    .run(server.as_ref(), &workflow.nodes, &workflow.edges, &target)
                    .await?;
            }
        }

        Ok(())
    }

    /// Bring every declared provider session to an active state and collect
    /// the debug ports to execute against. A session that cannot be started
    /// aborts the task; a workflow cannot meaningfully run without its
    /// declared sessions.
    async fn prepare_sessions(&self, task: &Task) -> Result<HashMap<String, u16>> {
        let mut ports = HashMap::new();

        for session in &task.browser_sessions {
            match session.kind {
                SessionRefKind::Browser => {
                    if let Some(port) = session.port {
                        ports.insert(session.id.clone(), port);
                    } else {
                        warn!(session_id = %session.id, "Browser entry has no port, skipping");
                    }
                }
                SessionRefKind::Session => {
                    let was_active = self
                        .sessions
                        .session_status(&session.id)
                        .await
                        .is_active();

                    if !was_active {
                        // Give the provider a settling window on both sides
                        // of the start request.
                        sleep(self.config.settle_delay()).await;
                    }

                    let port = self
                        .sessions
                        .start_session(&session.id)
                        .await
                        .with_context(|| format!("Failed to start session {}", session.id))?;

                    if !was_active {
                        sleep(self.config.settle_delay()).await;
                        let status = self.sessions.session_status(&session.id).await;
                        if !status.is_active() {
                            bail!(
                                "Session {} failed to start properly. Status: {:?}",
                                session.id,
                                status
                            );
                        }
                    }

                    match port {
                        Some(port) => {
                            ports.insert(session.id.clone(), port);
                        }
                        None => warn!(
                            session_id = %session.id,
                            "Session is active but has no known debug port"
                        ),
                    }
                }
            }
        }

        Ok(ports)
    }

    /// Persist a status transition, logging instead of failing: a stale
    /// status must not mask the execution outcome. Starts from the stored
    /// record so earlier transitions (start_time) survive the write.
    fn persist_status(&self, task: &Task, transition: fn(&mut Task)) {
        let mut record = self
            .storage
            .tasks
            .get_task(&task.id)
            .unwrap_or_else(|_| task.clone());
        transition(&mut record);
        if let Err(err) = self.storage.tasks.update_task(&record) {
            warn!(task_id = %task.id, error = %err, "Failed to persist task status");
        }
    }
}

/// RAII membership in the executing-task set. Dropping the guard releases
/// the id even when execution unwinds early.
struct ExecutionGuard<'a> {
    executing: &'a Mutex<HashSet<String>>,
    task_id: String,
}

impl<'a> ExecutionGuard<'a> {
    fn acquire(executing: &'a Mutex<HashSet<String>>, task_id: &str) -> Option<Self> {
        if lock_set(executing).insert(task_id.to_string()) {
            Some(Self {
                executing,
                task_id: task_id.to_string(),
            })
        } else {
            None
        }
    }
}

impl Drop for ExecutionGuard<'_> {
    fn drop(&mut self) {
        lock_set(self.executing).remove(&self.task_id);
    }
}

fn lock_set<'a>(set: &'a Mutex<HashSet<String>>) -> MutexGuard<'a, HashSet<String>> {
    set.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TaskStatus;
    use crate::session::{MemoryPortCache, PortCache};
    use tempfile::tempdir;

    fn make_runner(config: RunnerConfig) -> (Arc<TaskRunner>, Arc<Storage>, tempfile::TempDir) {
        let temp_dir = tempdir().unwrap();
        let db_path = temp_dir.path().join("test.db");
        let storage = Arc::new(Storage::new(db_path.to_str().unwrap()).unwrap());
        let cache: Arc<dyn PortCache> = Arc::new(MemoryPortCache::default());
        let sessions = Arc::new(SessionManager::new(&config, cache.clone()));
        let coordinator = Arc::new(ExecutionCoordinator::new(
            config.provider_port,
            &config.server_token,
            cache,
        ));
        let runner = Arc::new(TaskRunner::new(storage.clone(), sessions, coordinator, config));
        (runner, storage, temp_dir)
    }

    #[tokio::test]
    async fn test_task_without_sessions_fails_and_leaves_status_pending() {
        let (runner, storage, _tmp) = make_runner(RunnerConfig::default());

        let task = Task::new("empty", "wf-1");
        storage.tasks.create_task(&task).unwrap();

        let err = runner.start_task(&task).await.unwrap_err();
        assert!(err.to_string().contains("No browser sessions"));

        let stored = storage.tasks.get_task(&task.id).unwrap();
        assert_eq!(stored.status, TaskStatus::Pending);
        assert!(!runner.is_executing(&task.id));
    }

    #[tokio::test]
    async fn test_execution_guard_releases_on_drop() {
        let executing = Mutex::new(HashSet::new());

        {
            let guard = ExecutionGuard::acquire(&executing, "t1");
            assert!(guard.is_some());
            // A second acquire while held is refused.
            assert!(ExecutionGuard::acquire(&executing, "t1").is_none());
        }

        assert!(ExecutionGuard::acquire(&executing, "t1").is_some());
    }

    #[tokio::test]
    async fn test_is_executing_reports_only_in_flight_tasks() {
        let (runner, _storage, _tmp) = make_runner(RunnerConfig::default());
        assert!(!runner.is_executing("nope"));
    }
}

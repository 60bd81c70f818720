//! BotFlow orchestration core.
//!
//! Compiles node/edge workflow graphs into executable scripts and runs them
//! against remote browser instances: provider-managed sessions or plain
//! Chrome debug targets. The four pieces are the script compiler
//! ([`script`]), the session manager ([`session`]), the execution
//! coordinator ([`engine::coordinator`]) and the task runner
//! ([`engine::runner`]).

pub mod config;
pub mod engine;
pub mod models;
pub mod script;
pub mod services;
pub mod session;
pub mod storage;

pub use config::RunnerConfig;
pub use models::*;

use engine::coordinator::ExecutionCoordinator;
use engine::runner::TaskRunner;
use services::server::ServerRegistry;
use session::{PortCache, SessionManager};
use std::sync::Arc;
use storage::Storage;
use tracing::info;

/// Core application state shared between the CLI and embedding hosts.
pub struct AppCore {
    pub config: RunnerConfig,
    pub storage: Arc<Storage>,
    pub sessions: Arc<SessionManager>,
    pub coordinator: Arc<ExecutionCoordinator>,
    pub runner: Arc<TaskRunner>,
    pub servers: Arc<ServerRegistry>,
}

impl AppCore {
    pub fn new(db_path: &str, config: RunnerConfig) -> anyhow::Result<Self> {
        let storage = Arc::new(Storage::new(db_path)?);

        info!(provider_port = config.provider_port, "Initializing BotFlow");

        let cache: Arc<dyn PortCache> = Arc::new(storage.ports.clone());
        let sessions = Arc::new(SessionManager::new(&config, cache.clone()));
        let coordinator = Arc::new(ExecutionCoordinator::new(
            config.provider_port,
            &config.server_token,
            cache,
        ));
        let runner = Arc::new(TaskRunner::new(
            storage.clone(),
            sessions.clone(),
            coordinator.clone(),
            config.clone(),
        ));
        let servers = Arc::new(ServerRegistry::new(storage.clone()));

        Ok(Self {
            config,
            storage,
            sessions,
            coordinator,
            runner,
            servers,
        })
    }

    /// Start the periodic execution-server health sweep.
    pub fn start_server_monitor(&self) -> tokio::task::JoinHandle<()> {
        self.servers.spawn_monitor(self.config.health_interval())
    }
}

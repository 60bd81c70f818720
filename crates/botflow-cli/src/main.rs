use anyhow::Result;
use botflow_core::{AppCore, RunnerConfig};
use clap::{Parser, Subcommand};
use tracing::warn;

#[derive(Parser)]
#[command(name = "botflow", about = "Browser automation workflow orchestrator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List sessions known to the session provider
    Sessions,
    /// Task operations
    #[command(subcommand)]
    Task(TaskCommands),
    /// Workflow operations
    #[command(subcommand)]
    Workflow(WorkflowCommands),
    /// Execution server operations
    #[command(subcommand)]
    Server(ServerCommands),
}

#[derive(Subcommand)]
enum TaskCommands {
    /// List persisted tasks
    List,
    /// Run a task by id
    Run { id: String },
    /// Stop a task's sessions and mark it done
    Stop { id: String },
}

#[derive(Subcommand)]
enum WorkflowCommands {
    /// List stored workflows
    List,
    /// Compile a workflow and print the generated script
    Compile { id: String },
}

#[derive(Subcommand)]
enum ServerCommands {
    /// List registered execution servers
    List,
    /// Register an execution server by exchanging its token
    Register {
        url: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        token: String,
    },
    /// Probe every registered server's health endpoint once
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let dir = botflow_storage::paths::ensure_botflow_dir()?;
    let db_path = botflow_storage::paths::ensure_database_path_string()?;
    let config = load_config(&dir);
    let core = AppCore::new(&db_path, config)?;

    match cli.command {
        Commands::Sessions => {
            for session in core.sessions.list_sessions().await? {
                println!(
                    "{}  {:?}  {}",
                    session.uuid, session.status, session.name
                );
            }
        }
        Commands::Task(TaskCommands::List) => {
            for task in core.storage.tasks.list_tasks(None)? {
                println!("{}  {:?}  {}", task.id, task.status, task.name);
            }
        }
        Commands::Task(TaskCommands::Run { id }) => {
            let task = core.storage.tasks.get_task(&id)?;
            core.runner.start_task(&task).await?;
            println!("Task {id} completed");
        }
        Commands::Task(TaskCommands::Stop { id }) => {
            let task = core.storage.tasks.get_task(&id)?;
            core.runner.stop_task(&task).await?;
            println!("Task {id} stopped");
        }
        Commands::Workflow(WorkflowCommands::List) => {
            for workflow in core.storage.workflows.list_workflows()? {
                println!(
                    "{}  {}  ({} nodes)",
                    workflow.id,
                    workflow.name,
                    workflow.nodes.len()
                );
            }
        }
        Commands::Workflow(WorkflowCommands::Compile { id }) => {
            let workflow = core.storage.workflows.get_workflow(&id)?;
            let compiled = botflow_core::script::compile(&workflow.nodes, &workflow.edges)?;
            print!("{}", compiled.text);
        }
        Commands::Server(ServerCommands::List) => {
            for server in core.storage.servers.list_servers()? {
                println!(
                    "{}  {}  active={}",
                    server.id,
                    server.name.as_deref().unwrap_or(&server.url),
                    server.is_active
                );
            }
        }
        Commands::Server(ServerCommands::Register { url, name, token }) => {
            let server = core.servers.register(&url, name.as_deref(), &token).await?;
            println!("Registered server {}", server.id);
        }
        Commands::Server(ServerCommands::Check) => {
            for server in core.servers.check_all().await? {
                println!("{}  active={}", server.id, server.is_active);
            }
        }
    }

    Ok(())
}

fn load_config(dir: &std::path::Path) -> RunnerConfig {
    let path = dir.join("config.json");
    match std::fs::read_to_string(&path) {
        Ok(text) => serde_json::from_str(&text).unwrap_or_else(|err| {
            warn!(path = %path.display(), error = %err, "Invalid config file, using defaults");
            RunnerConfig::default()
        }),
        Err(_) => RunnerConfig::default(),
    }
}

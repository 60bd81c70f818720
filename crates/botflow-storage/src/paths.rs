//! Path utilities for BotFlow directory resolution.

use anyhow::Result;
use std::path::PathBuf;

const BOTFLOW_DIR: &str = ".botflow";
const DATABASE_FILE: &str = "botflow.db";

/// Environment variable to override the BotFlow directory.
const BOTFLOW_DIR_ENV: &str = "BOTFLOW_DIR";

/// Resolve the BotFlow data directory.
/// Priority: BOTFLOW_DIR env var > ~/.botflow/
pub fn resolve_botflow_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(BOTFLOW_DIR_ENV)
        && !dir.trim().is_empty()
    {
        return Ok(PathBuf::from(dir));
    }
    dirs::home_dir()
        .map(|h| h.join(BOTFLOW_DIR))
        .ok_or_else(|| anyhow::anyhow!("Failed to determine home directory"))
}

/// Ensure the BotFlow directory exists and return its path.
pub fn ensure_botflow_dir() -> Result<PathBuf> {
    let dir = resolve_botflow_dir()?;
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Ensure the directory exists and return the database path as a string.
pub fn ensure_database_path_string() -> Result<String> {
    let path = ensure_botflow_dir()?.join(DATABASE_FILE);
    Ok(path.display().to_string())
}

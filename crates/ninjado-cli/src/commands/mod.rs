pub mod belt;
pub mod config;
pub mod overall;
pub mod record;
pub mod routine;
pub mod stats;
pub mod trend;

use std::path::Path;

use ninjado_core::TaskCompletion;

/// Read a JSON array of task completions.
pub fn read_tasks(path: &Path) -> Result<Vec<TaskCompletion>, Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("failed to read {}: {e}", path.display()))?;
    let tasks: Vec<TaskCompletion> = serde_json::from_str(&content)
        .map_err(|e| format!("invalid task file {}: {e}", path.display()))?;
    Ok(tasks)
}

/// Runtime for the async history fetch.
pub fn runtime() -> Result<tokio::runtime::Runtime, std::io::Error> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
}

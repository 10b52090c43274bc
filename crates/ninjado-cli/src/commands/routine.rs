use std::path::PathBuf;

use clap::Args;
use ninjado_core::{Config, EfficiencyCache};

use super::read_tasks;

#[derive(Args)]
pub struct RoutineArgs {
    /// JSON files, each an array of {kind, planned_duration, actual_duration}
    #[arg(required = true)]
    files: Vec<PathBuf>,
}

pub fn run(args: RoutineArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load();
    let capacity = if config.cache.enabled {
        config.cache.capacity
    } else {
        0
    };
    let cache = EfficiencyCache::new(capacity);

    let mut results = Vec::with_capacity(args.files.len());
    for path in &args.files {
        let tasks = read_tasks(path)?;
        results.push(cache.routine_efficiency(&tasks));
    }

    let stats = cache.stats();
    tracing::debug!(hits = stats.hits, misses = stats.misses, "routine cache");

    if let [single] = results.as_slice() {
        println!("{}", serde_json::to_string_pretty(single)?);
    } else {
        println!("{}", serde_json::to_string_pretty(&results)?);
    }
    Ok(())
}

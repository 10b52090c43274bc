use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::Args;
use ninjado_core::efficiency::RoutineRunSummary;
use ninjado_core::HistoryStore;
use serde::Serialize;

use super::read_tasks;

#[derive(Args)]
pub struct RecordArgs {
    /// Routine name
    name: String,
    /// JSON file with the routine's task completions
    file: PathBuf,
    /// Completion time (RFC 3339), defaults to now
    #[arg(long)]
    at: Option<String>,
}

#[derive(Serialize)]
struct RecordOutput<'a> {
    id: i64,
    routine_name: &'a str,
    completed_at: DateTime<Utc>,
    efficiency_percentage: Option<f64>,
    time_saved_seconds: i64,
}

pub fn run(args: RecordArgs) -> Result<(), Box<dyn std::error::Error>> {
    let completed_at = match &args.at {
        Some(raw) => DateTime::parse_from_rfc3339(raw)
            .map_err(|e| format!("invalid --at '{raw}': {e}"))?
            .with_timezone(&Utc),
        None => Utc::now(),
    };

    let tasks = read_tasks(&args.file)?;
    let summary = RoutineRunSummary::from_tasks(&tasks);

    let store = HistoryStore::open()?;
    let id = store.record_run(&args.name, &summary, completed_at)?;

    let output = RecordOutput {
        id,
        routine_name: &args.name,
        completed_at,
        efficiency_percentage: summary.result.efficiency_percentage(),
        time_saved_seconds: summary.time_saved_seconds,
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

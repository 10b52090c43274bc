use chrono::Utc;
use clap::Args;
use ninjado_core::{Config, EfficiencyStatsBuilder, HistoryFetcher, HistoryStore};

use super::runtime;

#[derive(Args)]
pub struct StatsArgs {
    /// Print JSON instead of a summary
    #[arg(long)]
    json: bool,
}

pub fn run(args: StatsArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load();
    let fetcher = HistoryFetcher::new(HistoryStore::open()?, config.history.clone());
    let builder = EfficiencyStatsBuilder::new(config.efficiency.clone());

    let stats = runtime()?.block_on(fetcher.efficiency_stats(Utc::now(), &builder))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    let total_time_saved = fetcher.source().total_time_saved()?;
    println!("Belt:              {} ({})", stats.belt.name, stats.belt.color);
    if stats.has_enough_data {
        println!("Belt progress:     {:.0}%", stats.belt_progress);
    } else {
        println!(
            "Belt progress:     {} of {} qualifying routines needed",
            stats.qualifying_count, config.efficiency.min_completions_for_rank
        );
    }
    if let Some(next) = stats.next_belt() {
        println!("Next belt:         {} at {:.0}%", next.name, next.min_percentage);
    }
    println!("Final efficiency:  {:.1}%", stats.final_efficiency);
    println!("Average:           {:.1}%", stats.average_efficiency);
    println!(
        "Penalty:           {:.1} ({} overruns, {})",
        stats.penalty, stats.overrun_count, stats.penalty_policy
    );
    println!("Routines counted:  {}", stats.completion_count);
    println!("Time saved:        {:.0}s", total_time_saved);
    Ok(())
}

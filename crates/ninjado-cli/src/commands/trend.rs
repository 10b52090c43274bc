use chrono::Utc;
use clap::Args;
use ninjado_core::history::{analyze_trend, TrendDirection};
use ninjado_core::storage::{HistoryConfig, MAX_WINDOWS};
use ninjado_core::{Config, HistoryFetcher, HistoryStore};

use super::runtime;

#[derive(Args)]
pub struct TrendArgs {
    /// Number of windows to show (defaults to config)
    #[arg(long)]
    windows: Option<usize>,
    /// Print JSON instead of a table
    #[arg(long)]
    json: bool,
}

pub fn run(args: TrendArgs) -> Result<(), Box<dyn std::error::Error>> {
    let history = Config::load().history;
    let window_count = args.windows.unwrap_or(history.trend_windows);
    if window_count > MAX_WINDOWS {
        return Err(format!("--windows must be at most {MAX_WINDOWS}").into());
    }

    // Fetch exactly the span the trend covers.
    let fetch_config = HistoryConfig {
        window_days: history.trend_window_days,
        max_windows: window_count,
        ..history.clone()
    };
    fetch_config.validate()?;
    let now = Utc::now();
    let fetcher = HistoryFetcher::new(HistoryStore::open()?, fetch_config);
    let outcome = runtime()?.block_on(fetcher.fetch_recent(now, usize::MAX))?;

    let trend = analyze_trend(
        &outcome.records,
        now,
        history.trend_window_days,
        window_count,
        history.trend_deadband,
    )?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&trend)?);
        return Ok(());
    }

    for window in &trend {
        let arrow = match window.direction {
            TrendDirection::Up => "up",
            TrendDirection::Down => "down",
            TrendDirection::Stable => "stable",
        };
        let average = window
            .average_efficiency
            .map(|avg| format!("{avg:.1}%"))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{}  {:>8}  {:>3} routines  {}",
            window.window.start.format("%Y-%m-%d"),
            average,
            window.completion_count,
            arrow
        );
    }
    Ok(())
}

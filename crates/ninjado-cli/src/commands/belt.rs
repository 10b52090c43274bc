use clap::Args;
use ninjado_core::{belt_progress_percentage, get_belt_rank};
use serde::Serialize;

#[derive(Args)]
pub struct BeltArgs {
    /// Efficiency in percent
    #[arg(allow_negative_numbers = true)]
    percentage: f64,
    /// Rank as a user without enough history
    #[arg(long)]
    insufficient_data: bool,
}

#[derive(Serialize)]
struct BeltOutput {
    name: &'static str,
    color: &'static str,
    progress: f64,
    next: Option<&'static str>,
}

pub fn run(args: BeltArgs) -> Result<(), Box<dyn std::error::Error>> {
    let has_enough_data = !args.insufficient_data;
    let belt = get_belt_rank(Some(args.percentage), has_enough_data);
    let progress = if has_enough_data {
        belt_progress_percentage(args.percentage, belt)
    } else {
        0.0
    };

    let output = BeltOutput {
        name: belt.name,
        color: belt.color,
        progress,
        next: belt.next().map(|b| b.name),
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

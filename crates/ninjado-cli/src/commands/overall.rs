use clap::Args;
use ninjado_core::efficiency::{CountBasedOverrunPenalty, MagnitudeBasedGracePenalty};
use ninjado_core::{Config, PenaltyPolicy};

#[derive(Args)]
pub struct OverallArgs {
    /// Per-routine efficiencies as fractions
    #[arg(required = true, allow_negative_numbers = true)]
    values: Vec<f64>,
    /// Penalty rule: magnitude-based (Grace System) or count-based
    #[arg(long, default_value = "magnitude-based")]
    policy: PenaltyPolicy,
}

pub fn run(args: OverallArgs) -> Result<(), Box<dyn std::error::Error>> {
    let efficiency = Config::load().efficiency;

    match args.policy {
        PenaltyPolicy::MagnitudeBased => {
            let result = MagnitudeBasedGracePenalty {
                forgiveness_threshold: efficiency.forgiveness_threshold,
                multiplier: efficiency.grace_multiplier,
            }
            .aggregate(&args.values)?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        PenaltyPolicy::CountBased => {
            let result = CountBasedOverrunPenalty {
                forgiveness_threshold: efficiency.forgiveness_threshold,
                points_per_overrun: efficiency.points_per_overrun,
                cap: efficiency.penalty_cap,
            }
            .calculate(&args.values);
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
    }
    Ok(())
}

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "ninjado-cli", version, about = "NinjaDo efficiency CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score finished routines from task JSON files
    Routine(commands::routine::RoutineArgs),
    /// Aggregate routine efficiencies (fractions, e.g. 0.8 -0.2)
    Overall(commands::overall::OverallArgs),
    /// Belt rank for an efficiency percentage
    Belt(commands::belt::BeltArgs),
    /// Store a finished routine in the local history
    Record(commands::record::RecordArgs),
    /// Efficiency stats from the local history
    Stats(commands::stats::StatsArgs),
    /// Efficiency trend over recent weeks
    Trend(commands::trend::TrendArgs),
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("NINJADO_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_tracing();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Routine(args) => commands::routine::run(args),
        Commands::Overall(args) => commands::overall::run(args),
        Commands::Belt(args) => commands::belt::run(args),
        Commands::Record(args) => commands::record::run(args),
        Commands::Stats(args) => commands::stats::run(args),
        Commands::Trend(args) => commands::trend::run(args),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

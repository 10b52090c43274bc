//! # NinjaDo Core Library
//!
//! This library provides the efficiency scoring engine behind NinjaDo
//! routines. All scoring is available through the standalone `ninjado-cli`
//! binary, which is a thin layer over the same core library.
//!
//! ## Architecture
//!
//! - **Efficiency**: Pure calculators for routine efficiency, overrun
//!   penalties, the Grace System aggregate and belt ranks
//! - **History**: Windowed, batched reads of past completions and trend
//!   analysis over them
//! - **Storage**: SQLite-based completion history and TOML-based configuration
//!
//! ## Key Components
//!
//! - [`calculate_routine_efficiency`]: Score one finished routine
//! - [`calculate_overall_efficiency`]: Grace System aggregate over many runs
//! - [`get_belt_rank`]: Map a percentage to a belt
//! - [`HistoryFetcher`]: Collect recent history from a [`HistorySource`]
//! - [`HistoryStore`]: Completion persistence
//! - [`Config`]: Application configuration management

pub mod efficiency;
pub mod error;
pub mod history;
pub mod storage;

pub use efficiency::{
    belt_progress_percentage, calculate_overall_efficiency, calculate_overrun_penalty,
    calculate_routine_efficiency, get_belt_rank, BeltRank, EfficiencyCache, EfficiencyStats,
    EfficiencyStatsBuilder, OverallEfficiencyResult, OverrunPenalty, PenaltyPolicy,
    RoutineEfficiencyResult, TaskCompletion, TaskKind, BELT_RANKS,
};
pub use error::{ConfigError, CoreError, DatabaseError, HistoryError, ValidationError};
pub use history::{HistoricalCompletion, HistoryFetcher, HistorySource, TimeWindow};
pub use storage::{Config, HistoryStore};

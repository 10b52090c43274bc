//! Efficiency scoring engine for NinjaDo
//!
//! This module turns completed task timings into a routine efficiency,
//! aggregates routine efficiencies with the Grace System, and maps the final
//! score onto belt ranks.

mod belt;
mod cache;
mod grace;
mod penalty;
mod routine;
mod stats;

pub use belt::{belt_progress_percentage, get_belt_rank, BeltRank, BELT_RANKS};

pub use cache::{CacheStats, EfficiencyCache};

pub use grace::{
    calculate_overall_efficiency, present_efficiencies, MagnitudeBasedGracePenalty,
    OverallEfficiencyResult, PenaltyPolicy, DEFAULT_GRACE_MULTIPLIER,
};

pub use penalty::{
    calculate_overrun_penalty, CountBasedOverrunPenalty, OverrunPenalty,
    DEFAULT_FORGIVENESS_THRESHOLD, DEFAULT_PENALTY_CAP, DEFAULT_POINTS_PER_OVERRUN,
};

pub use routine::{
    calculate_routine_efficiency, EfficiencyBreakdown, RoutineEfficiencyResult,
    RoutineRunSummary, TaskCompletion, TaskKind,
};

pub use stats::{EfficiencyStats, EfficiencyStatsBuilder};

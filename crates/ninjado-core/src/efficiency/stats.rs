//! User-facing efficiency stats.
//!
//! Composes the pieces: resolve each historical completion to a percentage,
//! average the most recent ones, subtract the configured penalty and rank the
//! result. Everything here is in percent.

use serde::Serialize;

use super::belt::{belt_progress_percentage, get_belt_rank, BeltRank};
use super::grace::{ensure_finite, MagnitudeBasedGracePenalty, PenaltyPolicy};
use super::penalty::CountBasedOverrunPenalty;
use crate::error::ValidationError;
use crate::history::HistoricalCompletion;
use crate::storage::config::EfficiencyConfig;

/// Efficiency summary shown next to the user's badge.
#[derive(Debug, Clone, Serialize)]
pub struct EfficiencyStats {
    /// average_efficiency - penalty
    pub final_efficiency: f64,
    /// Mean before any penalty
    pub average_efficiency: f64,
    pub penalty: f64,
    pub overrun_count: usize,
    /// Completions that went into the average
    pub completion_count: usize,
    /// Every qualifying completion seen, including those past the average window
    pub qualifying_count: usize,
    pub belt: &'static BeltRank,
    /// Progress through the current belt, 0-100
    pub belt_progress: f64,
    pub has_enough_data: bool,
    pub penalty_policy: PenaltyPolicy,
}

impl EfficiencyStats {
    /// Stats for a user with no qualifying history.
    pub fn empty(penalty_policy: PenaltyPolicy) -> Self {
        Self {
            final_efficiency: 0.0,
            average_efficiency: 0.0,
            penalty: 0.0,
            overrun_count: 0,
            completion_count: 0,
            qualifying_count: 0,
            belt: BeltRank::lowest(),
            belt_progress: 0.0,
            has_enough_data: false,
            penalty_policy,
        }
    }

    pub fn next_belt(&self) -> Option<&'static BeltRank> {
        self.belt.next()
    }
}

/// Builds [`EfficiencyStats`] from historical completions.
#[derive(Debug, Clone)]
pub struct EfficiencyStatsBuilder {
    config: EfficiencyConfig,
}

impl Default for EfficiencyStatsBuilder {
    fn default() -> Self {
        Self::new(EfficiencyConfig::default())
    }
}

impl EfficiencyStatsBuilder {
    pub fn new(config: EfficiencyConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EfficiencyConfig {
        &self.config
    }

    /// Build stats from completions ordered most-recent-first.
    ///
    /// Non-qualifying records (no regular tasks, no resolvable efficiency)
    /// are skipped. `has_enough_data` counts every qualifying record passed
    /// in, while the average only uses the newest `history_limit` of them.
    pub fn build(&self, records: &[HistoricalCompletion]) -> Result<EfficiencyStats, ValidationError> {
        let qualifying: Vec<f64> = records
            .iter()
            .filter(|r| r.has_regular_tasks)
            .filter_map(HistoricalCompletion::resolved_efficiency)
            .collect();

        let qualifying_count = qualifying.len();
        let has_enough_data = qualifying_count >= self.config.min_completions_for_rank;
        let window: Vec<f64> = qualifying
            .into_iter()
            .take(self.config.history_limit)
            .collect();

        if window.is_empty() {
            return Ok(EfficiencyStats {
                qualifying_count,
                ..EfficiencyStats::empty(self.config.penalty_policy)
            });
        }

        let (average_efficiency, penalty, overrun_count) = match self.config.penalty_policy {
            PenaltyPolicy::CountBased => {
                let average = window.iter().sum::<f64>() / window.len() as f64;
                let overrun = CountBasedOverrunPenalty {
                    forgiveness_threshold: self.config.forgiveness_threshold,
                    points_per_overrun: self.config.points_per_overrun,
                    cap: self.config.penalty_cap,
                }
                .calculate(&window);
                (average, overrun.penalty, overrun.overrun_count)
            }
            PenaltyPolicy::MagnitudeBased => {
                let fractions: Vec<f64> = window.iter().map(|p| p / 100.0).collect();
                let overall = MagnitudeBasedGracePenalty {
                    forgiveness_threshold: self.config.forgiveness_threshold,
                    multiplier: self.config.grace_multiplier,
                }
                .aggregate(&fractions)?;
                (
                    overall.average_efficiency * 100.0,
                    overall.grace_system_penalty * 100.0,
                    overall.negative_routine_count,
                )
            }
        };

        let final_efficiency = average_efficiency - penalty;
        ensure_finite(
            "average_efficiency, penalty, final_efficiency",
            &[average_efficiency, penalty, final_efficiency],
        )?;
        let belt = get_belt_rank(Some(final_efficiency), has_enough_data);
        let belt_progress = if has_enough_data {
            belt_progress_percentage(final_efficiency, belt)
        } else {
            0.0
        };

        tracing::debug!(
            completion_count = window.len(),
            average_efficiency,
            penalty,
            final_efficiency,
            belt = belt.name,
            has_enough_data,
            "efficiency stats built"
        );

        Ok(EfficiencyStats {
            final_efficiency,
            average_efficiency,
            penalty,
            overrun_count,
            completion_count: window.len(),
            qualifying_count,
            belt,
            belt_progress,
            has_enough_data,
            penalty_policy: self.config.penalty_policy,
        })
    }
}

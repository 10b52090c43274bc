//! Count-based overrun penalty.
//!
//! Up to `forgiveness_threshold` overruns (negative efficiencies) are free.
//! Past that, every overrun costs `points_per_overrun` percentage points,
//! capped at `cap`. This rule works in percentage points; the magnitude-based
//! grace penalty in [`super::grace`] works in fractions and is kept separate.

use serde::{Deserialize, Serialize};

/// Overruns forgiven before any penalty applies.
pub const DEFAULT_FORGIVENESS_THRESHOLD: usize = 3;
/// Percentage points charged per overrun once past the threshold.
pub const DEFAULT_POINTS_PER_OVERRUN: f64 = 1.5;
/// Upper bound on the count-based penalty, in percentage points.
pub const DEFAULT_PENALTY_CAP: f64 = 50.0;

/// Result of the count-based rule.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct OverrunPenalty {
    /// Penalty in percentage points, always >= 0
    pub penalty: f64,
    /// Number of values strictly below zero
    pub overrun_count: usize,
}

/// Linear per-overrun penalty with a forgiveness threshold and a hard cap.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CountBasedOverrunPenalty {
    pub forgiveness_threshold: usize,
    pub points_per_overrun: f64,
    pub cap: f64,
}

impl Default for CountBasedOverrunPenalty {
    fn default() -> Self {
        Self {
            forgiveness_threshold: DEFAULT_FORGIVENESS_THRESHOLD,
            points_per_overrun: DEFAULT_POINTS_PER_OVERRUN,
            cap: DEFAULT_PENALTY_CAP,
        }
    }
}

impl CountBasedOverrunPenalty {
    /// Apply the rule to a list of per-routine efficiencies.
    ///
    /// Only the sign of each value matters, so fractions and percentages
    /// give the same result.
    pub fn calculate(&self, efficiencies: &[f64]) -> OverrunPenalty {
        let overrun_count = efficiencies.iter().filter(|&&e| e < 0.0).count();

        let penalty = if overrun_count <= self.forgiveness_threshold {
            0.0
        } else {
            (overrun_count as f64 * self.points_per_overrun)
                .min(self.cap)
                .max(0.0)
        };

        if penalty > 0.0 {
            tracing::debug!(overrun_count, penalty, "count-based overrun penalty applied");
        }

        OverrunPenalty {
            penalty,
            overrun_count,
        }
    }
}

/// Count-based penalty with the default constants (3 forgiven, 1.5 points each, cap 50).
pub fn calculate_overrun_penalty(efficiencies: &[f64]) -> OverrunPenalty {
    CountBasedOverrunPenalty::default().calculate(efficiencies)
}

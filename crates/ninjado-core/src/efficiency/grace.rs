//! Grace System aggregation of per-routine efficiencies.
//!
//! The overall score is the plain mean of the routine efficiencies minus a
//! grace penalty. Up to three negative routines are forgiven; from the fourth
//! on, the penalty is twice the magnitude of all negative efficiencies summed.
//! Everything here is in fractions (0.8 == 80%).

use serde::{Deserialize, Serialize};

use super::penalty::DEFAULT_FORGIVENESS_THRESHOLD;
use crate::error::ValidationError;

/// Multiplier applied to the summed negative efficiencies.
pub const DEFAULT_GRACE_MULTIPLIER: f64 = 2.0;

/// Which penalty rule turns overruns into a score deduction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PenaltyPolicy {
    /// `count × points`, capped; see [`super::penalty::CountBasedOverrunPenalty`]
    #[default]
    CountBased,
    /// `multiplier × |Σ negatives|`; see [`MagnitudeBasedGracePenalty`]
    MagnitudeBased,
}

impl std::fmt::Display for PenaltyPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PenaltyPolicy::CountBased => write!(f, "count_based"),
            PenaltyPolicy::MagnitudeBased => write!(f, "magnitude_based"),
        }
    }
}

impl std::str::FromStr for PenaltyPolicy {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "count_based" | "count" => Ok(PenaltyPolicy::CountBased),
            "magnitude_based" | "magnitude" | "grace" => Ok(PenaltyPolicy::MagnitudeBased),
            other => Err(ValidationError::InvalidValue {
                field: "penalty_policy".to_string(),
                message: format!("unknown policy '{other}' (expected count_based or magnitude_based)"),
            }),
        }
    }
}

/// Aggregate over N routine runs.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct OverallEfficiencyResult {
    /// Mean of the routine efficiencies
    pub average_efficiency: f64,
    /// Deduction applied by the grace rule, always >= 0
    pub grace_system_penalty: f64,
    /// average_efficiency - grace_system_penalty
    pub final_efficiency: f64,
    /// Runs with efficiency strictly below zero
    pub negative_routine_count: usize,
}

/// Magnitude-based grace penalty.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MagnitudeBasedGracePenalty {
    pub forgiveness_threshold: usize,
    pub multiplier: f64,
}

impl Default for MagnitudeBasedGracePenalty {
    fn default() -> Self {
        Self {
            forgiveness_threshold: DEFAULT_FORGIVENESS_THRESHOLD,
            multiplier: DEFAULT_GRACE_MULTIPLIER,
        }
    }
}

impl MagnitudeBasedGracePenalty {
    /// Aggregate pre-filtered efficiencies.
    ///
    /// # Errors
    /// Returns [`ValidationError::NonFinite`] if any value is NaN or infinite,
    /// or if the sums overflow.
    pub fn aggregate(&self, efficiencies: &[f64]) -> Result<OverallEfficiencyResult, ValidationError> {
        ensure_finite("efficiencies", efficiencies)?;

        if efficiencies.is_empty() {
            return Ok(OverallEfficiencyResult::default());
        }

        let average_efficiency = efficiencies.iter().sum::<f64>() / efficiencies.len() as f64;

        let (negative_routine_count, negative_sum) = efficiencies
            .iter()
            .filter(|&&e| e < 0.0)
            .fold((0usize, 0.0f64), |(n, sum), &e| (n + 1, sum + e));

        let grace_system_penalty = self.penalty_for(negative_routine_count, negative_sum);
        let final_efficiency = average_efficiency - grace_system_penalty;
        ensure_finite(
            "average_efficiency, grace_system_penalty, final_efficiency",
            &[average_efficiency, grace_system_penalty, final_efficiency],
        )?;

        tracing::debug!(
            runs = efficiencies.len(),
            average_efficiency,
            negative_routine_count,
            grace_system_penalty,
            final_efficiency,
            "overall efficiency aggregated"
        );

        Ok(OverallEfficiencyResult {
            average_efficiency,
            grace_system_penalty,
            final_efficiency,
            negative_routine_count,
        })
    }

    /// Penalty for `count` negative runs summing to `negative_sum` (<= 0).
    pub fn penalty_for(&self, count: usize, negative_sum: f64) -> f64 {
        if count > self.forgiveness_threshold {
            (self.multiplier * negative_sum.abs()).max(0.0)
        } else {
            0.0
        }
    }
}

/// Grace System aggregation with the default constants.
///
/// Absent efficiencies must be removed beforehand, see [`present_efficiencies`].
pub fn calculate_overall_efficiency(
    efficiencies: &[f64],
) -> Result<OverallEfficiencyResult, ValidationError> {
    MagnitudeBasedGracePenalty::default().aggregate(efficiencies)
}

/// Drop absent routine efficiencies before aggregation.
pub fn present_efficiencies(values: &[Option<f64>]) -> Vec<f64> {
    values.iter().flatten().copied().collect()
}

pub(super) fn ensure_finite(field: &str, values: &[f64]) -> Result<(), ValidationError> {
    match values.iter().position(|v| !v.is_finite()) {
        Some(index) => Err(ValidationError::NonFinite {
            field: field.to_string(),
            index,
            value: values[index],
        }),
        None => Ok(()),
    }
}

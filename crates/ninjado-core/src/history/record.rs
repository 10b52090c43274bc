use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One stored routine completion, as supplied by the persistence side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalCompletion {
    pub completed_at: DateTime<Utc>,
    /// Precomputed efficiency in percent; absent on legacy records
    #[serde(default)]
    pub efficiency_percentage: Option<f64>,
    /// Seconds saved (negative when time was lost)
    #[serde(default)]
    pub total_time_saved: f64,
    /// Planned seconds of the run; only legacy records rely on it
    #[serde(default)]
    pub total_duration: Option<f64>,
    /// Whether the routine had at least one regular task
    #[serde(default = "default_true")]
    pub has_regular_tasks: bool,
}

fn default_true() -> bool {
    true
}

impl HistoricalCompletion {
    pub fn new(completed_at: DateTime<Utc>, efficiency_percentage: Option<f64>) -> Self {
        Self {
            completed_at,
            efficiency_percentage,
            total_time_saved: 0.0,
            total_duration: None,
            has_regular_tasks: true,
        }
    }

    /// Legacy record carrying only the raw time fields.
    pub fn legacy(completed_at: DateTime<Utc>, total_time_saved: f64, total_duration: f64) -> Self {
        Self {
            completed_at,
            efficiency_percentage: None,
            total_time_saved,
            total_duration: Some(total_duration),
            has_regular_tasks: true,
        }
    }

    /// Efficiency in percent, recomputed from the raw fields when needed.
    ///
    /// Falls back to `total_time_saved / total_duration * 100` when no
    /// precomputed value is stored. Non-finite results count as absent.
    pub fn resolved_efficiency(&self) -> Option<f64> {
        if let Some(pct) = self.efficiency_percentage {
            return pct.is_finite().then_some(pct);
        }

        let duration = self.total_duration.filter(|d| *d > 0.0)?;
        let pct = self.total_time_saved / duration * 100.0;
        if !pct.is_finite() {
            return None;
        }
        tracing::debug!(
            completed_at = %self.completed_at,
            efficiency = pct,
            "efficiency recomputed from legacy time fields"
        );
        Some(pct)
    }

    /// Counts toward stats and ranking.
    pub fn is_qualifying(&self) -> bool {
        self.has_regular_tasks && self.resolved_efficiency().is_some()
    }
}

//! Efficiency trend over fixed time windows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{HistoricalCompletion, TimeWindow};
use crate::error::HistoryError;

/// Movement of a window's average relative to the previous window with data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Up,
    Down,
    Stable,
}

impl TrendDirection {
    /// Classify a change in percentage points against a symmetric deadband.
    pub fn classify(change: f64, deadband: f64) -> Self {
        if change > deadband {
            TrendDirection::Up
        } else if change < -deadband {
            TrendDirection::Down
        } else {
            TrendDirection::Stable
        }
    }
}

/// One bucket of the trend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendWindow {
    pub window: TimeWindow,
    /// Mean efficiency in percent; `None` when the window holds no data
    pub average_efficiency: Option<f64>,
    pub completion_count: usize,
    /// Change from the previous window with data, in percentage points
    pub change: Option<f64>,
    pub direction: TrendDirection,
}

/// Bucket `records` into `window_count` windows of `window_days` ending at
/// `now`, oldest first.
///
/// Each window with data is compared to the most recent earlier window with
/// data; empty windows and the first window with data are `Stable`.
///
/// # Errors
/// Returns [`HistoryError::WindowOutOfRange`] if the oldest window cannot be
/// represented.
pub fn analyze_trend(
    records: &[HistoricalCompletion],
    now: DateTime<Utc>,
    window_days: u32,
    window_count: usize,
    deadband: f64,
) -> Result<Vec<TrendWindow>, HistoryError> {
    let mut previous: Option<f64> = None;

    (0..window_count)
        .rev()
        .map(|n| {
            let window = TimeWindow::try_preceding(now, window_days, n)?;
            let values: Vec<f64> = records
                .iter()
                .filter(|r| r.has_regular_tasks && window.contains(r.completed_at))
                .filter_map(HistoricalCompletion::resolved_efficiency)
                .collect();

            let average_efficiency =
                (!values.is_empty()).then(|| values.iter().sum::<f64>() / values.len() as f64);

            let change = match (average_efficiency, previous) {
                (Some(current), Some(prior)) => Some(current - prior),
                _ => None,
            };
            let direction = change
                .map(|c| TrendDirection::classify(c, deadband))
                .unwrap_or(TrendDirection::Stable);

            if average_efficiency.is_some() {
                previous = average_efficiency;
            }

            Ok(TrendWindow {
                window,
                average_efficiency,
                completion_count: values.len(),
                change,
                direction,
            })
        })
        .collect()
}

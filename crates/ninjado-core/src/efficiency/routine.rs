//! Routine-level efficiency from completed task timings.
//!
//! Only regular tasks count toward the ratio. Focus tasks are carried along
//! in the input but never change the result.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Kind of task inside a routine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    /// Timed task scored against its planned duration
    Regular,
    /// Open-ended focus block, excluded from the efficiency ratio
    Focus,
}

/// Planned vs. actual duration of one completed task, in seconds.
///
/// Construction goes through [`TaskCompletion::new`] (and deserialization
/// through the same check), so a zero planned duration never reaches the
/// calculator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawTaskCompletion")]
pub struct TaskCompletion {
    kind: TaskKind,
    planned_duration: u32,
    actual_duration: u32,
}

#[derive(Deserialize)]
struct RawTaskCompletion {
    kind: TaskKind,
    planned_duration: u32,
    actual_duration: u32,
}

impl TryFrom<RawTaskCompletion> for TaskCompletion {
    type Error = ValidationError;

    fn try_from(raw: RawTaskCompletion) -> Result<Self, Self::Error> {
        TaskCompletion::new(raw.kind, raw.planned_duration, raw.actual_duration)
    }
}

impl TaskCompletion {
    /// Create a completion record.
    ///
    /// # Errors
    /// Returns [`ValidationError::InvalidDuration`] if `planned_duration` is zero.
    pub fn new(
        kind: TaskKind,
        planned_duration: u32,
        actual_duration: u32,
    ) -> Result<Self, ValidationError> {
        if planned_duration == 0 {
            return Err(ValidationError::InvalidDuration {
                field: "planned_duration".to_string(),
                value: 0,
            });
        }
        Ok(Self {
            kind,
            planned_duration,
            actual_duration,
        })
    }

    /// Shorthand for a regular task.
    pub fn regular(planned_duration: u32, actual_duration: u32) -> Result<Self, ValidationError> {
        Self::new(TaskKind::Regular, planned_duration, actual_duration)
    }

    /// Shorthand for a focus task.
    pub fn focus(planned_duration: u32, actual_duration: u32) -> Result<Self, ValidationError> {
        Self::new(TaskKind::Focus, planned_duration, actual_duration)
    }

    pub fn kind(&self) -> TaskKind {
        self.kind
    }

    pub fn planned_duration(&self) -> u32 {
        self.planned_duration
    }

    pub fn actual_duration(&self) -> u32 {
        self.actual_duration
    }

    /// Seconds saved (positive) or lost (negative) on this task.
    pub fn time_saved(&self) -> i64 {
        i64::from(self.planned_duration) - i64::from(self.actual_duration)
    }
}

/// Diagnostic totals behind a routine efficiency.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EfficiencyBreakdown {
    /// Sum of actual seconds across regular tasks
    pub total_regular_actual: u64,
    /// Sum of planned seconds across regular tasks
    pub total_regular_planned: u64,
    /// actual / planned (0 when there are no regular tasks)
    pub ratio: f64,
    /// ratio < 1
    pub is_faster_than_planned: bool,
}

/// Efficiency of one routine run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoutineEfficiencyResult {
    /// Signed fraction; `None` when the run had no regular tasks
    pub efficiency: Option<f64>,
    pub breakdown: EfficiencyBreakdown,
}

impl RoutineEfficiencyResult {
    /// Efficiency expressed in percent.
    pub fn efficiency_percentage(&self) -> Option<f64> {
        self.efficiency.map(|e| e * 100.0)
    }
}

/// Compute the efficiency of one routine run.
///
/// A ratio below 1 (faster than planned) is reported as the ratio itself;
/// a ratio of 1 or more becomes `1 - ratio`, so finishing exactly on time
/// yields 0 and finishing 20% late yields -0.2.
pub fn calculate_routine_efficiency(tasks: &[TaskCompletion]) -> RoutineEfficiencyResult {
    let (total_regular_actual, total_regular_planned, regular_count) = tasks
        .iter()
        .filter(|t| t.kind == TaskKind::Regular)
        .fold((0u64, 0u64, 0usize), |(actual, planned, n), t| {
            (
                actual + u64::from(t.actual_duration),
                planned + u64::from(t.planned_duration),
                n + 1,
            )
        });

    if regular_count == 0 {
        tracing::debug!(task_count = tasks.len(), "no regular tasks, efficiency absent");
        return RoutineEfficiencyResult {
            efficiency: None,
            breakdown: EfficiencyBreakdown::default(),
        };
    }

    let ratio = total_regular_actual as f64 / total_regular_planned as f64;
    let efficiency = if ratio < 1.0 { ratio } else { 1.0 - ratio };

    tracing::debug!(
        regular_count,
        total_regular_actual,
        total_regular_planned,
        ratio,
        efficiency,
        "routine efficiency calculated"
    );

    RoutineEfficiencyResult {
        efficiency: Some(efficiency),
        breakdown: EfficiencyBreakdown {
            total_regular_actual,
            total_regular_planned,
            ratio,
            is_faster_than_planned: ratio < 1.0,
        },
    }
}

/// What gets persisted for one finished routine run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoutineRunSummary {
    pub result: RoutineEfficiencyResult,
    /// Seconds saved (positive) or lost (negative) across regular tasks
    pub time_saved_seconds: i64,
    /// Sum of planned seconds across regular tasks
    pub planned_seconds: u64,
    pub has_regular_tasks: bool,
}

impl RoutineRunSummary {
    /// Summarize a routine run for the history store.
    pub fn from_tasks(tasks: &[TaskCompletion]) -> Self {
        let result = calculate_routine_efficiency(tasks);
        let time_saved_seconds = tasks
            .iter()
            .filter(|t| t.kind == TaskKind::Regular)
            .map(TaskCompletion::time_saved)
            .sum();

        Self {
            result,
            time_saved_seconds,
            planned_seconds: result.breakdown.total_regular_planned,
            has_regular_tasks: result.efficiency.is_some(),
        }
    }
}

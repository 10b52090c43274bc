//! Historical completions: windowed fetching and trend analysis.
//!
//! A [`HistorySource`] hands out pages of completions per time window. The
//! [`HistoryFetcher`] walks windows backwards from "now", a few at a time,
//! until it has enough qualifying records, then feeds them to the efficiency
//! engine. Trend analysis buckets the same records into fixed windows.

mod fetcher;
mod record;
mod trend;

pub use fetcher::{overall_from_records, FetchOutcome, HistoryFetcher};
pub use record::HistoricalCompletion;
pub use trend::{analyze_trend, TrendDirection, TrendWindow};

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::HistoryError;

/// Half-open time range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// The `n`-th window of `days` days counting back from `end` (n = 0 ends at `end`).
    ///
    /// Returns `None` when the window falls outside the representable time range.
    pub fn preceding(end: DateTime<Utc>, days: u32, n: usize) -> Option<Self> {
        let span = Duration::try_days(i64::from(days))?;
        let back = span.checked_mul(i32::try_from(n).ok()?)?;
        let window_end = end.checked_sub_signed(back)?;
        Some(Self {
            start: window_end.checked_sub_signed(span)?,
            end: window_end,
        })
    }

    /// [`TimeWindow::preceding`], failing with [`HistoryError::WindowOutOfRange`].
    pub fn try_preceding(end: DateTime<Utc>, days: u32, n: usize) -> Result<Self, HistoryError> {
        Self::preceding(end, days, n).ok_or(HistoryError::WindowOutOfRange { days, index: n })
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.start && at < self.end
    }
}

impl std::fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..{}", self.start.to_rfc3339(), self.end.to_rfc3339())
    }
}

/// Paged access to stored completions.
#[async_trait]
pub trait HistorySource: Send + Sync {
    /// Completions inside `window`, most recent first, skipping `offset` and
    /// returning at most `limit`.
    async fn fetch_page(
        &self,
        window: TimeWindow,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<HistoricalCompletion>, HistoryError>;
}

/// In-memory [`HistorySource`].
#[derive(Debug, Default)]
pub struct MemoryHistorySource {
    records: Vec<HistoricalCompletion>,
    page_requests: AtomicUsize,
}

impl MemoryHistorySource {
    pub fn new(mut records: Vec<HistoricalCompletion>) -> Self {
        records.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));
        Self {
            records,
            page_requests: AtomicUsize::new(0),
        }
    }

    /// Number of `fetch_page` calls served so far.
    pub fn page_requests(&self) -> usize {
        self.page_requests.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl HistorySource for MemoryHistorySource {
    async fn fetch_page(
        &self,
        window: TimeWindow,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<HistoricalCompletion>, HistoryError> {
        self.page_requests.fetch_add(1, Ordering::Relaxed);
        Ok(self
            .records
            .iter()
            .filter(|r| window.contains(r.completed_at))
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }
}

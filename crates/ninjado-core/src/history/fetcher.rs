use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt, TryStreamExt};
use serde::Serialize;

use super::{HistoricalCompletion, HistorySource, TimeWindow};
use crate::efficiency::{
    calculate_overall_efficiency, EfficiencyStats, EfficiencyStatsBuilder, OverallEfficiencyResult,
};
use crate::error::{CoreError, HistoryError, ValidationError};
use crate::storage::HistoryConfig;

/// Result of a windowed history fetch.
#[derive(Debug, Clone, Serialize)]
pub struct FetchOutcome {
    /// Qualifying completions, most recent first, at most `limit` of them
    pub records: Vec<HistoricalCompletion>,
    pub windows_scanned: usize,
    /// Every record returned by the source, qualifying or not
    pub records_seen: usize,
    pub reached_limit: bool,
}

/// Pulls history from a [`HistorySource`] in bounded windows and batches.
pub struct HistoryFetcher<S> {
    source: S,
    config: HistoryConfig,
}

impl<S: HistorySource> HistoryFetcher<S> {
    pub fn new(source: S, config: HistoryConfig) -> Self {
        Self { source, config }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Collect up to `limit` qualifying completions before `now`.
    ///
    /// Windows are requested `max_in_flight` at a time and reassembled in
    /// order. Scanning stops once `limit` qualifying records are in hand or
    /// `max_windows` windows have been read. If any page fails, the whole
    /// fetch fails.
    pub async fn fetch_recent(
        &self,
        now: DateTime<Utc>,
        limit: usize,
    ) -> Result<FetchOutcome, HistoryError> {
        let in_flight = self.config.max_in_flight.max(1);
        let mut collected: Vec<HistoricalCompletion> = Vec::new();
        let mut qualifying = 0usize;
        let mut windows_scanned = 0usize;
        let mut records_seen = 0usize;
        let mut next_window = 0usize;

        while next_window < self.config.max_windows && qualifying < limit {
            let group_end = (next_window + in_flight).min(self.config.max_windows);
            let windows: Vec<TimeWindow> = (next_window..group_end)
                .map(|n| TimeWindow::try_preceding(now, self.config.window_days, n))
                .collect::<Result<_, _>>()?;

            let pages: Vec<Vec<HistoricalCompletion>> = stream::iter(windows)
                .map(|window| self.fetch_window(window))
                .buffered(in_flight)
                .try_collect()
                .await?;

            next_window = group_end;
            for window_records in pages {
                windows_scanned += 1;
                records_seen += window_records.len();
                qualifying += window_records.iter().filter(|r| r.is_qualifying()).count();
                collected.extend(window_records);
            }
        }

        collected.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));
        let records: Vec<HistoricalCompletion> = collected
            .into_iter()
            .filter(HistoricalCompletion::is_qualifying)
            .take(limit)
            .collect();
        let reached_limit = records.len() >= limit;

        tracing::info!(
            windows_scanned,
            records_seen,
            qualifying = records.len(),
            limit,
            "history fetch complete"
        );

        Ok(FetchOutcome {
            records,
            windows_scanned,
            records_seen,
            reached_limit,
        })
    }

    /// Every record in `window`, read in `batch_size` pages.
    async fn fetch_window(
        &self,
        window: TimeWindow,
    ) -> Result<Vec<HistoricalCompletion>, HistoryError> {
        let batch_size = self.config.batch_size.max(1);
        let mut records = Vec::new();
        let mut offset = 0usize;

        loop {
            let page = self.source.fetch_page(window, offset, batch_size).await?;
            let len = page.len();
            records.extend(page);
            offset += len;
            if len < batch_size {
                break;
            }
        }

        tracing::debug!(%window, records = records.len(), "window fetched");
        Ok(records)
    }

    /// Fetch enough history for `builder` and build the user's stats.
    pub async fn efficiency_stats(
        &self,
        now: DateTime<Utc>,
        builder: &EfficiencyStatsBuilder,
    ) -> Result<EfficiencyStats, CoreError> {
        let config = builder.config();
        let limit = config.history_limit.max(config.min_completions_for_rank);
        let outcome = self.fetch_recent(now, limit).await?;
        Ok(builder.build(&outcome.records)?)
    }

    /// Fetch `limit` completions and run them through the Grace System.
    pub async fn overall_efficiency(
        &self,
        now: DateTime<Utc>,
        limit: usize,
    ) -> Result<OverallEfficiencyResult, CoreError> {
        let outcome = self.fetch_recent(now, limit).await?;
        Ok(overall_from_records(&outcome.records)?)
    }
}

/// Grace System aggregate over stored completions.
///
/// Stored values are percentages; the aggregator works in fractions.
pub fn overall_from_records(
    records: &[HistoricalCompletion],
) -> Result<OverallEfficiencyResult, ValidationError> {
    let fractions: Vec<f64> = records
        .iter()
        .filter(|r| r.has_regular_tasks)
        .filter_map(HistoricalCompletion::resolved_efficiency)
        .map(|pct| pct / 100.0)
        .collect();
    calculate_overall_efficiency(&fractions)
}

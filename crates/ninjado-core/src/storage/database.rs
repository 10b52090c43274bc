//! SQLite-based routine completion history.
//!
//! Provides persistent storage for:
//! - Finished routine runs and their efficiency
//! - Legacy records that only carry raw time fields
//! - Paged, windowed reads for the history fetcher

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::efficiency::RoutineRunSummary;
use crate::error::{CoreError, DatabaseError, HistoryError};
use crate::history::{HistoricalCompletion, HistorySource, TimeWindow};

/// A completion as stored, with its row id and routine name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredCompletion {
    pub id: i64,
    pub routine_name: String,
    #[serde(flatten)]
    pub completion: HistoricalCompletion,
}

/// SQLite store for routine completions.
pub struct HistoryStore {
    conn: Mutex<Connection>,
}

const SELECT_COLUMNS: &str = "SELECT id, routine_name, completed_at, efficiency_percentage,
        total_time_saved, total_duration, has_regular_tasks
     FROM routine_completions";

impl HistoryStore {
    /// Open the store at `~/.config/ninjado/ninjado.db`.
    ///
    /// # Errors
    /// Returns an error if the data directory or database cannot be opened.
    pub fn open() -> Result<Self, CoreError> {
        let path = data_dir()?.join("ninjado.db");
        Ok(Self::open_at(&path)?)
    }

    /// Open (and migrate) a database file at `path`.
    pub fn open_at(path: &Path) -> Result<Self, DatabaseError> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.migrate()?;
        Ok(store)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self, DatabaseError> {
        let store = Self {
            conn: Mutex::new(Connection::open_in_memory()?),
        };
        store.migrate()?;
        Ok(store)
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, DatabaseError> {
        self.conn
            .lock()
            .map_err(|_| DatabaseError::QueryFailed("connection mutex poisoned".to_string()))
    }

    fn migrate(&self) -> Result<(), DatabaseError> {
        self.conn()?.execute_batch(
            "CREATE TABLE IF NOT EXISTS routine_completions (
                id                    INTEGER PRIMARY KEY AUTOINCREMENT,
                routine_name          TEXT NOT NULL DEFAULT '',
                completed_at          TEXT NOT NULL,
                efficiency_percentage REAL,
                total_time_saved      REAL NOT NULL DEFAULT 0,
                total_duration        REAL,
                has_regular_tasks     INTEGER NOT NULL DEFAULT 1
            );

            CREATE INDEX IF NOT EXISTS idx_completions_completed_at
                ON routine_completions(completed_at);",
        )?;
        Ok(())
    }

    /// Store a finished routine run.
    pub fn record_run(
        &self,
        routine_name: &str,
        summary: &RoutineRunSummary,
        completed_at: DateTime<Utc>,
    ) -> Result<i64, DatabaseError> {
        let completion = HistoricalCompletion {
            completed_at,
            efficiency_percentage: summary.result.efficiency_percentage(),
            total_time_saved: summary.time_saved_seconds as f64,
            total_duration: Some(summary.planned_seconds as f64),
            has_regular_tasks: summary.has_regular_tasks,
        };
        self.record_completion(routine_name, &completion)
    }

    /// Store a completion record as-is.
    pub fn record_completion(
        &self,
        routine_name: &str,
        completion: &HistoricalCompletion,
    ) -> Result<i64, DatabaseError> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO routine_completions
                (routine_name, completed_at, efficiency_percentage, total_time_saved,
                 total_duration, has_regular_tasks)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                routine_name,
                timestamp(completion.completed_at),
                completion.efficiency_percentage,
                completion.total_time_saved,
                completion.total_duration,
                completion.has_regular_tasks,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Most recent completions, newest first.
    pub fn recent(&self, limit: usize) -> Result<Vec<StoredCompletion>, DatabaseError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "{SELECT_COLUMNS} ORDER BY completed_at DESC, id DESC LIMIT ?1"
        ))?;
        let rows = stmt.query_map(params![limit as i64], stored_from_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Completions inside `window`, newest first.
    pub fn in_window(
        &self,
        window: TimeWindow,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<StoredCompletion>, DatabaseError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "{SELECT_COLUMNS}
             WHERE completed_at >= ?1 AND completed_at < ?2
             ORDER BY completed_at DESC, id DESC
             LIMIT ?3 OFFSET ?4"
        ))?;
        let rows = stmt.query_map(
            params![
                timestamp(window.start),
                timestamp(window.end),
                limit as i64,
                offset as i64
            ],
            stored_from_row,
        )?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Completions with regular tasks and a usable efficiency.
    pub fn count_qualifying(&self) -> Result<u64, DatabaseError> {
        let count: i64 = self.conn()?.query_row(
            "SELECT COUNT(*) FROM routine_completions
             WHERE has_regular_tasks = 1
               AND (efficiency_percentage IS NOT NULL
                    OR (total_duration IS NOT NULL AND total_duration > 0))",
            [],
            |row| row.get(0),
        )?;
        Ok(count.max(0) as u64)
    }

    /// Seconds saved (or lost, if negative) across all stored runs.
    pub fn total_time_saved(&self) -> Result<f64, DatabaseError> {
        let total: Option<f64> = self
            .conn()?
            .query_row(
                "SELECT SUM(total_time_saved) FROM routine_completions",
                [],
                |row| row.get::<_, Option<f64>>(0),
            )
            .optional()?
            .flatten();
        Ok(total.unwrap_or(0.0))
    }
}

#[async_trait]
impl HistorySource for HistoryStore {
    async fn fetch_page(
        &self,
        window: TimeWindow,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<HistoricalCompletion>, HistoryError> {
        Ok(self
            .in_window(window, offset, limit)?
            .into_iter()
            .map(|stored| stored.completion)
            .collect())
    }
}

fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn stored_from_row(row: &Row<'_>) -> Result<StoredCompletion, rusqlite::Error> {
    let raw_completed_at: String = row.get(2)?;
    let completed_at = DateTime::parse_from_rfc3339(&raw_completed_at)
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(e))
        })?
        .with_timezone(&Utc);

    Ok(StoredCompletion {
        id: row.get(0)?,
        routine_name: row.get(1)?,
        completion: HistoricalCompletion {
            completed_at,
            efficiency_percentage: row.get(3)?,
            total_time_saved: row.get(4)?,
            total_duration: row.get(5)?,
            has_regular_tasks: row.get(6)?,
        },
    })
}

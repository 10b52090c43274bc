//! TOML-based engine configuration.
//!
//! Stores:
//! - Penalty policy and its thresholds
//! - Ranking requirements (history size, minimum completions)
//! - History windowing and batching limits
//! - Calculator cache settings
//!
//! Configuration is stored at `~/.config/ninjado/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::efficiency::{
    PenaltyPolicy, DEFAULT_FORGIVENESS_THRESHOLD, DEFAULT_GRACE_MULTIPLIER, DEFAULT_PENALTY_CAP,
    DEFAULT_POINTS_PER_OVERRUN,
};
use crate::error::ConfigError;

/// Longest allowed history or trend window, in days.
pub const MAX_WINDOW_DAYS: u32 = 3650;
/// Most windows a fetch or trend may walk back.
pub const MAX_WINDOWS: usize = 520;

/// Scoring configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EfficiencyConfig {
    #[serde(default)]
    pub penalty_policy: PenaltyPolicy,
    #[serde(default = "default_forgiveness_threshold")]
    pub forgiveness_threshold: usize,
    #[serde(default = "default_points_per_overrun")]
    pub points_per_overrun: f64,
    #[serde(default = "default_penalty_cap")]
    pub penalty_cap: f64,
    #[serde(default = "default_grace_multiplier")]
    pub grace_multiplier: f64,
    /// Qualifying completions required before a belt is awarded.
    #[serde(default = "default_30")]
    pub min_completions_for_rank: usize,
    /// Most recent completions averaged into the stats.
    #[serde(default = "default_30")]
    pub history_limit: usize,
}

/// History fetch and trend configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryConfig {
    #[serde(default = "default_window_days")]
    pub window_days: u32,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Windows fetched concurrently.
    #[serde(default = "default_max_in_flight")]
    pub max_in_flight: usize,
    #[serde(default = "default_max_windows")]
    pub max_windows: usize,
    #[serde(default = "default_trend_window_days")]
    pub trend_window_days: u32,
    #[serde(default = "default_trend_windows")]
    pub trend_windows: usize,
    /// Percentage points a window must move to count as up or down.
    #[serde(default = "default_trend_deadband")]
    pub trend_deadband: f64,
}

/// Calculator cache configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_cache_capacity")]
    pub capacity: usize,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/ninjado/config.toml`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub efficiency: EfficiencyConfig,
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub cache: CacheConfig,
}

// Default functions
fn default_forgiveness_threshold() -> usize {
    DEFAULT_FORGIVENESS_THRESHOLD
}
fn default_points_per_overrun() -> f64 {
    DEFAULT_POINTS_PER_OVERRUN
}
fn default_penalty_cap() -> f64 {
    DEFAULT_PENALTY_CAP
}
fn default_grace_multiplier() -> f64 {
    DEFAULT_GRACE_MULTIPLIER
}
fn default_30() -> usize {
    30
}
fn default_window_days() -> u32 {
    30
}
fn default_batch_size() -> usize {
    50
}
fn default_max_in_flight() -> usize {
    3
}
fn default_max_windows() -> usize {
    12
}
fn default_trend_window_days() -> u32 {
    7
}
fn default_trend_windows() -> usize {
    8
}
fn default_trend_deadband() -> f64 {
    2.0
}
fn default_true() -> bool {
    true
}
fn default_cache_capacity() -> usize {
    256
}

impl Default for EfficiencyConfig {
    fn default() -> Self {
        Self {
            penalty_policy: PenaltyPolicy::default(),
            forgiveness_threshold: default_forgiveness_threshold(),
            points_per_overrun: default_points_per_overrun(),
            penalty_cap: default_penalty_cap(),
            grace_multiplier: default_grace_multiplier(),
            min_completions_for_rank: 30,
            history_limit: 30,
        }
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            window_days: default_window_days(),
            batch_size: default_batch_size(),
            max_in_flight: default_max_in_flight(),
            max_windows: default_max_windows(),
            trend_window_days: default_trend_window_days(),
            trend_windows: default_trend_windows(),
            trend_deadband: default_trend_deadband(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            capacity: default_cache_capacity(),
        }
    }
}

impl HistoryConfig {
    /// Reject windows that are empty or reach too far back.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |key: &str, message: String| -> Result<(), ConfigError> {
            Err(ConfigError::InvalidValue {
                key: key.to_string(),
                message,
            })
        };
        for (key, days) in [
            ("history.window_days", self.window_days),
            ("history.trend_window_days", self.trend_window_days),
        ] {
            if days == 0 || days > MAX_WINDOW_DAYS {
                return invalid(key, format!("must be between 1 and {MAX_WINDOW_DAYS} days"));
            }
        }
        for (key, count) in [
            ("history.max_windows", self.max_windows),
            ("history.trend_windows", self.trend_windows),
        ] {
            if count > MAX_WINDOWS {
                return invalid(key, format!("must be at most {MAX_WINDOWS}"));
            }
        }
        if self.batch_size == 0 || self.max_in_flight == 0 {
            return invalid(
                "history.batch_size",
                "batch size and concurrency must be at least 1".to_string(),
            );
        }
        if !(self.trend_deadband.is_finite() && self.trend_deadband >= 0.0) {
            return invalid("history.trend_deadband", "must be a non-negative number".to_string());
        }
        Ok(())
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::InvalidValue {
            key: key.to_string(),
            message: "unknown config key".to_string(),
        };
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        if key.is_empty() {
            return Err(unknown());
        }
        let (parents, leaf) = match key.rsplit_once('.') {
            Some((parents, leaf)) => (Some(parents), leaf),
            None => (None, key),
        };

        let mut current = root;
        for part in parents.into_iter().flat_map(|p| p.split('.')) {
            current = current.get_mut(part).ok_or_else(unknown)?;
        }
        let obj = current.as_object_mut().ok_or_else(unknown)?;

        let existing = obj.get(leaf).ok_or_else(unknown)?;
        let new_value = match existing {
            serde_json::Value::Bool(_) => serde_json::Value::Bool(
                value
                    .parse::<bool>()
                    .map_err(|_| invalid(format!("expected true or false, got '{value}'")))?,
            ),
            serde_json::Value::Number(n) if n.is_u64() || n.is_i64() => {
                let parsed = value
                    .parse::<u64>()
                    .map_err(|_| invalid(format!("expected an integer, got '{value}'")))?;
                serde_json::Value::from(parsed)
            }
            serde_json::Value::Number(_) => {
                let parsed = value
                    .parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .ok_or_else(|| invalid(format!("expected a number, got '{value}'")))?;
                serde_json::Value::from(parsed)
            }
            serde_json::Value::String(_) => serde_json::Value::String(value.to_string()),
            _ => return Err(invalid("not a scalar value".to_string())),
        };
        obj.insert(leaf.to_string(), new_value);
        Ok(())
    }

    /// Path of the config file in the data directory.
    pub fn path() -> Result<PathBuf, ConfigError> {
        data_dir()
            .map(|dir| dir.join("config.toml"))
            .map_err(|e| ConfigError::LoadFailed {
                path: PathBuf::from("config.toml"),
                message: e.to_string(),
            })
    }

    /// Load from the data directory, falling back to defaults.
    pub fn load() -> Self {
        match Self::path() {
            Ok(path) => Self::load_from(&path).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "using default configuration");
                Self::default()
            }),
            Err(e) => {
                tracing::warn!(error = %e, "config directory unavailable, using defaults");
                Self::default()
            }
        }
    }

    /// Load from `path`. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let config: Config =
            toml::from_str(&content).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        std::fs::write(path, content).map_err(|e| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Reject values the engine cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |key: &str, message: &str| -> Result<(), ConfigError> {
            Err(ConfigError::InvalidValue {
                key: key.to_string(),
                message: message.to_string(),
            })
        };
        let e = &self.efficiency;
        if !(e.points_per_overrun.is_finite() && e.points_per_overrun >= 0.0) {
            return invalid("efficiency.points_per_overrun", "must be a non-negative number");
        }
        if !(e.penalty_cap.is_finite() && e.penalty_cap >= 0.0) {
            return invalid("efficiency.penalty_cap", "must be a non-negative number");
        }
        if !(e.grace_multiplier.is_finite() && e.grace_multiplier >= 0.0) {
            return invalid("efficiency.grace_multiplier", "must be a non-negative number");
        }
        if e.history_limit == 0 {
            return invalid("efficiency.history_limit", "must be at least 1");
        }
        self.history.validate()
    }

    /// Read a value by dotted key, e.g. `efficiency.penalty_policy`.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        match Self::get_json_value_by_path(&json, key)? {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a value by dotted key and persist the result.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        self.apply(key, value)?;
        self.save()
    }

    /// Set a value by dotted key in memory only.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json =
            serde_json::to_value(&*self).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }
}

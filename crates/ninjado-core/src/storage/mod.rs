pub mod config;
pub mod database;

pub use config::{CacheConfig, Config, EfficiencyConfig, HistoryConfig, MAX_WINDOWS, MAX_WINDOW_DAYS};
pub use database::{HistoryStore, StoredCompletion};

use std::path::PathBuf;

/// Returns the data directory, creating it if needed.
///
/// `NINJADO_DATA_DIR` overrides the location outright. Otherwise this is
/// `~/.config/ninjado/`, or `~/.config/ninjado-dev/` when `NINJADO_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, std::io::Error> {
    let dir = match std::env::var_os("NINJADO_DATA_DIR") {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("NINJADO_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("ninjado-dev")
            } else {
                base_dir.join("ninjado")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

//! Basic CLI E2E tests.
//!
//! Tests invoke the built binary against a temporary data directory and
//! verify outputs.

use std::path::Path;
use std::process::Command;

use tempfile::TempDir;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(data_dir: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_ninjado-cli"))
        .args(args)
        .env("NINJADO_DATA_DIR", data_dir)
        .env_remove("NINJADO_LOG")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

fn run_json(data_dir: &Path, args: &[&str]) -> serde_json::Value {
    let (stdout, stderr, code) = run_cli(data_dir, args);
    assert_eq!(code, 0, "command {args:?} failed: {stderr}");
    serde_json::from_str(&stdout).expect("Failed to parse JSON output")
}

fn write_tasks(dir: &TempDir, name: &str, json: &str) -> String {
    let path = dir.path().join(name);
    std::fs::write(&path, json).unwrap();
    path.to_string_lossy().to_string()
}

const SCENARIO_A: &str = r#"[
    {"kind": "regular", "planned_duration": 600, "actual_duration": 480},
    {"kind": "regular", "planned_duration": 600, "actual_duration": 480},
    {"kind": "regular", "planned_duration": 600, "actual_duration": 480},
    {"kind": "focus", "planned_duration": 600, "actual_duration": 720}
]"#;

#[test]
fn test_routine_scores_task_file() {
    let dir = TempDir::new().unwrap();
    let file = write_tasks(&dir, "a.json", SCENARIO_A);

    let json = run_json(dir.path(), &["routine", &file]);
    let efficiency = json["efficiency"].as_f64().unwrap();
    assert!((efficiency - 0.8).abs() < 1e-3);
    assert_eq!(json["breakdown"]["total_regular_planned"], 1800);
}

#[test]
fn test_routine_focus_only_is_null() {
    let dir = TempDir::new().unwrap();
    let file = write_tasks(
        &dir,
        "focus.json",
        r#"[{"kind": "focus", "planned_duration": 600, "actual_duration": 300}]"#,
    );
    let json = run_json(dir.path(), &["routine", &file]);
    assert!(json["efficiency"].is_null());
}

#[test]
fn test_routine_multiple_files_prints_array() {
    let dir = TempDir::new().unwrap();
    let file = write_tasks(&dir, "a.json", SCENARIO_A);
    let json = run_json(dir.path(), &["routine", &file, &file]);
    assert_eq!(json.as_array().map(Vec::len), Some(2));
}

#[test]
fn test_routine_rejects_zero_planned_duration() {
    let dir = TempDir::new().unwrap();
    let file = write_tasks(
        &dir,
        "bad.json",
        r#"[{"kind": "regular", "planned_duration": 0, "actual_duration": 30}]"#,
    );
    let (_, stderr, code) = run_cli(dir.path(), &["routine", &file]);
    assert_ne!(code, 0);
    assert!(stderr.contains("error:"));
}

#[test]
fn test_overall_grace_penalty() {
    let dir = TempDir::new().unwrap();
    let json = run_json(
        dir.path(),
        &["overall", "-0.10", "-0.05", "-0.15", "-0.08", "-0.12"],
    );
    assert_eq!(json["negative_routine_count"], 5);
    assert!((json["grace_system_penalty"].as_f64().unwrap() - 1.0).abs() < 1e-3);
    assert!((json["final_efficiency"].as_f64().unwrap() + 1.1).abs() < 1e-3);
}

#[test]
fn test_overall_count_based_policy() {
    let dir = TempDir::new().unwrap();
    let json = run_json(
        dir.path(),
        &["overall", "--policy", "count-based", "-0.1", "-0.1", "-0.1", "-0.1"],
    );
    assert_eq!(json["overrun_count"], 4);
    assert!((json["penalty"].as_f64().unwrap() - 6.0).abs() < 1e-9);
}

#[test]
fn test_belt_rank() {
    let dir = TempDir::new().unwrap();
    let json = run_json(dir.path(), &["belt", "72"]);
    assert_eq!(json["name"], "Advanced");
    assert_eq!(json["next"], "Expert");

    let json = run_json(dir.path(), &["belt", "72", "--insufficient-data"]);
    assert_eq!(json["name"], "Beginner");
}

#[test]
fn test_record_then_stats() {
    let dir = TempDir::new().unwrap();
    let file = write_tasks(&dir, "a.json", SCENARIO_A);

    let json = run_json(dir.path(), &["record", "Morning", &file]);
    assert!((json["efficiency_percentage"].as_f64().unwrap() - 80.0).abs() < 1e-3);
    assert_eq!(json["time_saved_seconds"], 360);

    let stats = run_json(dir.path(), &["stats", "--json"]);
    assert_eq!(stats["completion_count"], 1);
    assert_eq!(stats["has_enough_data"], false);
    assert_eq!(stats["belt"]["name"], "Beginner");
    assert!((stats["final_efficiency"].as_f64().unwrap() - 80.0).abs() < 1e-3);
}

#[test]
fn test_stats_progress_counts_every_qualifying_routine() {
    let dir = TempDir::new().unwrap();
    let file = write_tasks(&dir, "a.json", SCENARIO_A);
    let (_, _, code) = run_cli(dir.path(), &["config", "set", "efficiency.history_limit", "1"]);
    assert_eq!(code, 0);
    for hours_ago in 1..=3 {
        let at = (chrono::Utc::now() - chrono::Duration::hours(hours_ago)).to_rfc3339();
        let (_, stderr, code) = run_cli(dir.path(), &["record", "Morning", &file, "--at", &at]);
        assert_eq!(code, 0, "{stderr}");
    }

    let stats = run_json(dir.path(), &["stats", "--json"]);
    assert_eq!(stats["completion_count"], 1);
    assert_eq!(stats["qualifying_count"], 3);
}

#[test]
fn test_record_rejects_bad_timestamp() {
    let dir = TempDir::new().unwrap();
    let file = write_tasks(&dir, "a.json", SCENARIO_A);
    let (_, stderr, code) = run_cli(dir.path(), &["record", "Morning", &file, "--at", "yesterday"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("invalid --at"));
}

#[test]
fn test_stats_summary_on_empty_history() {
    let dir = TempDir::new().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["stats"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("Beginner"));
}

#[test]
fn test_trend_json_has_configured_windows() {
    let dir = TempDir::new().unwrap();
    let json = run_json(dir.path(), &["trend", "--json", "--windows", "4"]);
    assert_eq!(json.as_array().map(Vec::len), Some(4));
}

#[test]
fn test_trend_rejects_too_many_windows() {
    let dir = TempDir::new().unwrap();
    let (_, stderr, code) = run_cli(dir.path(), &["trend", "--windows", "100000"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("--windows must be at most"));
}

#[test]
fn test_oversized_window_config_is_rejected() {
    let dir = TempDir::new().unwrap();
    let (_, stderr, code) = run_cli(dir.path(), &["config", "set", "history.window_days", "4000000000"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("history.window_days"));

    let (stdout, _, code) = run_cli(dir.path(), &["stats"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("Beginner"));
}

#[test]
fn test_config_set_get_reset() {
    let dir = TempDir::new().unwrap();

    let (stdout, _, code) = run_cli(dir.path(), &["config", "set", "efficiency.history_limit", "20"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "ok");

    let (stdout, _, _) = run_cli(dir.path(), &["config", "get", "efficiency.history_limit"]);
    assert_eq!(stdout.trim(), "20");

    let (_, _, code) = run_cli(dir.path(), &["config", "reset"]);
    assert_eq!(code, 0);
    let (stdout, _, _) = run_cli(dir.path(), &["config", "get", "efficiency.history_limit"]);
    assert_eq!(stdout.trim(), "30");
}

#[test]
fn test_config_get_unknown_key_fails() {
    let dir = TempDir::new().unwrap();
    let (_, stderr, code) = run_cli(dir.path(), &["config", "get", "efficiency.nope"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("unknown key"));
}

//! End-to-end checks of the scoring pipeline: routine efficiency, Grace
//! System aggregation, belt ranks and the composed user stats.

use chrono::{Duration, TimeZone, Utc};
use ninjado_core::efficiency::{
    present_efficiencies, CountBasedOverrunPenalty, EfficiencyCache, MagnitudeBasedGracePenalty,
};
use ninjado_core::storage::EfficiencyConfig;
use ninjado_core::{
    belt_progress_percentage, calculate_overall_efficiency, calculate_overrun_penalty,
    calculate_routine_efficiency, get_belt_rank, BeltRank, EfficiencyStatsBuilder,
    HistoricalCompletion, PenaltyPolicy, TaskCompletion,
};

const TOLERANCE: f64 = 1e-3;

fn regular(planned: u32, actual: u32) -> TaskCompletion {
    TaskCompletion::regular(planned, actual).unwrap()
}

fn focus(planned: u32, actual: u32) -> TaskCompletion {
    TaskCompletion::focus(planned, actual).unwrap()
}

#[test]
fn test_scenario_a_faster_than_planned() {
    let tasks = vec![
        regular(600, 480),
        regular(600, 480),
        regular(600, 480),
        focus(600, 720),
    ];
    let result = calculate_routine_efficiency(&tasks);
    assert!((result.efficiency.unwrap() - 0.8).abs() < TOLERANCE);
    assert_eq!(result.breakdown.total_regular_actual, 1440);
    assert_eq!(result.breakdown.total_regular_planned, 1800);
    assert!(result.breakdown.is_faster_than_planned);

    let without_focus = calculate_routine_efficiency(&tasks[..3]);
    assert_eq!(result, without_focus);
}

#[test]
fn test_scenario_b_slower_than_planned() {
    let tasks = vec![regular(600, 720), regular(600, 720), focus(900, 600)];
    let result = calculate_routine_efficiency(&tasks);
    assert!((result.efficiency.unwrap() + 0.2).abs() < TOLERANCE);
    assert!(!result.breakdown.is_faster_than_planned);
}

#[test]
fn test_scenario_c_focus_only() {
    let tasks = vec![focus(600, 300), focus(1200, 1500)];
    let result = calculate_routine_efficiency(&tasks);
    assert_eq!(result.efficiency, None);
    assert_eq!(result.breakdown.total_regular_actual, 0);
    assert_eq!(result.breakdown.total_regular_planned, 0);
    assert_eq!(result.breakdown.ratio, 0.0);
    assert!(!result.breakdown.is_faster_than_planned);
}

#[test]
fn test_scenario_d_grace_penalty() {
    let result = calculate_overall_efficiency(&[-0.10, -0.05, -0.15, -0.08, -0.12]).unwrap();
    assert!((result.average_efficiency + 0.10).abs() < TOLERANCE);
    assert_eq!(result.negative_routine_count, 5);
    assert!((result.grace_system_penalty - 1.00).abs() < TOLERANCE);
    assert!((result.final_efficiency + 1.10).abs() < TOLERANCE);
}

#[test]
fn test_scenario_e_grace_forgiveness() {
    let result = calculate_overall_efficiency(&[-0.05, -0.10, -0.08]).unwrap();
    assert_eq!(result.negative_routine_count, 3);
    assert_eq!(result.grace_system_penalty, 0.0);
    assert!((result.final_efficiency + 0.0767).abs() < TOLERANCE);
}

#[test]
fn test_scenario_f_rank_classification() {
    assert_eq!(get_belt_rank(Some(72.0), true).name, "Advanced");
    assert_eq!(get_belt_rank(Some(72.0), false).name, "Beginner");
}

#[test]
fn test_exactly_on_time_scores_zero() {
    let result = calculate_routine_efficiency(&[regular(600, 600)]);
    assert_eq!(result.efficiency, Some(0.0));
    assert_eq!(result.breakdown.ratio, 1.0);
    assert!(!result.breakdown.is_faster_than_planned);
}

#[test]
fn test_calculators_are_idempotent() {
    let tasks = vec![regular(700, 430), regular(300, 410), focus(100, 5)];
    let first = calculate_routine_efficiency(&tasks);
    let second = calculate_routine_efficiency(&tasks);
    assert_eq!(first.efficiency.map(f64::to_bits), second.efficiency.map(f64::to_bits));
    assert_eq!(first, second);

    let values = [0.4, -0.3, -0.2, -0.1, -0.6, 0.9];
    assert_eq!(
        calculate_overall_efficiency(&values).unwrap(),
        calculate_overall_efficiency(&values).unwrap()
    );
    assert_eq!(calculate_overrun_penalty(&values), calculate_overrun_penalty(&values));
    assert_eq!(get_belt_rank(Some(79.9), true), get_belt_rank(Some(79.9), true));
}

#[test]
fn test_routine_results_feed_the_aggregate() {
    let runs = vec![
        vec![regular(600, 480)],
        vec![focus(600, 100)],
        vec![regular(600, 660)],
    ];
    let efficiencies: Vec<Option<f64>> = runs
        .iter()
        .map(|tasks| calculate_routine_efficiency(tasks).efficiency)
        .collect();
    let values = present_efficiencies(&efficiencies);
    assert_eq!(values.len(), 2);

    let overall = calculate_overall_efficiency(&values).unwrap();
    assert!((overall.average_efficiency - 0.35).abs() < TOLERANCE);
    assert_eq!(overall.negative_routine_count, 1);
    assert_eq!(overall.grace_system_penalty, 0.0);
}

#[test]
fn test_penalty_policies_stay_distinct() {
    let values = [-0.1, -0.1, -0.1, -0.1, 0.5];
    let count_based = CountBasedOverrunPenalty::default().calculate(&values);
    let magnitude = MagnitudeBasedGracePenalty::default().aggregate(&values).unwrap();

    assert_eq!(count_based.overrun_count, 4);
    assert!((count_based.penalty - 6.0).abs() < TOLERANCE);
    assert!((magnitude.grace_system_penalty - 0.8).abs() < TOLERANCE);
}

#[test]
fn test_count_penalty_is_capped() {
    let values = vec![-1.0; 40];
    let penalty = calculate_overrun_penalty(&values);
    assert_eq!(penalty.overrun_count, 40);
    assert_eq!(penalty.penalty, 50.0);
}

#[test]
fn test_belt_progress_bounds() {
    let advanced = get_belt_rank(Some(72.5), true);
    assert!((belt_progress_percentage(72.5, advanced) - 50.0).abs() < TOLERANCE);
    assert_eq!(belt_progress_percentage(1000.0, BeltRank::highest()), 100.0);

    let beginner = BeltRank::lowest();
    let progress = belt_progress_percentage(-500.0, beginner);
    assert!((0.0..=100.0).contains(&progress));
}

fn history(values: &[f64]) -> Vec<HistoricalCompletion> {
    let newest = Utc.with_ymd_and_hms(2026, 10, 1, 8, 0, 0).unwrap();
    values
        .iter()
        .enumerate()
        .map(|(i, pct)| HistoricalCompletion::new(newest - Duration::days(i as i64), Some(*pct)))
        .collect()
}

#[test]
fn test_stats_rank_once_enough_history() {
    let builder = EfficiencyStatsBuilder::default();
    let stats = builder.build(&history(&[72.0; 30])).unwrap();
    assert!(stats.has_enough_data);
    assert_eq!(stats.completion_count, 30);
    assert_eq!(stats.belt.name, "Advanced");
    assert!((stats.final_efficiency - 72.0).abs() < TOLERANCE);
    assert_eq!(stats.next_belt().map(|b| b.name), Some("Expert"));
}

#[test]
fn test_stats_stay_beginner_without_enough_history() {
    let builder = EfficiencyStatsBuilder::default();
    let stats = builder.build(&history(&[90.0; 29])).unwrap();
    assert!(!stats.has_enough_data);
    assert_eq!(stats.belt.name, "Beginner");
    assert!((stats.average_efficiency - 90.0).abs() < TOLERANCE);
}

#[test]
fn test_stats_count_based_penalty_in_points() {
    let mut values = vec![80.0; 26];
    values.extend([-10.0, -10.0, -10.0, -10.0]);
    let stats = EfficiencyStatsBuilder::default().build(&history(&values)).unwrap();
    assert_eq!(stats.penalty_policy, PenaltyPolicy::CountBased);
    assert_eq!(stats.overrun_count, 4);
    assert!((stats.penalty - 6.0).abs() < TOLERANCE);
    assert!((stats.final_efficiency - (stats.average_efficiency - 6.0)).abs() < TOLERANCE);
}

#[test]
fn test_stats_magnitude_based_penalty_in_points() {
    let config = EfficiencyConfig {
        penalty_policy: PenaltyPolicy::MagnitudeBased,
        ..EfficiencyConfig::default()
    };
    let mut values = vec![80.0; 26];
    values.extend([-10.0, -10.0, -10.0, -10.0]);
    let stats = EfficiencyStatsBuilder::new(config).build(&history(&values)).unwrap();
    assert_eq!(stats.overrun_count, 4);
    assert!((stats.penalty - 80.0).abs() < TOLERANCE);
}

#[test]
fn test_stats_use_newest_window_only() {
    let mut values = vec![50.0; 30];
    values.extend(vec![-100.0; 10]);
    let stats = EfficiencyStatsBuilder::default().build(&history(&values)).unwrap();
    assert_eq!(stats.completion_count, 30);
    assert_eq!(stats.overrun_count, 0);
    assert!((stats.final_efficiency - 50.0).abs() < TOLERANCE);
}

#[test]
fn test_stats_from_legacy_records() {
    let newest = Utc.with_ymd_and_hms(2026, 10, 1, 8, 0, 0).unwrap();
    let records: Vec<_> = (0..30)
        .map(|i| HistoricalCompletion::legacy(newest - Duration::days(i), 90.0, 100.0))
        .collect();
    let stats = EfficiencyStatsBuilder::default().build(&records).unwrap();
    assert!(stats.has_enough_data);
    assert_eq!(stats.belt.name, "Grandmaster");
    assert_eq!(stats.belt_progress, 100.0);
}

#[test]
fn test_cache_matches_direct_calls() {
    let cache = EfficiencyCache::new(8);
    let tasks = vec![regular(600, 480), focus(600, 720)];
    assert_eq!(cache.routine_efficiency(&tasks), calculate_routine_efficiency(&tasks));
    assert_eq!(cache.routine_efficiency(&tasks), calculate_routine_efficiency(&tasks));

    let values = [-0.10, -0.05, -0.15, -0.08, -0.12];
    assert_eq!(
        cache.overall_efficiency(&values).unwrap(),
        calculate_overall_efficiency(&values).unwrap()
    );
    let stats = cache.stats();
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.misses, 2);
}

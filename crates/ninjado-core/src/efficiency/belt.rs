//! Belt ranks over the efficiency percentage line.
//!
//! Eight half-open tiers `[min, max)` cover the whole line from negative to
//! positive infinity without gaps or overlap.

use serde::Serialize;

/// One rank tier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BeltRank {
    pub name: &'static str,
    pub color: &'static str,
    /// Inclusive lower bound, in percent
    pub min_percentage: f64,
    /// Exclusive upper bound, in percent
    pub max_percentage: f64,
}

/// All tiers, lowest first.
pub static BELT_RANKS: [BeltRank; 8] = [
    BeltRank {
        name: "Beginner",
        color: "White",
        min_percentage: f64::NEG_INFINITY,
        max_percentage: 40.0,
    },
    BeltRank {
        name: "Novice",
        color: "Yellow",
        min_percentage: 40.0,
        max_percentage: 50.0,
    },
    BeltRank {
        name: "Apprentice",
        color: "Orange",
        min_percentage: 50.0,
        max_percentage: 60.0,
    },
    BeltRank {
        name: "Skilled",
        color: "Green",
        min_percentage: 60.0,
        max_percentage: 70.0,
    },
    BeltRank {
        name: "Advanced",
        color: "Blue",
        min_percentage: 70.0,
        max_percentage: 75.0,
    },
    BeltRank {
        name: "Expert",
        color: "Purple",
        min_percentage: 75.0,
        max_percentage: 80.0,
    },
    BeltRank {
        name: "Master",
        color: "Brown",
        min_percentage: 80.0,
        max_percentage: 85.0,
    },
    BeltRank {
        name: "Grandmaster",
        color: "Black",
        min_percentage: 85.0,
        max_percentage: f64::INFINITY,
    },
];

impl BeltRank {
    /// Lowest tier, used whenever there is not enough data to rank.
    pub fn lowest() -> &'static BeltRank {
        &BELT_RANKS[0]
    }

    /// Highest tier.
    pub fn highest() -> &'static BeltRank {
        &BELT_RANKS[BELT_RANKS.len() - 1]
    }

    /// Whether `percentage` falls in `[min, max)`. The top tier also holds +inf.
    pub fn contains(&self, percentage: f64) -> bool {
        percentage >= self.min_percentage
            && (percentage < self.max_percentage || self.is_highest())
    }

    pub fn is_highest(&self) -> bool {
        self.max_percentage == f64::INFINITY
    }

    /// Position in [`BELT_RANKS`].
    pub fn index(&self) -> usize {
        BELT_RANKS
            .iter()
            .position(|b| b.name == self.name)
            .unwrap_or(0)
    }

    /// The tier above this one.
    pub fn next(&self) -> Option<&'static BeltRank> {
        BELT_RANKS.get(self.index() + 1)
    }

    /// Look a tier up by name, case-insensitively.
    pub fn by_name(name: &str) -> Option<&'static BeltRank> {
        BELT_RANKS.iter().find(|b| b.name.eq_ignore_ascii_case(name))
    }
}

/// Classify an efficiency percentage.
///
/// Without enough history, or without a value, the lowest tier is returned.
pub fn get_belt_rank(percentage: Option<f64>, has_enough_data: bool) -> &'static BeltRank {
    let percentage = match percentage {
        Some(p) if has_enough_data && !p.is_nan() => p,
        _ => return BeltRank::lowest(),
    };

    BELT_RANKS
        .iter()
        .rev()
        .find(|belt| belt.contains(percentage))
        .unwrap_or_else(BeltRank::lowest)
}

/// Progress through `belt` in percent, clamped to `[0, 100]`.
///
/// The top tier always reports 100. The unbounded bottom tier measures
/// progress from 0%.
pub fn belt_progress_percentage(current_efficiency: f64, belt: &BeltRank) -> f64 {
    if belt.is_highest() {
        return 100.0;
    }
    if current_efficiency.is_nan() {
        return 0.0;
    }

    let min = if belt.min_percentage.is_finite() {
        belt.min_percentage
    } else {
        0.0
    };
    let span = belt.max_percentage - min;
    if span <= 0.0 {
        return 0.0;
    }

    ((current_efficiency - min) / span * 100.0).clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tiers_are_contiguous() {
        for pair in BELT_RANKS.windows(2) {
            assert_eq!(pair[0].max_percentage, pair[1].min_percentage);
        }
        assert_eq!(BELT_RANKS[0].min_percentage, f64::NEG_INFINITY);
        assert_eq!(BELT_RANKS[7].max_percentage, f64::INFINITY);
    }

    #[test]
    fn test_boundaries_are_half_open() {
        assert_eq!(get_belt_rank(Some(39.999), true).name, "Beginner");
        assert_eq!(get_belt_rank(Some(40.0), true).name, "Novice");
        assert_eq!(get_belt_rank(Some(70.0), true).name, "Advanced");
        assert_eq!(get_belt_rank(Some(75.0), true).name, "Expert");
        assert_eq!(get_belt_rank(Some(85.0), true).name, "Grandmaster");
    }

    #[test]
    fn test_extremes() {
        assert_eq!(get_belt_rank(Some(-500.0), true).name, "Beginner");
        assert_eq!(get_belt_rank(Some(1e9), true).name, "Grandmaster");
        assert_eq!(get_belt_rank(Some(f64::INFINITY), true).name, "Grandmaster");
        assert_eq!(get_belt_rank(Some(f64::NEG_INFINITY), true).name, "Beginner");
    }

    #[test]
    fn test_not_enough_data_or_absent() {
        assert_eq!(get_belt_rank(Some(99.0), false).name, "Beginner");
        assert_eq!(get_belt_rank(None, true).name, "Beginner");
        assert_eq!(get_belt_rank(Some(f64::NAN), true).name, "Beginner");
    }

    #[test]
    fn test_progress_interpolates() {
        let skilled = BeltRank::by_name("skilled").unwrap();
        assert!((belt_progress_percentage(65.0, skilled) - 50.0).abs() < 1e-9);
        assert_eq!(belt_progress_percentage(60.0, skilled), 0.0);
    }

    #[test]
    fn test_progress_clamped() {
        let advanced = BeltRank::by_name("Advanced").unwrap();
        assert_eq!(belt_progress_percentage(10.0, advanced), 0.0);
        assert_eq!(belt_progress_percentage(90.0, advanced), 100.0);
    }

    #[test]
    fn test_progress_top_tier() {
        assert_eq!(belt_progress_percentage(86.0, BeltRank::highest()), 100.0);
    }

    #[test]
    fn test_progress_bottom_tier_from_zero() {
        let beginner = BeltRank::lowest();
        assert!((belt_progress_percentage(20.0, beginner) - 50.0).abs() < 1e-9);
        assert_eq!(belt_progress_percentage(-30.0, beginner), 0.0);
    }

    #[test]
    fn test_next_belt() {
        assert_eq!(BeltRank::lowest().next().unwrap().name, "Novice");
        assert!(BeltRank::highest().next().is_none());
    }
}

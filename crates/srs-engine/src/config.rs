//! Scheduling constants governing the SRS state machine (`spec.md` §4.3).

use chrono::Duration;

/// Tunable constants for the SRS engine. Production code uses
/// [`SrsConfig::default`], which reproduces the canonical values from
/// `spec.md` §4.3; tests sometimes override individual fields to probe
/// clamping behavior in isolation.
#[derive(Debug, Clone, PartialEq)]
pub struct SrsConfig {
    pub learning_step_1: Duration,
    pub learning_step_2: Duration,
    pub graduate_interval: Duration,
    pub min_ease: f64,
    pub default_ease: f64,
    pub ease_adjustment_again: f64,
    pub ease_adjustment_good: f64,
    pub max_review_interval: Duration,
    pub fuzz_percentage: f64,
}

impl Default for SrsConfig {
    fn default() -> Self {
        Self {
            learning_step_1: Duration::minutes(1),
            learning_step_2: Duration::minutes(10),
            graduate_interval: Duration::days(1),
            min_ease: 1.3,
            default_ease: 2.5,
            ease_adjustment_again: -0.20,
            ease_adjustment_good: 0.10,
            max_review_interval: Duration::days(3650),
            fuzz_percentage: 0.05,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_canonical_constants() {
        let config = SrsConfig::default();
        assert_eq!(config.learning_step_1, Duration::minutes(1));
        assert_eq!(config.learning_step_2, Duration::minutes(10));
        assert_eq!(config.graduate_interval, Duration::days(1));
        assert!((config.min_ease - 1.3).abs() < f64::EPSILON);
        assert!((config.default_ease - 2.5).abs() < f64::EPSILON);
        assert!((config.ease_adjustment_again + 0.20).abs() < f64::EPSILON);
        assert!((config.ease_adjustment_good - 0.10).abs() < f64::EPSILON);
        assert_eq!(config.max_review_interval, Duration::days(3650));
        assert!((config.fuzz_percentage - 0.05).abs() < f64::EPSILON);
    }
}

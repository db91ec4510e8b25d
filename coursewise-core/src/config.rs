//! Configuration types for the recommendation engine.
//!
//! Every tunable constant of the engine lives here so it can be overridden
//! from the `[engine]` section of the config file:
//! - Scoring bonuses and duration-bucket thresholds
//! - Candidate oversampling and default result size
//! - Collaborator timeout and store-write retry policy

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Top-level engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Number of recommendations when the caller does not ask for a count
    pub default_limit: usize,
    /// Candidates requested from the index per requested recommendation
    pub oversample_factor: usize,
    /// Upper bound for a single index query or text-generation call
    pub timeout_ms: u64,
    /// Preference bonuses
    pub scoring: ScoringWeights,
    /// Store write retries
    pub retry: RetryConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_limit: 5,
            oversample_factor: 3,
            timeout_ms: 20_000,
            scoring: ScoringWeights::default(),
            retry: RetryConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Collaborator timeout as a [`Duration`]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Number of neighbors to request for `limit` results
    pub fn candidate_count(&self, limit: usize) -> usize {
        limit.saturating_mul(self.oversample_factor.max(1))
    }
}

/// Additive bonuses applied on top of similarity, and the duration buckets
/// they are matched against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    /// Bonus when the course category is a preferred category
    pub category_bonus: f64,
    /// Bonus when the course difficulty equals the preferred difficulty
    pub difficulty_bonus: f64,
    /// Bonus when the course duration falls in the preferred bucket
    pub duration_bonus: f64,
    /// Longest duration (hours, inclusive) that counts as short
    pub short_max_hours: u32,
    /// Longest duration (hours, inclusive) that counts as medium
    pub medium_max_hours: u32,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            category_bonus: 0.2,
            difficulty_bonus: 0.1,
            duration_bonus: 0.1,
            short_max_hours: 30,
            medium_max_hours: 60,
        }
    }
}

/// Exponential backoff for store writes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts including the first one
    pub max_attempts: u32,
    /// Delay before the first retry
    pub initial_backoff_ms: u64,
    /// Multiplier applied to the delay after each retry
    pub backoff_factor: u32,
    /// Upper bound for a single delay
    pub max_backoff_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff_ms: 50,
            backoff_factor: 5,
            max_backoff_ms: 2_000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights() {
        let weights = ScoringWeights::default();
        assert!((weights.category_bonus - 0.2).abs() < f64::EPSILON);
        assert!((weights.difficulty_bonus - 0.1).abs() < f64::EPSILON);
        assert!((weights.duration_bonus - 0.1).abs() < f64::EPSILON);
        assert_eq!(weights.short_max_hours, 30);
        assert_eq!(weights.medium_max_hours, 60);
    }

    #[test]
    fn test_candidate_count_oversamples() {
        let config = EngineConfig::default();
        assert_eq!(config.candidate_count(5), 15);

        let config = EngineConfig {
            oversample_factor: 0,
            ..Default::default()
        };
        assert_eq!(config.candidate_count(4), 4);
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config: EngineConfig = serde_json::from_str(
            r#"{"timeout_ms": 500, "scoring": {"category_bonus": 0.5}}"#,
        )
        .unwrap();
        assert_eq!(config.timeout(), Duration::from_millis(500));
        assert!((config.scoring.category_bonus - 0.5).abs() < f64::EPSILON);
        assert_eq!(config.scoring.medium_max_hours, 60);
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.oversample_factor, 3);
    }
}

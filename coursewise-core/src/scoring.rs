//! Preference-aware re-ranking of similarity candidates
//!
//! The index orders candidates by semantic closeness only. [`Ranker`]
//! removes courses the user already evaluated, adds preference bonuses on
//! top of the similarity score, and re-sorts. Ranking is a pure transform:
//! the input slice is never modified and each call builds new
//! [`RankedCandidate`] records.

use std::collections::HashSet;

use crate::config::ScoringWeights;
use crate::types::{
    CandidateResult, DurationPreference, InteractionRecord, PreferenceProfile, RankedCandidate,
};

/// Bucket a course duration using the configured thresholds.
///
/// Buckets are exclusive and cover every duration:
/// short ≤ `short_max_hours` < medium ≤ `medium_max_hours` < long.
pub fn duration_bucket(hours: u32, weights: &ScoringWeights) -> DurationPreference {
    if hours <= weights.short_max_hours {
        DurationPreference::Short
    } else if hours <= weights.medium_max_hours {
        DurationPreference::Medium
    } else {
        DurationPreference::Long
    }
}

/// Course ids the user has rated, commented on, or viewed.
///
/// Query records are ignored: asking about a topic does not mean the user
/// has seen the courses it returned.
pub fn evaluated_course_ids(history: &[InteractionRecord]) -> HashSet<&str> {
    history
        .iter()
        .filter(|r| r.interaction_type.is_evaluation())
        .map(|r| r.course_id.as_str())
        .collect()
}

/// Scores and orders candidates against a preference profile
#[derive(Debug, Clone, Default)]
pub struct Ranker {
    weights: ScoringWeights,
}

impl Ranker {
    pub fn new(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    /// Similarity plus every bonus the candidate qualifies for
    pub fn score(&self, candidate: &CandidateResult, preferences: &PreferenceProfile) -> f64 {
        let course = &candidate.course;
        let mut score = candidate.similarity_score;

        if preferences.preferred_categories.contains(&course.category) {
            score += self.weights.category_bonus;
        }
        if preferences.preferred_difficulty == Some(course.difficulty) {
            score += self.weights.difficulty_bonus;
        }
        if duration_bucket(course.duration, &self.weights) == preferences.preferred_duration {
            score += self.weights.duration_bonus;
        }

        score
    }

    /// Filter, score and sort every candidate without truncating.
    ///
    /// The sort is stable, so equal scores keep their input (similarity)
    /// order.
    pub fn score_all(
        &self,
        candidates: &[CandidateResult],
        preferences: &PreferenceProfile,
        history: &[InteractionRecord],
    ) -> Vec<RankedCandidate> {
        let evaluated = evaluated_course_ids(history);

        let mut ranked: Vec<RankedCandidate> = candidates
            .iter()
            .filter(|c| !evaluated.contains(c.course_id()))
            .map(|c| RankedCandidate {
                course: c.course.clone(),
                similarity_score: c.similarity_score,
                final_score: self.score(c, preferences),
            })
            .collect();

        ranked.sort_by(|a, b| b.final_score.total_cmp(&a.final_score));
        ranked
    }

    /// Top `limit` candidates by final score
    pub fn rank(
        &self,
        candidates: &[CandidateResult],
        preferences: &PreferenceProfile,
        history: &[InteractionRecord],
        limit: usize,
    ) -> Vec<RankedCandidate> {
        let mut ranked = self.score_all(candidates, preferences, history);
        ranked.truncate(limit);
        ranked
    }
}

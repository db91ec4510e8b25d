//! Per-request recommendation results
//!
//! These records live for one `get_recommendations` call. Each stage
//! produces a new record type instead of mutating the previous one.

use serde::{Deserialize, Serialize};

use super::course::Course;

/// A course returned by similarity search, pending re-ranking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateResult {
    pub course: Course,
    /// `1 - distance`, clamped to [0, 1]
    pub similarity_score: f64,
}

impl CandidateResult {
    pub fn new(course: Course, similarity_score: f64) -> Self {
        Self {
            course,
            similarity_score: similarity_score.clamp(0.0, 1.0),
        }
    }

    pub fn course_id(&self) -> &str {
        &self.course.id
    }
}

/// A candidate after preference scoring
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedCandidate {
    pub course: Course,
    pub similarity_score: f64,
    /// Similarity plus preference bonuses
    pub final_score: f64,
}

impl RankedCandidate {
    pub fn course_id(&self) -> &str {
        &self.course.id
    }

    /// Attach an explanation
    pub fn annotate(self, explanation: String) -> AnnotatedCourse {
        AnnotatedCourse {
            course: self.course,
            similarity_score: self.similarity_score,
            final_score: self.final_score,
            explanation,
        }
    }
}

/// A recommended course with its justification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedCourse {
    pub course: Course,
    pub similarity_score: f64,
    pub final_score: f64,
    pub explanation: String,
}

/// Response of `get_recommendations`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationSet {
    pub user_id: String,
    pub recommendations: Vec<AnnotatedCourse>,
    /// Candidates that survived history filtering, before truncation
    pub total_found: usize,
}

impl RecommendationSet {
    pub fn is_empty(&self) -> bool {
        self.recommendations.is_empty()
    }
}

/// Response of `record_feedback`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackReceipt {
    /// The interaction was appended to the log
    pub logged: bool,
    /// A changed profile was persisted
    pub preferences_updated: bool,
}

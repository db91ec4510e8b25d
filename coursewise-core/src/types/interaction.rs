//! Users and their interaction log

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::course::ParseEnumError;
use super::preferences::PreferenceProfile;

/// Sentinel course id for the query captured at the end of onboarding
pub const ONBOARDING_QUERY: &str = "onboarding_query";

/// Sentinel course id for a query typed with `learn <topic>`
pub const MANUAL_QUERY: &str = "manual_query";

/// A registered user and their current preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub user_id: String,
    pub name: String,
    pub preferences: PreferenceProfile,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserRecord {
    /// Create a new user with both timestamps set to now
    pub fn new(
        user_id: impl Into<String>,
        name: impl Into<String>,
        preferences: PreferenceProfile,
    ) -> Self {
        let now = Utc::now();
        Self {
            user_id: user_id.into(),
            name: name.into(),
            preferences,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Kind of logged interaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionType {
    /// A recommendation request; `course_id` is a sentinel
    Query,
    /// A rating and/or comment on a course
    Feedback,
    /// The user opened a course
    View,
}

impl InteractionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Query => "query",
            Self::Feedback => "feedback",
            Self::View => "view",
        }
    }

    /// Whether this interaction means the user already evaluated the course
    pub fn is_evaluation(&self) -> bool {
        matches!(self, Self::Feedback | Self::View)
    }
}

impl fmt::Display for InteractionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InteractionType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "query" => Ok(Self::Query),
            "feedback" => Ok(Self::Feedback),
            "view" => Ok(Self::View),
            _ => Err(ParseEnumError::new("interaction type", s)),
        }
    }
}

/// Append-only interaction log entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionRecord {
    pub user_id: String,
    pub course_id: String,
    pub interaction_type: InteractionType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl InteractionRecord {
    /// A rating/comment on a course
    pub fn feedback(
        user_id: impl Into<String>,
        course_id: impl Into<String>,
        rating: Option<u8>,
        text: Option<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            course_id: course_id.into(),
            interaction_type: InteractionType::Feedback,
            rating,
            feedback: text.filter(|t| !t.trim().is_empty()),
            timestamp: Utc::now(),
        }
    }

    /// A recommendation query, stored under a sentinel course id
    pub fn query(
        user_id: impl Into<String>,
        sentinel: impl Into<String>,
        query: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            course_id: sentinel.into(),
            interaction_type: InteractionType::Query,
            rating: None,
            feedback: Some(query.into()),
            timestamp: Utc::now(),
        }
    }

    /// The user opened a course
    pub fn view(user_id: impl Into<String>, course_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            course_id: course_id.into(),
            interaction_type: InteractionType::View,
            rating: None,
            feedback: None,
            timestamp: Utc::now(),
        }
    }

    /// Override the timestamp (stores clamp it to keep per-user order)
    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// The query text, for `query` interactions
    pub fn query_text(&self) -> Option<&str> {
        match self.interaction_type {
            InteractionType::Query => self.feedback.as_deref(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_feedback_and_view_are_evaluations() {
        assert!(InteractionType::Feedback.is_evaluation());
        assert!(InteractionType::View.is_evaluation());
        assert!(!InteractionType::Query.is_evaluation());
    }

    #[test]
    fn test_query_record_carries_text() {
        let record = InteractionRecord::query("u1", MANUAL_QUERY, "learn rust");
        assert_eq!(record.course_id, "manual_query");
        assert_eq!(record.query_text(), Some("learn rust"));
    }

    #[test]
    fn test_feedback_record_drops_blank_text() {
        let record = InteractionRecord::feedback("u1", "42", Some(4), Some("  ".into()));
        assert!(record.feedback.is_none());
        assert!(record.query_text().is_none());
    }

    #[test]
    fn test_interaction_type_round_trip() {
        for kind in [
            InteractionType::Query,
            InteractionType::Feedback,
            InteractionType::View,
        ] {
            assert_eq!(kind.as_str().parse::<InteractionType>(), Ok(kind));
        }
    }
}

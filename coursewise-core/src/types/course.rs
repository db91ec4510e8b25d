//! Course catalog records

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Difficulty level of a course, also used as a learner preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
    Mixed,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
            Self::Mixed => "mixed",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error type for parsing an enum value from free text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseEnumError {
    kind: &'static str,
    value: String,
}

impl ParseEnumError {
    pub(crate) fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

impl fmt::Display for ParseEnumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {}: {}", self.kind, self.value)
    }
}

impl std::error::Error for ParseEnumError {}

impl FromStr for Difficulty {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "beginner" => Ok(Self::Beginner),
            "intermediate" => Ok(Self::Intermediate),
            "advanced" => Ok(Self::Advanced),
            "mixed" => Ok(Self::Mixed),
            _ => Err(ParseEnumError::new("difficulty", s)),
        }
    }
}

/// An immutable catalog entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    /// Stable identifier, unique within the catalog
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub difficulty: Difficulty,
    /// Length in hours, always positive
    pub duration: u32,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    /// Average rating on a 0-5 scale
    pub rating: f64,
    pub price: f64,
}

impl Course {
    /// Text representation used for embedding the course
    pub fn document_text(&self) -> String {
        let tags: Vec<&str> = self.tags.iter().map(String::as_str).collect();
        format!(
            "Title: {}\nDescription: {}\nCategory: {}\nDifficulty: {}\nTags: {}\nDuration: {} hours",
            self.title,
            self.description,
            self.category,
            self.difficulty,
            tags.join(", "),
            self.duration
        )
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// Build a course with the attributes ranking cares about
    pub fn course(id: &str, category: &str, difficulty: Difficulty, duration: u32) -> Course {
        Course {
            id: id.to_string(),
            title: format!("Course {}", id),
            description: format!("About {}", category),
            category: category.to_string(),
            difficulty,
            duration,
            tags: BTreeSet::from([category.to_lowercase()]),
            rating: 4.5,
            price: 99.99,
        }
    }
}

//! Learner preference profile
//!
//! [`PreferenceProfile`] is the typed, persisted description of what a user
//! wants to learn. Free text (model output, onboarding answers) is parsed
//! into [`RawPreferences`] first and converted with
//! [`PreferenceProfile::from_raw`], which backfills every missing or
//! unparseable field with the documented default.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::course::{Difficulty, ParseEnumError};

/// Default category for a profile with no stated interests
pub const DEFAULT_CATEGORY: &str = "general";

/// Default goal for a profile with no stated goals
pub const DEFAULT_GOAL: &str = "skill development";

/// How the learner prefers to study
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LearningStyle {
    Visual,
    Auditory,
    HandsOn,
    Theoretical,
}

impl LearningStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Visual => "visual",
            Self::Auditory => "auditory",
            Self::HandsOn => "hands-on",
            Self::Theoretical => "theoretical",
        }
    }
}

impl fmt::Display for LearningStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LearningStyle {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['_', ' '], "-").as_str() {
            "visual" => Ok(Self::Visual),
            "auditory" => Ok(Self::Auditory),
            "hands-on" | "handson" | "practical" => Ok(Self::HandsOn),
            "theoretical" => Ok(Self::Theoretical),
            _ => Err(ParseEnumError::new("learning style", s)),
        }
    }
}

/// Preferred course length bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DurationPreference {
    Short,
    #[default]
    Medium,
    Long,
}

impl DurationPreference {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Short => "short",
            Self::Medium => "medium",
            Self::Long => "long",
        }
    }
}

impl fmt::Display for DurationPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DurationPreference {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "short" => Ok(Self::Short),
            "medium" => Ok(Self::Medium),
            "long" => Ok(Self::Long),
            _ => Err(ParseEnumError::new("duration preference", s)),
        }
    }
}

/// Spending tolerance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetPreference {
    Free,
    Low,
    #[default]
    Medium,
    High,
}

impl BudgetPreference {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for BudgetPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BudgetPreference {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "free" => Ok(Self::Free),
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(ParseEnumError::new("budget preference", s)),
        }
    }
}

/// Structured learning preferences of one user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreferenceProfile {
    pub preferred_categories: BTreeSet<String>,
    pub preferred_difficulty: Option<Difficulty>,
    pub learning_style: Option<LearningStyle>,
    pub preferred_duration: DurationPreference,
    pub budget_preference: BudgetPreference,
    pub goals: BTreeSet<String>,
    /// Free text the user attached with `preference <text>`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom: Option<String>,
}

impl Default for PreferenceProfile {
    fn default() -> Self {
        Self {
            preferred_categories: BTreeSet::from([DEFAULT_CATEGORY.to_string()]),
            preferred_difficulty: Some(Difficulty::Intermediate),
            learning_style: Some(LearningStyle::HandsOn),
            preferred_duration: DurationPreference::Medium,
            budget_preference: BudgetPreference::Medium,
            goals: BTreeSet::from([DEFAULT_GOAL.to_string()]),
            custom: None,
        }
    }
}

impl PreferenceProfile {
    /// Build a profile from loosely-typed input, backfilling defaults.
    ///
    /// A field that is absent, empty, or fails to parse takes the value of
    /// [`PreferenceProfile::default`].
    pub fn from_raw(raw: RawPreferences) -> Self {
        let defaults = Self::default();

        let preferred_categories = non_empty_set(raw.preferred_categories)
            .unwrap_or(defaults.preferred_categories);
        let goals = non_empty_set(raw.goals).unwrap_or(defaults.goals);

        Self {
            preferred_categories,
            preferred_difficulty: parse_field(raw.preferred_difficulty)
                .or(defaults.preferred_difficulty),
            learning_style: parse_field(raw.learning_style).or(defaults.learning_style),
            preferred_duration: parse_field(raw.preferred_duration)
                .unwrap_or(defaults.preferred_duration),
            budget_preference: parse_field(raw.budget_preference)
                .unwrap_or(defaults.budget_preference),
            goals,
            custom: raw
                .custom
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty()),
        }
    }

    /// Categories joined for prompts and synthesized queries
    pub fn categories_text(&self) -> String {
        join(&self.preferred_categories)
    }

    /// Goals joined for prompts
    pub fn goals_text(&self) -> String {
        join(&self.goals)
    }
}

fn join(set: &BTreeSet<String>) -> String {
    set.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
}

fn parse_field<T: FromStr>(value: Option<String>) -> Option<T> {
    value.and_then(|v| v.parse().ok())
}

fn non_empty_set(value: Option<StringOrList>) -> Option<BTreeSet<String>> {
    let set: BTreeSet<String> = value?
        .into_vec()
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    (!set.is_empty()).then_some(set)
}

/// A JSON value that may be a single string or a list of strings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StringOrList {
    One(String),
    Many(Vec<String>),
}

impl StringOrList {
    /// Flatten to a list; a single string is split on commas
    pub fn into_vec(self) -> Vec<String> {
        match self {
            Self::One(s) => s.split(',').map(str::to_string).collect(),
            Self::Many(v) => v,
        }
    }
}

/// Loosely-typed preferences as produced by extraction or onboarding
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawPreferences {
    pub preferred_categories: Option<StringOrList>,
    pub preferred_difficulty: Option<String>,
    pub learning_style: Option<String>,
    pub preferred_duration: Option<String>,
    pub budget_preference: Option<String>,
    pub goals: Option<StringOrList>,
    pub custom: Option<String>,
}

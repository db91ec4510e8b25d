//! Preference learning from course ratings
//!
//! Only positive signals teach the profile something: a rating of 4 adds
//! the course category to the preferred categories, a rating of 5 also
//! adopts the course difficulty. Lower ratings are logged by the engine
//! but never change the profile, and categories are never removed here.

use crate::types::{Course, PreferenceProfile};

/// Lowest rating that counts as positive feedback
pub const POSITIVE_RATING: u8 = 4;

/// Rating that also overrides the preferred difficulty
pub const TOP_RATING: u8 = 5;

/// Result of applying one rating to a profile
#[derive(Debug, Clone, PartialEq)]
pub struct FeedbackOutcome {
    pub profile: PreferenceProfile,
    /// The profile differs from the input
    pub changed: bool,
}

/// Apply a rating to a profile, returning the updated copy.
pub fn apply_feedback(profile: &PreferenceProfile, course: &Course, rating: u8) -> FeedbackOutcome {
    let mut updated = profile.clone();

    if rating >= POSITIVE_RATING {
        updated.preferred_categories.insert(course.category.clone());
    }
    if rating >= TOP_RATING {
        updated.preferred_difficulty = Some(course.difficulty);
    }

    let changed = updated != *profile;
    FeedbackOutcome {
        profile: updated,
        changed,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::types::{Difficulty, fixtures::course};

    fn profile(categories: &[&str], difficulty: Difficulty) -> PreferenceProfile {
        PreferenceProfile {
            preferred_categories: categories.iter().map(|c| c.to_string()).collect(),
            preferred_difficulty: Some(difficulty),
            ..Default::default()
        }
    }

    #[test]
    fn test_top_rating_adds_category_and_difficulty() {
        let before = profile(&["Business"], Difficulty::Beginner);
        let data = course("9", "Data Science", Difficulty::Advanced, 40);

        let outcome = apply_feedback(&before, &data, 5);

        assert!(outcome.changed);
        assert_eq!(
            outcome.profile.preferred_categories,
            BTreeSet::from(["Business".to_string(), "Data Science".to_string()])
        );
        assert_eq!(outcome.profile.preferred_difficulty, Some(Difficulty::Advanced));
    }

    #[test]
    fn test_rating_four_adds_category_only() {
        let before = profile(&["Business"], Difficulty::Beginner);
        let data = course("9", "Data Science", Difficulty::Advanced, 40);

        let outcome = apply_feedback(&before, &data, 4);

        assert!(outcome.profile.preferred_categories.contains("Data Science"));
        assert_eq!(outcome.profile.preferred_difficulty, Some(Difficulty::Beginner));
    }

    #[test]
    fn test_low_ratings_never_mutate() {
        let before = profile(&["Business"], Difficulty::Beginner);
        let data = course("9", "Data Science", Difficulty::Advanced, 40);

        for rating in 1..=3 {
            let outcome = apply_feedback(&before, &data, rating);
            assert!(!outcome.changed);
            assert_eq!(outcome.profile, before);
        }
    }

    #[test]
    fn test_repeat_feedback_is_idempotent() {
        let before = profile(&["Business"], Difficulty::Beginner);
        let data = course("9", "Data Science", Difficulty::Advanced, 40);

        let first = apply_feedback(&before, &data, 5);
        let second = apply_feedback(&first.profile, &data, 5);

        assert!(first.changed);
        assert!(!second.changed);
        assert_eq!(first.profile, second.profile);
    }

    #[test]
    fn test_categories_never_shrink() {
        let before = profile(&["A", "B", "C"], Difficulty::Mixed);
        for rating in 1..=5 {
            let data = course("1", "D", Difficulty::Beginner, 10);
            let outcome = apply_feedback(&before, &data, rating);
            assert!(before.preferred_categories.is_subset(&outcome.profile.preferred_categories));
        }
    }

    #[test]
    fn test_input_profile_is_untouched() {
        let before = profile(&["Business"], Difficulty::Beginner);
        let snapshot = before.clone();
        let _ = apply_feedback(&before, &course("9", "Art", Difficulty::Advanced, 40), 5);
        assert_eq!(before, snapshot);
    }
}

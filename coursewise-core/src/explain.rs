//! Natural-language justification for a recommendation

use std::sync::Arc;
use std::time::Duration;

use coursewise_models::TextGenerator;
use tracing::{debug, warn};

use crate::types::{Course, InteractionRecord, PreferenceProfile};

/// Explanation used whenever generation fails
pub const FALLBACK_EXPLANATION: &str = "Recommended based on your preferences.";

/// Build the explanation prompt for one course.
///
/// The prompt is a deterministic function of the course and the profile.
/// History only contributes the most recent query, which anchors the
/// explanation to what the user asked for.
pub fn explanation_prompt(
    course: &Course,
    preferences: &PreferenceProfile,
    history: &[InteractionRecord],
) -> String {
    let difficulty = preferences
        .preferred_difficulty
        .map(|d| d.to_string())
        .unwrap_or_else(|| "any".to_string());
    let style = preferences
        .learning_style
        .map(|s| s.to_string())
        .unwrap_or_else(|| "any".to_string());
    let description = if course.description.is_empty() {
        "N/A"
    } else {
        course.description.as_str()
    };

    let mut prompt = format!(
        "You are an AI course advisor. A user is looking for personalized course \
         recommendations based on their learning preferences.\n\n\
         User preferences:\n\
         - Categories: {}\n\
         - Difficulty: {}\n\
         - Duration preference: {}\n\
         - Learning style: {}\n\
         - Goals: {}\n",
        preferences.categories_text(),
        difficulty,
        preferences.preferred_duration,
        style,
        preferences.goals_text(),
    );

    if let Some(query) = history.iter().find_map(InteractionRecord::query_text) {
        prompt.push_str(&format!("- Latest request: {}\n", query));
    }

    prompt.push_str(&format!(
        "\nRecommended course details:\n\
         - Title: {}\n\
         - Category: {}\n\
         - Difficulty: {}\n\
         - Rating: {}\n\
         - Description: {}\n\
         - Duration: {} hours\n\n\
         Please generate a short two line only, friendly explanation for why this \
         course is recommended to the user.",
        course.title, course.category, course.difficulty, course.rating, description, course.duration,
    ));

    prompt
}

/// Generates explanations, degrading to [`FALLBACK_EXPLANATION`]
#[derive(Clone)]
pub struct Explainer {
    generator: Arc<dyn TextGenerator>,
    timeout: Duration,
}

impl Explainer {
    pub fn new(generator: Arc<dyn TextGenerator>, timeout: Duration) -> Self {
        Self { generator, timeout }
    }

    /// Explain why `course` fits the profile. Never fails.
    pub async fn explain(
        &self,
        course: &Course,
        preferences: &PreferenceProfile,
        history: &[InteractionRecord],
    ) -> String {
        let prompt = explanation_prompt(course, preferences, history);

        match tokio::time::timeout(self.timeout, self.generator.complete(&prompt)).await {
            Ok(Ok(text)) if !text.trim().is_empty() => text.trim().to_string(),
            Ok(Ok(_)) => {
                debug!(course_id = %course.id, "blank explanation, using fallback");
                FALLBACK_EXPLANATION.to_string()
            }
            Ok(Err(e)) => {
                warn!(course_id = %course.id, generator = self.generator.name(), error = %e, "explanation generation failed");
                FALLBACK_EXPLANATION.to_string()
            }
            Err(_) => {
                warn!(course_id = %course.id, timeout_ms = self.timeout.as_millis() as u64, "explanation generation timed out");
                FALLBACK_EXPLANATION.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::types::{Difficulty, MANUAL_QUERY, fixtures::course};

    struct FixedGenerator(&'static str);

    #[async_trait]
    impl TextGenerator for FixedGenerator {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn complete(&self, _prompt: &str) -> coursewise_models::Result<String> {
            Ok(self.0.to_string())
        }
    }

    struct FailingGenerator;

    #[async_trait]
    impl TextGenerator for FailingGenerator {
        fn name(&self) -> &str {
            "failing"
        }

        async fn complete(&self, _prompt: &str) -> coursewise_models::Result<String> {
            Err(coursewise_models::Error::Request("connection refused".into()))
        }
    }

    struct SlowGenerator;

    #[async_trait]
    impl TextGenerator for SlowGenerator {
        fn name(&self) -> &str {
            "slow"
        }

        async fn complete(&self, _prompt: &str) -> coursewise_models::Result<String> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok("too late".to_string())
        }
    }

    fn explainer(generator: impl TextGenerator + 'static) -> Explainer {
        Explainer::new(Arc::new(generator), Duration::from_secs(1))
    }

    #[tokio::test]
    async fn test_uses_generated_text() {
        let course = course("1", "Programming", Difficulty::Beginner, 20);
        let text = explainer(FixedGenerator("  Great first course.\n"))
            .explain(&course, &PreferenceProfile::default(), &[])
            .await;
        assert_eq!(text, "Great first course.");
    }

    #[tokio::test]
    async fn test_failure_falls_back() {
        let course = course("1", "Programming", Difficulty::Beginner, 20);
        let text = explainer(FailingGenerator)
            .explain(&course, &PreferenceProfile::default(), &[])
            .await;
        assert_eq!(text, FALLBACK_EXPLANATION);
    }

    #[tokio::test]
    async fn test_blank_output_falls_back() {
        let course = course("1", "Programming", Difficulty::Beginner, 20);
        let text = explainer(FixedGenerator("   "))
            .explain(&course, &PreferenceProfile::default(), &[])
            .await;
        assert_eq!(text, FALLBACK_EXPLANATION);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_falls_back() {
        let course = course("1", "Programming", Difficulty::Beginner, 20);
        let text = explainer(SlowGenerator)
            .explain(&course, &PreferenceProfile::default(), &[])
            .await;
        assert_eq!(text, FALLBACK_EXPLANATION);
    }

    #[test]
    fn test_prompt_is_deterministic_and_complete() {
        let course = course("1", "Programming", Difficulty::Beginner, 20);
        let prefs = PreferenceProfile::default();
        let history = vec![InteractionRecord::query("u1", MANUAL_QUERY, "python basics")];

        let a = explanation_prompt(&course, &prefs, &history);
        let b = explanation_prompt(&course, &prefs, &history);

        assert_eq!(a, b);
        assert!(a.contains("- Categories: general"));
        assert!(a.contains("- Difficulty: intermediate"));
        assert!(a.contains("- Learning style: hands-on"));
        assert!(a.contains("- Latest request: python basics"));
        assert!(a.contains("- Title: Course 1"));
        assert!(a.contains("- Duration: 20 hours"));
    }
}

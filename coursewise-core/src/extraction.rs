//! Structured preferences from free-text descriptions

use std::sync::Arc;
use std::time::Duration;

use coursewise_models::TextGenerator;
use tracing::{debug, warn};

use crate::types::{PreferenceProfile, RawPreferences};

/// Prompt asking the generator for a JSON preference object
pub fn extraction_prompt(description: &str) -> String {
    format!(
        "Analyze the following description of a learner and extract structured learning preferences.\n\n\
         Description: \"{}\"\n\n\
         Return ONLY a JSON object in this format:\n\
         {{\n\
         \x20   \"preferred_categories\": [\"category1\", \"category2\"],\n\
         \x20   \"preferred_difficulty\": \"beginner/intermediate/advanced\",\n\
         \x20   \"learning_style\": \"visual/auditory/hands-on/theoretical\",\n\
         \x20   \"preferred_duration\": \"short/medium/long\",\n\
         \x20   \"budget_preference\": \"free/low/medium/high\",\n\
         \x20   \"goals\": [\"goal1\", \"goal2\"]\n\
         }}",
        description.trim()
    )
}

/// Parse the JSON object embedded in a model response.
///
/// Models often wrap the object in prose or code fences, so everything
/// between the first `{` and the last `}` is parsed.
pub fn parse_preferences(response: &str) -> Option<RawPreferences> {
    let start = response.find('{')?;
    let end = response.rfind('}')?;
    if end < start {
        return None;
    }
    serde_json::from_str(&response[start..=end]).ok()
}

/// Turns free text into a [`PreferenceProfile`], never failing
#[derive(Clone)]
pub struct PreferenceExtractor {
    generator: Arc<dyn TextGenerator>,
    timeout: Duration,
}

impl PreferenceExtractor {
    pub fn new(generator: Arc<dyn TextGenerator>, timeout: Duration) -> Self {
        Self { generator, timeout }
    }

    /// Extract a profile; blank input or any failure yields the default
    pub async fn extract(&self, description: &str) -> PreferenceProfile {
        if description.trim().is_empty() {
            return PreferenceProfile::default();
        }

        let prompt = extraction_prompt(description);
        let response =
            match tokio::time::timeout(self.timeout, self.generator.complete(&prompt)).await {
                Ok(Ok(text)) => text,
                Ok(Err(e)) => {
                    warn!(generator = self.generator.name(), error = %e, "preference extraction failed");
                    return PreferenceProfile::default();
                }
                Err(_) => {
                    warn!(timeout_ms = self.timeout.as_millis() as u64, "preference extraction timed out");
                    return PreferenceProfile::default();
                }
            };

        match parse_preferences(&response) {
            Some(raw) => PreferenceProfile::from_raw(raw),
            None => {
                debug!(response = %response, "no preference object in model output");
                PreferenceProfile::default()
            }
        }
    }
}

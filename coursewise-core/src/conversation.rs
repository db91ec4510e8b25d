//! Text-command front end
//!
//! [`Conversation`] interprets one chat message at a time: it drives
//! onboarding for new users and dispatches commands for registered ones.
//! Slow work is handed to [`RecommendationJobs`]; the reply carries the job
//! id so the transport can deliver the result when it is ready.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use coursewise_models::TextGenerator;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::engine::RecommendationEngine;
use crate::error::{EngineError, Result};
use crate::jobs::{JobId, RecommendationJobs};
use crate::onboarding::{OnboardingEffect, OnboardingState};
use crate::store::SessionStore;
use crate::types::{
    MANUAL_QUERY, ONBOARDING_QUERY, PreferenceProfile, RecommendationSet, UserRecord,
};

/// Recommendations per chat request
pub const CHAT_RECOMMENDATIONS: usize = 3;

const NOT_REGISTERED: &str = "Please type `start` to begin onboarding.";
const NO_RESULTS: &str =
    "No recommendations found. Try `learn <topic>` with a different topic.";
const GENERATION_FAILED: &str = "Sorry, I couldn't generate a response at this time.";
const WHO_AM_I: &str = "I'm your AI learning buddy! I recommend personalized courses based on \
                        your goals. Type `help` to see more.";
const THANKS_REPLIES: [&str; 4] = [
    "You're welcome!",
    "Glad you liked it!",
    "Always here to help!",
    "Let's keep learning!",
];
const THANKS_KEYWORDS: [&str; 5] = ["thank", "cool", "awesome", "great", "wow"];

const HELP: &str = "Here's what I can do:\n\
                    - `start`: Get started\n\
                    - `learn <your goal>`: Get course recommendations\n\
                    - `recommend again`: Reuse your last learning goal\n\
                    - `history`: View your learning goals\n\
                    - `feedback <course_id> [1-5] <your feedback>`: Rate a course\n\
                    - `preference <text>`: Tell me more about what you like\n\
                    - `my preference`: Show your saved preferences\n\n\
                    Try: `preference data science, beginner`";

/// Finds an introductory video for a course
#[async_trait]
pub trait VideoLookup: Send + Sync {
    /// Id of the best matching video, or `None` when nothing was found or
    /// the lookup failed
    async fn search(&self, query: &str) -> Option<String>;
}

/// Messages to send back, plus the job producing recommendations if any
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatReply {
    pub replies: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_id: Option<JobId>,
}

impl ChatReply {
    fn text(reply: impl Into<String>) -> Self {
        Self {
            replies: vec![reply.into()],
            job_id: None,
        }
    }

    fn with_job(replies: Vec<String>, job_id: JobId) -> Self {
        Self {
            replies,
            job_id: Some(job_id),
        }
    }
}

/// Chat rendering of a recommendation set
pub async fn render_recommendations(
    set: &RecommendationSet,
    videos: Option<&dyn VideoLookup>,
) -> String {
    if set.is_empty() {
        return NO_RESULTS.to_string();
    }

    let mut text = String::from("Top Course Recommendations:\n\n");
    for (i, rec) in set.recommendations.iter().enumerate() {
        text.push_str(&format!(
            "{}. *{}* ({}) [id: {}]\n{}\n",
            i + 1,
            rec.course.title,
            capitalize(rec.course.difficulty.as_str()),
            rec.course.id,
            rec.explanation
        ));
        if let Some(videos) = videos {
            let query = format!("{} introduction", rec.course.title);
            if let Some(video_id) = videos.search(&query).await {
                text.push_str(&format!(
                    "Watch: https://www.youtube.com/watch?v={}\n",
                    video_id
                ));
            }
        }
        text.push_str("---\n");
    }
    text
}

/// Chat rendering of an engine error
pub fn render_error(err: &EngineError) -> String {
    match err {
        EngineError::UserNotFound(_) => format!("User not found. {}", NOT_REGISTERED),
        EngineError::ServiceUnavailable(_) | EngineError::StoreWriteFailure(_) => {
            "The recommendation service is busy, please try again shortly.".to_string()
        }
        other => format!("Error: {}", other),
    }
}

fn render_profile(user: &UserRecord) -> String {
    let prefs: &PreferenceProfile = &user.preferences;
    let mut lines = vec![
        "Your current preferences:".to_string(),
        format!("- categories: {}", prefs.categories_text()),
    ];
    if let Some(difficulty) = prefs.preferred_difficulty {
        lines.push(format!("- difficulty: {}", difficulty));
    }
    if let Some(style) = prefs.learning_style {
        lines.push(format!("- learning style: {}", style));
    }
    lines.push(format!("- duration: {}", prefs.preferred_duration));
    lines.push(format!("- budget: {}", prefs.budget_preference));
    lines.push(format!("- goals: {}", prefs.goals_text()));
    if let Some(custom) = &prefs.custom {
        lines.push(format!("- custom: {}", custom));
    }
    lines.join("\n")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Remainder of `message` after a case-insensitive `keyword`, if the
/// message is that command
fn command_arg<'a>(message: &'a str, keyword: &str) -> Option<&'a str> {
    let head = message.get(..keyword.len())?;
    if !head.eq_ignore_ascii_case(keyword) {
        return None;
    }
    let rest = &message[keyword.len()..];
    if rest.is_empty() || rest.starts_with(char::is_whitespace) {
        Some(rest.trim())
    } else {
        None
    }
}

/// Parse `<course_id> [1-5] [text]`; the rating defaults to 5
fn parse_feedback(args: &str) -> Option<(&str, u8, Option<String>)> {
    let mut parts = args.splitn(2, char::is_whitespace);
    let course_id = parts.next().filter(|id| !id.is_empty())?;
    let rest = parts.next().unwrap_or("").trim();

    let mut words = rest.splitn(2, char::is_whitespace);
    let first = words.next().unwrap_or("");
    let (rating, text) = match first.parse::<u8>() {
        Ok(rating) if (1..=5).contains(&rating) => (rating, words.next().unwrap_or("").trim()),
        _ => (5, rest),
    };

    if text.is_empty() && rest.is_empty() {
        return None;
    }
    let text = (!text.is_empty()).then(|| text.to_string());
    Some((course_id, rating, text))
}

fn fallback_prompt(message: &str) -> String {
    format!(
        "The user asked: \"{}\"\n\n\
         As an AI learning assistant, always respond with something helpful, but gently tie it \
         back to education, learning paths, or skill-building courses where appropriate. If the \
         question is not course-related, give a brief answer and then suggest a topic worth \
         learning.\n\n\
         Your response:",
        message
    )
}

/// Interprets chat messages for one deployment
pub struct Conversation {
    engine: Arc<RecommendationEngine>,
    jobs: Arc<RecommendationJobs>,
    sessions: Arc<dyn SessionStore>,
    generator: Arc<dyn TextGenerator>,
    limit: usize,
    timeout: Duration,
}

impl Conversation {
    pub fn new(
        engine: Arc<RecommendationEngine>,
        jobs: Arc<RecommendationJobs>,
        sessions: Arc<dyn SessionStore>,
        generator: Arc<dyn TextGenerator>,
    ) -> Self {
        let timeout = engine.config().timeout();
        Self {
            engine,
            jobs,
            sessions,
            generator,
            limit: CHAT_RECOMMENDATIONS,
            timeout,
        }
    }

    /// Recommendations requested per chat command
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit.max(1);
        self
    }

    /// Handle one incoming message
    pub async fn handle(&self, user_id: &str, message: &str) -> Result<ChatReply> {
        let message = message.trim();
        if user_id.trim().is_empty() {
            return Err(EngineError::InvalidInput("user_id must not be empty".to_string()));
        }

        if message.eq_ignore_ascii_case("start") {
            return self.start(user_id).await;
        }

        let session = self
            .sessions
            .load_session(user_id)
            .await
            .map_err(|e| EngineError::ServiceUnavailable(e.to_string()))?;
        if let Some(state) = session {
            return self.continue_onboarding(user_id, state, message).await;
        }

        let user = match self.engine.user(user_id).await {
            Ok(user) => user,
            Err(EngineError::UserNotFound(_)) => return Ok(ChatReply::text(NOT_REGISTERED)),
            Err(e) => return Err(e),
        };

        self.command(&user, message).await
    }

    async fn start(&self, user_id: &str) -> Result<ChatReply> {
        match self.engine.user(user_id).await {
            Ok(user) => {
                return Ok(ChatReply::text(format!(
                    "Welcome back, {}! You're all set. Type `help` to see what I can do.",
                    user.name
                )));
            }
            Err(EngineError::UserNotFound(_)) => {}
            Err(e) => return Err(e),
        }

        let (state, greeting) = OnboardingState::start();
        self.save_session(user_id, &state).await?;
        Ok(ChatReply::text(greeting))
    }

    async fn continue_onboarding(
        &self,
        user_id: &str,
        state: OnboardingState,
        message: &str,
    ) -> Result<ChatReply> {
        let transition = state.step(message);

        let mut first_query = None;
        if let Some(OnboardingEffect::CreateProfile {
            name,
            preferences,
            query,
        }) = transition.effect
        {
            let profile = PreferenceProfile::from_raw(preferences);
            self.engine
                .create_user_with_profile(user_id, &name, profile)
                .await?;
            first_query = Some(query);
        }

        // Once the profile exists the session must not outlive it
        match &transition.next {
            Some(next) => self.save_session(user_id, next).await?,
            None => self
                .sessions
                .clear_session(user_id)
                .await
                .map_err(|e| EngineError::StoreWriteFailure(e.to_string()))?,
        }

        let mut job_id = None;
        if let Some(query) = first_query {
            self.engine
                .log_query(user_id, ONBOARDING_QUERY, &query)
                .await?;
            job_id = Some(self.jobs.submit(user_id, &query, self.limit).await);
        }

        Ok(ChatReply {
            replies: transition.replies,
            job_id,
        })
    }

    async fn save_session(&self, user_id: &str, state: &OnboardingState) -> Result<()> {
        self.sessions
            .save_session(user_id, state)
            .await
            .map_err(|e| EngineError::StoreWriteFailure(e.to_string()))
    }

    async fn command(&self, user: &UserRecord, message: &str) -> Result<ChatReply> {
        let user_id = user.user_id.as_str();
        let lower = message.to_lowercase();

        if let Some(topic) = command_arg(message, "learn") {
            if topic.is_empty() {
                return Ok(ChatReply::text(
                    "Please specify what you want to learn. Example: learn python for beginners",
                ));
            }
            self.engine.log_query(user_id, MANUAL_QUERY, topic).await?;
            let job_id = self.jobs.submit(user_id, topic, self.limit).await;
            return Ok(ChatReply::with_job(
                vec!["Generating your personalized recommendations, please wait...".to_string()],
                job_id,
            ));
        }

        if lower == "recommend again" {
            return match self.engine.last_query(user_id).await? {
                Some(query) => {
                    let job_id = self.jobs.submit(user_id, &query, self.limit).await;
                    Ok(ChatReply::with_job(
                        vec![
                            format!("Recommending courses for your last goal: *{}*", query),
                            "Please wait while we generate recommendations...".to_string(),
                        ],
                        job_id,
                    ))
                }
                None => Ok(ChatReply::text(
                    "You haven't asked for any course recommendations yet. Try: learn <topic>",
                )),
            };
        }

        if lower == "history" {
            let goals = self.engine.query_history(user_id).await?;
            if goals.is_empty() {
                return Ok(ChatReply::text("No learning history found yet."));
            }
            let listing: Vec<String> = goals
                .iter()
                .enumerate()
                .map(|(i, goal)| format!("{}. {}", i + 1, goal))
                .collect();
            return Ok(ChatReply::text(format!(
                "Your Previous Learning Goals:\n{}",
                listing.join("\n")
            )));
        }

        if let Some(args) = command_arg(message, "feedback") {
            let Some((course_id, rating, text)) = parse_feedback(args) else {
                return Ok(ChatReply::text(
                    "Format: feedback <course_id> [1-5] <your feedback>",
                ));
            };
            let receipt = self
                .engine
                .record_feedback(user_id, course_id, rating, text)
                .await?;
            let reply = if receipt.preferences_updated {
                "Thank you! Feedback submitted and your preferences were updated."
            } else {
                "Thank you! Feedback submitted."
            };
            return Ok(ChatReply::text(reply));
        }

        if lower == "help" {
            return Ok(ChatReply::text(HELP));
        }

        if let Some(text) = command_arg(message, "preference") {
            if text.is_empty() {
                return Ok(ChatReply::text(
                    "Please include your preferences. Example: `preference web dev, intermediate`",
                ));
            }
            self.engine.set_custom_preference(user_id, text).await?;
            let job_id = self.jobs.submit(user_id, text, self.limit).await;
            return Ok(ChatReply::with_job(
                vec![format!(
                    "Preferences saved: {}\nFetching top course recommendations...",
                    text
                )],
                job_id,
            ));
        }

        if lower.contains("my preference") {
            return Ok(ChatReply::text(render_profile(user)));
        }

        if lower.contains("who are you") {
            return Ok(ChatReply::text(WHO_AM_I));
        }

        if THANKS_KEYWORDS.iter().any(|k| lower.contains(k)) {
            let reply = THANKS_REPLIES[message.len() % THANKS_REPLIES.len()];
            return Ok(ChatReply::text(reply));
        }

        Ok(ChatReply::text(self.free_form(message).await))
    }

    async fn free_form(&self, message: &str) -> String {
        let prompt = fallback_prompt(message);
        match tokio::time::timeout(self.timeout, self.generator.complete(&prompt)).await {
            Ok(Ok(text)) if !text.trim().is_empty() => text.trim().to_string(),
            Ok(Ok(_)) => GENERATION_FAILED.to_string(),
            Ok(Err(e)) => {
                warn!(error = %e, "free-form reply failed");
                GENERATION_FAILED.to_string()
            }
            Err(_) => {
                debug!("free-form reply timed out");
                GENERATION_FAILED.to_string()
            }
        }
    }
}

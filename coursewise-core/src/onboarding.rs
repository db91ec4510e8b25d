//! Conversational onboarding as a finite-state machine
//!
//! A new user answers five questions: name, goal, interests, level and
//! weekly time. [`OnboardingState::step`] consumes one message and returns
//! a [`Transition`] holding the next state, the replies to send, and at the
//! end an [`OnboardingEffect`] for the caller to execute. The machine itself
//! performs no I/O, so its state can be persisted between messages.

use serde::{Deserialize, Serialize};

use crate::types::{Difficulty, DurationPreference, RawPreferences, StringOrList};

pub const ASK_NAME: &str = "Welcome! What's your name?";
pub const ASK_GOAL: &str = "What's your learning goal? (e.g., get a job, explore AI)";
pub const ASK_INTERESTS: &str = "What topics are you interested in?";
pub const ASK_LEVEL: &str = "Your skill level? (beginner/intermediate/advanced)";
pub const ASK_TIME: &str = "Weekly time commitment? (e.g., 5 hours)";

/// Where the user is in the onboarding dialogue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum OnboardingState {
    AwaitingName,
    AwaitingGoal {
        name: String,
    },
    AwaitingInterests {
        name: String,
        goal: String,
    },
    AwaitingLevel {
        name: String,
        goal: String,
        interests: String,
    },
    AwaitingTime {
        name: String,
        goal: String,
        interests: String,
        level: Difficulty,
    },
}

/// Work the caller must perform when onboarding completes
#[derive(Debug, Clone, PartialEq)]
pub enum OnboardingEffect {
    /// Register the user, log `query` and start recommending for it
    CreateProfile {
        name: String,
        preferences: RawPreferences,
        query: String,
    },
}

/// Outcome of feeding one message to the machine
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    /// `None` once onboarding is finished
    pub next: Option<OnboardingState>,
    pub replies: Vec<String>,
    pub effect: Option<OnboardingEffect>,
}

impl Transition {
    fn advance(next: OnboardingState, reply: &str) -> Self {
        Self {
            next: Some(next),
            replies: vec![reply.to_string()],
            effect: None,
        }
    }

    fn repeat(state: OnboardingState, reply: String) -> Self {
        Self {
            next: Some(state),
            replies: vec![reply],
            effect: None,
        }
    }
}

impl OnboardingState {
    /// Initial state and the greeting that asks for it
    pub fn start() -> (Self, String) {
        (Self::AwaitingName, ASK_NAME.to_string())
    }

    /// The question this state is waiting on
    pub fn prompt(&self) -> &'static str {
        match self {
            Self::AwaitingName => ASK_NAME,
            Self::AwaitingGoal { .. } => ASK_GOAL,
            Self::AwaitingInterests { .. } => ASK_INTERESTS,
            Self::AwaitingLevel { .. } => ASK_LEVEL,
            Self::AwaitingTime { .. } => ASK_TIME,
        }
    }

    /// Consume one answer.
    ///
    /// Blank answers and unrecognized skill levels repeat the current
    /// question without advancing.
    pub fn step(self, message: &str) -> Transition {
        let answer = message.trim();
        if answer.is_empty() {
            let prompt = self.prompt().to_string();
            return Transition::repeat(self, prompt);
        }
        let answer = answer.to_string();

        match self {
            Self::AwaitingName => Transition::advance(Self::AwaitingGoal { name: answer }, ASK_GOAL),
            Self::AwaitingGoal { name } => Transition::advance(
                Self::AwaitingInterests { name, goal: answer },
                ASK_INTERESTS,
            ),
            Self::AwaitingInterests { name, goal } => Transition::advance(
                Self::AwaitingLevel {
                    name,
                    goal,
                    interests: answer,
                },
                ASK_LEVEL,
            ),
            Self::AwaitingLevel {
                name,
                goal,
                interests,
            } => match answer.parse::<Difficulty>() {
                Ok(level) => Transition::advance(
                    Self::AwaitingTime {
                        name,
                        goal,
                        interests,
                        level,
                    },
                    ASK_TIME,
                ),
                Err(_) => Transition::repeat(
                    Self::AwaitingLevel {
                        name,
                        goal,
                        interests,
                    },
                    format!("Please answer beginner, intermediate or advanced. {}", ASK_LEVEL),
                ),
            },
            Self::AwaitingTime {
                name,
                goal,
                interests,
                level,
            } => complete(name, goal, interests, level, answer),
        }
    }
}

fn complete(
    name: String,
    goal: String,
    interests: String,
    level: Difficulty,
    time: String,
) -> Transition {
    let summary = format!(
        "Here's what you shared:\n\
         - Name: {}\n\
         - Goal: {}\n\
         - Interests: {}\n\
         - Skill Level: {}\n\
         - Time Commitment: {}",
        name, goal, interests, level, time
    );
    let thanks = format!(
        "Thanks {}! Your preferences have been saved.\n\
         Generating your personalized course recommendations now...",
        name
    );

    let preferences = RawPreferences {
        preferred_categories: Some(StringOrList::One(interests.clone())),
        preferred_difficulty: Some(level.to_string()),
        preferred_duration: weekly_hours(&time).map(|h| duration_for_weekly_hours(h).to_string()),
        goals: Some(StringOrList::Many(vec![goal.clone()])),
        ..Default::default()
    };

    Transition {
        next: None,
        replies: vec![summary, thanks],
        effect: Some(OnboardingEffect::CreateProfile {
            name,
            preferences,
            query: format!("{} with focus on {}", goal, interests),
        }),
    }
}

/// First number in a free-text time answer ("5 hours", "about 10h")
fn weekly_hours(answer: &str) -> Option<u32> {
    answer
        .split(|c: char| !c.is_ascii_digit())
        .find(|part| !part.is_empty())
        .and_then(|digits| digits.parse().ok())
}

/// Learners with little weekly time are steered to shorter courses
fn duration_for_weekly_hours(hours: u32) -> DurationPreference {
    match hours {
        0..=3 => DurationPreference::Short,
        4..=8 => DurationPreference::Medium,
        _ => DurationPreference::Long,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PreferenceProfile;

    fn run(answers: &[&str]) -> Transition {
        let (mut state, _) = OnboardingState::start();
        let mut last = None;
        for answer in answers {
            let transition = state.clone().step(answer);
            if let Some(next) = transition.next.clone() {
                state = next;
            }
            last = Some(transition);
        }
        last.unwrap()
    }

    #[test]
    fn test_full_dialogue_creates_profile() {
        let transition = run(&["Ada", "get a job", "python, data science", "Beginner", "5 hours"]);

        assert!(transition.next.is_none());
        assert_eq!(transition.replies.len(), 2);
        assert!(transition.replies[0].contains("- Name: Ada"));
        assert!(transition.replies[1].starts_with("Thanks Ada!"));

        let Some(OnboardingEffect::CreateProfile {
            name,
            preferences,
            query,
        }) = transition.effect
        else {
            panic!("expected CreateProfile effect");
        };
        assert_eq!(name, "Ada");
        assert_eq!(query, "get a job with focus on python, data science");

        let profile = PreferenceProfile::from_raw(preferences);
        assert!(profile.preferred_categories.contains("python"));
        assert!(profile.preferred_categories.contains("data science"));
        assert_eq!(profile.preferred_difficulty, Some(Difficulty::Beginner));
        assert_eq!(profile.preferred_duration, DurationPreference::Medium);
        assert!(profile.goals.contains("get a job"));
    }

    #[test]
    fn test_each_answer_advances_one_step() {
        let (state, greeting) = OnboardingState::start();
        assert_eq!(greeting, ASK_NAME);

        let t = state.step("Ada");
        assert_eq!(t.replies, vec![ASK_GOAL.to_string()]);
        assert_eq!(t.next, Some(OnboardingState::AwaitingGoal { name: "Ada".into() }));

        let t = t.next.unwrap().step("explore AI");
        assert_eq!(t.replies, vec![ASK_INTERESTS.to_string()]);
        assert!(t.effect.is_none());
    }

    #[test]
    fn test_blank_answer_repeats_question() {
        let state = OnboardingState::AwaitingGoal { name: "Ada".into() };
        let t = state.clone().step("   ");
        assert_eq!(t.next, Some(state));
        assert_eq!(t.replies, vec![ASK_GOAL.to_string()]);
    }

    #[test]
    fn test_unknown_level_repeats_question() {
        let state = OnboardingState::AwaitingLevel {
            name: "Ada".into(),
            goal: "job".into(),
            interests: "rust".into(),
        };
        let t = state.clone().step("wizard");
        assert_eq!(t.next, Some(state));
        assert!(t.replies[0].ends_with(ASK_LEVEL));
    }

    #[test]
    fn test_time_answer_without_number_keeps_default_duration() {
        let transition = run(&["Ada", "job", "rust", "advanced", "whenever I can"]);
        let Some(OnboardingEffect::CreateProfile { preferences, .. }) = transition.effect else {
            panic!("expected CreateProfile effect");
        };
        assert!(preferences.preferred_duration.is_none());
    }

    #[test]
    fn test_weekly_hours_buckets() {
        assert_eq!(weekly_hours("about 12h a week"), Some(12));
        assert_eq!(duration_for_weekly_hours(2), DurationPreference::Short);
        assert_eq!(duration_for_weekly_hours(5), DurationPreference::Medium);
        assert_eq!(duration_for_weekly_hours(20), DurationPreference::Long);
    }

    #[test]
    fn test_state_serializes_with_step_tag() {
        let state = OnboardingState::AwaitingInterests {
            name: "Ada".into(),
            goal: "job".into(),
        };
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["step"], "awaiting_interests");
        let back: OnboardingState = serde_json::from_value(json).unwrap();
        assert_eq!(back, state);
    }
}

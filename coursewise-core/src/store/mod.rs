//! Persistence seams for users, interactions and onboarding sessions
//!
//! The engine only talks to [`PreferenceStore`]; the conversation layer
//! additionally uses [`SessionStore`]. [`MemoryStore`] implements both in
//! process, the `coursewise-store` crate implements them on libSQL.

mod memory;

use async_trait::async_trait;
use thiserror::Error;

use crate::onboarding::OnboardingState;
use crate::types::{InteractionRecord, PreferenceProfile, UserRecord};

pub use memory::MemoryStore;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur in a store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("user not found: {0}")]
    UserNotFound(String),

    #[error("user already exists: {0}")]
    UserExists(String),

    /// Backend failure (connection, I/O, locked database)
    #[error("store backend error: {0}")]
    Backend(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    /// Whether retrying the same operation could succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Backend(_))
    }
}

/// Users, their preference profiles and their interaction log
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    /// Register a user; fails with [`StoreError::UserExists`] if taken
    async fn create_user(&self, user: UserRecord) -> StoreResult<()>;

    async fn get_user(&self, user_id: &str) -> StoreResult<Option<UserRecord>>;

    async fn get_profile(&self, user_id: &str) -> StoreResult<Option<PreferenceProfile>> {
        Ok(self.get_user(user_id).await?.map(|user| user.preferences))
    }

    /// Replace the profile of an existing user
    async fn put_profile(&self, user_id: &str, profile: &PreferenceProfile) -> StoreResult<()>;

    /// Append to the log. Timestamps earlier than the user's latest record
    /// are raised to it, so per-user order is non-decreasing.
    async fn append_interaction(&self, record: InteractionRecord) -> StoreResult<()>;

    /// Newest first; equal timestamps list the later insertion first
    async fn list_interactions(&self, user_id: &str) -> StoreResult<Vec<InteractionRecord>>;
}

/// Per-user onboarding progress
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn load_session(&self, user_id: &str) -> StoreResult<Option<OnboardingState>>;

    async fn save_session(&self, user_id: &str, state: &OnboardingState) -> StoreResult<()>;

    async fn clear_session(&self, user_id: &str) -> StoreResult<()>;
}

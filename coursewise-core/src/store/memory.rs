//! In-process store

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{PreferenceStore, SessionStore, StoreError, StoreResult};
use crate::onboarding::OnboardingState;
use crate::types::{InteractionRecord, PreferenceProfile, UserRecord};

/// Store backed by hash maps; contents are lost on drop
#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<String, UserRecord>>,
    // Per-user log in insertion order
    interactions: RwLock<HashMap<String, Vec<InteractionRecord>>>,
    sessions: RwLock<HashMap<String, OnboardingState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PreferenceStore for MemoryStore {
    async fn create_user(&self, user: UserRecord) -> StoreResult<()> {
        let mut users = self.users.write().await;
        if users.contains_key(&user.user_id) {
            return Err(StoreError::UserExists(user.user_id));
        }
        users.insert(user.user_id.clone(), user);
        Ok(())
    }

    async fn get_user(&self, user_id: &str) -> StoreResult<Option<UserRecord>> {
        Ok(self.users.read().await.get(user_id).cloned())
    }

    async fn put_profile(&self, user_id: &str, profile: &PreferenceProfile) -> StoreResult<()> {
        let mut users = self.users.write().await;
        let user = users
            .get_mut(user_id)
            .ok_or_else(|| StoreError::UserNotFound(user_id.to_string()))?;
        user.preferences = profile.clone();
        user.updated_at = Utc::now();
        Ok(())
    }

    async fn append_interaction(&self, mut record: InteractionRecord) -> StoreResult<()> {
        let mut interactions = self.interactions.write().await;
        let log = interactions.entry(record.user_id.clone()).or_default();
        if let Some(last) = log.last() {
            record.timestamp = record.timestamp.max(last.timestamp);
        }
        log.push(record);
        Ok(())
    }

    async fn list_interactions(&self, user_id: &str) -> StoreResult<Vec<InteractionRecord>> {
        let interactions = self.interactions.read().await;
        Ok(interactions
            .get(user_id)
            .map(|log| log.iter().rev().cloned().collect())
            .unwrap_or_default())
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn load_session(&self, user_id: &str) -> StoreResult<Option<OnboardingState>> {
        Ok(self.sessions.read().await.get(user_id).cloned())
    }

    async fn save_session(&self, user_id: &str, state: &OnboardingState) -> StoreResult<()> {
        self.sessions
            .write()
            .await
            .insert(user_id.to_string(), state.clone());
        Ok(())
    }

    async fn clear_session(&self, user_id: &str) -> StoreResult<()> {
        self.sessions.write().await.remove(user_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::types::{InteractionType, MANUAL_QUERY};

    #[tokio::test]
    async fn test_create_user_rejects_duplicates() {
        let store = MemoryStore::new();
        store
            .create_user(UserRecord::new("u1", "Ada", PreferenceProfile::default()))
            .await
            .unwrap();

        let err = store
            .create_user(UserRecord::new("u1", "Other", PreferenceProfile::default()))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::UserExists(id) if id == "u1"));
        assert_eq!(store.get_user("u1").await.unwrap().unwrap().name, "Ada");
    }

    #[tokio::test]
    async fn test_put_profile_requires_user() {
        let store = MemoryStore::new();
        let err = store
            .put_profile("ghost", &PreferenceProfile::default())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::UserNotFound(_)));
    }

    #[tokio::test]
    async fn test_put_profile_replaces() {
        let store = MemoryStore::new();
        store
            .create_user(UserRecord::new("u1", "Ada", PreferenceProfile::default()))
            .await
            .unwrap();

        let mut profile = PreferenceProfile::default();
        profile.custom = Some("evenings only".into());
        store.put_profile("u1", &profile).await.unwrap();

        assert_eq!(store.get_profile("u1").await.unwrap(), Some(profile));
        assert!(store.get_profile("ghost").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_interactions_list_newest_first() {
        let store = MemoryStore::new();
        let now = Utc::now();
        store
            .append_interaction(InteractionRecord::query("u1", MANUAL_QUERY, "first").at(now))
            .await
            .unwrap();
        store
            .append_interaction(InteractionRecord::feedback("u1", "7", Some(5), None).at(now))
            .await
            .unwrap();
        store
            .append_interaction(InteractionRecord::view("u2", "7"))
            .await
            .unwrap();

        let log = store.list_interactions("u1").await.unwrap();
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].interaction_type, InteractionType::Feedback);
        assert_eq!(log[1].query_text(), Some("first"));
    }

    #[tokio::test]
    async fn test_timestamps_never_go_backwards() {
        let store = MemoryStore::new();
        let now = Utc::now();
        store
            .append_interaction(InteractionRecord::view("u1", "1").at(now))
            .await
            .unwrap();
        store
            .append_interaction(InteractionRecord::view("u1", "2").at(now - Duration::hours(1)))
            .await
            .unwrap();

        let log = store.list_interactions("u1").await.unwrap();
        assert_eq!(log[0].course_id, "2");
        assert_eq!(log[0].timestamp, now);
    }

    #[tokio::test]
    async fn test_sessions_round_trip() {
        let store = MemoryStore::new();
        let state = OnboardingState::AwaitingGoal { name: "Ada".into() };

        store.save_session("u1", &state).await.unwrap();
        assert_eq!(store.load_session("u1").await.unwrap(), Some(state));

        store.clear_session("u1").await.unwrap();
        assert!(store.load_session("u1").await.unwrap().is_none());
    }
}

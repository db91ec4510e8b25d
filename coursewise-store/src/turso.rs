//! Turso/libSQL implementation of the preference and session stores.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use coursewise_core::{
    InteractionRecord, OnboardingState, PreferenceProfile, PreferenceStore, SessionStore,
    StoreError, StoreResult, UserRecord,
};
use libsql::{Builder, Connection, Database};
use tracing::{debug, info, instrument};

use crate::{Error, Result};

/// SQL schema for the users table.
const SCHEMA_USERS: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    user_id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    preferences TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
)
"#;

/// SQL schema for the interaction log. `seq` breaks timestamp ties.
const SCHEMA_INTERACTIONS: &str = r#"
CREATE TABLE IF NOT EXISTS interactions (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id TEXT NOT NULL,
    course_id TEXT NOT NULL,
    interaction_type TEXT NOT NULL,
    rating INTEGER,
    feedback TEXT,
    timestamp TEXT NOT NULL
)
"#;

const INDEX_INTERACTIONS: &str = r#"
CREATE INDEX IF NOT EXISTS idx_interactions_user_time
ON interactions(user_id, timestamp)
"#;

/// SQL schema for in-progress onboarding dialogues.
const SCHEMA_SESSIONS: &str = r#"
CREATE TABLE IF NOT EXISTS onboarding_sessions (
    user_id TEXT PRIMARY KEY,
    state TEXT NOT NULL,
    updated_at TEXT NOT NULL
)
"#;

/// Raises the new timestamp to the user's latest one, in a single statement.
const INSERT_INTERACTION: &str = r#"
INSERT INTO interactions (user_id, course_id, interaction_type, rating, feedback, timestamp)
VALUES (?1, ?2, ?3, ?4, ?5, MAX(?6, COALESCE(
    (SELECT timestamp FROM interactions WHERE user_id = ?1 ORDER BY seq DESC LIMIT 1),
    ?6
)))
"#;

/// libSQL-backed store for users, interactions and onboarding sessions.
#[derive(Clone)]
pub struct TursoStore {
    db: Arc<Database>,
}

impl TursoStore {
    /// Open (or create) a local embedded database file.
    pub async fn new_local(path: &Path) -> Result<Self> {
        let db = Builder::new_local(path).build().await?;
        let store = Self { db: Arc::new(db) };
        store.ensure_schema().await?;
        info!(path = %path.display(), "opened local store");
        Ok(store)
    }

    /// Connect to a remote Turso database.
    pub async fn new_remote(url: &str, token: &str) -> Result<Self> {
        let db = Builder::new_remote(url.to_string(), token.to_string())
            .build()
            .await?;
        let store = Self { db: Arc::new(db) };
        store.ensure_schema().await?;
        info!(url, "connected to remote store");
        Ok(store)
    }

    /// Create an in-memory store (for testing).
    pub async fn new_memory() -> Result<Self> {
        let db = Builder::new_local(":memory:").build().await?;
        let store = Self { db: Arc::new(db) };
        store.ensure_schema().await?;
        Ok(store)
    }

    async fn conn(&self) -> Result<Connection> {
        Ok(self.db.connect()?)
    }

    async fn ensure_schema(&self) -> Result<()> {
        let conn = self.conn().await?;
        conn.execute(SCHEMA_USERS, ()).await?;
        conn.execute(SCHEMA_INTERACTIONS, ()).await?;
        conn.execute(INDEX_INTERACTIONS, ()).await?;
        conn.execute(SCHEMA_SESSIONS, ()).await?;
        Ok(())
    }

    fn parse_user(row: &libsql::Row) -> Result<UserRecord> {
        let user_id: String = row.get(0)?;
        let name: String = row.get(1)?;
        let preferences_json: String = row.get(2)?;
        let created_at_str: String = row.get(3)?;
        let updated_at_str: String = row.get(4)?;

        Ok(UserRecord {
            user_id,
            name,
            preferences: serde_json::from_str(&preferences_json)?,
            created_at: parse_datetime(&created_at_str)?,
            updated_at: parse_datetime(&updated_at_str)?,
        })
    }

    fn parse_interaction(row: &libsql::Row) -> Result<InteractionRecord> {
        let user_id: String = row.get(0)?;
        let course_id: String = row.get(1)?;
        let type_str: String = row.get(2)?;
        let rating: Option<i64> = row.get(3)?;
        let feedback: Option<String> = row.get(4)?;
        let timestamp_str: String = row.get(5)?;

        let interaction_type = type_str
            .parse()
            .map_err(|_| Error::InvalidData(format!("invalid interaction type: {}", type_str)))?;
        let rating = rating
            .map(|r| {
                u8::try_from(r).map_err(|_| Error::InvalidData(format!("invalid rating: {}", r)))
            })
            .transpose()?;

        Ok(InteractionRecord {
            user_id,
            course_id,
            interaction_type,
            rating,
            feedback,
            timestamp: parse_datetime(&timestamp_str)?,
        })
    }

    async fn insert_user(&self, user: &UserRecord) -> Result<bool> {
        let conn = self.conn().await?;
        let inserted = conn
            .execute(
                "INSERT INTO users (user_id, name, preferences, created_at, updated_at) VALUES (?, ?, ?, ?, ?) ON CONFLICT(user_id) DO NOTHING",
                libsql::params![
                    user.user_id.clone(),
                    user.name.clone(),
                    serde_json::to_string(&user.preferences)?,
                    format_datetime(user.created_at),
                    format_datetime(user.updated_at)
                ],
            )
            .await?;
        Ok(inserted > 0)
    }

    async fn select_user(&self, user_id: &str) -> Result<Option<UserRecord>> {
        let conn = self.conn().await?;
        let mut rows = conn
            .query(
                "SELECT user_id, name, preferences, created_at, updated_at FROM users WHERE user_id = ?",
                [user_id],
            )
            .await?;

        if let Some(row) = rows.next().await? {
            Ok(Some(Self::parse_user(&row)?))
        } else {
            Ok(None)
        }
    }

    async fn update_profile(&self, user_id: &str, profile: &PreferenceProfile) -> Result<bool> {
        let conn = self.conn().await?;
        let updated = conn
            .execute(
                "UPDATE users SET preferences = ?, updated_at = ? WHERE user_id = ?",
                libsql::params![
                    serde_json::to_string(profile)?,
                    format_datetime(Utc::now()),
                    user_id
                ],
            )
            .await?;
        Ok(updated > 0)
    }

    async fn insert_interaction(&self, record: &InteractionRecord) -> Result<()> {
        let conn = self.conn().await?;
        conn.execute(
            INSERT_INTERACTION,
            libsql::params![
                record.user_id.clone(),
                record.course_id.clone(),
                record.interaction_type.as_str(),
                record.rating.map(i64::from),
                record.feedback.clone(),
                format_datetime(record.timestamp)
            ],
        )
        .await?;
        Ok(())
    }

    async fn select_interactions(&self, user_id: &str) -> Result<Vec<InteractionRecord>> {
        let conn = self.conn().await?;
        let mut rows = conn
            .query(
                "SELECT user_id, course_id, interaction_type, rating, feedback, timestamp FROM interactions WHERE user_id = ? ORDER BY timestamp DESC, seq DESC",
                [user_id],
            )
            .await?;

        let mut records = Vec::new();
        while let Some(row) = rows.next().await? {
            records.push(Self::parse_interaction(&row)?);
        }
        Ok(records)
    }

    async fn select_session(&self, user_id: &str) -> Result<Option<OnboardingState>> {
        let conn = self.conn().await?;
        let mut rows = conn
            .query(
                "SELECT state FROM onboarding_sessions WHERE user_id = ?",
                [user_id],
            )
            .await?;

        if let Some(row) = rows.next().await? {
            let state_json: String = row.get(0)?;
            Ok(Some(serde_json::from_str(&state_json)?))
        } else {
            Ok(None)
        }
    }

    async fn upsert_session(&self, user_id: &str, state: &OnboardingState) -> Result<()> {
        let conn = self.conn().await?;
        conn.execute(
            "INSERT INTO onboarding_sessions (user_id, state, updated_at) VALUES (?, ?, ?) ON CONFLICT(user_id) DO UPDATE SET state = excluded.state, updated_at = excluded.updated_at",
            libsql::params![
                user_id,
                serde_json::to_string(state)?,
                format_datetime(Utc::now())
            ],
        )
        .await?;
        Ok(())
    }

    async fn delete_session(&self, user_id: &str) -> Result<()> {
        let conn = self.conn().await?;
        conn.execute(
            "DELETE FROM onboarding_sessions WHERE user_id = ?",
            [user_id],
        )
        .await?;
        Ok(())
    }
}

#[async_trait]
impl PreferenceStore for TursoStore {
    #[instrument(skip(self, user), fields(user_id = %user.user_id), level = "debug")]
    async fn create_user(&self, user: UserRecord) -> StoreResult<()> {
        if self.insert_user(&user).await? {
            debug!("user created");
            Ok(())
        } else {
            Err(StoreError::UserExists(user.user_id))
        }
    }

    #[instrument(skip(self), level = "debug")]
    async fn get_user(&self, user_id: &str) -> StoreResult<Option<UserRecord>> {
        Ok(self.select_user(user_id).await?)
    }

    #[instrument(skip(self, profile), level = "debug")]
    async fn put_profile(&self, user_id: &str, profile: &PreferenceProfile) -> StoreResult<()> {
        if self.update_profile(user_id, profile).await? {
            Ok(())
        } else {
            Err(StoreError::UserNotFound(user_id.to_string()))
        }
    }

    #[instrument(skip(self, record), fields(user_id = %record.user_id, kind = %record.interaction_type), level = "debug")]
    async fn append_interaction(&self, record: InteractionRecord) -> StoreResult<()> {
        Ok(self.insert_interaction(&record).await?)
    }

    #[instrument(skip(self), level = "debug")]
    async fn list_interactions(&self, user_id: &str) -> StoreResult<Vec<InteractionRecord>> {
        Ok(self.select_interactions(user_id).await?)
    }
}

#[async_trait]
impl SessionStore for TursoStore {
    #[instrument(skip(self), level = "debug")]
    async fn load_session(&self, user_id: &str) -> StoreResult<Option<OnboardingState>> {
        Ok(self.select_session(user_id).await?)
    }

    #[instrument(skip(self, state), level = "debug")]
    async fn save_session(&self, user_id: &str, state: &OnboardingState) -> StoreResult<()> {
        Ok(self.upsert_session(user_id, state).await?)
    }

    #[instrument(skip(self), level = "debug")]
    async fn clear_session(&self, user_id: &str) -> StoreResult<()> {
        Ok(self.delete_session(user_id).await?)
    }
}

/// Fixed-width RFC 3339 so that text order matches time order.
fn format_datetime(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn parse_datetime(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| Error::InvalidData(format!("invalid datetime: {}", s)))
}

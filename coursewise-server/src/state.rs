//! Shared application state for the coursewise server

use std::sync::Arc;

use chrono::{DateTime, Utc};
use coursewise_core::{Conversation, RecommendationEngine, RecommendationJobs};

/// Shared application state accessible by all handlers
#[derive(Clone)]
pub struct AppState {
    /// Recommendation engine
    pub engine: Arc<RecommendationEngine>,
    /// Background recommendation jobs
    pub jobs: Arc<RecommendationJobs>,
    /// Chat front end
    pub conversation: Arc<Conversation>,
    /// When the server started
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(
        engine: Arc<RecommendationEngine>,
        jobs: Arc<RecommendationJobs>,
        conversation: Arc<Conversation>,
    ) -> Self {
        Self {
            engine,
            jobs,
            conversation,
            started_at: Utc::now(),
        }
    }

    /// Returns how long the server has been running
    pub fn uptime_seconds(&self) -> i64 {
        (Utc::now() - self.started_at).num_seconds()
    }
}

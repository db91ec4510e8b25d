//! HTTP server module

mod api;
mod error;
mod jobs;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};

use crate::AppState;

pub use api::{HealthResponse, QueryHistoryResponse, RecommendationResponse};
pub use error::{ApiError, ErrorResponse};
pub use jobs::{CancelResponse, JobAccepted};

/// Create the HTTP router with all routes configured
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(api::health))
        .route("/api/users", post(api::create_user))
        .route(
            "/api/users/:user_id/preferences",
            get(api::get_preferences).put(api::update_preferences),
        )
        .route("/api/users/:user_id/history", get(api::query_history))
        .route("/api/users/:user_id/views", post(api::record_view))
        .route("/api/recommendations", post(api::recommend))
        .route("/api/feedback", post(api::record_feedback))
        .route("/api/jobs", post(jobs::submit_job))
        .route("/api/jobs/:id", get(jobs::job_status).delete(jobs::cancel_job))
        .route("/api/chat", post(jobs::chat))
        .with_state(state)
}

//! REST API handlers for users, recommendations and feedback

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use coursewise_core::{AnnotatedCourse, FeedbackReceipt, PreferenceProfile, UserRecord};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::error::ApiError;
use crate::AppState;

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status of the server
    pub status: String,
    /// Server version
    pub version: String,
    /// Seconds since server started
    pub uptime_seconds: i64,
    /// Courses in the loaded catalog
    pub courses: usize,
}

/// Health check endpoint
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.uptime_seconds(),
        courses: state.engine.catalog().len(),
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Users
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub user_id: String,
    pub name: String,
    /// Free-text description; preferences are extracted from it
    #[serde(default)]
    pub description: Option<String>,
}

/// POST /api/users
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserRecord>), ApiError> {
    let user = state
        .engine
        .create_user(
            &request.user_id,
            &request.name,
            request.description.as_deref().unwrap_or(""),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// GET /api/users/:user_id/preferences
pub async fn get_preferences(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<PreferenceProfile>, ApiError> {
    Ok(Json(state.engine.preferences(&user_id).await?))
}

#[derive(Debug, Deserialize)]
pub struct UpdatePreferencesRequest {
    pub description: String,
}

/// PUT /api/users/:user_id/preferences
pub async fn update_preferences(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Json(request): Json<UpdatePreferencesRequest>,
) -> Result<Json<PreferenceProfile>, ApiError> {
    let profile = state
        .engine
        .update_preferences(&user_id, &request.description)
        .await?;
    Ok(Json(profile))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct QueryHistoryResponse {
    /// Logged queries, newest first
    pub queries: Vec<String>,
}

/// GET /api/users/:user_id/history
pub async fn query_history(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<QueryHistoryResponse>, ApiError> {
    state.engine.user(&user_id).await?;
    let queries = state.engine.query_history(&user_id).await?;
    Ok(Json(QueryHistoryResponse { queries }))
}

#[derive(Debug, Deserialize)]
pub struct RecordViewRequest {
    pub course_id: String,
}

/// POST /api/users/:user_id/views
pub async fn record_view(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Json(request): Json<RecordViewRequest>,
) -> Result<StatusCode, ApiError> {
    state.engine.user(&user_id).await?;
    state.engine.record_view(&user_id, &request.course_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ────────────────────────────────────────────────────────────────────────────
// Recommendations and feedback
// ────────────────────────────────────────────────────────────────────────────

/// Body shared by synchronous recommendations and job submission
#[derive(Debug, Deserialize)]
pub struct RecommendationRequest {
    pub user_id: String,
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RecommendationResponse {
    pub recommendations: Vec<AnnotatedCourse>,
    pub total_found: usize,
}

/// POST /api/recommendations
pub async fn recommend(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RecommendationRequest>,
) -> Result<Json<RecommendationResponse>, ApiError> {
    let limit = request
        .limit
        .unwrap_or_else(|| state.engine.default_limit());
    let set = state
        .engine
        .get_recommendations(
            &request.user_id,
            request.query.as_deref().unwrap_or(""),
            limit,
        )
        .await?;
    debug!(
        user_id = %request.user_id,
        returned = set.recommendations.len(),
        total_found = set.total_found,
        "recommendations served"
    );
    Ok(Json(RecommendationResponse {
        recommendations: set.recommendations,
        total_found: set.total_found,
    }))
}

#[derive(Debug, Deserialize)]
pub struct FeedbackRequest {
    pub user_id: String,
    pub course_id: String,
    pub rating: u8,
    #[serde(default)]
    pub feedback: Option<String>,
}

/// POST /api/feedback
pub async fn record_feedback(
    State(state): State<Arc<AppState>>,
    Json(request): Json<FeedbackRequest>,
) -> Result<Json<FeedbackReceipt>, ApiError> {
    let receipt = state
        .engine
        .record_feedback(
            &request.user_id,
            &request.course_id,
            request.rating,
            request.feedback,
        )
        .await?;
    Ok(Json(receipt))
}

//! Background job and chat endpoints

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use coursewise_core::{ChatReply, JobId, JobStatus};
use serde::{Deserialize, Serialize};

use super::api::RecommendationRequest;
use super::error::ApiError;
use crate::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct JobAccepted {
    pub job_id: JobId,
}

/// POST /api/jobs
pub async fn submit_job(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RecommendationRequest>,
) -> Result<(StatusCode, Json<JobAccepted>), ApiError> {
    // Unknown users get a 404, not a job id
    state.engine.user(&request.user_id).await?;

    let limit = request
        .limit
        .unwrap_or_else(|| state.engine.default_limit());
    let job_id = state
        .jobs
        .submit(
            &request.user_id,
            request.query.as_deref().unwrap_or(""),
            limit,
        )
        .await;
    Ok((StatusCode::ACCEPTED, Json(JobAccepted { job_id })))
}

/// GET /api/jobs/:id
pub async fn job_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<JobId>,
) -> Result<Json<JobStatus>, ApiError> {
    state
        .jobs
        .status(&id)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("job not found: {}", id)))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CancelResponse {
    /// False when the job had already finished
    pub cancelled: bool,
}

/// DELETE /api/jobs/:id
pub async fn cancel_job(
    State(state): State<Arc<AppState>>,
    Path(id): Path<JobId>,
) -> Result<Json<CancelResponse>, ApiError> {
    state
        .jobs
        .cancel(&id)
        .await
        .map(|cancelled| Json(CancelResponse { cancelled }))
        .ok_or_else(|| ApiError::not_found(format!("job not found: {}", id)))
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub user_id: String,
    pub message: String,
}

/// POST /api/chat
pub async fn chat(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatReply>, ApiError> {
    let reply = state
        .conversation
        .handle(&request.user_id, &request.message)
        .await?;
    Ok(Json(reply))
}

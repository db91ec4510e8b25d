//! Background recommendation jobs
//!
//! Generating explanations can take many seconds, so the chat front end
//! submits a job, answers immediately, and lets the client poll by id.
//! Each job publishes its status on a `watch` channel; a job reaches exactly
//! one terminal state and never leaves it. Finished jobs stay pollable for
//! a retention window and are dropped by the next `submit` after it.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::{RwLock, watch};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use uuid::Uuid;

use crate::conversation::{VideoLookup, render_error, render_recommendations};
use crate::engine::RecommendationEngine;
use crate::types::RecommendationSet;

/// Identifier of a submitted job (UUIDv7, time ordered)
pub type JobId = Uuid;

/// How long a finished job stays pollable
pub const DEFAULT_JOB_RETENTION: Duration = Duration::from_secs(600);

/// Lifecycle of a recommendation job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Completed {
        recommendations: RecommendationSet,
        /// Chat-ready rendering of the recommendations
        message: String,
    },
    Failed {
        error: String,
        retryable: bool,
        message: String,
    },
    Cancelled,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, JobStatus::Pending)
    }
}

struct JobEntry {
    user_id: String,
    status: Arc<watch::Sender<JobStatus>>,
    finished_at: Arc<OnceLock<Instant>>,
    cancel: CancellationToken,
}

impl JobEntry {
    fn finish(&self, outcome: JobStatus) -> bool {
        finish(&self.status, &self.finished_at, outcome)
    }

    fn expired(&self, now: Instant, retention: Duration) -> bool {
        self.finished_at
            .get()
            .is_some_and(|at| now.saturating_duration_since(*at) >= retention)
    }
}

/// Registry and runner for recommendation jobs
pub struct RecommendationJobs {
    engine: Arc<RecommendationEngine>,
    videos: Option<Arc<dyn VideoLookup>>,
    jobs: RwLock<HashMap<JobId, JobEntry>>,
    retention: Duration,
    shutdown: CancellationToken,
}

impl RecommendationJobs {
    pub fn new(engine: Arc<RecommendationEngine>, videos: Option<Arc<dyn VideoLookup>>) -> Self {
        Self {
            engine,
            videos,
            jobs: RwLock::new(HashMap::new()),
            retention: DEFAULT_JOB_RETENTION,
            shutdown: CancellationToken::new(),
        }
    }

    /// Keep finished jobs pollable for `retention` instead of the default
    pub fn with_retention(mut self, retention: Duration) -> Self {
        self.retention = retention;
        self
    }

    /// Start generating recommendations in the background
    pub async fn submit(&self, user_id: &str, query: &str, limit: usize) -> JobId {
        let id = Uuid::now_v7();
        let (sender, _) = watch::channel(JobStatus::Pending);
        let sender = Arc::new(sender);
        let finished_at = Arc::new(OnceLock::new());
        let cancel = self.shutdown.child_token();

        {
            let mut jobs = self.jobs.write().await;
            let now = Instant::now();
            let expired = prune(&mut jobs, |job| job.expired(now, self.retention));
            if expired > 0 {
                debug!(expired, "expired finished jobs");
            }
            jobs.insert(
                id,
                JobEntry {
                    user_id: user_id.to_string(),
                    status: sender.clone(),
                    finished_at: finished_at.clone(),
                    cancel: cancel.clone(),
                },
            );
        }

        let engine = self.engine.clone();
        let videos = self.videos.clone();
        let user_id = user_id.to_string();
        let query = query.to_string();

        tokio::spawn(async move {
            let outcome = tokio::select! {
                _ = cancel.cancelled() => {
                    debug!(job_id = %id, "job cancelled before completion");
                    JobStatus::Cancelled
                }
                status = run_job(&engine, videos.as_deref(), &user_id, &query, limit) => status,
            };
            finish(&sender, &finished_at, outcome);
        });

        debug!(job_id = %id, "recommendation job submitted");
        id
    }

    pub async fn status(&self, id: &JobId) -> Option<JobStatus> {
        let jobs = self.jobs.read().await;
        jobs.get(id).map(|job| job.status.borrow().clone())
    }

    /// User that submitted the job
    pub async fn owner(&self, id: &JobId) -> Option<String> {
        let jobs = self.jobs.read().await;
        jobs.get(id).map(|job| job.user_id.clone())
    }

    pub async fn subscribe(&self, id: &JobId) -> Option<watch::Receiver<JobStatus>> {
        let jobs = self.jobs.read().await;
        jobs.get(id).map(|job| job.status.subscribe())
    }

    /// Wait until the job reaches a terminal state
    pub async fn wait(&self, id: &JobId) -> Option<JobStatus> {
        let mut receiver = self.subscribe(id).await?;
        let status = receiver.wait_for(JobStatus::is_terminal).await.ok()?;
        Some(status.clone())
    }

    /// Cancel a pending job.
    ///
    /// Returns `None` for an unknown id and `Some(false)` when the job had
    /// already finished.
    pub async fn cancel(&self, id: &JobId) -> Option<bool> {
        let jobs = self.jobs.read().await;
        let job = jobs.get(id)?;
        let cancelled = job.finish(JobStatus::Cancelled);
        job.cancel.cancel();
        if cancelled {
            info!(job_id = %id, "recommendation job cancelled");
        }
        Some(cancelled)
    }

    /// Forget every finished job, retained or not. Returns how many were
    /// removed.
    pub async fn prune_finished(&self) -> usize {
        let mut jobs = self.jobs.write().await;
        prune(&mut jobs, |job| job.status.borrow().is_terminal())
    }

    /// Number of jobs currently tracked, pending or retained
    pub async fn tracked(&self) -> usize {
        self.jobs.read().await.len()
    }

    /// Cancel every running job
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }
}

/// Move a pending job to `outcome`; terminal states are never replaced
fn finish(
    sender: &watch::Sender<JobStatus>,
    finished_at: &OnceLock<Instant>,
    outcome: JobStatus,
) -> bool {
    sender.send_if_modified(|current| {
        if current.is_terminal() {
            false
        } else {
            let _ = finished_at.set(Instant::now());
            *current = outcome;
            true
        }
    })
}

fn prune(jobs: &mut HashMap<JobId, JobEntry>, remove: impl Fn(&JobEntry) -> bool) -> usize {
    let before = jobs.len();
    jobs.retain(|_, job| !remove(job));
    before - jobs.len()
}

async fn run_job(
    engine: &RecommendationEngine,
    videos: Option<&dyn VideoLookup>,
    user_id: &str,
    query: &str,
    limit: usize,
) -> JobStatus {
    match engine.get_recommendations(user_id, query, limit).await {
        Ok(set) => {
            let message = render_recommendations(&set, videos).await;
            JobStatus::Completed {
                recommendations: set,
                message,
            }
        }
        Err(e) => JobStatus::Failed {
            retryable: e.is_retryable(),
            message: render_error(&e),
            error: e.to_string(),
        },
    }
}

//! coursewise-core: course recommendation engine
//!
//! Combines semantic similarity search over a course catalog with an
//! explicit, continuously updated learner preference profile.
//!
//! # Architecture
//!
//! - [`catalog`]: immutable course catalog loaded from CSV
//! - [`index`]: [`EmbeddingIndex`] seam and an in-memory cosine index
//! - [`scoring`]: preference-aware re-ranking ([`Ranker`])
//! - [`explain`] / [`extraction`]: text-generation backed helpers that
//!   degrade to fixed fallbacks
//! - [`feedback`]: preference learning from ratings
//! - [`store`]: [`PreferenceStore`] / [`SessionStore`] seams and [`MemoryStore`]
//! - [`engine`]: [`RecommendationEngine`], the orchestrator
//! - [`onboarding`], [`conversation`], [`jobs`]: chat front end and
//!   background recommendation jobs

pub mod catalog;
pub mod config;
pub mod conversation;
pub mod engine;
pub mod error;
pub mod explain;
pub mod extraction;
pub mod feedback;
pub mod index;
pub mod jobs;
pub mod onboarding;
pub mod retry;
pub mod scoring;
pub mod store;
pub mod types;

pub use catalog::{Catalog, CatalogError};
pub use config::{EngineConfig, RetryConfig, ScoringWeights};
pub use conversation::{ChatReply, Conversation, VideoLookup};
pub use engine::RecommendationEngine;
pub use error::{EngineError, Result};
pub use index::{EmbeddingIndex, HashingEmbedder, IndexDocument, IndexError, IndexHit, MemoryVectorIndex};
pub use jobs::{DEFAULT_JOB_RETENTION, JobId, JobStatus, RecommendationJobs};
pub use onboarding::{OnboardingEffect, OnboardingState, Transition};
pub use retry::RetryPolicy;
pub use scoring::Ranker;
pub use store::{MemoryStore, PreferenceStore, SessionStore, StoreError, StoreResult};
pub use types::*;

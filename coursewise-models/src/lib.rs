//! Model providers for coursewise.
//!
//! This crate provides:
//! - [`TextGenerator`](providers::TextGenerator) for prompt completion
//!   (recommendation explanations, preference extraction, chat replies)
//! - [`Embedder`](providers::Embedder) for turning course and query text
//!   into vectors for similarity search
//! - [`OllamaProvider`](providers::OllamaProvider), a local implementation
//!   of both traits
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────┐
//! │            coursewise-core                │
//! │  Explainer   PreferenceExtractor   Index  │
//! └─────┬──────────────┬──────────────┬───────┘
//!       │ TextGenerator│              │ Embedder
//!       ▼              ▼              ▼
//! ┌───────────────────────────────────────────┐
//! │              OllamaProvider               │
//! │      /api/generate        /api/embed      │
//! └───────────────────────────────────────────┘
//! ```

mod error;

pub mod providers;

pub use error::{Error, Result};
pub use providers::{Embedder, OllamaProvider, TextGenerator};

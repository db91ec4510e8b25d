//! Model provider traits and implementations.
//!
//! [`TextGenerator`] and [`Embedder`] are the two seams the recommendation
//! engine consumes. Both are object safe so callers hold them as
//! `Arc<dyn TextGenerator>` / `Arc<dyn Embedder>`.
//!
//! # Example
//!
//! ```ignore
//! use coursewise_models::providers::{OllamaProvider, TextGenerator};
//!
//! async fn explain(generator: &dyn TextGenerator) -> coursewise_models::Result<String> {
//!     generator.complete("Why is this course a good fit?").await
//! }
//! ```

mod ollama;
mod types;

use async_trait::async_trait;

pub use ollama::{
    DEFAULT_BASE_URL, DEFAULT_EMBEDDING_MODEL, DEFAULT_GENERATION_MODEL, OllamaProvider,
};
pub use types::*;

use crate::Result;

/// Trait for prompt-completion providers.
///
/// Implementations return the generated text or an error; callers decide
/// how to degrade when generation fails.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Provider identifier used in logs (e.g., "ollama").
    fn name(&self) -> &str;

    /// Complete a single prompt and return the generated text.
    async fn complete(&self, prompt: &str) -> Result<String>;
}

/// Trait for text embedding providers.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Generate an embedding for a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embeddings for multiple texts.
    ///
    /// Default implementation calls `embed` sequentially; implementations
    /// should override for efficient batching.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.embed(text).await?);
        }
        Ok(results)
    }
}

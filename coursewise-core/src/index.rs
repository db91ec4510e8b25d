//! Embedding index for semantic course search
//!
//! [`EmbeddingIndex`] is the seam between the engine and whatever vector
//! store holds the course embeddings. [`MemoryVectorIndex`] keeps vectors in
//! process and scores queries by cosine distance; it takes any
//! [`Embedder`], including the offline [`HashingEmbedder`].

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use coursewise_models::Embedder;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use crate::types::Course;

/// Errors from an embedding index
#[derive(Debug, Error)]
pub enum IndexError {
    /// The embedding backend could not be reached or failed
    #[error("embedding index unavailable: {0}")]
    Unavailable(String),
}

impl From<coursewise_models::Error> for IndexError {
    fn from(err: coursewise_models::Error) -> Self {
        IndexError::Unavailable(err.to_string())
    }
}

/// A document to embed and store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexDocument {
    pub id: String,
    pub text: String,
    pub metadata: serde_json::Value,
}

impl IndexDocument {
    /// Document for a catalog course; the metadata is the course itself
    pub fn from_course(course: &Course) -> Self {
        Self {
            id: course.id.clone(),
            text: course.document_text(),
            metadata: serde_json::to_value(course).unwrap_or_default(),
        }
    }
}

/// A nearest-neighbor match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexHit {
    pub id: String,
    pub metadata: serde_json::Value,
    /// Cosine distance in [0, 2]; smaller is closer
    pub distance: f64,
}

/// Nearest-neighbor search over embedded documents
#[async_trait]
pub trait EmbeddingIndex: Send + Sync {
    /// Add or replace documents by id. Returns how many were written.
    async fn index(&self, documents: Vec<IndexDocument>) -> Result<usize, IndexError>;

    /// Up to `k` documents ordered by ascending distance to `text`
    async fn query(&self, text: &str, k: usize) -> Result<Vec<IndexHit>, IndexError>;

    /// Number of stored documents
    async fn len(&self) -> usize;
}

/// Compute cosine similarity between two embedding vectors
///
/// Returns a value in [-1, 1] where 1 means identical direction. Vectors of
/// different length or zero norm have similarity 0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        (dot / (norm_a * norm_b)).clamp(-1.0, 1.0)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// MemoryVectorIndex
// ────────────────────────────────────────────────────────────────────────────

struct Entry {
    id: String,
    vector: Vec<f32>,
    metadata: serde_json::Value,
}

#[derive(Default)]
struct Entries {
    items: Vec<Entry>,
    positions: HashMap<String, usize>,
}

/// In-process vector index with exhaustive cosine search
pub struct MemoryVectorIndex {
    embedder: Arc<dyn Embedder>,
    entries: RwLock<Entries>,
}

impl MemoryVectorIndex {
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self {
            embedder,
            entries: RwLock::new(Entries::default()),
        }
    }
}

#[async_trait]
impl EmbeddingIndex for MemoryVectorIndex {
    #[instrument(skip(self, documents), fields(count = documents.len()), level = "debug")]
    async fn index(&self, documents: Vec<IndexDocument>) -> Result<usize, IndexError> {
        if documents.is_empty() {
            return Ok(0);
        }

        let texts: Vec<String> = documents.iter().map(|d| d.text.clone()).collect();
        let vectors = self.embedder.embed_batch(&texts).await?;
        if vectors.len() != documents.len() {
            return Err(IndexError::Unavailable(format!(
                "embedder returned {} vectors for {} documents",
                vectors.len(),
                documents.len()
            )));
        }

        let mut entries = self.entries.write().await;
        let written = documents.len();
        for (doc, vector) in documents.into_iter().zip(vectors) {
            let entry = Entry {
                id: doc.id,
                vector,
                metadata: doc.metadata,
            };
            match entries.positions.get(&entry.id) {
                Some(&pos) => entries.items[pos] = entry,
                None => {
                    let pos = entries.items.len();
                    entries.positions.insert(entry.id.clone(), pos);
                    entries.items.push(entry);
                }
            }
        }

        debug!(total = entries.items.len(), "index updated");
        Ok(written)
    }

    #[instrument(skip(self), level = "debug")]
    async fn query(&self, text: &str, k: usize) -> Result<Vec<IndexHit>, IndexError> {
        if k == 0 {
            return Ok(Vec::new());
        }

        let query = self.embedder.embed(text).await?;
        let entries = self.entries.read().await;

        let mut scored: Vec<(f64, &Entry)> = entries
            .items
            .iter()
            .map(|e| {
                let distance = 1.0 - f64::from(cosine_similarity(&query, &e.vector));
                (distance.clamp(0.0, 2.0), e)
            })
            .collect();
        scored.sort_by(|a, b| a.0.total_cmp(&b.0));

        Ok(scored
            .into_iter()
            .take(k)
            .map(|(distance, e)| IndexHit {
                id: e.id.clone(),
                metadata: e.metadata.clone(),
                distance,
            })
            .collect())
    }

    async fn len(&self) -> usize {
        self.entries.read().await.items.len()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// HashingEmbedder
// ────────────────────────────────────────────────────────────────────────────

/// Default dimensionality of [`HashingEmbedder`] vectors
pub const HASHING_DIMENSIONS: usize = 256;

/// Deterministic bag-of-words embedder using signed feature hashing.
///
/// Needs no model server. Texts that share words land close together, which
/// is enough for keyword-level matching and for tests.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimensions: usize,
}

impl HashingEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn vectorize(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];
        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let hash = fnv1a(&token.to_lowercase());
            let bucket = (hash % self.dimensions as u64) as usize;
            let sign = if hash >> 63 == 0 { 1.0 } else { -1.0 };
            vector[bucket] += sign;
        }

        let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|x| *x /= norm);
        }
        vector
    }
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self::new(HASHING_DIMENSIONS)
    }
}

fn fnv1a(token: &str) -> u64 {
    token.bytes().fold(0xcbf2_9ce4_8422_2325, |hash, byte| {
        (hash ^ u64::from(byte)).wrapping_mul(0x0000_0100_0000_01b3)
    })
}

#[async_trait]
impl Embedder for HashingEmbedder {
    async fn embed(&self, text: &str) -> coursewise_models::Result<Vec<f32>> {
        Ok(self.vectorize(text))
    }
}

//! Shared fakes for coursewise-core integration tests

#![allow(dead_code)]

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use coursewise_core::{
    Catalog, Course, Difficulty, EmbeddingIndex, EngineConfig, IndexDocument, IndexError,
    IndexHit, InteractionRecord, MemoryStore, PreferenceProfile, PreferenceStore,
    RecommendationEngine, StoreError, StoreResult, UserRecord,
};
use coursewise_models::TextGenerator;

// ────────────────────────────────────────────────────────────────────────────
// Catalog
// ────────────────────────────────────────────────────────────────────────────

pub fn course(id: &str, title: &str, category: &str, difficulty: Difficulty, hours: u32) -> Course {
    Course {
        id: id.to_string(),
        title: title.to_string(),
        description: format!("{} course", category),
        category: category.to_string(),
        difficulty,
        duration: hours,
        tags: BTreeSet::from([category.to_lowercase()]),
        rating: 4.5,
        price: 49.99,
    }
}

pub fn sample_courses() -> Vec<Course> {
    vec![
        course("1", "Intro to Python", "Programming", Difficulty::Beginner, 20),
        course("2", "Advanced Machine Learning", "Data Science", Difficulty::Advanced, 80),
        course("3", "Web Development Bootcamp", "Programming", Difficulty::Intermediate, 50),
        course("4", "Financial Accounting", "Business", Difficulty::Beginner, 25),
        course("5", "Deep Learning Specialization", "Data Science", Difficulty::Advanced, 70),
        course("6", "Watercolor Basics", "Art", Difficulty::Beginner, 10),
    ]
}

pub fn sample_catalog() -> Arc<Catalog> {
    Arc::new(Catalog::new(sample_courses()).expect("sample ids are unique"))
}

pub fn hit(course: &Course, distance: f64) -> IndexHit {
    IndexHit {
        id: course.id.clone(),
        metadata: serde_json::to_value(course).unwrap(),
        distance,
    }
}

pub fn profile(categories: &[&str], difficulty: Difficulty) -> PreferenceProfile {
    PreferenceProfile {
        preferred_categories: categories.iter().map(|c| c.to_string()).collect(),
        preferred_difficulty: Some(difficulty),
        ..Default::default()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Text generation
// ────────────────────────────────────────────────────────────────────────────

/// Returns a fixed reply, or fails when `reply` is `None`
pub struct ScriptedGenerator {
    reply: Option<String>,
    calls: AtomicUsize,
}

impl ScriptedGenerator {
    pub fn replying(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Some(reply.to_string()),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            reply: None,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, _prompt: &str) -> coursewise_models::Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.reply {
            Some(reply) => Ok(reply.clone()),
            None => Err(coursewise_models::Error::Request("connection refused".into())),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Embedding index
// ────────────────────────────────────────────────────────────────────────────

/// Returns preset hits and records every query text
pub struct ScriptedIndex {
    hits: Vec<IndexHit>,
    fail: bool,
    delay: Option<Duration>,
    queries: Mutex<Vec<(String, usize)>>,
}

impl ScriptedIndex {
    pub fn with_hits(hits: Vec<IndexHit>) -> Arc<Self> {
        Arc::new(Self {
            hits,
            fail: false,
            delay: None,
            queries: Mutex::new(Vec::new()),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            hits: Vec::new(),
            fail: true,
            delay: None,
            queries: Mutex::new(Vec::new()),
        })
    }

    pub fn slow(delay: Duration, hits: Vec<IndexHit>) -> Arc<Self> {
        Arc::new(Self {
            hits,
            fail: false,
            delay: Some(delay),
            queries: Mutex::new(Vec::new()),
        })
    }

    pub fn queries(&self) -> Vec<(String, usize)> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl EmbeddingIndex for ScriptedIndex {
    async fn index(&self, documents: Vec<IndexDocument>) -> Result<usize, IndexError> {
        Ok(documents.len())
    }

    async fn query(&self, text: &str, k: usize) -> Result<Vec<IndexHit>, IndexError> {
        self.queries.lock().unwrap().push((text.to_string(), k));
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail {
            return Err(IndexError::Unavailable("index offline".into()));
        }
        Ok(self.hits.iter().take(k).cloned().collect())
    }

    async fn len(&self) -> usize {
        self.hits.len()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Store
// ────────────────────────────────────────────────────────────────────────────

/// Memory store whose writes or profile reads fail with a backend error a
/// set number of times
pub struct FlakyStore {
    inner: MemoryStore,
    failures_left: AtomicU32,
    write_attempts: AtomicU32,
    read_failures_left: AtomicU32,
    read_attempts: AtomicU32,
}

impl FlakyStore {
    pub fn new(failures: u32) -> Arc<Self> {
        Self::with_failures(failures, 0)
    }

    /// Writes succeed; the first `failures` profile reads fail
    pub fn failing_reads(failures: u32) -> Arc<Self> {
        Self::with_failures(0, failures)
    }

    fn with_failures(writes: u32, reads: u32) -> Arc<Self> {
        Arc::new(Self {
            inner: MemoryStore::new(),
            failures_left: AtomicU32::new(writes),
            write_attempts: AtomicU32::new(0),
            read_failures_left: AtomicU32::new(reads),
            read_attempts: AtomicU32::new(0),
        })
    }

    pub fn inner(&self) -> &MemoryStore {
        &self.inner
    }

    pub fn write_attempts(&self) -> u32 {
        self.write_attempts.load(Ordering::SeqCst)
    }

    pub fn read_attempts(&self) -> u32 {
        self.read_attempts.load(Ordering::SeqCst)
    }

    fn check(&self) -> StoreResult<()> {
        trip(&self.write_attempts, &self.failures_left)
    }
}

fn trip(attempts: &AtomicU32, failures_left: &AtomicU32) -> StoreResult<()> {
    attempts.fetch_add(1, Ordering::SeqCst);
    let failed = failures_left
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok();
    if failed {
        Err(StoreError::Backend("database is locked".into()))
    } else {
        Ok(())
    }
}

#[async_trait]
impl PreferenceStore for FlakyStore {
    async fn create_user(&self, user: UserRecord) -> StoreResult<()> {
        self.inner.create_user(user).await
    }

    async fn get_user(&self, user_id: &str) -> StoreResult<Option<UserRecord>> {
        self.inner.get_user(user_id).await
    }

    async fn get_profile(&self, user_id: &str) -> StoreResult<Option<PreferenceProfile>> {
        trip(&self.read_attempts, &self.read_failures_left)?;
        self.inner.get_profile(user_id).await
    }

    async fn put_profile(&self, user_id: &str, profile: &PreferenceProfile) -> StoreResult<()> {
        self.check()?;
        self.inner.put_profile(user_id, profile).await
    }

    async fn append_interaction(&self, record: InteractionRecord) -> StoreResult<()> {
        self.check()?;
        self.inner.append_interaction(record).await
    }

    async fn list_interactions(&self, user_id: &str) -> StoreResult<Vec<InteractionRecord>> {
        self.inner.list_interactions(user_id).await
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Engine
// ────────────────────────────────────────────────────────────────────────────

pub fn engine(
    index: Arc<dyn EmbeddingIndex>,
    store: Arc<dyn PreferenceStore>,
    generator: Arc<dyn TextGenerator>,
) -> RecommendationEngine {
    engine_with_config(index, store, generator, EngineConfig::default())
}

pub fn engine_with_config(
    index: Arc<dyn EmbeddingIndex>,
    store: Arc<dyn PreferenceStore>,
    generator: Arc<dyn TextGenerator>,
    config: EngineConfig,
) -> RecommendationEngine {
    RecommendationEngine::new(sample_catalog(), index, store, generator, config)
}

//! Builds the engine and its collaborators from a [`CoursewiseConfig`]

use std::sync::Arc;

use anyhow::{Context, Result};
use coursewise_core::{
    Catalog, Conversation, EmbeddingIndex, HashingEmbedder, MemoryVectorIndex,
    RecommendationEngine, RecommendationJobs, VideoLookup,
};
use coursewise_models::{Embedder, OllamaProvider, TextGenerator};
use coursewise_server::{AppState, YouTubeSearch};
use coursewise_store::TursoStore;
use tracing::{debug, info};

use crate::config::{CoursewiseConfig, EmbedderKind};

/// Everything a command needs to talk to the engine
pub struct App {
    pub engine: Arc<RecommendationEngine>,
    pub jobs: Arc<RecommendationJobs>,
    pub conversation: Arc<Conversation>,
}

impl App {
    /// Open the store, load and index the catalog, and wire the engine.
    pub async fn build(config: &CoursewiseConfig) -> Result<Self> {
        let app = Self::open(config).await?;
        let indexed = app
            .engine
            .index_catalog()
            .await
            .context("failed to index the course catalog")?;
        info!(courses = indexed, "catalog indexed");
        Ok(app)
    }

    /// Wire the engine without indexing the catalog.
    ///
    /// Enough for commands that never query the similarity index.
    pub async fn open(config: &CoursewiseConfig) -> Result<Self> {
        let catalog = Arc::new(load_catalog(config)?);
        let store = Arc::new(open_store(config).await?);

        let ollama = Arc::new(
            OllamaProvider::with_base_url(&config.models.ollama_host)
                .generation_model(&config.models.generation_model)
                .embedding_model(&config.models.embedding_model),
        );
        let generator: Arc<dyn TextGenerator> = ollama.clone();
        let embedder: Arc<dyn Embedder> = match config.models.embedder {
            EmbedderKind::Ollama => ollama.clone(),
            EmbedderKind::Hashing => Arc::new(HashingEmbedder::default()),
        };
        let index: Arc<dyn EmbeddingIndex> = Arc::new(MemoryVectorIndex::new(embedder));

        let engine = Arc::new(RecommendationEngine::new(
            catalog,
            index,
            store.clone(),
            generator.clone(),
            config.engine.clone(),
        ));
        let videos = config.video.youtube_api_key.as_ref().map(|key| {
            debug!("video links enabled");
            let search = YouTubeSearch::new(key.clone()).with_client(ollama.http_client().clone());
            Arc::new(search) as Arc<dyn VideoLookup>
        });
        let jobs = Arc::new(RecommendationJobs::new(engine.clone(), videos));
        let conversation = Arc::new(Conversation::new(
            engine.clone(),
            jobs.clone(),
            store,
            generator,
        ));

        Ok(Self {
            engine,
            jobs,
            conversation,
        })
    }

    /// Shared state for the HTTP server
    pub fn into_state(self) -> Arc<AppState> {
        Arc::new(AppState::new(self.engine, self.jobs, self.conversation))
    }
}

fn load_catalog(config: &CoursewiseConfig) -> Result<Catalog> {
    let path = &config.catalog.path;
    Catalog::from_csv_path(path)
        .with_context(|| format!("failed to load catalog from {}", path.display()))
}

async fn open_store(config: &CoursewiseConfig) -> Result<TursoStore> {
    if let Some(url) = &config.store.url {
        let token = config.store.token.as_deref().unwrap_or_default();
        return TursoStore::new_remote(url, token)
            .await
            .with_context(|| format!("failed to connect to store at {}", url));
    }

    let path = &config.store.path;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    TursoStore::new_local(path)
        .await
        .with_context(|| format!("failed to open store at {}", path.display()))
}

use coursewise_core::{EngineConfig, RetryConfig, ScoringWeights};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration as stored in TOML files (with optional fields for merging)
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawCoursewiseConfig {
    #[serde(default)]
    pub server: RawServerConfig,

    #[serde(default)]
    pub catalog: RawCatalogConfig,

    #[serde(default)]
    pub store: RawStoreConfig,

    #[serde(default)]
    pub models: RawModelsConfig,

    #[serde(default)]
    pub engine: RawEngineConfig,

    #[serde(default)]
    pub video: RawVideoConfig,
}

/// Server config as stored in TOML (optional fields for proper merging)
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawServerConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawCatalogConfig {
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawStoreConfig {
    pub path: Option<PathBuf>,
    pub url: Option<String>,
    pub token: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawModelsConfig {
    pub ollama_host: Option<String>,
    pub generation_model: Option<String>,
    pub embedding_model: Option<String>,
    pub embedder: Option<EmbedderKind>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawVideoConfig {
    pub youtube_api_key: Option<String>,
}

/// Engine tuning as stored in TOML; every key merges on its own
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawEngineConfig {
    pub default_limit: Option<usize>,
    pub oversample_factor: Option<usize>,
    pub timeout_ms: Option<u64>,
    #[serde(default)]
    pub scoring: RawScoringWeights,
    #[serde(default)]
    pub retry: RawRetryConfig,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawScoringWeights {
    pub category_bonus: Option<f64>,
    pub difficulty_bonus: Option<f64>,
    pub duration_bonus: Option<f64>,
    pub short_max_hours: Option<u32>,
    pub medium_max_hours: Option<u32>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawRetryConfig {
    pub max_attempts: Option<u32>,
    pub initial_backoff_ms: Option<u64>,
    pub backoff_factor: Option<u32>,
    pub max_backoff_ms: Option<u64>,
}

impl RawEngineConfig {
    /// Keys set in `overlay` win over `self`
    pub fn merge(self, overlay: Self) -> Self {
        Self {
            default_limit: overlay.default_limit.or(self.default_limit),
            oversample_factor: overlay.oversample_factor.or(self.oversample_factor),
            timeout_ms: overlay.timeout_ms.or(self.timeout_ms),
            scoring: RawScoringWeights {
                category_bonus: overlay.scoring.category_bonus.or(self.scoring.category_bonus),
                difficulty_bonus: overlay
                    .scoring
                    .difficulty_bonus
                    .or(self.scoring.difficulty_bonus),
                duration_bonus: overlay.scoring.duration_bonus.or(self.scoring.duration_bonus),
                short_max_hours: overlay
                    .scoring
                    .short_max_hours
                    .or(self.scoring.short_max_hours),
                medium_max_hours: overlay
                    .scoring
                    .medium_max_hours
                    .or(self.scoring.medium_max_hours),
            },
            retry: RawRetryConfig {
                max_attempts: overlay.retry.max_attempts.or(self.retry.max_attempts),
                initial_backoff_ms: overlay
                    .retry
                    .initial_backoff_ms
                    .or(self.retry.initial_backoff_ms),
                backoff_factor: overlay.retry.backoff_factor.or(self.retry.backoff_factor),
                max_backoff_ms: overlay.retry.max_backoff_ms.or(self.retry.max_backoff_ms),
            },
        }
    }

    /// Fill unset keys with the engine defaults
    pub fn finalize(self) -> EngineConfig {
        let engine = EngineConfig::default();
        let scoring = ScoringWeights::default();
        let retry = RetryConfig::default();

        EngineConfig {
            default_limit: self.default_limit.unwrap_or(engine.default_limit),
            oversample_factor: self.oversample_factor.unwrap_or(engine.oversample_factor),
            timeout_ms: self.timeout_ms.unwrap_or(engine.timeout_ms),
            scoring: ScoringWeights {
                category_bonus: self.scoring.category_bonus.unwrap_or(scoring.category_bonus),
                difficulty_bonus: self
                    .scoring
                    .difficulty_bonus
                    .unwrap_or(scoring.difficulty_bonus),
                duration_bonus: self.scoring.duration_bonus.unwrap_or(scoring.duration_bonus),
                short_max_hours: self.scoring.short_max_hours.unwrap_or(scoring.short_max_hours),
                medium_max_hours: self
                    .scoring
                    .medium_max_hours
                    .unwrap_or(scoring.medium_max_hours),
            },
            retry: RetryConfig {
                max_attempts: self.retry.max_attempts.unwrap_or(retry.max_attempts),
                initial_backoff_ms: self
                    .retry
                    .initial_backoff_ms
                    .unwrap_or(retry.initial_backoff_ms),
                backoff_factor: self.retry.backoff_factor.unwrap_or(retry.backoff_factor),
                max_backoff_ms: self.retry.max_backoff_ms.unwrap_or(retry.max_backoff_ms),
            },
        }
    }
}

/// Final configuration with defaults applied
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CoursewiseConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub catalog: CatalogConfig,

    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub models: ModelsConfig,

    #[serde(default)]
    pub engine: EngineConfig,

    #[serde(default)]
    pub video: VideoConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host for the coursewise server
    pub host: String,

    /// Port for the coursewise server
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// CSV export the catalog is loaded from
    pub path: PathBuf,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_CATALOG_PATH),
        }
    }
}

/// Where preferences and interactions are kept.
///
/// A `url` selects a remote libSQL database and takes precedence over `path`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub path: PathBuf,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: coursewise_paths::default_store_path(),
            url: None,
            token: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelsConfig {
    pub ollama_host: String,
    pub generation_model: String,
    pub embedding_model: String,
    pub embedder: EmbedderKind,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            ollama_host: coursewise_models::providers::DEFAULT_BASE_URL.to_string(),
            generation_model: coursewise_models::providers::DEFAULT_GENERATION_MODEL
                .to_string(),
            embedding_model: coursewise_models::providers::DEFAULT_EMBEDDING_MODEL
                .to_string(),
            embedder: EmbedderKind::default(),
        }
    }
}

/// Which embedder backs the similarity index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EmbedderKind {
    /// Embeddings from the Ollama server
    #[default]
    Ollama,
    /// Offline feature hashing, no model server needed
    Hashing,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct VideoConfig {
    /// Enables video links in chat recommendations
    #[serde(skip_serializing_if = "Option::is_none")]
    pub youtube_api_key: Option<String>,
}

/// Default port for the coursewise server
pub const DEFAULT_PORT: u16 = 7433;

/// Default host for the coursewise server
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default catalog location, relative to the working directory
pub const DEFAULT_CATALOG_PATH: &str = "data/coursera_data.csv";

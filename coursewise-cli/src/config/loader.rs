use super::types::{
    CatalogConfig, CoursewiseConfig, DEFAULT_HOST, DEFAULT_PORT, ModelsConfig, RawCatalogConfig,
    RawCoursewiseConfig, RawModelsConfig, RawServerConfig, RawStoreConfig, RawVideoConfig,
    ServerConfig, StoreConfig, VideoConfig,
};
use anyhow::Result;
use std::path::{Path, PathBuf};

/// Environment variable naming the Ollama server, as the ollama CLI reads it
pub const OLLAMA_HOST_ENV: &str = "OLLAMA_HOST";

/// Environment variable carrying the YouTube Data API key
pub const YOUTUBE_API_KEY_ENV: &str = "YOUTUBE_API_KEY";

/// Overrides the project config directory (useful for isolated e2e tests)
pub const PROJECT_CONFIG_DIR_ENV: &str = "COURSEWISE_PROJECT_CONFIG_DIR";

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load merged configuration (user + project + environment)
    pub fn load() -> Result<CoursewiseConfig> {
        let mut raw = RawCoursewiseConfig::default();

        // Layer 1: User config
        let user_path = Self::user_config_path();
        if user_path.exists() {
            raw = Self::merge_raw(raw, Self::read_raw(&user_path)?);
        }

        // Layer 2: Project config
        let project_path = Self::project_config_path();
        if project_path.exists() {
            raw = Self::merge_raw(raw, Self::read_raw(&project_path)?);
        }

        // Layer 3: Environment
        raw = Self::merge_raw(raw, Self::env_overrides());

        Ok(Self::finalize(raw))
    }

    /// Get user config path (`$XDG_CONFIG_HOME/coursewise/config.toml`)
    pub fn user_config_path() -> PathBuf {
        coursewise_paths::config_file()
    }

    /// Get project config path
    pub fn project_config_path() -> PathBuf {
        if let Ok(dir) = std::env::var(PROJECT_CONFIG_DIR_ENV) {
            PathBuf::from(dir).join("config.toml")
        } else {
            PathBuf::from(".coursewise/config.toml")
        }
    }

    fn read_raw(path: &Path) -> Result<RawCoursewiseConfig> {
        let contents = std::fs::read_to_string(path)?;
        toml::from_str(&contents)
            .map_err(|e| anyhow::anyhow!("invalid config {}: {}", path.display(), e))
    }

    /// Settings that can come from the environment
    fn env_overrides() -> RawCoursewiseConfig {
        let non_empty = |key: &str| std::env::var(key).ok().filter(|v| !v.trim().is_empty());

        RawCoursewiseConfig {
            models: RawModelsConfig {
                ollama_host: non_empty(OLLAMA_HOST_ENV),
                ..Default::default()
            },
            video: RawVideoConfig {
                youtube_api_key: non_empty(YOUTUBE_API_KEY_ENV),
            },
            ..Default::default()
        }
    }

    /// Merge two raw configs (overlay values override base only if explicitly set)
    fn merge_raw(base: RawCoursewiseConfig, overlay: RawCoursewiseConfig) -> RawCoursewiseConfig {
        RawCoursewiseConfig {
            server: RawServerConfig {
                host: overlay.server.host.or(base.server.host),
                port: overlay.server.port.or(base.server.port),
            },
            catalog: RawCatalogConfig {
                path: overlay.catalog.path.or(base.catalog.path),
            },
            store: RawStoreConfig {
                path: overlay.store.path.or(base.store.path),
                url: overlay.store.url.or(base.store.url),
                token: overlay.store.token.or(base.store.token),
            },
            models: RawModelsConfig {
                ollama_host: overlay.models.ollama_host.or(base.models.ollama_host),
                generation_model: overlay
                    .models
                    .generation_model
                    .or(base.models.generation_model),
                embedding_model: overlay
                    .models
                    .embedding_model
                    .or(base.models.embedding_model),
                embedder: overlay.models.embedder.or(base.models.embedder),
            },
            engine: base.engine.merge(overlay.engine),
            video: RawVideoConfig {
                youtube_api_key: overlay.video.youtube_api_key.or(base.video.youtube_api_key),
            },
        }
    }

    /// Convert raw config to final config with defaults applied
    fn finalize(raw: RawCoursewiseConfig) -> CoursewiseConfig {
        let models = ModelsConfig::default();
        let store = StoreConfig::default();

        CoursewiseConfig {
            server: ServerConfig {
                host: raw.server.host.unwrap_or_else(|| DEFAULT_HOST.to_string()),
                port: raw.server.port.unwrap_or(DEFAULT_PORT),
            },
            catalog: CatalogConfig {
                path: raw
                    .catalog
                    .path
                    .unwrap_or_else(|| CatalogConfig::default().path),
            },
            store: StoreConfig {
                path: raw.store.path.unwrap_or(store.path),
                url: raw.store.url,
                token: raw.store.token,
            },
            models: ModelsConfig {
                ollama_host: raw.models.ollama_host.unwrap_or(models.ollama_host),
                generation_model: raw
                    .models
                    .generation_model
                    .unwrap_or(models.generation_model),
                embedding_model: raw.models.embedding_model.unwrap_or(models.embedding_model),
                embedder: raw.models.embedder.unwrap_or(models.embedder),
            },
            engine: raw.engine.finalize(),
            video: VideoConfig {
                youtube_api_key: raw.video.youtube_api_key,
            },
        }
    }

    /// Save config to a specific path
    ///
    /// Creates parent directories if they don't exist.
    pub fn save_to_path(config: &CoursewiseConfig, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let toml = toml::to_string_pretty(config)?;
        std::fs::write(path, toml)?;

        Ok(())
    }

    /// Load config from a specific path (for testing)
    #[cfg(test)]
    pub fn load_from_path(path: &Path) -> Result<CoursewiseConfig> {
        if path.exists() {
            Ok(Self::finalize(Self::read_raw(path)?))
        } else {
            Ok(CoursewiseConfig::default())
        }
    }
}

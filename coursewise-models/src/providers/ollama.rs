//! Ollama local model provider.
//!
//! Connects to a local Ollama instance for prompt completion and embeddings.
//!
//! # Example
//!
//! ```ignore
//! use coursewise_models::providers::OllamaProvider;
//!
//! let provider = OllamaProvider::new();  // Uses localhost:11434
//! let provider = OllamaProvider::with_base_url("http://192.168.1.100:11434")
//!     .generation_model("llama3")
//!     .embedding_model("all-minilm");
//! ```

use async_trait::async_trait;
use tracing::debug;

use super::{
    EmbedRequest, EmbedResponse, Embedder, GenerateOptions, GenerateRequest, GenerateResponse,
    InstalledModel, TagsResponse, TextGenerator,
};
use crate::{Error, Result};

/// Default Ollama API base URL.
pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";

/// Default model used for completions.
pub const DEFAULT_GENERATION_MODEL: &str = "tinyllama";

/// Default model used for embeddings.
pub const DEFAULT_EMBEDDING_MODEL: &str = "all-minilm";

// ────────────────────────────────────────────────────────────────────────────
// OllamaProvider
// ────────────────────────────────────────────────────────────────────────────

/// Ollama local model provider.
///
/// Implements [`TextGenerator`] over `/api/generate` and [`Embedder`] over
/// `/api/embed`.
pub struct OllamaProvider {
    base_url: String,
    client: reqwest::Client,
    generation_model: String,
    embedding_model: String,
    options: GenerateOptions,
}

impl OllamaProvider {
    /// Create a new Ollama provider with default URL (localhost:11434).
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Create a new Ollama provider with a custom base URL.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
            generation_model: DEFAULT_GENERATION_MODEL.to_string(),
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            options: GenerateOptions::default(),
        }
    }

    /// Set the model used for completions.
    pub fn generation_model(mut self, model: impl Into<String>) -> Self {
        self.generation_model = model.into();
        self
    }

    /// Set the model used for embeddings.
    pub fn embedding_model(mut self, model: impl Into<String>) -> Self {
        self.embedding_model = model.into();
        self
    }

    /// Set sampling options sent with every completion.
    pub fn options(mut self, options: GenerateOptions) -> Self {
        self.options = options;
        self
    }

    /// HTTP client used for every request; clones share its connection pool.
    pub fn http_client(&self) -> &reqwest::Client {
        &self.client
    }

    /// Get the base URL for this provider.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get the completion model name.
    pub fn generation_model_name(&self) -> &str {
        &self.generation_model
    }

    /// Get the embedding model name.
    pub fn embedding_model_name(&self) -> &str {
        &self.embedding_model
    }

    /// List the models installed on the Ollama host (`/api/tags`).
    pub async fn list_models(&self) -> Result<Vec<InstalledModel>> {
        let url = format!("{}/api/tags", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::Request(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Error::ProviderApi(format!(
                "Ollama API returned status {}",
                response.status()
            )));
        }

        let tags: TagsResponse = response
            .json()
            .await
            .map_err(|e| Error::Request(e.to_string()))?;

        Ok(tags.models)
    }

    /// Perform a non-streaming completion.
    pub async fn generate(&self, prompt: &str) -> Result<GenerateResponse> {
        let url = format!("{}/api/generate", self.base_url);
        let request = GenerateRequest::new(&self.generation_model, prompt)
            .options(self.options.clone());

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Request(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::ProviderApi(format!(
                "Ollama API returned {}: {}",
                status, body
            )));
        }

        response
            .json::<GenerateResponse>()
            .await
            .map_err(|e| Error::Request(e.to_string()))
    }

    async fn embed_inputs(&self, input: Vec<String>) -> Result<Vec<Vec<f32>>> {
        let url = format!("{}/api/embed", self.base_url);
        let expected = input.len();
        let request = EmbedRequest {
            model: self.embedding_model.clone(),
            input,
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Request(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::ProviderApi(format!(
                "Ollama API returned {}: {}",
                status, body
            )));
        }

        let body: EmbedResponse = response
            .json()
            .await
            .map_err(|e| Error::Request(e.to_string()))?;

        if body.embeddings.len() != expected {
            return Err(Error::ProviderApi(format!(
                "expected {} embeddings, got {}",
                expected,
                body.embeddings.len()
            )));
        }

        Ok(body.embeddings)
    }
}

impl Default for OllamaProvider {
    fn default() -> Self {
        Self::new()
    }
}

/// Extract the generated text, rejecting blank completions.
fn completion_text(response: GenerateResponse) -> Result<String> {
    let text = response.response.trim();
    if text.is_empty() {
        return Err(Error::EmptyResponse("ollama".to_string()));
    }
    Ok(text.to_string())
}

#[async_trait]
impl TextGenerator for OllamaProvider {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        let response = self.generate(prompt).await?;
        debug!(
            model = %response.model,
            prompt_tokens = response.prompt_eval_count.unwrap_or(0),
            output_tokens = response.eval_count.unwrap_or(0),
            "ollama completion finished"
        );
        completion_text(response)
    }
}

#[async_trait]
impl Embedder for OllamaProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut vectors = self.embed_inputs(vec![text.to_string()]).await?;
        vectors
            .pop()
            .ok_or_else(|| Error::EmptyResponse("ollama".to_string()))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        self.embed_inputs(texts.to_vec()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_creates_provider_with_default_url() {
        let provider = OllamaProvider::new();
        assert_eq!(provider.base_url(), "http://localhost:11434");
        assert_eq!(provider.generation_model_name(), DEFAULT_GENERATION_MODEL);
        assert_eq!(provider.embedding_model_name(), DEFAULT_EMBEDDING_MODEL);
    }

    #[test]
    fn with_base_url_trims_trailing_slash() {
        let provider = OllamaProvider::with_base_url("http://192.168.1.100:11434/");
        assert_eq!(provider.base_url(), "http://192.168.1.100:11434");
    }

    #[test]
    fn builder_sets_models() {
        let provider = OllamaProvider::new()
            .generation_model("llama3")
            .embedding_model("nomic-embed-text");
        assert_eq!(provider.generation_model_name(), "llama3");
        assert_eq!(provider.embedding_model_name(), "nomic-embed-text");
        assert_eq!(TextGenerator::name(&provider), "ollama");
    }

    // ────────────────────────────────────────────────────────────────────────────
    // Response Parsing Tests
    // ────────────────────────────────────────────────────────────────────────────

    #[test]
    fn parse_generate_response_extracts_text() {
        let json = r#"{
            "model": "tinyllama",
            "created_at": "2024-01-15T10:00:00Z",
            "response": "  This course matches your goals.\n",
            "done": true,
            "prompt_eval_count": 42,
            "eval_count": 12
        }"#;

        let response: GenerateResponse = serde_json::from_str(json).unwrap();
        assert!(response.done);
        assert_eq!(response.prompt_eval_count, Some(42));
        assert_eq!(
            completion_text(response).unwrap(),
            "This course matches your goals."
        );
    }

    #[test]
    fn blank_completion_is_an_error() {
        let json = r#"{"model": "tinyllama", "response": "   ", "done": true}"#;
        let response: GenerateResponse = serde_json::from_str(json).unwrap();
        let err = completion_text(response).unwrap_err();
        assert!(matches!(err, Error::EmptyResponse(_)));
    }

    #[test]
    fn parse_embed_response() {
        let json = r#"{
            "model": "all-minilm",
            "embeddings": [[0.1, 0.2, 0.3], [0.4, 0.5, 0.6]]
        }"#;
        let response: EmbedResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.embeddings.len(), 2);
        assert_eq!(response.embeddings[1][2], 0.6);
    }

    #[test]
    fn parse_tags_response_extracts_models() {
        let json = r#"{
            "models": [
                {
                    "name": "tinyllama:latest",
                    "model": "tinyllama:latest",
                    "modified_at": "2024-01-15T10:00:00Z",
                    "size": 637700138,
                    "digest": "abc123"
                }
            ]
        }"#;

        let response: TagsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.models.len(), 1);
        assert_eq!(response.models[0].name, "tinyllama:latest");
    }

    #[tokio::test]
    async fn unreachable_host_is_a_request_error() {
        let provider = OllamaProvider::with_base_url("http://127.0.0.1:9");
        let err = provider.complete("hello").await.unwrap_err();
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn empty_batch_skips_the_request() {
        let provider = OllamaProvider::with_base_url("http://127.0.0.1:9");
        let vectors = provider.embed_batch(&[]).await.unwrap();
        assert!(vectors.is_empty());
    }

    // ────────────────────────────────────────────────────────────────────────────
    // Integration Tests (require Ollama running)
    // ────────────────────────────────────────────────────────────────────────────

    /// Check if Ollama is available at the given URL.
    async fn ollama_available(base_url: &str) -> bool {
        let client = reqwest::Client::new();
        client
            .get(format!("{}/api/tags", base_url))
            .timeout(std::time::Duration::from_secs(2))
            .send()
            .await
            .is_ok()
    }

    #[tokio::test]
    #[ignore = "requires Ollama running locally with a model installed"]
    async fn integration_complete_sends_request_to_ollama() {
        let base_url =
            std::env::var("OLLAMA_HOST").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        if !ollama_available(&base_url).await {
            eprintln!("Skipping: Ollama not available at {}", base_url);
            return;
        }

        let provider = OllamaProvider::with_base_url(&base_url);
        let models = provider.list_models().await.expect("tags should load");
        let Some(model) = models.first() else {
            eprintln!("Skipping: No models installed in Ollama");
            return;
        };

        let provider = provider.generation_model(&model.name);
        let text = provider
            .complete("Say 'hello' and nothing else.")
            .await
            .expect("completion should succeed");
        assert!(!text.is_empty());
    }
}

//! Request and response types for the Ollama HTTP API.

use serde::{Deserialize, Serialize};

/// Sampling options forwarded to Ollama.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerateOptions {
    /// Sampling temperature (0.0 to 2.0).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Maximum tokens to generate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_predict: Option<u32>,
}

impl GenerateOptions {
    /// Whether no option is set (the `options` object can be omitted).
    pub fn is_empty(&self) -> bool {
        self.temperature.is_none() && self.num_predict.is_none()
    }
}

/// Request body for Ollama's `/api/generate` endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateRequest {
    pub model: String,
    pub prompt: String,
    pub stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<GenerateOptions>,
}

impl GenerateRequest {
    /// Create a non-streaming generate request.
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            stream: false,
            options: None,
        }
    }

    /// Attach sampling options, dropping them when empty.
    pub fn options(mut self, options: GenerateOptions) -> Self {
        self.options = if options.is_empty() {
            None
        } else {
            Some(options)
        };
        self
    }
}

/// Response from Ollama's `/api/generate` endpoint.
#[derive(Debug, Deserialize)]
pub struct GenerateResponse {
    pub model: String,
    #[serde(default)]
    pub response: String,
    pub done: bool,
    #[serde(default)]
    pub prompt_eval_count: Option<u64>,
    #[serde(default)]
    pub eval_count: Option<u64>,
}

/// Request body for Ollama's `/api/embed` endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct EmbedRequest {
    pub model: String,
    pub input: Vec<String>,
}

/// Response from Ollama's `/api/embed` endpoint.
#[derive(Debug, Deserialize)]
pub struct EmbedResponse {
    #[serde(default)]
    pub model: String,
    pub embeddings: Vec<Vec<f32>>,
}

/// Response from Ollama's `/api/tags` endpoint.
#[derive(Debug, Deserialize)]
pub struct TagsResponse {
    pub models: Vec<InstalledModel>,
}

/// Model installed on the Ollama host.
#[derive(Debug, Clone, Deserialize)]
pub struct InstalledModel {
    pub name: String,
    pub size: u64,
    pub modified_at: String,
}

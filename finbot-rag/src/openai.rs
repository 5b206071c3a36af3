//! OpenAI providers for embeddings and chat-based answer generation.
//!
//! Both providers call the OpenAI REST API directly with `reqwest`. API keys
//! are accepted as-is; a missing or invalid credential surfaces as an API
//! error on the first request rather than at construction time.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::generation::GenerationProvider;

/// The OpenAI embeddings API endpoint.
const OPENAI_EMBEDDINGS_URL: &str = "https://api.openai.com/v1/embeddings";

/// The OpenAI chat completions API endpoint.
const OPENAI_CHAT_URL: &str = "https://api.openai.com/v1/chat/completions";

/// The default model for embeddings.
const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";

/// The default dimensionality for `text-embedding-3-small`.
const DEFAULT_DIMENSIONS: usize = 1536;

/// The default model for answer generation.
const DEFAULT_CHAT_MODEL: &str = "gpt-4o-mini";

/// The default sampling temperature. Low, so answers stay close to the
/// supplied context.
const DEFAULT_TEMPERATURE: f32 = 0.3;

/// The environment variable holding the API key for both providers.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

fn env_api_key(consumer: &'static str) -> Result<String> {
    std::env::var(API_KEY_ENV).map_err(|_| RagError::Config(format!(
        "{API_KEY_ENV} environment variable not set (required by {consumer})"
    )))
}

// ── OpenAI API error body ──────────────────────────────────────────

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Extract a human-readable message from a failed API response body.
async fn api_error_detail(response: reqwest::Response) -> (reqwest::StatusCode, String) {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let detail =
        serde_json::from_str::<ErrorResponse>(&body).map(|e| e.error.message).unwrap_or(body);
    (status, detail)
}

// ── Embeddings ─────────────────────────────────────────────────────

/// An [`EmbeddingProvider`] backed by the OpenAI embeddings API.
///
/// Uses `reqwest` to call the `/v1/embeddings` endpoint directly. Batch
/// requests send all inputs in a single call.
///
/// # Configuration
///
/// - `model` – defaults to `text-embedding-3-small`.
/// - `api_key` – from the constructor or the `OPENAI_API_KEY` environment variable.
pub struct OpenAIEmbeddingProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
    dimensions: usize,
}

impl OpenAIEmbeddingProvider {
    /// Create a new provider with the given API key.
    ///
    /// Uses the default model (`text-embedding-3-small`, 1536 dimensions).
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            model: DEFAULT_EMBEDDING_MODEL.into(),
            dimensions: DEFAULT_DIMENSIONS,
        }
    }

    /// Create a new provider using the `OPENAI_API_KEY` environment variable.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] if the variable is not set.
    pub fn from_env() -> Result<Self> {
        Ok(Self::new(env_api_key("OpenAIEmbeddingProvider")?))
    }

    /// Set the model name (e.g. `text-embedding-3-large`).
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the expected output dimensions.
    pub fn with_dimensions(mut self, dims: usize) -> Self {
        self.dimensions = dims;
        self
    }
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: Vec<&'a str>,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

fn embedding_error(message: String) -> RagError {
    RagError::Embedding { provider: "OpenAI".into(), message }
}

#[async_trait]
impl EmbeddingProvider for OpenAIEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        debug!(provider = "OpenAI", text_len = text.len(), "embedding single text");

        let results = self.embed_batch(&[text]).await?;
        results
            .into_iter()
            .next()
            .ok_or_else(|| embedding_error("API returned empty response".into()))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!(
            provider = "OpenAI",
            batch_size = texts.len(),
            model = %self.model,
            "embedding batch"
        );

        let request_body = EmbeddingRequest { model: &self.model, input: texts.to_vec() };

        let response = self
            .client
            .post(OPENAI_EMBEDDINGS_URL)
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                error!(provider = "OpenAI", error = %e, "embedding request failed");
                embedding_error(format!("request failed: {e}"))
            })?;

        if !response.status().is_success() {
            let (status, detail) = api_error_detail(response).await;
            error!(provider = "OpenAI", %status, "embeddings API error");
            return Err(embedding_error(format!("API returned {status}: {detail}")));
        }

        let embedding_response: EmbeddingResponse = response.json().await.map_err(|e| {
            error!(provider = "OpenAI", error = %e, "failed to parse embeddings response");
            embedding_error(format!("failed to parse response: {e}"))
        })?;

        Ok(embedding_response.data.into_iter().map(|d| d.embedding).collect())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

// ── Chat completions ───────────────────────────────────────────────

/// A [`GenerationProvider`] backed by the OpenAI chat completions API.
///
/// Sends the composed prompt as a single user message and returns the first
/// choice's message content.
///
/// # Configuration
///
/// - `model` – defaults to `gpt-4o-mini`.
/// - `temperature` – defaults to 0.3.
/// - `api_key` – from the constructor or the `OPENAI_API_KEY` environment variable.
pub struct OpenAIChatProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
    temperature: f32,
}

impl OpenAIChatProvider {
    /// Create a new provider with the given API key.
    ///
    /// Uses the default model (`gpt-4o-mini`) and temperature (0.3).
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            model: DEFAULT_CHAT_MODEL.into(),
            temperature: DEFAULT_TEMPERATURE,
        }
    }

    /// Create a new provider using the `OPENAI_API_KEY` environment variable.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] if the variable is not set.
    pub fn from_env() -> Result<Self> {
        Ok(Self::new(env_api_key("OpenAIChatProvider")?))
    }

    /// Set the model name (e.g. `gpt-4o`).
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

fn generation_error(message: String) -> RagError {
    RagError::Generation { provider: "OpenAI".into(), message }
}

#[async_trait]
impl GenerationProvider for OpenAIChatProvider {
    async fn generate(&self, prompt: &str) -> Result<String> {
        debug!(
            provider = "OpenAI",
            model = %self.model,
            prompt_len = prompt.len(),
            "generating completion"
        );

        let request_body = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage { role: "user", content: prompt }],
            temperature: self.temperature,
        };

        let response = self
            .client
            .post(OPENAI_CHAT_URL)
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                error!(provider = "OpenAI", error = %e, "chat request failed");
                generation_error(format!("request failed: {e}"))
            })?;

        if !response.status().is_success() {
            let (status, detail) = api_error_detail(response).await;
            error!(provider = "OpenAI", %status, "chat API error");
            return Err(generation_error(format!("API returned {status}: {detail}")));
        }

        let chat_response: ChatResponse = response.json().await.map_err(|e| {
            error!(provider = "OpenAI", error = %e, "failed to parse chat response");
            generation_error(format!("failed to parse response: {e}"))
        })?;

        chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| generation_error("API returned no completion".into()))
    }
}

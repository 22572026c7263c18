//! # OpenAI Embedding Provider
//!
//! This crate implements the `EmbeddingProvider` trait on top of OpenAI's
//! embeddings API (e.g. `text-embedding-3-small`, `text-embedding-3-large`).
//!
//! Every vector returned by this provider is L2-normalized before it is
//! handed to the caller, so the vector store's inner-product scoring is
//! exactly cosine similarity regardless of what the API returns.
//!
//! ## Example
//!
//! ```rust,no_run
//! use openai_embedding::OpenAIEmbedding;
//! use embedding::EmbeddingProvider;
//!
//! async fn example() -> Result<(), anyhow::Error> {
//!     // API key can be passed directly or read from OPENAI_API_KEY
//!     let provider = OpenAIEmbedding::with_api_key(String::new());
//!     let vector = provider.embed("Hello world").await?;
//!     println!("dimension: {}", vector.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Supported models
//!
//! - `text-embedding-3-small`: 1536 dimensions, cost-effective (default)
//! - `text-embedding-3-large`: 3072 dimensions, higher accuracy
//! - `text-embedding-ada-002`: 1536 dimensions (legacy)
//!
//! Note: a persisted memory store is bound to one dimension, so changing
//! models requires rebuilding the store from scratch.

use async_openai::{types::CreateEmbeddingRequestArgs, Client};
use async_trait::async_trait;
use embedding::EmbeddingProvider;
use tracing::{debug, instrument, warn};

/// OpenAI embedding provider. Holds the async-openai client and model name.
#[derive(Debug, Clone)]
pub struct OpenAIEmbedding {
    client: Client<async_openai::config::OpenAIConfig>,
    /// Embedding model name (e.g. "text-embedding-3-small").
    model: String,
}

impl OpenAIEmbedding {
    /// Creates a new OpenAI embedding provider.
    ///
    /// # Arguments
    ///
    /// * `api_key` - OpenAI API key. If empty, read from OPENAI_API_KEY.
    /// * `model` - The embedding model to use.
    pub fn new(api_key: String, model: String) -> Self {
        Self::new_with_base_url(api_key, model, None)
    }

    /// Creates a provider pointed at an OpenAI-compatible endpoint.
    ///
    /// When `base_url` is `Some`, requests are sent there instead of the
    /// default OpenAI API.
    pub fn new_with_base_url(api_key: String, model: String, base_url: Option<&str>) -> Self {
        let api_key = if api_key.is_empty() {
            std::env::var("OPENAI_API_KEY").unwrap_or_default()
        } else {
            api_key
        };

        let mut openai_config = async_openai::config::OpenAIConfig::new().with_api_key(api_key);
        if let Some(url) = base_url.filter(|s| !s.is_empty()) {
            openai_config = openai_config.with_api_base(url);
        }
        let client = Client::with_config(openai_config);

        Self { client, model }
    }

    /// Creates a provider with the default model (`text-embedding-3-small`).
    pub fn with_api_key(api_key: String) -> Self {
        Self::new(api_key, "text-embedding-3-small".to_string())
    }

    /// Sets a different embedding model.
    pub fn with_model(mut self, model: String) -> Self {
        self.model = model;
        self
    }

    /// Returns the embedding model name (for diagnostics).
    pub fn model(&self) -> &str {
        &self.model
    }
}

/// Scales a vector to unit length. Zero vectors are returned unchanged.
fn l2_normalize(mut vector: Vec<f32>) -> Vec<f32> {
    let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in &mut vector {
            *x /= norm;
        }
    }
    vector
}

#[async_trait]
impl EmbeddingProvider for OpenAIEmbedding {
    /// Embeds a single text via OpenAI's embeddings endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is invalid, the request fails
    /// (network error, rate limit), or the response carries no embedding.
    #[instrument(skip(self, text), fields(model = %self.model, text_len = text.len()))]
    async fn embed(&self, text: &str) -> Result<Vec<f32>, anyhow::Error> {
        let request = CreateEmbeddingRequestArgs::default()
            .model(self.model.clone())
            .input(vec![text])
            .build()?;

        let response = match self.client.embeddings().create(request).await {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, "OpenAI embed request failed");
                return Err(e.into());
            }
        };

        let embedding = response
            .data
            .first()
            .ok_or_else(|| anyhow::anyhow!("No embedding in response"))?
            .embedding
            .clone();

        debug!(dimension = embedding.len(), "OpenAI embed done");
        Ok(l2_normalize(embedding))
    }

    /// Embeds multiple texts in a single API call.
    ///
    /// Results come back in input order, one normalized vector per text.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response has fewer
    /// embeddings than inputs.
    #[instrument(skip(self, texts), fields(model = %self.model, batch_size = texts.len()))]
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, anyhow::Error> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let inputs: Vec<&str> = texts.iter().map(|s| s.as_str()).collect();

        let request = CreateEmbeddingRequestArgs::default()
            .model(self.model.clone())
            .input(inputs)
            .build()?;

        let response = match self.client.embeddings().create(request).await {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, "OpenAI embed_batch request failed");
                return Err(e.into());
            }
        };

        let embeddings: Vec<Vec<f32>> = response
            .data
            .into_iter()
            .map(|item| l2_normalize(item.embedding))
            .collect();

        if embeddings.len() != texts.len() {
            warn!(
                expected = texts.len(),
                got = embeddings.len(),
                "OpenAI embed_batch response count mismatch"
            );
            return Err(anyhow::anyhow!(
                "Expected {} embeddings, got {}",
                texts.len(),
                embeddings.len()
            ));
        }

        debug!(count = embeddings.len(), "OpenAI embed_batch done");
        Ok(embeddings)
    }
}

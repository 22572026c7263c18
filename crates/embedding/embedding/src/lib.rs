//! # Text Embeddings
//!
//! This crate defines the embedding provider interface the memory subsystem
//! builds on: text in, fixed-dimension vector out.
//!
//! ## Provider contract
//!
//! Implementations must uphold two properties the vector store relies on:
//!
//! - **Stable dimension**: every vector a provider produces has the same
//!   length for the provider's lifetime. A persisted store is bound to that
//!   dimension; switching providers requires rebuilding the store.
//! - **L2-normalized output**: vectors have unit length, so the inner
//!   product of two embeddings equals their cosine similarity.

use async_trait::async_trait;

mod config;
pub use config::{EmbeddingConfig, EnvEmbeddingConfig};

/// Provider of text embeddings.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generates an L2-normalized embedding vector for a single text string.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, anyhow::Error>;

    /// Generates embedding vectors for multiple texts in a single call.
    /// More efficient than calling `embed` in a loop.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, anyhow::Error>;
}

//! Integration tests for the OpenAI embedding provider.
//!
//! Tests that call the real OpenAI API are marked `#[ignore]` and require the
//! `OPENAI_API_KEY` environment variable (and sufficient quota).
//!
//! # Running tests
//!
//! - **Default (no API):** `cargo test -p openai-embedding`
//! - **With API:** `cargo test -p openai-embedding -- --ignored`; set
//!   `OPENAI_API_KEY` (e.g. in repo root `.env`). Quota/billing errors are
//!   treated as skip, not failure.

use std::path::Path;

use embedding::EmbeddingProvider;
use openai_embedding::OpenAIEmbedding;

/// Loads `.env` from the workspace root so `OPENAI_API_KEY` is available in
/// ignored tests.
fn load_root_env() {
    let root_env = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../../.env");
    let _ = dotenvy::from_path(root_env);
}

/// Returns true if the error is due to OpenAI quota/billing/rate-limit; such
/// tests are skipped instead of failed.
fn is_quota_or_billing_error(e: &anyhow::Error) -> bool {
    let s = e.to_string();
    s.contains("insufficient_quota")
        || s.contains("quota")
        || s.contains("billing")
        || s.contains("rate_limit")
}

#[tokio::test]
#[ignore] // Requires API key and quota, run with: cargo test -p openai-embedding -- --ignored
async fn test_openai_embed_is_normalized() {
    load_root_env();
    let api_key = std::env::var("OPENAI_API_KEY")
        .expect("OPENAI_API_KEY environment variable must be set for this test");

    let provider = OpenAIEmbedding::new(api_key, "text-embedding-3-small".to_string());

    match provider.embed("Hello world").await {
        Ok(embedding) => {
            assert_eq!(embedding.len(), 1536); // text-embedding-3-small dimension
            let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
            assert!((norm - 1.0).abs() < 1e-3, "embedding must be unit length");
        }
        Err(e) if is_quota_or_billing_error(&e) => {
            eprintln!("test skipped: OpenAI quota/billing limit ({})", e);
        }
        Err(e) => panic!("OpenAI embed request failed: {}", e),
    }
}

#[tokio::test]
#[ignore]
async fn test_openai_embed_batch_order_and_count() {
    load_root_env();
    let api_key = std::env::var("OPENAI_API_KEY")
        .expect("OPENAI_API_KEY environment variable must be set for this test");

    let provider = OpenAIEmbedding::new(api_key, "text-embedding-3-small".to_string());

    let texts = vec![
        "Hello".to_string(),
        "World".to_string(),
        "Goodbye".to_string(),
    ];

    match provider.embed_batch(&texts).await {
        Ok(embeddings) => {
            assert_eq!(embeddings.len(), 3);
            for embedding in &embeddings {
                assert_eq!(embedding.len(), 1536);
            }
        }
        Err(e) if is_quota_or_billing_error(&e) => {
            eprintln!("test skipped: OpenAI quota/billing limit ({})", e);
        }
        Err(e) => panic!("OpenAI embed_batch request failed: {}", e),
    }
}

#[tokio::test]
async fn test_construction_without_api_key() {
    // Must not panic; the failure surfaces on the first API call.
    let provider = OpenAIEmbedding::with_api_key(String::new());
    assert_eq!(provider.model(), "text-embedding-3-small");
}

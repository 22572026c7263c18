//! Deterministic embedding providers for tests.
//!
//! Real providers call an external model; these stubs keep tests offline
//! and reproducible. Hidden from docs, but public so integration tests can
//! share them.

use async_trait::async_trait;
use embedding::EmbeddingProvider;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Bag-of-keywords embedder over a tiny fixed vocabulary.
///
/// Each axis counts hits from one keyword group; the result is
/// L2-normalized, so texts about the same topic score close to 1.0 while
/// unrelated texts score 0.0.
#[derive(Debug, Clone)]
pub struct KeywordEmbedding {
    axes: Vec<Vec<&'static str>>,
}

impl KeywordEmbedding {
    pub fn new() -> Self {
        Self {
            axes: vec![
                vec!["hiking", "hike", "trail", "outdoors", "mountain"],
                vec!["pizza", "food", "pasta", "eat", "meal"],
                vec!["teacher", "work", "job", "living", "school"],
            ],
        }
    }
}

impl Default for KeywordEmbedding {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmbeddingProvider for KeywordEmbedding {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, anyhow::Error> {
        let lowered = text.to_lowercase();
        let tokens: Vec<&str> = lowered
            .split_whitespace()
            .map(|token| token.trim_matches(|c: char| !c.is_alphanumeric()))
            .collect();

        let mut vector: Vec<f32> = self
            .axes
            .iter()
            .map(|keywords| {
                tokens
                    .iter()
                    .filter(|token| keywords.contains(token))
                    .count() as f32
            })
            .collect();

        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in &mut vector {
                *x /= norm;
            }
        }
        Ok(vector)
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, anyhow::Error> {
        let mut vectors = Vec::with_capacity(texts.len());
        for text in texts {
            vectors.push(self.embed(text).await?);
        }
        Ok(vectors)
    }
}

/// Returns the same vector for every input; useful for tie-break tests.
#[derive(Debug, Clone)]
pub struct FixedEmbedding {
    vector: Vec<f32>,
}

impl FixedEmbedding {
    pub fn new(vector: Vec<f32>) -> Self {
        Self { vector }
    }
}

#[async_trait]
impl EmbeddingProvider for FixedEmbedding {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>, anyhow::Error> {
        Ok(self.vector.clone())
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, anyhow::Error> {
        Ok(vec![self.vector.clone(); texts.len()])
    }
}

/// Yields `first_dimension` on the first call and `later_dimension`
/// afterwards, simulating a misconfigured provider swap.
#[derive(Debug)]
pub struct ShiftingDimension {
    first_dimension: usize,
    later_dimension: usize,
    calls: AtomicUsize,
}

impl ShiftingDimension {
    pub fn new(first_dimension: usize, later_dimension: usize) -> Self {
        Self {
            first_dimension,
            later_dimension,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl EmbeddingProvider for ShiftingDimension {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>, anyhow::Error> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        let dimension = if call == 0 {
            self.first_dimension
        } else {
            self.later_dimension
        };
        Ok(vec![1.0; dimension])
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, anyhow::Error> {
        let mut vectors = Vec::with_capacity(texts.len());
        for text in texts {
            vectors.push(self.embed(text).await?);
        }
        Ok(vectors)
    }
}

/// Sleeps before answering, for timeout tests.
#[derive(Debug, Clone)]
pub struct SlowEmbedding {
    delay: Duration,
}

impl SlowEmbedding {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl EmbeddingProvider for SlowEmbedding {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>, anyhow::Error> {
        tokio::time::sleep(self.delay).await;
        Ok(vec![1.0, 0.0])
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, anyhow::Error> {
        tokio::time::sleep(self.delay).await;
        Ok(vec![vec![1.0, 0.0]; texts.len()])
    }
}

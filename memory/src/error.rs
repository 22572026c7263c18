//! # Error Taxonomy
//!
//! Errors of the memory subsystem fall into two classes the caller must be
//! able to tell apart:
//!
//! - **Configuration errors** are fatal and not worth retrying: the
//!   embedding dimension drifted from the store's established dimension, or
//!   a persisted snapshot pair is inconsistent. The store needs rebuilding.
//! - **Transient errors** (provider unavailable, timeout, unreadable
//!   snapshot path) may succeed on retry; the subsystem never retries
//!   internally.
//!
//! Empty search results, oversized `top_k`, and empty content are not
//! errors at all — the store validates structural invariants only, never
//! semantic content.

use std::time::Duration;
use thiserror::Error;

/// Errors produced by the memory subsystem.
#[derive(Debug, Error)]
pub enum MemoryError {
    /// A new embedding does not match the dimension the store was fixed to.
    #[error("embedding dimension mismatch: store dimension is {expected}, provider returned {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// The persisted metadata count disagrees with the index row count.
    #[error("snapshot mismatch: {records} metadata records vs {rows} index rows")]
    SnapshotMismatch { records: usize, rows: usize },

    /// The persisted index artifact is unreadable or the pair is incomplete.
    #[error("malformed snapshot: {0}")]
    MalformedSnapshot(String),

    /// The embedding provider failed.
    #[error("embedding provider error: {0}")]
    Embedding(anyhow::Error),

    /// The embedding provider did not answer within the configured timeout.
    #[error("embedding timed out after {0:?}")]
    EmbeddingTimeout(Duration),

    /// Snapshot I/O failed.
    #[error("snapshot io error: {0}")]
    Io(#[from] std::io::Error),

    /// Snapshot metadata could not be encoded or decoded.
    #[error("snapshot metadata error: {0}")]
    Metadata(#[from] serde_json::Error),
}

impl MemoryError {
    /// True for fatal errors the caller should answer with a store rebuild,
    /// never a retry.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            MemoryError::DimensionMismatch { .. }
                | MemoryError::SnapshotMismatch { .. }
                | MemoryError::MalformedSnapshot(_)
        )
    }

    /// True for errors a caller may reasonably retry.
    pub fn is_transient(&self) -> bool {
        !self.is_configuration()
    }
}

//! # Vector Memory Store
//!
//! Durable long-term memory with insert and cosine-similarity search.
//!
//! The store owns two parallel sequences behind one lock: the record list
//! and the vector index. Index position `i` always corresponds to record
//! position `i` — every insert appends to both under the same write guard,
//! and a snapshot restores both from the same save point. There is no
//! in-place update or per-record deletion; the model is append-only with a
//! single bulk `clear`.
//!
//! Search is a brute-force linear scan scored by inner product. Providers
//! return L2-normalized vectors, so inner product equals cosine
//! similarity. Brute force is intentional at conversational-memory scale
//! and keeps the alignment invariant trivial to uphold; a swapped-in
//! approximate index would have to preserve the same ranking contract
//! (descending similarity, earlier-insert tie-break, clamped `top_k`).
//!
//! ## Concurrency
//!
//! `insert` is the single mutating entry point and takes the write lock;
//! searches share the read lock and observe either the pre- or post-insert
//! state, never a torn one. The embedding call happens before any lock is
//! taken, so a slow provider never blocks readers, and a failed or
//! timed-out embedding aborts the call with no partial mutation.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use memory::config::MemoryConfig;
//! use memory::types::{Attributes, MemoryCategory};
//! use memory::vector_store::VectorMemoryStore;
//! use openai_embedding::OpenAIEmbedding;
//!
//! # async fn example() -> Result<(), memory::error::MemoryError> {
//! let provider = Arc::new(OpenAIEmbedding::with_api_key(String::new()));
//! let store = VectorMemoryStore::open(&MemoryConfig::default(), provider).await?;
//!
//! store
//!     .insert("I work as a teacher", MemoryCategory::fact(), 0.8, Attributes::new())
//!     .await?;
//! let matches = store.search("what do you do for a living", 5).await?;
//! # Ok(())
//! # }
//! ```

use crate::config::MemoryConfig;
use crate::error::MemoryError;
use crate::snapshot::{self, SnapshotData};
use crate::types::{Attributes, MemoryCategory, MemoryRecord, SIMILARITY_SCORE_KEY};
use chrono::Utc;
use embedding::EmbeddingProvider;
use std::cmp::Ordering;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

/// Append-only semantic memory over an embedding provider.
pub struct VectorMemoryStore {
    provider: Arc<dyn EmbeddingProvider>,
    snapshot_dir: PathBuf,
    embed_timeout: Duration,
    inner: RwLock<StoreInner>,
}

impl std::fmt::Debug for VectorMemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VectorMemoryStore")
            .field("snapshot_dir", &self.snapshot_dir)
            .field("embed_timeout", &self.embed_timeout)
            .finish_non_exhaustive()
    }
}

#[derive(Default)]
struct StoreInner {
    records: Vec<MemoryRecord>,
    vectors: Vec<Vec<f32>>,
    /// Fixed by the first embedding (or the restored snapshot) for the
    /// store's lifetime.
    dimension: Option<usize>,
    next_id: u64,
}

impl VectorMemoryStore {
    /// Opens a store, restoring the snapshot pair under
    /// `config.snapshot_dir` when one exists.
    ///
    /// Construction is the only point where a snapshot is read; a store
    /// that is already serving inserts is never restored into. An
    /// inconsistent pair (one artifact missing, malformed index, or
    /// metadata count ≠ index row count) fails the open outright.
    pub async fn open(
        config: &MemoryConfig,
        provider: Arc<dyn EmbeddingProvider>,
    ) -> Result<Self, MemoryError> {
        let inner = match snapshot::load(&config.snapshot_dir).await? {
            Some(SnapshotData {
                records,
                vectors,
                dimension,
            }) => {
                info!(
                    count = records.len(),
                    dimension,
                    path = %config.snapshot_dir.display(),
                    "restored memory snapshot"
                );
                let next_id = records.iter().map(|r| r.id + 1).max().unwrap_or(0);
                StoreInner {
                    records,
                    vectors,
                    dimension: Some(dimension),
                    next_id,
                }
            }
            None => {
                debug!(path = %config.snapshot_dir.display(), "no snapshot found, starting empty");
                StoreInner::default()
            }
        };

        Ok(Self {
            provider,
            snapshot_dir: config.snapshot_dir.clone(),
            embed_timeout: config.embed_timeout,
            inner: RwLock::new(inner),
        })
    }

    /// Inserts a new memory and returns its id.
    ///
    /// The content is embedded first; only then is the write lock taken
    /// and the record/vector pair appended in lock-step. A provider
    /// failure or timeout leaves the store untouched. A vector whose
    /// dimension differs from the store's established dimension is a
    /// fatal configuration error.
    #[instrument(skip(self, content, attributes), fields(category = %category, content_len = content.len()))]
    pub async fn insert(
        &self,
        content: &str,
        category: MemoryCategory,
        importance: f32,
        attributes: Attributes,
    ) -> Result<u64, MemoryError> {
        let vector = self.embed(content).await?;

        let mut inner = self.inner.write().await;
        match inner.dimension {
            Some(expected) if expected != vector.len() => {
                return Err(MemoryError::DimensionMismatch {
                    expected,
                    actual: vector.len(),
                });
            }
            None => inner.dimension = Some(vector.len()),
            _ => {}
        }

        let id = inner.next_id;
        inner.next_id += 1;
        let record = MemoryRecord {
            id,
            content: content.to_string(),
            category,
            importance,
            created_at: Utc::now(),
            attributes,
        };
        // Both appends happen under the same guard; no reader can observe
        // one list longer than the other.
        inner.records.push(record);
        inner.vectors.push(vector);

        debug!(id, total = inner.records.len(), "memory inserted");
        Ok(id)
    }

    /// Returns the `top_k` records most similar to `query`, ranked by
    /// descending similarity, each annotated with its score in
    /// `attributes`.
    ///
    /// `top_k` is clamped to the record count; an empty store yields an
    /// empty result without touching the provider. Ties in score resolve
    /// to the earlier-inserted record, keeping results deterministic.
    #[instrument(skip(self, query), fields(query_len = query.len(), top_k = top_k))]
    pub async fn search(&self, query: &str, top_k: usize) -> Result<Vec<MemoryRecord>, MemoryError> {
        {
            let inner = self.inner.read().await;
            if inner.records.is_empty() {
                return Ok(Vec::new());
            }
        }

        let query_vector = self.embed(query).await?;

        let inner = self.inner.read().await;
        if let Some(expected) = inner.dimension {
            if query_vector.len() != expected {
                return Err(MemoryError::DimensionMismatch {
                    expected,
                    actual: query_vector.len(),
                });
            }
        }

        let mut scored: Vec<(usize, f32)> = inner
            .vectors
            .iter()
            .enumerate()
            .map(|(position, vector)| (position, inner_product(&query_vector, vector)))
            .collect();

        // Stable sort: equal scores keep insertion order, so the earlier
        // record wins the tie.
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        scored.truncate(top_k.min(inner.records.len()));

        let results = scored
            .into_iter()
            .map(|(position, score)| {
                let mut record = inner.records[position].clone();
                record.attributes.insert(
                    SIMILARITY_SCORE_KEY.to_string(),
                    serde_json::Value::from(score),
                );
                record
            })
            .collect();

        Ok(results)
    }

    /// Renders the best matches for `query` as a bulleted context block,
    /// one `- {content} (relevance: {score})` line per match with the
    /// score at two decimals. No matches render as an empty string, not a
    /// placeholder.
    pub async fn context_for(
        &self,
        query: &str,
        max_memories: usize,
    ) -> Result<String, MemoryError> {
        let records = self.search(query, max_memories).await?;
        if records.is_empty() {
            return Ok(String::new());
        }

        let lines: Vec<String> = records
            .iter()
            .map(|record| {
                format!(
                    "- {} (relevance: {:.2})",
                    record.content,
                    record.similarity_score().unwrap_or(0.0)
                )
            })
            .collect();

        Ok(lines.join("\n"))
    }

    /// Writes the snapshot pair to the configured directory.
    ///
    /// Runs under the read lock: concurrent searches proceed, while
    /// inserts wait until both artifacts are on disk — the pair always
    /// reflects a single save point. A store that has never embedded
    /// anything has nothing to snapshot and returns without writing.
    #[instrument(skip(self))]
    pub async fn persist(&self) -> Result<(), MemoryError> {
        let inner = self.inner.read().await;
        let Some(dimension) = inner.dimension else {
            debug!("store has no established dimension yet, skipping snapshot");
            return Ok(());
        };

        snapshot::write(&self.snapshot_dir, &inner.records, &inner.vectors, dimension).await?;
        info!(
            count = inner.records.len(),
            path = %self.snapshot_dir.display(),
            "memory snapshot written"
        );
        Ok(())
    }

    /// Number of records held.
    pub async fn count(&self) -> usize {
        self.inner.read().await.records.len()
    }

    /// The store's established embedding dimension, once fixed.
    pub async fn dimension(&self) -> Option<usize> {
        self.inner.read().await.dimension
    }

    /// Irreversibly discards all records and vectors. The established
    /// dimension and the id counter survive, so ids stay unique for the
    /// store instance.
    pub async fn clear(&self) {
        let mut inner = self.inner.write().await;
        let discarded = inner.records.len();
        inner.records.clear();
        inner.vectors.clear();
        warn!(discarded, "all long-term memories cleared");
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, MemoryError> {
        match tokio::time::timeout(self.embed_timeout, self.provider.embed(text)).await {
            Ok(Ok(vector)) => Ok(vector),
            Ok(Err(e)) => Err(MemoryError::Embedding(e)),
            Err(_) => Err(MemoryError::EmbeddingTimeout(self.embed_timeout)),
        }
    }
}

/// Inner product of two equal-length vectors; cosine similarity for
/// normalized inputs.
fn inner_product(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FixedEmbedding, KeywordEmbedding, ShiftingDimension, SlowEmbedding};

    fn test_config(dir: &std::path::Path) -> MemoryConfig {
        MemoryConfig::with_snapshot_dir(dir)
    }

    async fn open_keyword_store(dir: &std::path::Path) -> VectorMemoryStore {
        VectorMemoryStore::open(&test_config(dir), Arc::new(KeywordEmbedding::new()))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_insert_assigns_sequential_ids() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_keyword_store(dir.path()).await;

        let a = store
            .insert("I love hiking", MemoryCategory::fact(), 0.5, Attributes::new())
            .await
            .unwrap();
        let b = store
            .insert("pizza is great", MemoryCategory::preference(), 0.5, Attributes::new())
            .await
            .unwrap();

        assert_eq!(a, 0);
        assert_eq!(b, 1);
        assert_eq!(store.count().await, 2);
    }

    #[tokio::test]
    async fn test_empty_store_search_is_empty_not_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_keyword_store(dir.path()).await;

        let results = store.search("anything", 5).await.unwrap();
        assert!(results.is_empty());
        assert_eq!(store.context_for("anything", 5).await.unwrap(), "");
    }

    #[tokio::test]
    async fn test_search_ranks_by_similarity() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_keyword_store(dir.path()).await;

        for content in [
            "I love hiking",
            "My favorite food is pizza",
            "I work as a teacher",
        ] {
            store
                .insert(content, MemoryCategory::fact(), 0.5, Attributes::new())
                .await
                .unwrap();
        }

        let results = store
            .search("what do you do for a living", 3)
            .await
            .unwrap();
        assert_eq!(results[0].content, "I work as a teacher");
        assert!(results[0].similarity_score().unwrap() > 0.9);
    }

    #[tokio::test]
    async fn test_top_k_clamped_to_record_count() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_keyword_store(dir.path()).await;

        store
            .insert("I love hiking", MemoryCategory::fact(), 0.5, Attributes::new())
            .await
            .unwrap();

        let results = store.search("hiking", 50).await.unwrap();
        assert_eq!(results.len(), 1);
    }

    #[tokio::test]
    async fn test_identical_embeddings_tie_break_by_insertion_order() {
        let dir = tempfile::tempdir().unwrap();
        let provider = Arc::new(FixedEmbedding::new(vec![0.6, 0.8]));
        let store = VectorMemoryStore::open(&test_config(dir.path()), provider)
            .await
            .unwrap();

        let first = store
            .insert("twin one", MemoryCategory::fact(), 0.5, Attributes::new())
            .await
            .unwrap();
        let second = store
            .insert("twin two", MemoryCategory::fact(), 0.5, Attributes::new())
            .await
            .unwrap();

        let results = store.search("twins", 2).await.unwrap();
        assert_eq!(results[0].id, first);
        assert_eq!(results[1].id, second);
    }

    #[tokio::test]
    async fn test_dimension_drift_is_fatal_and_mutates_nothing() {
        let dir = tempfile::tempdir().unwrap();
        // First call yields a 3-dim vector, every later call 4-dim.
        let provider = Arc::new(ShiftingDimension::new(3, 4));
        let store = VectorMemoryStore::open(&test_config(dir.path()), provider)
            .await
            .unwrap();

        store
            .insert("establishes dimension", MemoryCategory::fact(), 0.5, Attributes::new())
            .await
            .unwrap();

        let err = store
            .insert("drifted", MemoryCategory::fact(), 0.5, Attributes::new())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            MemoryError::DimensionMismatch {
                expected: 3,
                actual: 4
            }
        ));
        assert!(err.is_configuration());
        assert_eq!(store.count().await, 1);
    }

    #[tokio::test]
    async fn test_embed_timeout_aborts_without_partial_insert() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = test_config(dir.path());
        config.embed_timeout = Duration::from_millis(10);
        let provider = Arc::new(SlowEmbedding::new(Duration::from_millis(500)));
        let store = VectorMemoryStore::open(&config, provider).await.unwrap();

        let err = store
            .insert("never lands", MemoryCategory::fact(), 0.5, Attributes::new())
            .await
            .unwrap_err();
        assert!(matches!(err, MemoryError::EmbeddingTimeout(_)));
        assert!(err.is_transient());
        assert_eq!(store.count().await, 0);
    }

    #[tokio::test]
    async fn test_context_for_formats_two_decimal_scores() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_keyword_store(dir.path()).await;

        store
            .insert("I work as a teacher", MemoryCategory::fact(), 0.5, Attributes::new())
            .await
            .unwrap();

        let context = store.context_for("teacher", 5).await.unwrap();
        assert_eq!(context, "- I work as a teacher (relevance: 1.00)");
    }

    #[tokio::test]
    async fn test_persist_restore_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_keyword_store(dir.path()).await;

        for content in ["I love hiking", "My favorite food is pizza", "I work as a teacher"] {
            store
                .insert(content, MemoryCategory::fact(), 0.5, Attributes::new())
                .await
                .unwrap();
        }
        let before = store.search("what do you do for a living", 3).await.unwrap();
        store.persist().await.unwrap();

        let restored = open_keyword_store(dir.path()).await;
        assert_eq!(restored.count().await, 3);
        assert_eq!(restored.dimension().await, store.dimension().await);

        let after = restored
            .search("what do you do for a living", 3)
            .await
            .unwrap();
        let ids = |records: &[MemoryRecord]| records.iter().map(|r| r.id).collect::<Vec<_>>();
        assert_eq!(ids(&before), ids(&after));
        for (b, a) in before.iter().zip(after.iter()) {
            assert!((b.similarity_score().unwrap() - a.similarity_score().unwrap()).abs() < 1e-6);
        }

        // New inserts continue the id sequence past the restored records.
        let next = restored
            .insert("another memory about hiking", MemoryCategory::fact(), 0.5, Attributes::new())
            .await
            .unwrap();
        assert_eq!(next, 3);
    }

    #[tokio::test]
    async fn test_tampered_snapshot_fails_open() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_keyword_store(dir.path()).await;
        store
            .insert("I love hiking", MemoryCategory::fact(), 0.5, Attributes::new())
            .await
            .unwrap();
        store.persist().await.unwrap();

        // Drop a record from the metadata artifact; counts now disagree.
        tokio::fs::write(dir.path().join(snapshot::METADATA_FILE), b"[]")
            .await
            .unwrap();

        let err = VectorMemoryStore::open(&test_config(dir.path()), Arc::new(KeywordEmbedding::new()))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            MemoryError::SnapshotMismatch { records: 0, rows: 1 }
        ));
    }

    #[tokio::test]
    async fn test_lone_index_artifact_fails_open() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_keyword_store(dir.path()).await;
        store
            .insert("I love hiking", MemoryCategory::fact(), 0.5, Attributes::new())
            .await
            .unwrap();
        store.persist().await.unwrap();

        tokio::fs::remove_file(dir.path().join(snapshot::METADATA_FILE))
            .await
            .unwrap();

        let err = VectorMemoryStore::open(&test_config(dir.path()), Arc::new(KeywordEmbedding::new()))
            .await
            .unwrap_err();
        assert!(err.is_configuration());
    }

    #[tokio::test]
    async fn test_clear_discards_everything() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_keyword_store(dir.path()).await;
        store
            .insert("I love hiking", MemoryCategory::fact(), 0.5, Attributes::new())
            .await
            .unwrap();

        store.clear().await;
        assert_eq!(store.count().await, 0);
        assert!(store.search("hiking", 5).await.unwrap().is_empty());

        // Ids keep counting up after a clear.
        let id = store
            .insert("fresh start", MemoryCategory::fact(), 0.5, Attributes::new())
            .await
            .unwrap();
        assert_eq!(id, 1);
    }

    #[tokio::test]
    async fn test_concurrent_inserts_and_searches_stay_aligned() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(open_keyword_store(dir.path()).await);

        let mut tasks = tokio::task::JoinSet::new();
        for i in 0..16 {
            let store = Arc::clone(&store);
            if i % 2 == 0 {
                tasks.spawn(async move {
                    store
                        .insert("I love hiking", MemoryCategory::fact(), 0.5, Attributes::new())
                        .await
                        .unwrap();
                });
            } else {
                tasks.spawn(async move {
                    // Readers see either the pre- or post-insert state,
                    // never a torn one; any observed result set is valid.
                    store.search("hiking", 100).await.unwrap();
                });
            }
        }
        while tasks.join_next().await.is_some() {}

        assert_eq!(store.count().await, 8);
        let results = store.search("hiking", 100).await.unwrap();
        assert_eq!(results.len(), 8);
        // Ids are unique and monotonic even under concurrent inserts.
        let mut ids: Vec<u64> = results.iter().map(|r| r.id).collect();
        ids.sort_unstable();
        assert_eq!(ids, (0..8).collect::<Vec<u64>>());
    }

    #[test]
    fn test_inner_product() {
        assert_eq!(inner_product(&[1.0, 0.0], &[1.0, 0.0]), 1.0);
        assert_eq!(inner_product(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
        assert!((inner_product(&[0.6, 0.8], &[0.6, 0.8]) - 1.0).abs() < 1e-6);
    }
}

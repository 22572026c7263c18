//! # Memory Facade
//!
//! The single surface the decision component talks to. One facade owns the
//! long-term vector store and the short-term conversation buffer, so
//! callers see one cohesive memory instead of two stores, and never deal
//! with persistence timing themselves.
//!
//! The facade adds no business logic beyond parameter defaults; structural
//! errors from the store propagate untouched so the caller can distinguish
//! "rebuild the store" from "retry" — degrading gracefully (answering
//! without memory context) is the caller's decision, not this layer's.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use memory::config::MemoryConfig;
//! use memory::facade::MemoryFacade;
//! use memory::types::TurnRole;
//! use memory::vector_store::VectorMemoryStore;
//! use openai_embedding::OpenAIEmbedding;
//!
//! # async fn example() -> Result<(), memory::error::MemoryError> {
//! let config = MemoryConfig::default();
//! let provider = Arc::new(OpenAIEmbedding::with_api_key(String::new()));
//! let store = VectorMemoryStore::open(&config, provider).await?;
//! let facade = MemoryFacade::new(store, &config);
//!
//! facade.append_turn(TurnRole::User, "remember that I teach math").await;
//! facade.remember("User teaches math", None, None).await?;
//! let context = facade.relevant_context("what is my job?").await?;
//! # Ok(())
//! # }
//! ```

use crate::config::MemoryConfig;
use crate::conversation::ConversationBuffer;
use crate::error::MemoryError;
use crate::types::{Attributes, ConversationTurn, MemoryCategory, TurnRole};
use crate::vector_store::VectorMemoryStore;
use tokio::sync::RwLock;

/// Default importance when the caller does not supply one.
const DEFAULT_IMPORTANCE: f32 = 0.5;

/// Orchestration layer over the two memory tiers.
pub struct MemoryFacade {
    long_term: VectorMemoryStore,
    buffer: RwLock<ConversationBuffer>,
    top_k: usize,
}

impl MemoryFacade {
    /// Wraps an opened store and a fresh conversation buffer sized per
    /// `config`.
    pub fn new(long_term: VectorMemoryStore, config: &MemoryConfig) -> Self {
        Self {
            long_term,
            buffer: RwLock::new(ConversationBuffer::new(config.buffer_capacity)),
            top_k: config.top_k,
        }
    }

    /// Stores a long-term memory. Defaults: category `fact`, importance
    /// 0.5. Returns the new record's id.
    pub async fn remember(
        &self,
        content: &str,
        category: Option<MemoryCategory>,
        importance: Option<f32>,
    ) -> Result<u64, MemoryError> {
        self.long_term
            .insert(
                content,
                category.unwrap_or_else(MemoryCategory::fact),
                importance.unwrap_or(DEFAULT_IMPORTANCE),
                Attributes::new(),
            )
            .await
    }

    /// Renders the long-term memories most relevant to `query`, or an
    /// empty string when nothing matches.
    pub async fn relevant_context(&self, query: &str) -> Result<String, MemoryError> {
        self.long_term.context_for(query, self.top_k).await
    }

    /// Appends a turn to the conversation buffer.
    pub async fn append_turn(&self, role: TurnRole, content: &str) {
        self.buffer
            .write()
            .await
            .append(role, content, Attributes::new());
    }

    /// Recent-turns transcript within a character budget.
    pub async fn render_context(&self, max_chars: usize) -> String {
        self.buffer.read().await.render_context(max_chars)
    }

    /// The `n` most recent turns (all turns when `None`), chronological.
    pub async fn recent_turns(&self, n: Option<usize>) -> Vec<ConversationTurn> {
        self.buffer.read().await.recent(n)
    }

    /// Discards the conversation buffer, starting a fresh conversation.
    /// Long-term memories are untouched.
    pub async fn clear_conversation(&self) {
        self.buffer.write().await.clear();
    }

    /// Snapshots the long-term store to disk.
    pub async fn persist(&self) -> Result<(), MemoryError> {
        self.long_term.persist().await
    }

    /// Direct access to the long-term store for callers that need `search`
    /// or `count` rather than rendered context.
    pub fn long_term(&self) -> &VectorMemoryStore {
        &self.long_term
    }
}

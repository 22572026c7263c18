//! # Memory Crate
//!
//! Two-tier conversational memory for an assistant backend: a bounded,
//! ordered short-term conversation buffer and a persistent, semantically
//! searchable long-term store backed by a vector index.
//!
//! ## Architecture
//!
//! Caller text flows through the [`facade::MemoryFacade`] to an
//! [`embedding::EmbeddingProvider`], then into the
//! [`vector_store::VectorMemoryStore`] for insert or search; ranked
//! results come back as a formatted context string for the decision
//! component.
//!
//! ## Modules
//!
//! - [`types`] - Core type definitions
//! - [`conversation`] - Bounded short-term conversation buffer
//! - [`vector_store`] - Durable long-term vector memory store
//! - [`snapshot`] - Paired on-disk snapshot codec
//! - [`facade`] - The single surface consumed by callers
//! - [`config`] - Subsystem configuration
//! - [`error`] - Error taxonomy (configuration vs. transient)
//!
//! ## The alignment invariant
//!
//! The record list and the vector index always have identical length and
//! order: index position `i` corresponds to record position `i`. Insert is
//! the only mutating operation and appends to both under one write guard;
//! a snapshot persists and restores both from the same save point, and a
//! mismatched pair fails the load outright. Everything else in this crate
//! is shaped around keeping that invariant boring.
//!
//! ## Embedding integration
//!
//! Providers live in separate crates:
//! - `embedding` - the `EmbeddingProvider` trait and env config
//! - `openai-embedding` - OpenAI implementation

pub mod config;
pub mod conversation;
pub mod error;
pub mod facade;
pub mod snapshot;
pub mod types;
pub mod vector_store;

#[doc(hidden)]
pub mod test_support;

pub use config::MemoryConfig;
pub use conversation::{ConversationBuffer, ConversationSnapshot};
pub use error::MemoryError;
pub use facade::MemoryFacade;
pub use types::{
    Attributes, ConversationTurn, MemoryCategory, MemoryRecord, TurnRole, SIMILARITY_SCORE_KEY,
};
pub use vector_store::VectorMemoryStore;

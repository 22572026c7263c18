//! # Core Types
//!
//! Data model shared by the conversation buffer and the vector memory store.
//!
//! ## TurnRole
//!
//! Who produced a conversation turn: the user or the assistant.
//!
//! ## ConversationTurn
//!
//! A single turn of the live conversation. Turns are immutable once
//! appended; the buffer destroys them only by eviction.
//!
//! ## MemoryCategory
//!
//! An open tag over long-term memories. Well-known values (`fact`,
//! `conversation`, `preference`, `event`) get constructors, but any string
//! is accepted — the set is deliberately not closed.
//!
//! ## MemoryRecord
//!
//! A single long-term memory. Records carry no vector themselves: the
//! store owns vectors in a parallel sequence where index position `i`
//! always corresponds to record position `i`. Search results get their
//! similarity score attached under [`SIMILARITY_SCORE_KEY`] in
//! `attributes`.
//!
//! ## Serialization
//!
//! All types implement `Serialize`/`Deserialize`; the snapshot metadata
//! artifact is the JSON form of `Vec<MemoryRecord>`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Attribute key under which `search` attaches the similarity score.
pub const SIMILARITY_SCORE_KEY: &str = "similarity_score";

/// Free-form string-to-value mapping carried by turns and records.
pub type Attributes = HashMap<String, serde_json::Value>;

/// Who produced a conversation turn.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TurnRole {
    User,
    Assistant,
}

impl fmt::Display for TurnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TurnRole::User => write!(f, "user"),
            TurnRole::Assistant => write!(f, "assistant"),
        }
    }
}

/// A single turn in the conversation buffer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConversationTurn {
    /// Role of the speaker
    pub role: TurnRole,
    /// The turn's text
    pub content: String,
    /// When the turn was appended
    pub created_at: DateTime<Utc>,
    /// Free-form metadata, not indexed
    #[serde(default)]
    pub attributes: Attributes,
}

impl ConversationTurn {
    /// Creates a turn stamped with the current time.
    pub fn new(role: TurnRole, content: impl Into<String>, attributes: Attributes) -> Self {
        Self {
            role,
            content: content.into(),
            created_at: Utc::now(),
            attributes,
        }
    }
}

/// Open category tag for long-term memories.
///
/// Arbitrary values are accepted; the well-known ones below just avoid
/// stringly-typed call sites.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct MemoryCategory(String);

impl MemoryCategory {
    pub fn new(category: impl Into<String>) -> Self {
        Self(category.into())
    }

    pub fn fact() -> Self {
        Self::new("fact")
    }

    pub fn conversation() -> Self {
        Self::new("conversation")
    }

    pub fn preference() -> Self {
        Self::new("preference")
    }

    pub fn event() -> Self {
        Self::new("event")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for MemoryCategory {
    fn from(category: &str) -> Self {
        Self::new(category)
    }
}

impl fmt::Display for MemoryCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single long-term memory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MemoryRecord {
    /// Monotonically assigned per store instance, stable for the record's lifetime
    pub id: u64,
    /// The memory's semantic payload
    pub content: String,
    /// Open category tag
    pub category: MemoryCategory,
    /// Caller-supplied importance in [0, 1]; stored as advisory metadata only
    pub importance: f32,
    /// When the record was inserted
    pub created_at: DateTime<Utc>,
    /// Free-form metadata; search results carry their score here
    #[serde(default)]
    pub attributes: Attributes,
}

impl MemoryRecord {
    /// Similarity score attached by the most recent `search`, if any.
    pub fn similarity_score(&self) -> Option<f32> {
        self.attributes
            .get(SIMILARITY_SCORE_KEY)
            .and_then(|value| value.as_f64())
            .map(|value| value as f32)
    }
}

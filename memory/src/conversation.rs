//! # Conversation Buffer
//!
//! Bounded short-term memory for a single conversation: an append-only,
//! ordered log of turns with oldest-first eviction once capacity is
//! exceeded, plus a session-scoped key/value scratch space.
//!
//! The buffer is scoped to one session and is not shared across concurrent
//! callers; the facade serializes access when it owns one.
//!
//! ## Example
//!
//! ```rust
//! use memory::conversation::ConversationBuffer;
//!
//! let mut buffer = ConversationBuffer::new(20);
//! buffer.append_user("Hello");
//! buffer.append_assistant("Hi! How can I help?");
//!
//! let transcript = buffer.render_context(2000);
//! assert!(transcript.starts_with("user: Hello"));
//! ```

use crate::types::{Attributes, ConversationTurn, TurnRole};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::debug;

/// Sliding-window buffer over the current conversation.
#[derive(Debug, Clone)]
pub struct ConversationBuffer {
    capacity: usize,
    turns: VecDeque<ConversationTurn>,
    session: Attributes,
}

/// Transport-neutral form of a buffer for cross-process handoff.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversationSnapshot {
    pub turns: Vec<ConversationTurn>,
    #[serde(default)]
    pub session: Attributes,
}

impl ConversationBuffer {
    /// Creates an empty buffer holding at most `capacity` turns.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            turns: VecDeque::with_capacity(capacity),
            session: Attributes::new(),
        }
    }

    /// Restores a buffer from a snapshot, keeping only the most recent
    /// `capacity` turns when the snapshot holds more.
    pub fn from_snapshot(snapshot: ConversationSnapshot, capacity: usize) -> Self {
        let mut turns = snapshot.turns;
        if turns.len() > capacity {
            turns.drain(..turns.len() - capacity);
        }
        Self {
            capacity,
            turns: turns.into(),
            session: snapshot.session,
        }
    }

    /// Appends a turn, evicting the oldest one first when at capacity.
    /// Always succeeds.
    pub fn append(&mut self, role: TurnRole, content: impl Into<String>, attributes: Attributes) {
        if self.capacity == 0 {
            return;
        }
        if self.turns.len() == self.capacity {
            self.turns.pop_front();
        }
        self.turns
            .push_back(ConversationTurn::new(role, content, attributes));
    }

    /// Shorthand for appending a user turn without attributes.
    pub fn append_user(&mut self, content: impl Into<String>) {
        self.append(TurnRole::User, content, Attributes::new());
    }

    /// Shorthand for appending an assistant turn without attributes.
    pub fn append_assistant(&mut self, content: impl Into<String>) {
        self.append(TurnRole::Assistant, content, Attributes::new());
    }

    /// Returns the `n` most recent turns in chronological order, or all
    /// held turns when `n` is `None`.
    pub fn recent(&self, n: Option<usize>) -> Vec<ConversationTurn> {
        match n {
            Some(n) => {
                let skip = self.turns.len().saturating_sub(n);
                self.turns.iter().skip(skip).cloned().collect()
            }
            None => self.turns.iter().cloned().collect(),
        }
    }

    /// Builds a newline-joined `"role: content"` transcript within a
    /// character budget.
    ///
    /// Walks from the most recent turn backward, keeping a line only if the
    /// rendered result (joining newlines included) stays within
    /// `max_chars`, then restores chronological order. Lines are never
    /// truncated: a turn that does not fit is dropped whole, along with
    /// everything older than it.
    pub fn render_context(&self, max_chars: usize) -> String {
        let mut lines: Vec<String> = Vec::new();
        let mut used = 0usize;

        for turn in self.turns.iter().rev() {
            let line = format!("{}: {}", turn.role, turn.content);
            let cost = line.len() + if lines.is_empty() { 0 } else { 1 };
            if used + cost > max_chars {
                break;
            }
            used += cost;
            lines.push(line);
        }

        lines.reverse();
        lines.join("\n")
    }

    /// Stores a session-scoped value, unrelated to the turn log.
    pub fn set_session_value(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.session.insert(key.into(), value);
    }

    /// Retrieves a session-scoped value.
    pub fn get_session_value(&self, key: &str) -> Option<&serde_json::Value> {
        self.session.get(key)
    }

    /// Most recent user turn content, if any.
    pub fn last_user_message(&self) -> Option<&str> {
        self.turns
            .iter()
            .rev()
            .find(|turn| turn.role == TurnRole::User)
            .map(|turn| turn.content.as_str())
    }

    /// Most recent assistant turn content, if any.
    pub fn last_assistant_message(&self) -> Option<&str> {
        self.turns
            .iter()
            .rev()
            .find(|turn| turn.role == TurnRole::Assistant)
            .map(|turn| turn.content.as_str())
    }

    /// Discards all turns and session values.
    pub fn clear(&mut self) {
        debug!(discarded = self.turns.len(), "conversation buffer cleared");
        self.turns.clear();
        self.session.clear();
    }

    /// Number of turns currently held.
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Capacity fixed at construction.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Copies the buffer into its transport-neutral form.
    pub fn snapshot(&self) -> ConversationSnapshot {
        ConversationSnapshot {
            turns: self.turns.iter().cloned().collect(),
            session: self.session.clone(),
        }
    }
}

//! Memory subsystem configuration with environment-variable overrides.

use std::path::PathBuf;
use std::time::Duration;

/// Knobs for the memory subsystem.
#[derive(Debug, Clone)]
pub struct MemoryConfig {
    /// Directory holding the snapshot pair (vector index + metadata)
    pub snapshot_dir: PathBuf,
    /// How many turns the conversation buffer holds before evicting
    pub buffer_capacity: usize,
    /// How many memories a context lookup retrieves
    pub top_k: usize,
    /// Budget for a single embedding call; exceeded calls fail cleanly
    pub embed_timeout: Duration,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            snapshot_dir: PathBuf::from("data/memory_index"),
            buffer_capacity: 20,
            top_k: 5,
            embed_timeout: Duration::from_secs(30),
        }
    }
}

impl MemoryConfig {
    /// Default config with the given snapshot directory.
    pub fn with_snapshot_dir(snapshot_dir: impl Into<PathBuf>) -> Self {
        Self {
            snapshot_dir: snapshot_dir.into(),
            ..Self::default()
        }
    }

    /// Overrides defaults from environment variables, for deployments:
    /// `MEMORY_SNAPSHOT_DIR`, `MEMORY_BUFFER_CAPACITY`, `MEMORY_TOP_K`,
    /// `MEMORY_EMBED_TIMEOUT_SECS`. Unset or unparsable values keep the
    /// default.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(dir) = std::env::var("MEMORY_SNAPSHOT_DIR") {
            if !dir.trim().is_empty() {
                config.snapshot_dir = PathBuf::from(dir);
            }
        }
        if let Some(capacity) = parse_env("MEMORY_BUFFER_CAPACITY") {
            config.buffer_capacity = capacity;
        }
        if let Some(top_k) = parse_env("MEMORY_TOP_K") {
            config.top_k = top_k;
        }
        if let Some(secs) = parse_env::<u64>("MEMORY_EMBED_TIMEOUT_SECS") {
            config.embed_timeout = Duration::from_secs(secs);
        }

        config
    }
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|value| value.parse().ok())
}

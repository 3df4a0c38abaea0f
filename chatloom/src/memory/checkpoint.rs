//! Checkpoint and metadata types.

use std::time::SystemTime;

/// Metadata for a single checkpoint (source, step, created_at).
#[derive(Debug, Clone)]
pub struct CheckpointMetadata {
    pub source: CheckpointSource,
    pub step: u64,
    pub created_at: Option<SystemTime>,
}

/// What produced the checkpoint: initial input, a mid-run loop snapshot, or
/// the end-of-turn update. Only `Update` is written by the current run loop;
/// the others are kept for stores that record finer-grained history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckpointSource {
    Input,
    Loop,
    Update,
}

impl CheckpointSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckpointSource::Input => "input",
            CheckpointSource::Loop => "loop",
            CheckpointSource::Update => "update",
        }
    }

    /// Inverse of `as_str`; unknown text falls back to `Update` so old rows
    /// never make a thread unreadable.
    pub fn parse(s: &str) -> Self {
        match s {
            "input" => CheckpointSource::Input,
            "loop" => CheckpointSource::Loop,
            _ => CheckpointSource::Update,
        }
    }
}

/// One checkpoint: a full state snapshot plus id/ts/metadata.
///
/// **Interaction**: produced by the graph at the end of a successful turn;
/// consumed by `Checkpointer::put`, returned by `get`.
#[derive(Debug, Clone)]
pub struct Checkpoint<S> {
    pub id: String,
    pub ts: String,
    pub channel_values: S,
    pub metadata: CheckpointMetadata,
}

impl<S> Checkpoint<S> {
    /// Creates a checkpoint from the final state of a turn. Uses current time
    /// for id/ts.
    pub fn from_state(state: S, source: CheckpointSource, step: u64) -> Self {
        let now = SystemTime::now();
        let ts = format!(
            "{}",
            now.duration_since(SystemTime::UNIX_EPOCH)
                .map(|d| d.as_millis())
                .unwrap_or(0)
        );
        let id = format!("{}-{}", ts, step);
        Self {
            id,
            ts,
            channel_values: state,
            metadata: CheckpointMetadata {
                source,
                step,
                created_at: Some(now),
            },
        }
    }
}

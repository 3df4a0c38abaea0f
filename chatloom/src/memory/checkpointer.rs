//! Checkpointer trait and its error type.

use async_trait::async_trait;
use thiserror::Error;

use crate::memory::checkpoint::Checkpoint;
use crate::memory::config::RunnableConfig;

/// Persistence failure on save/load. Surfaced to the caller, never retried
/// internally; retry policy belongs to the caller.
#[derive(Debug, Error)]
pub enum CheckpointError {
    /// Backing-store I/O failure (open, read, write, lock).
    #[error("storage error: {0}")]
    Storage(String),
    /// State could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Extracts the thread id a checkpoint operation is keyed by.
pub(crate) fn require_thread_id(config: &RunnableConfig) -> Result<&str, CheckpointError> {
    config
        .thread_id
        .as_deref()
        .ok_or_else(|| CheckpointError::Storage("config.thread_id is required".to_string()))
}

/// Durable per-thread snapshot store.
///
/// `put` must be safe to call repeatedly for the same thread id: each call
/// records a new latest snapshot. `get` returns the most recent snapshot
/// written for the id, or `None` when the id has never been saved; the
/// thread is created implicitly on first `put`. Implementations must allow
/// concurrent calls for different thread ids without interference.
#[async_trait]
pub trait Checkpointer<S>: Send + Sync
where
    S: Clone + Send + Sync + 'static,
{
    /// Durably records `checkpoint` as the new latest snapshot for
    /// `config.thread_id`.
    async fn put(
        &self,
        config: &RunnableConfig,
        checkpoint: &Checkpoint<S>,
    ) -> Result<(), CheckpointError>;

    /// Latest snapshot for `config.thread_id`, or `None` for an unknown id.
    async fn get(&self, config: &RunnableConfig) -> Result<Option<Checkpoint<S>>, CheckpointError>;

    /// Every thread id ever saved, each exactly once, in stable order.
    async fn list_thread_ids(&self) -> Result<Vec<String>, CheckpointError>;
}

//! In-memory checkpointer for dev and tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::memory::checkpoint::Checkpoint;
use crate::memory::checkpointer::{require_thread_id, CheckpointError, Checkpointer};
use crate::memory::config::RunnableConfig;

/// In-memory checkpointer: per-thread snapshot history behind a mutex.
///
/// Keeps every snapshot written per thread; `get` returns the last one.
/// State lives only for the process lifetime; use [`SqliteSaver`] for
/// anything that must survive a restart.
///
/// [`SqliteSaver`]: crate::memory::SqliteSaver
pub struct MemorySaver<S> {
    threads: Mutex<HashMap<String, Vec<Checkpoint<S>>>>,
}

impl<S> MemorySaver<S> {
    pub fn new() -> Self {
        Self {
            threads: Mutex::new(HashMap::new()),
        }
    }
}

impl<S> Default for MemorySaver<S> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<S> Checkpointer<S> for MemorySaver<S>
where
    S: Clone + Send + Sync + 'static,
{
    async fn put(
        &self,
        config: &RunnableConfig,
        checkpoint: &Checkpoint<S>,
    ) -> Result<(), CheckpointError> {
        let thread_id = require_thread_id(config)?;
        let mut threads = self
            .threads
            .lock()
            .map_err(|_| CheckpointError::Storage("memory saver lock poisoned".to_string()))?;
        threads
            .entry(thread_id.to_string())
            .or_default()
            .push(checkpoint.clone());
        Ok(())
    }

    async fn get(&self, config: &RunnableConfig) -> Result<Option<Checkpoint<S>>, CheckpointError> {
        let thread_id = require_thread_id(config)?;
        let threads = self
            .threads
            .lock()
            .map_err(|_| CheckpointError::Storage("memory saver lock poisoned".to_string()))?;
        Ok(threads
            .get(thread_id)
            .and_then(|snapshots| snapshots.last())
            .cloned())
    }

    async fn list_thread_ids(&self) -> Result<Vec<String>, CheckpointError> {
        let threads = self
            .threads
            .lock()
            .map_err(|_| CheckpointError::Storage("memory saver lock poisoned".to_string()))?;
        let mut ids: Vec<String> = threads.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::checkpoint::CheckpointSource;

    fn cp(state: i32, step: u64) -> Checkpoint<i32> {
        Checkpoint::from_state(state, CheckpointSource::Update, step)
    }

    /// **Scenario**: save then load returns the saved state.
    #[tokio::test]
    async fn put_then_get_roundtrip() {
        let saver = MemorySaver::new();
        let config = RunnableConfig::for_thread("a");
        saver.put(&config, &cp(1, 0)).await.unwrap();
        let loaded = saver.get(&config).await.unwrap().unwrap();
        assert_eq!(loaded.channel_values, 1);
    }

    /// **Scenario**: repeated saves for one thread: latest wins.
    #[tokio::test]
    async fn latest_snapshot_wins() {
        let saver = MemorySaver::new();
        let config = RunnableConfig::for_thread("a");
        saver.put(&config, &cp(1, 0)).await.unwrap();
        saver.put(&config, &cp(2, 1)).await.unwrap();
        let loaded = saver.get(&config).await.unwrap().unwrap();
        assert_eq!(loaded.channel_values, 2);
    }

    /// **Scenario**: load twice without an intervening save returns identical states.
    #[tokio::test]
    async fn get_is_idempotent() {
        let saver = MemorySaver::new();
        let config = RunnableConfig::for_thread("a");
        saver.put(&config, &cp(7, 0)).await.unwrap();
        let first = saver.get(&config).await.unwrap().unwrap();
        let second = saver.get(&config).await.unwrap().unwrap();
        assert_eq!(first.channel_values, second.channel_values);
        assert_eq!(first.id, second.id);
    }

    /// **Scenario**: unknown thread id loads as None.
    #[tokio::test]
    async fn get_unknown_thread_is_none() {
        let saver = MemorySaver::<i32>::new();
        let config = RunnableConfig::for_thread("missing");
        assert!(saver.get(&config).await.unwrap().is_none());
    }

    /// **Scenario**: saving under ids {"a","b","a"} lists exactly {"a","b"}.
    #[tokio::test]
    async fn list_thread_ids_deduplicates() {
        let saver = MemorySaver::new();
        for id in ["a", "b", "a"] {
            let config = RunnableConfig::for_thread(id);
            saver.put(&config, &cp(0, 0)).await.unwrap();
        }
        let ids = saver.list_thread_ids().await.unwrap();
        assert_eq!(ids, vec!["a".to_string(), "b".to_string()]);
    }
}

//! SQLite-backed checkpointer (feature `sqlite`).
//!
//! One row per snapshot; the latest snapshot for a thread is the row with
//! the highest insertion id. The connection is shared behind a mutex, so a
//! single saver may be used from concurrent turns on different threads;
//! writes for the same thread id are last-write-wins.

use std::marker::PhantomData;
use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};

use crate::memory::checkpoint::{Checkpoint, CheckpointMetadata, CheckpointSource};
use crate::memory::checkpointer::{require_thread_id, CheckpointError, Checkpointer};
use crate::memory::config::RunnableConfig;
use crate::memory::serializer::{JsonSerializer, Serializer};

/// File-backed checkpointer over SQLite, using [`JsonSerializer`] for state.
pub struct SqliteSaver<S> {
    conn: Mutex<Connection>,
    serializer: JsonSerializer,
    _state: PhantomData<fn() -> S>,
}

impl<S> SqliteSaver<S>
where
    S: Clone + Send + Sync + 'static + serde::Serialize + serde::de::DeserializeOwned,
{
    /// Opens (or creates) the database at `path` and ensures the schema.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CheckpointError> {
        let conn = Connection::open(path).map_err(storage)?;
        Self::with_connection(conn)
    }

    /// In-memory database; useful in tests that want real SQL without a file.
    pub fn in_memory() -> Result<Self, CheckpointError> {
        let conn = Connection::open_in_memory().map_err(storage)?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self, CheckpointError> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS checkpoints (
                 id            INTEGER PRIMARY KEY AUTOINCREMENT,
                 thread_id     TEXT NOT NULL,
                 checkpoint_id TEXT NOT NULL,
                 ts            TEXT NOT NULL,
                 source        TEXT NOT NULL,
                 step          INTEGER NOT NULL,
                 state         BLOB NOT NULL
             );
             CREATE INDEX IF NOT EXISTS idx_checkpoints_thread
                 ON checkpoints (thread_id, id);",
        )
        .map_err(storage)?;
        Ok(Self {
            conn: Mutex::new(conn),
            serializer: JsonSerializer,
            _state: PhantomData,
        })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, CheckpointError> {
        self.conn
            .lock()
            .map_err(|_| CheckpointError::Storage("sqlite connection lock poisoned".to_string()))
    }
}

fn storage(e: rusqlite::Error) -> CheckpointError {
    CheckpointError::Storage(e.to_string())
}

#[async_trait]
impl<S> Checkpointer<S> for SqliteSaver<S>
where
    S: Clone + Send + Sync + 'static + serde::Serialize + serde::de::DeserializeOwned,
{
    async fn put(
        &self,
        config: &RunnableConfig,
        checkpoint: &Checkpoint<S>,
    ) -> Result<(), CheckpointError> {
        let thread_id = require_thread_id(config)?;
        let state = self.serializer.serialize(&checkpoint.channel_values)?;
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO checkpoints (thread_id, checkpoint_id, ts, source, step, state)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                thread_id,
                checkpoint.id,
                checkpoint.ts,
                checkpoint.metadata.source.as_str(),
                checkpoint.metadata.step as i64,
                state,
            ],
        )
        .map_err(storage)?;
        Ok(())
    }

    async fn get(&self, config: &RunnableConfig) -> Result<Option<Checkpoint<S>>, CheckpointError> {
        let thread_id = require_thread_id(config)?;
        let conn = self.lock()?;
        let row = conn
            .query_row(
                "SELECT checkpoint_id, ts, source, step, state
                 FROM checkpoints WHERE thread_id = ?1
                 ORDER BY id DESC LIMIT 1",
                params![thread_id],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, i64>(3)?,
                        row.get::<_, Vec<u8>>(4)?,
                    ))
                },
            )
            .optional()
            .map_err(storage)?;

        let Some((checkpoint_id, ts, source, step, state)) = row else {
            return Ok(None);
        };
        let channel_values = self.serializer.deserialize(&state)?;
        Ok(Some(Checkpoint {
            id: checkpoint_id,
            ts,
            channel_values,
            metadata: CheckpointMetadata {
                source: CheckpointSource::parse(&source),
                step: step as u64,
                created_at: None,
            },
        }))
    }

    async fn list_thread_ids(&self) -> Result<Vec<String>, CheckpointError> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare("SELECT DISTINCT thread_id FROM checkpoints ORDER BY thread_id")
            .map_err(storage)?;
        let ids = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(storage)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(storage)?;
        Ok(ids)
    }
}

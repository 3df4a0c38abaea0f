//! Checkpointing: per-thread durable snapshots of conversation state.
//!
//! A [`Checkpointer`] keys snapshots by thread id. `put` records a new latest
//! snapshot (latest wins, safe to call repeatedly), `get` returns the latest
//! or `None` for an unknown thread, and `list_thread_ids` returns every id
//! ever saved, each exactly once. Different thread ids may be saved and
//! loaded concurrently; racing saves for the *same* id are last-write-wins.
//!
//! | Type            | Persistence | Use case                | Feature  |
//! |-----------------|-------------|-------------------------|----------|
//! | [`MemorySaver`] | In-memory   | Dev, tests              | —        |
//! | [`SqliteSaver`] | SQLite file | Single-node, production | `sqlite` |
//!
//! [`JsonSerializer`] is required by `SqliteSaver` (state must be
//! `Serialize + DeserializeOwned`); `MemorySaver` stores snapshots directly.

mod checkpoint;
mod checkpointer;
mod config;
mod memory_saver;
mod serializer;

#[cfg(feature = "sqlite")]
mod sqlite_saver;

pub use checkpoint::{Checkpoint, CheckpointMetadata, CheckpointSource};
pub use checkpointer::{CheckpointError, Checkpointer};
pub use config::{RunnableConfig, DEFAULT_RECURSION_LIMIT};
pub use memory_saver::MemorySaver;
pub use serializer::{JsonSerializer, Serializer};

#[cfg(feature = "sqlite")]
pub use sqlite_saver::SqliteSaver;

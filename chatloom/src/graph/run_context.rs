//! Run context passed into nodes for streaming-aware execution.

use std::collections::HashSet;
use std::fmt::Debug;

use tokio::sync::mpsc;

use crate::memory::RunnableConfig;
use crate::stream::{StreamEvent, StreamMode};

/// Per-run context handed to `Node::run_with_context`.
#[derive(Clone)]
pub struct RunContext<S>
where
    S: Clone + Send + Sync + Debug + 'static,
{
    /// Config for the current run (thread_id, recursion_limit).
    pub config: RunnableConfig,
    /// Sender for streaming events; `None` on non-streaming invokes.
    pub stream_tx: Option<mpsc::Sender<StreamEvent<S>>>,
    /// Enabled stream modes (Values, Updates, Messages).
    pub stream_mode: HashSet<StreamMode>,
}

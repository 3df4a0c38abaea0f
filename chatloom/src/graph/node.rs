//! Node trait: one graph step, state-in, state-out.

use std::fmt::Debug;

use async_trait::async_trait;

use crate::error::AgentError;
use crate::graph::RunContext;

/// One step in a state graph: receives the state, returns the updated state.
///
/// Routing lives on the graph (direct edges and routers), not on the node;
/// a node only transforms state. Implementations: `ChatNode` (completion),
/// `ToolNode` (tool dispatch).
#[async_trait]
pub trait Node<S>: Send + Sync
where
    S: Clone + Send + Sync + Debug + 'static,
{
    /// Stable id used in edges and stream events.
    fn id(&self) -> &str;

    async fn run(&self, state: S) -> Result<S, AgentError>;

    /// Streaming-aware variant; defaults to `run`. Nodes that can emit
    /// incremental output (e.g. `ChatNode` forwarding completion chunks)
    /// override this and inspect `ctx.stream_mode`.
    async fn run_with_context(&self, state: S, _ctx: &RunContext<S>) -> Result<S, AgentError> {
        self.run(state).await
    }
}

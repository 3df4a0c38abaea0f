//! Graph compilation error.

use thiserror::Error;

/// Error when compiling a state graph.
///
/// Returned by `StateGraph::compile()`. Validation ensures every edge
/// endpoint (except START/END) is a registered node, exactly one edge leaves
/// START, each node has exactly one outgoing edge, and no node is left
/// without a way forward. Router targets are validated at run time, since a
/// router is an opaque function.
#[derive(Debug, Error)]
pub enum CompilationError {
    /// An edge endpoint was not registered via `add_node` (and is not START/END).
    #[error("node not found: {0}")]
    NodeNotFound(String),

    /// No direct edge from START, or more than one edge from START.
    #[error("graph must have exactly one direct edge from START")]
    MissingStart,

    /// A registered node has no outgoing edge; invoke could never leave it.
    #[error("node has no outgoing edge: {0}")]
    DeadEnd(String),

    /// More than one outgoing edge was declared for the same node.
    #[error("node has conflicting outgoing edges: {0}")]
    ConflictingEdges(String),
}

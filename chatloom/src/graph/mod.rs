//! State graph: nodes + edges (direct and conditional), compile and invoke.
//!
//! Add nodes with `add_node`, wire them with `add_edge(from, to)` and
//! `add_conditional_edges(from, router)` using `START` and `END` for graph
//! entry/exit, then `compile` or `compile_with_checkpointer` to get a
//! `CompiledStateGraph`. Cycles are legal; runs are bounded by
//! `RunnableConfig::recursion_limit`.

mod compile_error;
mod compiled;
mod node;
mod run_context;
mod state_graph;

pub use compile_error::CompilationError;
pub use compiled::CompiledStateGraph;
pub use node::Node;
pub use run_context::RunContext;
pub use state_graph::{Router, StateGraph, END, START};

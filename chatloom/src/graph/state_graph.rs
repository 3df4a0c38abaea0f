//! State graph builder: nodes plus direct and conditional edges.
//!
//! Direct edges (`add_edge`) name their target up front; conditional edges
//! (`add_conditional_edges`) defer the choice to a router function that
//! inspects the state after the node ran. This is what lets the chat graph
//! loop: chat → (router) → tools → chat, until the router picks `END`.

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

use crate::graph::compile_error::CompilationError;
use crate::graph::compiled::{CompiledStateGraph, Edge};
use crate::graph::node::Node;
use crate::memory::Checkpointer;

/// Sentinel for graph entry: use as `from` in `add_edge(START, first_node)`.
pub const START: &str = "__start__";

/// Sentinel for graph exit: a direct edge target or router return value.
pub const END: &str = "__end__";

/// Router for a conditional edge: reads the state a node just produced and
/// returns the next node id, or [`END`].
pub type Router<S> = Arc<dyn Fn(&S) -> String + Send + Sync>;

/// State graph builder. Generic over the state type `S`.
///
/// Build with `add_node` / `add_edge` / `add_conditional_edges`, then
/// `compile()` or `compile_with_checkpointer()` to obtain an executable
/// graph. Each node has exactly one outgoing edge (direct or conditional);
/// cycles are allowed and bounded at run time by the recursion limit.
///
/// **Interaction**: accepts `Arc<dyn Node<S>>`; produces `CompiledStateGraph<S>`.
pub struct StateGraph<S> {
    nodes: HashMap<String, Arc<dyn Node<S>>>,
    edges: Vec<(String, Edge<S>)>,
}

impl<S> Default for StateGraph<S>
where
    S: Clone + Send + Sync + Debug + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<S> StateGraph<S>
where
    S: Clone + Send + Sync + Debug + 'static,
{
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            edges: Vec::new(),
        }
    }

    /// Adds a node; id must be unique. Replaces if same id.
    pub fn add_node(&mut self, id: impl Into<String>, node: Arc<dyn Node<S>>) -> &mut Self {
        self.nodes.insert(id.into(), node);
        self
    }

    /// Adds a direct edge from `from` to `to`. Use `START` for graph entry
    /// and `END` for graph exit.
    pub fn add_edge(&mut self, from: impl Into<String>, to: impl Into<String>) -> &mut Self {
        self.edges.push((from.into(), Edge::Direct(to.into())));
        self
    }

    /// Adds a conditional edge from `from`: after the node runs, `router`
    /// picks the next node id (or `END`) from the updated state.
    pub fn add_conditional_edges(
        &mut self,
        from: impl Into<String>,
        router: impl Fn(&S) -> String + Send + Sync + 'static,
    ) -> &mut Self {
        self.edges
            .push((from.into(), Edge::Conditional(Arc::new(router))));
        self
    }

    /// Builds the executable graph without persistence.
    pub fn compile(self) -> Result<CompiledStateGraph<S>, CompilationError> {
        self.compile_internal(None)
    }

    /// Builds the executable graph with a checkpointer. When `invoke(state,
    /// config)` runs with `config.thread_id` set, the final state is saved
    /// after the turn completes.
    pub fn compile_with_checkpointer(
        self,
        checkpointer: Arc<dyn Checkpointer<S>>,
    ) -> Result<CompiledStateGraph<S>, CompilationError> {
        self.compile_internal(Some(checkpointer))
    }

    fn compile_internal(
        self,
        checkpointer: Option<Arc<dyn Checkpointer<S>>>,
    ) -> Result<CompiledStateGraph<S>, CompilationError> {
        for (from, edge) in &self.edges {
            if from != START && !self.nodes.contains_key(from) {
                return Err(CompilationError::NodeNotFound(from.clone()));
            }
            if let Edge::Direct(to) = edge {
                if to != END && !self.nodes.contains_key(to) {
                    return Err(CompilationError::NodeNotFound(to.clone()));
                }
            }
        }

        let mut entry: Option<String> = None;
        let mut edge_map: HashMap<String, Edge<S>> = HashMap::new();
        for (from, edge) in self.edges {
            if from == START {
                let Edge::Direct(to) = edge else {
                    return Err(CompilationError::MissingStart);
                };
                if entry.replace(to).is_some() {
                    return Err(CompilationError::MissingStart);
                }
                continue;
            }
            if edge_map.insert(from.clone(), edge).is_some() {
                return Err(CompilationError::ConflictingEdges(from));
            }
        }
        let entry = entry.ok_or(CompilationError::MissingStart)?;

        for id in self.nodes.keys() {
            if !edge_map.contains_key(id) {
                return Err(CompilationError::DeadEnd(id.clone()));
            }
        }

        Ok(CompiledStateGraph {
            nodes: self.nodes,
            entry,
            edges: edge_map,
            checkpointer,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    use crate::error::AgentError;

    #[derive(Clone)]
    struct AddNode {
        id: &'static str,
        delta: i32,
    }

    #[async_trait]
    impl Node<i32> for AddNode {
        fn id(&self) -> &str {
            self.id
        }

        async fn run(&self, state: i32) -> Result<i32, AgentError> {
            Ok(state + self.delta)
        }
    }

    /// **Scenario**: Edge to an unregistered node fails with NodeNotFound.
    #[test]
    fn compile_unknown_edge_target_fails() {
        let mut graph = StateGraph::<i32>::new();
        graph.add_node("a", Arc::new(AddNode { id: "a", delta: 1 }));
        graph.add_edge(START, "a");
        graph.add_edge("a", "ghost");
        match graph.compile() {
            Err(CompilationError::NodeNotFound(id)) => assert_eq!(id, "ghost"),
            other => panic!("expected NodeNotFound, got {:?}", other.err()),
        }
    }

    /// **Scenario**: No edge from START fails with MissingStart.
    #[test]
    fn compile_without_start_edge_fails() {
        let mut graph = StateGraph::<i32>::new();
        graph.add_node("a", Arc::new(AddNode { id: "a", delta: 1 }));
        graph.add_edge("a", END);
        assert!(matches!(
            graph.compile(),
            Err(CompilationError::MissingStart)
        ));
    }

    /// **Scenario**: Two edges from START fail with MissingStart.
    #[test]
    fn compile_two_start_edges_fails() {
        let mut graph = StateGraph::<i32>::new();
        graph.add_node("a", Arc::new(AddNode { id: "a", delta: 1 }));
        graph.add_node("b", Arc::new(AddNode { id: "b", delta: 2 }));
        graph.add_edge(START, "a");
        graph.add_edge(START, "b");
        graph.add_edge("a", END);
        graph.add_edge("b", END);
        assert!(matches!(
            graph.compile(),
            Err(CompilationError::MissingStart)
        ));
    }

    /// **Scenario**: A node without an outgoing edge fails with DeadEnd.
    #[test]
    fn compile_dead_end_node_fails() {
        let mut graph = StateGraph::<i32>::new();
        graph.add_node("a", Arc::new(AddNode { id: "a", delta: 1 }));
        graph.add_edge(START, "a");
        match graph.compile() {
            Err(CompilationError::DeadEnd(id)) => assert_eq!(id, "a"),
            other => panic!("expected DeadEnd, got {:?}", other.err()),
        }
    }

    /// **Scenario**: Two outgoing edges for the same node fail with ConflictingEdges.
    #[test]
    fn compile_conflicting_edges_fails() {
        let mut graph = StateGraph::<i32>::new();
        graph.add_node("a", Arc::new(AddNode { id: "a", delta: 1 }));
        graph.add_edge(START, "a");
        graph.add_edge("a", END);
        graph.add_conditional_edges("a", |_| END.to_string());
        match graph.compile() {
            Err(CompilationError::ConflictingEdges(id)) => assert_eq!(id, "a"),
            other => panic!("expected ConflictingEdges, got {:?}", other.err()),
        }
    }

    /// **Scenario**: A cyclic graph (a → b → a) with a conditional escape compiles.
    #[test]
    fn compile_accepts_cycle_with_conditional_escape() {
        let mut graph = StateGraph::<i32>::new();
        graph.add_node("a", Arc::new(AddNode { id: "a", delta: 1 }));
        graph.add_node("b", Arc::new(AddNode { id: "b", delta: 2 }));
        graph.add_edge(START, "a");
        graph.add_conditional_edges("a", |s: &i32| {
            if *s < 10 {
                "b".to_string()
            } else {
                END.to_string()
            }
        });
        graph.add_edge("b", "a");
        assert!(graph.compile().is_ok());
    }
}

//! Compiled state graph: immutable, supports invoke and stream.
//!
//! Built by `StateGraph::compile` or `compile_with_checkpointer`. Steps from
//! the entry node, following direct edges and routers, until `END`. Every
//! run is bounded by `RunnableConfig::recursion_limit`; when a checkpointer
//! is attached and `config.thread_id` is set, the final state is saved after
//! the turn, and only then, so an aborted turn never touches storage.

use std::collections::{HashMap, HashSet};
use std::fmt::Debug;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, warn};

use crate::error::AgentError;
use crate::graph::state_graph::{Router, END};
use crate::graph::{Node, RunContext};
use crate::memory::{Checkpoint, CheckpointSource, Checkpointer, RunnableConfig};
use crate::stream::{StreamEvent, StreamMode};

/// One outgoing edge of a node.
pub(super) enum Edge<S> {
    Direct(String),
    Conditional(Router<S>),
}

impl<S> Clone for Edge<S> {
    fn clone(&self) -> Self {
        match self {
            Edge::Direct(to) => Edge::Direct(to.clone()),
            Edge::Conditional(router) => Edge::Conditional(Arc::clone(router)),
        }
    }
}

/// Compiled graph: immutable structure, supports invoke and stream.
///
/// Created by `StateGraph::compile()` or `compile_with_checkpointer()`.
/// The run loop walks entry → edges/routers → `END`, checking the step
/// counter against `config.recursion_limit` before each node.
pub struct CompiledStateGraph<S> {
    pub(super) nodes: HashMap<String, Arc<dyn Node<S>>>,
    pub(super) entry: String,
    pub(super) edges: HashMap<String, Edge<S>>,
    pub(super) checkpointer: Option<Arc<dyn Checkpointer<S>>>,
}

impl<S> Clone for CompiledStateGraph<S> {
    fn clone(&self) -> Self {
        Self {
            nodes: self.nodes.clone(),
            entry: self.entry.clone(),
            edges: self.edges.clone(),
            checkpointer: self.checkpointer.clone(),
        }
    }
}

impl<S> CompiledStateGraph<S>
where
    S: Clone + Send + Sync + Debug + 'static,
{
    /// Shared run loop used by invoke() and stream().
    async fn run_loop_inner(
        &self,
        state: &mut S,
        config: &RunnableConfig,
        run_ctx: Option<&RunContext<S>>,
    ) -> Result<(), AgentError> {
        let mut current = self.entry.clone();
        let mut steps: usize = 0;

        loop {
            // Client went away: abort without saving.
            if let Some(ctx) = run_ctx {
                if ctx.stream_tx.as_ref().is_some_and(|tx| tx.is_closed()) {
                    debug!("stream receiver dropped, aborting turn");
                    return Ok(());
                }
            }

            steps += 1;
            if steps > config.recursion_limit {
                warn!(limit = config.recursion_limit, "recursion limit exceeded");
                return Err(AgentError::RecursionLimitExceeded {
                    limit: config.recursion_limit,
                });
            }

            let node = self
                .nodes
                .get(&current)
                .ok_or_else(|| AgentError::ExecutionFailed(format!("unknown node: {current}")))?
                .clone();
            debug!(node = %current, step = steps, "running node");

            let current_state = state.clone();
            *state = if let Some(ctx) = run_ctx {
                node.run_with_context(current_state, ctx).await?
            } else {
                node.run(current_state).await?
            };

            if let Some(ctx) = run_ctx {
                if let Some(tx) = &ctx.stream_tx {
                    if ctx.stream_mode.contains(&StreamMode::Values) {
                        let _ = tx.send(StreamEvent::Values(state.clone())).await;
                    }
                    if ctx.stream_mode.contains(&StreamMode::Updates) {
                        let _ = tx
                            .send(StreamEvent::Updates {
                                node_id: current.clone(),
                                state: state.clone(),
                            })
                            .await;
                    }
                }
            }

            let next = match self.edges.get(&current) {
                Some(Edge::Direct(to)) => to.clone(),
                Some(Edge::Conditional(router)) => router(state),
                None => {
                    return Err(AgentError::ExecutionFailed(format!(
                        "no outgoing edge for node: {current}"
                    )))
                }
            };

            if next == END {
                self.save_checkpoint(state, config, steps as u64).await?;
                return Ok(());
            }
            if !self.nodes.contains_key(&next) {
                return Err(AgentError::ExecutionFailed(format!(
                    "router returned unknown node: {next}"
                )));
            }
            current = next;
        }
    }

    /// Saves the final state when a checkpointer and thread_id are present.
    /// Storage failures surface to the caller; nothing is retried here.
    async fn save_checkpoint(
        &self,
        state: &S,
        config: &RunnableConfig,
        step: u64,
    ) -> Result<(), AgentError> {
        if let (Some(cp), Some(_)) = (&self.checkpointer, &config.thread_id) {
            let checkpoint = Checkpoint::from_state(state.clone(), CheckpointSource::Update, step);
            cp.put(config, &checkpoint).await?;
        }
        Ok(())
    }

    /// Runs the graph to completion and returns the final state.
    ///
    /// When the graph was compiled with a checkpointer and `config.thread_id`
    /// is set, the final state is saved after the run; a save failure is
    /// returned as `AgentError::Checkpoint`. Any error means no save
    /// happened for this turn.
    pub async fn invoke(&self, state: S, config: RunnableConfig) -> Result<S, AgentError> {
        let mut state = state;
        self.run_loop_inner(&mut state, &config, None).await?;
        Ok(state)
    }

    /// Streams graph execution, emitting events via a channel-backed stream.
    ///
    /// Dropping the returned stream cancels the run before its next node;
    /// a cancelled turn does not save. A run failure is emitted as
    /// `StreamEvent::Error` before the stream closes.
    pub fn stream(
        &self,
        state: S,
        config: RunnableConfig,
        stream_mode: impl Into<HashSet<StreamMode>>,
    ) -> ReceiverStream<StreamEvent<S>> {
        let (tx, rx) = mpsc::channel(128);
        let graph = self.clone();
        let mode_set: HashSet<StreamMode> = stream_mode.into();

        tokio::spawn(async move {
            let mut state = state;
            let run_ctx = RunContext {
                config: config.clone(),
                stream_tx: Some(tx.clone()),
                stream_mode: mode_set,
            };
            if let Err(e) = graph
                .run_loop_inner(&mut state, &config, Some(&run_ctx))
                .await
            {
                let _ = tx.send(StreamEvent::Error(e.to_string())).await;
            }
        });

        ReceiverStream::new(rx)
    }
}

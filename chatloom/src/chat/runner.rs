//! Chat graph runner: one controller over graph build, checkpoint load,
//! invoke/stream, and thread listing.
//!
//! The original design had three near-duplicate graphs (plain, persisted,
//! persisted + tools); here a single runner is parameterized by an optional
//! `ToolRegistry` and a required `Checkpointer`. Used by chatloom-cli and
//! chatloom-server.

use std::collections::HashSet;
use std::sync::Arc;

use tokio_stream::StreamExt;

use crate::chat::{tools_condition, ChatNode, ToolNode, CHAT_NODE, TOOLS_NODE};
use crate::error::AgentError;
use crate::graph::{CompilationError, CompiledStateGraph, StateGraph, END, START};
use crate::llm::LlmClient;
use crate::memory::{CheckpointError, Checkpointer, RunnableConfig, DEFAULT_RECURSION_LIMIT};
use crate::message::Message;
use crate::state::ChatState;
use crate::stream::{StreamEvent, StreamMode};
use crate::tools::ToolRegistry;

/// Error type for runner invoke/stream operations.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("compilation failed: {0}")]
    Compilation(#[from] CompilationError),
    #[error("checkpoint error: {0}")]
    Checkpoint(#[from] CheckpointError),
    #[error("execution failed: {0}")]
    Execution(#[from] AgentError),
    #[error("stream ended without final state")]
    StreamEndedWithoutState,
}

/// Chat graph runner: compiled graph plus persistence.
///
/// One turn = one `invoke` (or `stream_with_callback`): load the thread's
/// latest snapshot (or start empty), append the user message, run the graph
/// until the model answers without tool calls, save, return the final state.
///
/// # Example
///
/// ```ignore
/// let runner = ChatRunner::new(llm, Some(registry), checkpointer)?;
/// let state = runner.invoke("what is 2 + 3?", "thread-1").await?;
/// println!("{}", state.last_assistant_content().unwrap_or(""));
/// ```
pub struct ChatRunner {
    compiled: CompiledStateGraph<ChatState>,
    checkpointer: Arc<dyn Checkpointer<ChatState>>,
    system_prompt: Option<String>,
    recursion_limit: usize,
}

impl ChatRunner {
    /// Builds the chat graph and compiles it with the checkpointer.
    ///
    /// With tools: chat → (router) → tools → chat, looping until the model
    /// answers without calls. Without tools (or with an empty registry):
    /// chat → END, a single completion per turn.
    ///
    /// When tools are present the `llm` should already carry their specs
    /// (e.g. `ChatOpenAI::with_tools(registry.specs())`) so the model can
    /// request them.
    pub fn new(
        llm: Box<dyn LlmClient>,
        tools: Option<Arc<ToolRegistry>>,
        checkpointer: Arc<dyn Checkpointer<ChatState>>,
    ) -> Result<Self, CompilationError> {
        let mut graph = StateGraph::<ChatState>::new();
        graph.add_node(CHAT_NODE, Arc::new(ChatNode::new(llm)));
        graph.add_edge(START, CHAT_NODE);

        match tools {
            Some(registry) if !registry.is_empty() => {
                graph.add_node(TOOLS_NODE, Arc::new(ToolNode::new(registry)));
                graph.add_conditional_edges(CHAT_NODE, tools_condition);
                graph.add_edge(TOOLS_NODE, CHAT_NODE);
            }
            _ => {
                graph.add_edge(CHAT_NODE, END);
            }
        }

        let compiled = graph.compile_with_checkpointer(checkpointer.clone())?;
        Ok(Self {
            compiled,
            checkpointer,
            system_prompt: None,
            recursion_limit: DEFAULT_RECURSION_LIMIT,
        })
    }

    /// Prepends this system message to fresh threads.
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// Overrides the per-turn step cap.
    pub fn with_recursion_limit(mut self, limit: usize) -> Self {
        self.recursion_limit = limit;
        self
    }

    fn config_for(&self, thread_id: &str) -> RunnableConfig {
        RunnableConfig {
            thread_id: Some(thread_id.to_string()),
            recursion_limit: self.recursion_limit,
        }
    }

    /// Loads the thread's latest snapshot (or starts fresh) and appends the
    /// new user message.
    async fn initial_state(
        &self,
        user_message: &str,
        config: &RunnableConfig,
    ) -> Result<ChatState, CheckpointError> {
        let mut state = match self.checkpointer.get(config).await? {
            Some(checkpoint) => checkpoint.channel_values,
            None => {
                let mut fresh = ChatState::default();
                if let Some(prompt) = &self.system_prompt {
                    fresh.add_messages(vec![Message::system(prompt.clone())]);
                }
                fresh
            }
        };
        state.add_messages(vec![Message::user(user_message)]);
        Ok(state)
    }

    /// Runs one turn and returns the final state. The answer is the state's
    /// last assistant message.
    pub async fn invoke(&self, user_message: &str, thread_id: &str) -> Result<ChatState, RunError> {
        let config = self.config_for(thread_id);
        let state = self.initial_state(user_message, &config).await?;
        Ok(self.compiled.invoke(state, config).await?)
    }

    /// Runs one turn in streaming mode; returns the final state from the
    /// last `Values` event. `on_event` sees every event (chunks, updates,
    /// snapshots) so callers can implement typewriter output or SSE relay.
    pub async fn stream_with_callback<F>(
        &self,
        user_message: &str,
        thread_id: &str,
        mut on_event: Option<F>,
    ) -> Result<ChatState, RunError>
    where
        F: FnMut(StreamEvent<ChatState>),
    {
        let config = self.config_for(thread_id);
        let state = self.initial_state(user_message, &config).await?;

        let modes = HashSet::from([StreamMode::Messages, StreamMode::Updates, StreamMode::Values]);
        let mut stream = self.compiled.stream(state, config, modes);

        let mut final_state: Option<ChatState> = None;
        while let Some(event) = stream.next().await {
            if let StreamEvent::Error(msg) = &event {
                return Err(RunError::Execution(AgentError::ExecutionFailed(
                    msg.clone(),
                )));
            }
            if let Some(ref mut f) = on_event {
                f(event.clone());
            }
            if let StreamEvent::Values(s) = event {
                final_state = Some(s);
            }
        }

        final_state.ok_or(RunError::StreamEndedWithoutState)
    }

    /// Full message history of a thread; empty for an unknown id.
    pub async fn history(&self, thread_id: &str) -> Result<ChatState, RunError> {
        let config = self.config_for(thread_id);
        Ok(self
            .checkpointer
            .get(&config)
            .await?
            .map(|checkpoint| checkpoint.channel_values)
            .unwrap_or_default())
    }

    /// Every thread id ever saved, each exactly once.
    pub async fn list_threads(&self) -> Result<Vec<String>, RunError> {
        Ok(self.checkpointer.list_thread_ids().await?)
    }
}

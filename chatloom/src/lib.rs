//! # chatloom
//!
//! A checkpointed chat graph with tool routing, **state-in, state-out**: one
//! message log flows through a two-node cycle — completion, then optional
//! tool dispatch — until the model answers without requesting tools. Every
//! finished turn is snapshotted under its thread id so conversations can be
//! resumed, listed, and branched.
//!
//! ## Design Principles
//!
//! - **Single state type**: the graph moves one [`ChatState`] (an ordered,
//!   append-only message log) through its nodes; the reducer is plain
//!   concatenation.
//! - **Tool failures are data**: an unknown tool or a failing invocation
//!   becomes an `{"error": ...}` tool result the model reads on the next
//!   completion. Only invariant violations and infrastructure failures
//!   abort a turn.
//! - **Save last**: the checkpoint is written once, after the turn
//!   completes; an aborted turn leaves the stored thread untouched.
//!
//! ## Main Modules
//!
//! - [`graph`]: `StateGraph`, `CompiledStateGraph`, `Node` — build and run
//!   state graphs with direct and conditional edges.
//! - [`chat`]: `ChatNode`, `ToolNode`, `tools_condition`, `ChatRunner` —
//!   the chat graph itself.
//! - [`llm`]: `LlmClient` trait, `MockLlm`, and `ChatOpenAI` (feature
//!   `openai`).
//! - [`tools`]: `Tool`, `ToolRegistry`, and the built-in tools (calculator,
//!   stock price, weather, web search).
//! - [`memory`]: `Checkpointer` trait, `MemorySaver`, and `SqliteSaver`
//!   (feature `sqlite`).
//! - [`stream`]: stream modes and events for incremental delivery.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use chatloom::{ChatRunner, ChatState, MemorySaver, MockLlm};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let llm = Box::new(MockLlm::new("hi"));
//! let checkpointer = Arc::new(MemorySaver::<ChatState>::new());
//! let runner = ChatRunner::new(llm, None, checkpointer)?;
//!
//! let state = runner.invoke("hello", "thread-1").await?;
//! println!("{}", state.last_assistant_content().unwrap_or(""));
//! # Ok(())
//! # }
//! ```
//!
//! ## Features
//!
//! - `sqlite` (default): persistent checkpointer backed by SQLite.
//! - `openai`: OpenAI-compatible chat completions via `async-openai`.

pub mod chat;
pub mod config;
pub mod error;
pub mod graph;
pub mod llm;
pub mod memory;
pub mod message;
pub mod state;
pub mod stream;
pub mod tools;

pub use chat::{tools_condition, ChatNode, ChatRunner, RunError, ToolNode, CHAT_NODE, TOOLS_NODE};
pub use config::ChatBuildConfig;
pub use error::AgentError;
pub use graph::{CompilationError, CompiledStateGraph, Node, Router, StateGraph, END, START};
pub use llm::{LlmClient, LlmResponse, MockLlm};
#[cfg(feature = "openai")]
pub use llm::ChatOpenAI;
pub use memory::{
    Checkpoint, CheckpointError, CheckpointMetadata, CheckpointSource, Checkpointer, JsonSerializer,
    MemorySaver, RunnableConfig, Serializer, DEFAULT_RECURSION_LIMIT,
};
#[cfg(feature = "sqlite")]
pub use memory::SqliteSaver;
pub use message::{Message, ToolCall};
pub use state::ChatState;
pub use stream::{MessageChunk, StreamEvent, StreamMetadata, StreamMode};
pub use tools::{
    CalculatorTool, StockPriceTool, Tool, ToolError, ToolRegistry, ToolSpec, WeatherTool,
    WebSearchTool,
};

//! Chat node: read the log, call the completion client, append the
//! assistant message.
//!
//! # Streaming
//!
//! `run_with_context` supports Messages streaming: when `stream_mode`
//! contains `StreamMode::Messages`, it uses `LlmClient::invoke_stream()` and
//! forwards content chunks to the stream channel as `StreamEvent::Messages`.
//! Routing still happens on the fully assembled message.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::AgentError;
use crate::graph::{Node, RunContext};
use crate::llm::LlmClient;
use crate::message::Message;
use crate::state::ChatState;
use crate::stream::{MessageChunk, StreamEvent, StreamMetadata, StreamMode};

use super::CHAT_NODE;

/// Completion node: one step that appends one assistant message.
///
/// **Interaction**: implements `Node<ChatState>`; consumes an `LlmClient`
/// (e.g. `MockLlm` or `ChatOpenAI`). Whether the turn continues into tool
/// dispatch is decided by the router, not here.
pub struct ChatNode {
    llm: Box<dyn LlmClient>,
}

impl ChatNode {
    pub fn new(llm: Box<dyn LlmClient>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl Node<ChatState> for ChatNode {
    fn id(&self) -> &str {
        CHAT_NODE
    }

    async fn run(&self, state: ChatState) -> Result<ChatState, AgentError> {
        let response = self.llm.invoke(&state.messages).await?;
        let mut state = state;
        state.add_messages(vec![Message::assistant_with_calls(
            response.content,
            response.tool_calls,
        )]);
        Ok(state)
    }

    async fn run_with_context(
        &self,
        state: ChatState,
        ctx: &RunContext<ChatState>,
    ) -> Result<ChatState, AgentError> {
        let should_stream =
            ctx.stream_mode.contains(&StreamMode::Messages) && ctx.stream_tx.is_some();

        let response = if should_stream {
            let (chunk_tx, mut chunk_rx) = mpsc::channel::<MessageChunk>(128);
            let stream_tx = ctx.stream_tx.clone().expect("checked above");
            let node_id = self.id().to_string();

            // Forward chunks while the completion is still in flight.
            let forward_task = tokio::spawn(async move {
                while let Some(chunk) = chunk_rx.recv().await {
                    let event = StreamEvent::Messages {
                        chunk,
                        metadata: StreamMetadata {
                            node_id: node_id.clone(),
                        },
                    };
                    let _ = stream_tx.send(event).await;
                }
            });

            let result = self
                .llm
                .invoke_stream(&state.messages, Some(chunk_tx))
                .await;

            // chunk_tx is dropped by invoke_stream; wait for the forwarder to drain.
            let _ = forward_task.await;

            result?
        } else {
            self.llm.invoke(&state.messages).await?
        };

        let mut state = state;
        state.add_messages(vec![Message::assistant_with_calls(
            response.content,
            response.tool_calls,
        )]);
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    use crate::llm::MockLlm;
    use crate::memory::RunnableConfig;

    /// **Scenario**: run appends exactly one assistant message with the
    /// client's content.
    #[tokio::test]
    async fn run_appends_assistant_message() {
        let node = ChatNode::new(Box::new(MockLlm::new("hi")));
        let state = ChatState::new(vec![Message::user("hello")]);
        let out = node.run(state).await.unwrap();
        assert_eq!(out.messages.len(), 2);
        assert_eq!(out.last_assistant_content(), Some("hi"));
    }

    /// **Scenario**: streaming run forwards chunks that assemble to the
    /// appended assistant content.
    #[tokio::test]
    async fn run_with_context_streams_chunks() {
        let node = ChatNode::new(Box::new(MockLlm::new("hello streaming world")));
        let (tx, mut rx) = mpsc::channel(64);
        let ctx = RunContext {
            config: RunnableConfig::default(),
            stream_tx: Some(tx),
            stream_mode: HashSet::from([StreamMode::Messages]),
        };
        let state = ChatState::new(vec![Message::user("go")]);
        let out = node.run_with_context(state, &ctx).await.unwrap();
        drop(ctx);

        let mut assembled = String::new();
        while let Some(event) = rx.recv().await {
            match event {
                StreamEvent::Messages { chunk, metadata } => {
                    assert_eq!(metadata.node_id, CHAT_NODE);
                    assembled.push_str(&chunk.content);
                }
                other => panic!("unexpected event {:?}", other),
            }
        }
        assert_eq!(assembled, "hello streaming world");
        assert_eq!(out.last_assistant_content(), Some("hello streaming world"));
    }
}

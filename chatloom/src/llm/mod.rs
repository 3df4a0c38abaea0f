//! LLM client abstraction for the chat node.
//!
//! One completion interface: `invoke` returns the assembled assistant
//! message; `invoke_stream` delivers the same result with content chunks
//! forwarded along the way. Implementations: `MockLlm` (scripted, offline)
//! and `ChatOpenAI` (real API, feature `openai`).

mod mock;

#[cfg(feature = "openai")]
mod openai;

pub use mock::MockLlm;

#[cfg(feature = "openai")]
pub use openai::ChatOpenAI;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::AgentError;
use crate::message::{Message, ToolCall};
use crate::stream::MessageChunk;

/// Response from one completion: assistant text and requested tool calls.
///
/// **Interaction**: returned by `LlmClient::invoke()`; `ChatNode` turns it
/// into one assistant message. Empty `tool_calls` routes the turn to END.
#[derive(Debug, Clone)]
pub struct LlmResponse {
    /// Assistant message content (plain text).
    pub content: String,
    /// Tool calls requested this turn; empty means answer directly.
    pub tool_calls: Vec<ToolCall>,
}

/// Completion client: messages in, one assistant message out.
///
/// Tool descriptors are configured on the client (builder-style), not passed
/// per call; `ChatNode` only hands over the log.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// One completion turn over the full log.
    async fn invoke(&self, messages: &[Message]) -> Result<LlmResponse, AgentError>;

    /// Streaming delivery of the same completion: content chunks are sent to
    /// `chunk_tx` as they arrive, and the fully assembled response is
    /// returned. Tool-call metadata arrives only with the returned response,
    /// never inside chunks. Default falls back to `invoke` with the whole
    /// content as one chunk.
    async fn invoke_stream(
        &self,
        messages: &[Message],
        chunk_tx: Option<mpsc::Sender<MessageChunk>>,
    ) -> Result<LlmResponse, AgentError> {
        let response = self.invoke(messages).await?;
        if let Some(tx) = chunk_tx {
            if !response.content.is_empty() {
                let _ = tx
                    .send(MessageChunk {
                        content: response.content.clone(),
                    })
                    .await;
            }
        }
        Ok(response)
    }
}

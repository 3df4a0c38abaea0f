//! Mock LlmClient for tests and offline runs.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::AgentError;
use crate::llm::{LlmClient, LlmResponse};
use crate::message::Message;
use crate::stream::MessageChunk;

/// Scripted completion client: pops one queued response per invoke; once the
/// script is exhausted, answers with a fixed fallback and no tool calls.
///
/// Streaming splits the content on word boundaries so chunk assembly is
/// exercised the way a real client would.
///
/// **Interaction**: implements `LlmClient`; used by `ChatNode` in tests and
/// by the CLI's `--mock` mode.
pub struct MockLlm {
    script: Mutex<VecDeque<LlmResponse>>,
    fallback: String,
}

impl MockLlm {
    /// Client that always answers `text` with no tool calls.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback: text.into(),
        }
    }

    /// Client that plays `responses` in order, then falls back to a fixed
    /// "script exhausted" answer.
    pub fn scripted(responses: Vec<LlmResponse>) -> Self {
        Self {
            script: Mutex::new(responses.into()),
            fallback: "script exhausted".to_string(),
        }
    }

    fn next_response(&self) -> Result<LlmResponse, AgentError> {
        let mut script = self
            .script
            .lock()
            .map_err(|_| AgentError::Completion("mock script lock poisoned".to_string()))?;
        Ok(script.pop_front().unwrap_or_else(|| LlmResponse {
            content: self.fallback.clone(),
            tool_calls: Vec::new(),
        }))
    }
}

#[async_trait]
impl LlmClient for MockLlm {
    async fn invoke(&self, _messages: &[Message]) -> Result<LlmResponse, AgentError> {
        self.next_response()
    }

    async fn invoke_stream(
        &self,
        _messages: &[Message],
        chunk_tx: Option<mpsc::Sender<MessageChunk>>,
    ) -> Result<LlmResponse, AgentError> {
        let response = self.next_response()?;
        if let Some(tx) = chunk_tx {
            for part in response.content.split_inclusive(' ') {
                let _ = tx
                    .send(MessageChunk {
                        content: part.to_string(),
                    })
                    .await;
            }
        }
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    use crate::message::ToolCall;

    /// **Scenario**: fixed mock always returns the same content.
    #[tokio::test]
    async fn fixed_mock_repeats_answer() {
        let llm = MockLlm::new("hi");
        for _ in 0..3 {
            let r = llm.invoke(&[]).await.unwrap();
            assert_eq!(r.content, "hi");
            assert!(r.tool_calls.is_empty());
        }
    }

    /// **Scenario**: scripted mock plays responses in order, then falls back.
    #[tokio::test]
    async fn scripted_mock_plays_in_order() {
        let llm = MockLlm::scripted(vec![
            LlmResponse {
                content: String::new(),
                tool_calls: vec![ToolCall {
                    id: "1".into(),
                    name: "calculator".into(),
                    arguments: json!({}),
                }],
            },
            LlmResponse {
                content: "5".into(),
                tool_calls: vec![],
            },
        ]);
        assert_eq!(llm.invoke(&[]).await.unwrap().tool_calls.len(), 1);
        assert_eq!(llm.invoke(&[]).await.unwrap().content, "5");
        assert_eq!(llm.invoke(&[]).await.unwrap().content, "script exhausted");
    }

    /// **Scenario**: streamed chunks concatenate to the returned content.
    #[tokio::test]
    async fn stream_chunks_assemble_to_content() {
        let llm = MockLlm::new("hello streaming world");
        let (tx, mut rx) = mpsc::channel(16);
        let response = llm.invoke_stream(&[], Some(tx)).await.unwrap();
        let mut assembled = String::new();
        while let Some(chunk) = rx.recv().await {
            assembled.push_str(&chunk.content);
        }
        assert_eq!(assembled, response.content);
    }
}

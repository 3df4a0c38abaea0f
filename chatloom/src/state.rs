//! Conversation state: the per-thread, append-only message log.
//!
//! The reducer for incoming batches is list concatenation (`add_messages`):
//! no deduplication, no reordering. The controller always appends
//! strictly-new messages, so replace-by-id semantics are not needed.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::AgentError;
use crate::message::{Message, ToolCall};

/// State flowing through the chat graph: an ordered message log.
///
/// One `ChatState` per conversation thread. The graph holds the in-memory
/// working copy during a turn; the checkpointer owns the durable copy.
///
/// **Interaction**: read and extended by `ChatNode` / `ToolNode`; snapshotted
/// whole by `Checkpointer::put` at the end of a successful turn.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatState {
    pub messages: Vec<Message>,
}

impl ChatState {
    pub fn new(messages: Vec<Message>) -> Self {
        Self { messages }
    }

    /// Appends a batch to the log. Concatenation only: the result is the old
    /// log followed by `batch`, in order.
    pub fn add_messages(&mut self, batch: Vec<Message>) {
        self.messages.extend(batch);
    }

    /// Tool calls requested by the last message, when it is an assistant
    /// message. Empty otherwise, including when the last assistant message
    /// answered directly.
    pub fn pending_tool_calls(&self) -> &[ToolCall] {
        match self.messages.last() {
            Some(Message::Assistant { tool_calls, .. }) => tool_calls,
            _ => &[],
        }
    }

    /// Content of the last assistant message, if any.
    pub fn last_assistant_content(&self) -> Option<&str> {
        self.messages.iter().rev().find_map(|m| match m {
            Message::Assistant { content, .. } => Some(content.as_str()),
            _ => None,
        })
    }

    /// Every tool-call id issued by any assistant message in the log.
    pub fn issued_call_ids(&self) -> HashSet<&str> {
        self.messages
            .iter()
            .filter_map(|m| match m {
                Message::Assistant { tool_calls, .. } => Some(tool_calls),
                _ => None,
            })
            .flatten()
            .map(|tc| tc.id.as_str())
            .collect()
    }

    /// Appends tool results, enforcing the call-id invariant: every result
    /// must reference an id issued by a preceding assistant message.
    ///
    /// All-or-nothing: on `MalformedToolResult` the log is left unmodified.
    /// Non-tool messages in `results` are rejected the same way.
    pub fn append_tool_results(&mut self, results: Vec<Message>) -> Result<(), AgentError> {
        let issued = self.issued_call_ids();
        for msg in &results {
            match msg {
                Message::Tool { tool_call_id, .. } if issued.contains(tool_call_id.as_str()) => {}
                Message::Tool { tool_call_id, .. } => {
                    return Err(AgentError::MalformedToolResult(tool_call_id.clone()))
                }
                other => {
                    return Err(AgentError::ExecutionFailed(format!(
                        "expected tool result, got {} message",
                        other.role()
                    )))
                }
            }
        }
        self.messages.extend(results);
        Ok(())
    }
}

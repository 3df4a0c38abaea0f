//! Message types: the closed tagged union every log entry belongs to.
//!
//! Four roles: system, user, assistant (optionally carrying tool calls), and
//! tool (one result per dispatched call). Messages are immutable once appended
//! to a [`ChatState`](crate::state::ChatState); serde uses the `role` tag so
//! persisted logs read like chat transcripts.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One tool invocation requested by the model.
///
/// Produced only by an `LlmClient` implementation as part of an assistant
/// message; the controller never hand-constructs these. `id` is unique within
/// the owning assistant message and is echoed back by the matching
/// `Message::Tool` result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    /// Arguments as a JSON object (name → value).
    pub arguments: Value,
}

/// One entry in a conversation log.
///
/// **Interaction**: appended by `ChatNode` (assistant) and `ToolNode` (tool
/// results); rendered by the CLI and server; persisted verbatim by the
/// checkpointer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Message {
    /// Optional conversation preamble; at most one, first in the log.
    System { content: String },
    /// One caller-submitted input.
    User { content: String },
    /// Model output. Empty `tool_calls` means "answer directly".
    Assistant {
        content: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        tool_calls: Vec<ToolCall>,
    },
    /// Result of one dispatched tool call; references the issuing call id.
    Tool {
        tool_call_id: String,
        content: String,
    },
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Message::System {
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Message::User {
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Message::Assistant {
            content: content.into(),
            tool_calls: Vec::new(),
        }
    }

    pub fn assistant_with_calls(content: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        Message::Assistant {
            content: content.into(),
            tool_calls,
        }
    }

    pub fn tool(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Message::Tool {
            tool_call_id: tool_call_id.into(),
            content: content.into(),
        }
    }

    /// Text content of the message, whatever the role.
    pub fn content(&self) -> &str {
        match self {
            Message::System { content }
            | Message::User { content }
            | Message::Assistant { content, .. }
            | Message::Tool { content, .. } => content,
        }
    }

    /// Role tag as it appears in serialized form.
    pub fn role(&self) -> &'static str {
        match self {
            Message::System { .. } => "system",
            Message::User { .. } => "user",
            Message::Assistant { .. } => "assistant",
            Message::Tool { .. } => "tool",
        }
    }
}

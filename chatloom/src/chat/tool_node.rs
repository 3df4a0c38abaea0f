//! Tool node: dispatch every pending tool call, append one result each.
//!
//! Dispatch failures are data: an unknown name or a failing tool becomes an
//! `{"error": ...}` result the model reads on the next completion. Only the
//! call-id invariant is fatal: a result for a call that was never issued
//! aborts the turn with `MalformedToolResult` and leaves the log unmodified.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, warn};

use crate::error::AgentError;
use crate::graph::Node;
use crate::message::Message;
use crate::state::ChatState;
use crate::tools::ToolRegistry;

use super::TOOLS_NODE;

/// Tool-dispatch node: one step that resolves every call the last assistant
/// message requested.
///
/// Calls run in declared order; each dispatch is independent and does not
/// see the other calls' results. Results are appended in the same order.
///
/// **Interaction**: implements `Node<ChatState>`; consumes a `ToolRegistry`.
pub struct ToolNode {
    registry: Arc<ToolRegistry>,
}

impl ToolNode {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl Node<ChatState> for ToolNode {
    fn id(&self) -> &str {
        TOOLS_NODE
    }

    async fn run(&self, state: ChatState) -> Result<ChatState, AgentError> {
        let calls = state.pending_tool_calls().to_vec();
        let mut results = Vec::with_capacity(calls.len());

        for call in &calls {
            debug!(tool = %call.name, call_id = %call.id, "dispatching tool call");
            let payload = match self
                .registry
                .dispatch(&call.name, call.arguments.clone())
                .await
            {
                Ok(value) => value,
                Err(e) => {
                    warn!(tool = %call.name, error = %e, "tool call failed");
                    json!({ "error": e.to_string() })
                }
            };
            results.push(Message::tool(call.id.clone(), payload.to_string()));
        }

        let mut state = state;
        state.append_tool_results(results)?;
        Ok(state)
    }
}

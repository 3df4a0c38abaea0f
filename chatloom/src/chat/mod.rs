//! Chat graph nodes and runner.
//!
//! Two nodes implementing `Node<ChatState>`, completion and tool dispatch,
//! wired as chat → (router) → tools → chat. The router sends the turn to the
//! tool node only when the last assistant message requested calls; otherwise
//! the turn is complete.

mod chat_node;
mod runner;
mod tool_node;

pub use chat_node::ChatNode;
pub use runner::{ChatRunner, RunError};
pub use tool_node::ToolNode;

use crate::graph::END;
use crate::state::ChatState;

/// Node id of the completion node.
pub const CHAT_NODE: &str = "chat";

/// Node id of the tool-dispatch node.
pub const TOOLS_NODE: &str = "tools";

/// Routes after the chat node: `"tools"` when the last assistant message
/// requested tool calls, [`END`] otherwise.
pub fn tools_condition(state: &ChatState) -> String {
    if state.pending_tool_calls().is_empty() {
        END.to_string()
    } else {
        TOOLS_NODE.to_string()
    }
}

//! Turn execution error types.
//!
//! Used by `Node::run` and the compiled graph's invoke/stream loop. Tool-level
//! failures are not here: they are encoded into the conversation as tool-result
//! data (see `tools::ToolError` and `ToolNode`).

use thiserror::Error;

use crate::memory::CheckpointError;

/// Error aborting the current turn.
///
/// Returned by `Node::run` and `CompiledStateGraph::invoke`. None of these
/// variants corrupt previously saved state: the checkpoint is only written
/// after a turn completes successfully.
#[derive(Debug, Error)]
pub enum AgentError {
    /// The completion call failed (API error, no choices, bad request).
    #[error("completion failed: {0}")]
    Completion(String),

    /// A tool result referenced a call id never issued by a preceding
    /// assistant message. The log is left unmodified.
    #[error("tool result references unknown call id: {0}")]
    MalformedToolResult(String),

    /// The completion/tool round-trip cap was hit before the model stopped
    /// requesting tools.
    #[error("recursion limit of {limit} steps exceeded")]
    RecursionLimitExceeded { limit: usize },

    /// Saving or loading the thread checkpoint failed.
    #[error("checkpoint error: {0}")]
    Checkpoint(#[from] CheckpointError),

    /// Execution failed with a message (e.g. router returned an unknown node).
    #[error("execution failed: {0}")]
    ExecutionFailed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: Display of Completion contains "completion failed" and the message.
    #[test]
    fn agent_error_display_completion() {
        let err = AgentError::Completion("boom".to_string());
        let s = err.to_string();
        assert!(s.contains("completion failed"), "{}", s);
        assert!(s.contains("boom"), "{}", s);
    }

    /// **Scenario**: Display of RecursionLimitExceeded names the limit.
    #[test]
    fn agent_error_display_recursion_limit() {
        let err = AgentError::RecursionLimitExceeded { limit: 25 };
        assert!(err.to_string().contains("25"), "{}", err);
    }

    /// **Scenario**: CheckpointError converts into AgentError::Checkpoint via From.
    #[test]
    fn agent_error_from_checkpoint_error() {
        let err: AgentError = CheckpointError::Storage("disk full".to_string()).into();
        match &err {
            AgentError::Checkpoint(CheckpointError::Storage(msg)) => {
                assert!(msg.contains("disk full"))
            }
            other => panic!("expected Checkpoint variant, got {:?}", other),
        }
    }

    /// **Scenario**: Debug format includes the variant name.
    #[test]
    fn agent_error_debug_format() {
        let err = AgentError::MalformedToolResult("call-9".to_string());
        let s = format!("{:?}", err);
        assert!(s.contains("MalformedToolResult"), "{}", s);
        assert!(s.contains("call-9"), "{}", s);
    }
}

//! Invoke config: thread id and the per-turn round-trip cap.

/// Default cap on graph steps per turn. One completion/tool round-trip costs
/// two steps, so this allows a dozen tool exchanges before the turn aborts.
pub const DEFAULT_RECURSION_LIMIT: usize = 25;

/// Config for a single invoke. Identifies the thread and bounds the run.
///
/// **Interaction**: passed to `CompiledStateGraph::invoke(state, config)` and
/// `Checkpointer::put` / `get`.
#[derive(Debug, Clone)]
pub struct RunnableConfig {
    /// Unique id for this conversation thread. Required for persistence;
    /// `None` runs the turn without saving.
    pub thread_id: Option<String>,
    /// Maximum graph steps per turn. A model that keeps requesting tools
    /// past this bound aborts the turn with `RecursionLimitExceeded`.
    pub recursion_limit: usize,
}

impl Default for RunnableConfig {
    fn default() -> Self {
        Self {
            thread_id: None,
            recursion_limit: DEFAULT_RECURSION_LIMIT,
        }
    }
}

impl RunnableConfig {
    /// Config for a persisted run on the given thread.
    pub fn for_thread(thread_id: impl Into<String>) -> Self {
        Self {
            thread_id: Some(thread_id.into()),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: Default has no thread id and the default limit.
    #[test]
    fn default_config() {
        let c = RunnableConfig::default();
        assert!(c.thread_id.is_none());
        assert_eq!(c.recursion_limit, DEFAULT_RECURSION_LIMIT);
    }

    /// **Scenario**: for_thread sets the id and keeps the default limit.
    #[test]
    fn for_thread_sets_id() {
        let c = RunnableConfig::for_thread("t-9");
        assert_eq!(c.thread_id.as_deref(), Some("t-9"));
        assert_eq!(c.recursion_limit, DEFAULT_RECURSION_LIMIT);
    }
}

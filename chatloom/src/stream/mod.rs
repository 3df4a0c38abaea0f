//! Streaming types for graph runs.
//!
//! Stream modes select which events `CompiledStateGraph::stream` emits:
//! full state snapshots, per-node updates, or completion chunks. Chunks are
//! delivery only: routing always happens on the fully assembled assistant
//! message, never on individual chunks.

use std::fmt::Debug;

/// Stream mode selector: which kinds of events to emit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StreamMode {
    /// Emit full state after each node completes.
    Values,
    /// Emit incremental updates with node id and state.
    Updates,
    /// Emit completion chunks as the model produces them.
    Messages,
}

/// Metadata attached to streamed message chunks.
#[derive(Clone, Debug)]
pub struct StreamMetadata {
    /// Node id that produced the chunk.
    pub node_id: String,
}

/// One chunk of streamed completion content.
#[derive(Clone, Debug)]
pub struct MessageChunk {
    pub content: String,
}

/// Event emitted while running a graph.
#[derive(Clone, Debug)]
pub enum StreamEvent<S>
where
    S: Clone + Send + Sync + Debug + 'static,
{
    /// Full state snapshot after a node finishes.
    Values(S),
    /// Incremental update with the node id and state after that node.
    Updates { node_id: String, state: S },
    /// Completion chunk emitted by a node (typewriter-style delivery).
    Messages {
        chunk: MessageChunk,
        metadata: StreamMetadata,
    },
    /// The run failed; emitted last, then the stream closes.
    Error(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    struct DummyState(i32);

    /// **Scenario**: StreamEvent variants carry expected data.
    #[test]
    fn stream_event_variants_hold_data() {
        let values = StreamEvent::Values(DummyState(1));
        match values {
            StreamEvent::Values(DummyState(v)) => assert_eq!(v, 1),
            _ => panic!("expected Values variant"),
        }

        let updates = StreamEvent::Updates {
            node_id: "chat".into(),
            state: DummyState(2),
        };
        match updates {
            StreamEvent::Updates { node_id, state } => {
                assert_eq!(node_id, "chat");
                assert_eq!(state, DummyState(2));
            }
            _ => panic!("expected Updates variant"),
        }

        let messages: StreamEvent<DummyState> = StreamEvent::Messages {
            chunk: MessageChunk {
                content: "hel".into(),
            },
            metadata: StreamMetadata {
                node_id: "chat".into(),
            },
        };
        match messages {
            StreamEvent::Messages { chunk, metadata } => {
                assert_eq!(chunk.content, "hel");
                assert_eq!(metadata.node_id, "chat");
            }
            _ => panic!("expected Messages variant"),
        }

        let error: StreamEvent<DummyState> = StreamEvent::Error("boom".into());
        match error {
            StreamEvent::Error(msg) => assert_eq!(msg, "boom"),
            _ => panic!("expected Error variant"),
        }
    }
}

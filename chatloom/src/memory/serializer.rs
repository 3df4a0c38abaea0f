//! Serializer for checkpoint state (state ↔ bytes).

use crate::memory::checkpointer::CheckpointError;

/// Encodes and decodes state for persistent checkpoint storage.
///
/// Used by `SqliteSaver`; `MemorySaver` stores `Checkpoint<S>` directly and
/// needs none.
pub trait Serializer<S>: Send + Sync
where
    S: Clone + Send + Sync + 'static,
{
    fn serialize(&self, state: &S) -> Result<Vec<u8>, CheckpointError>;
    fn deserialize(&self, bytes: &[u8]) -> Result<S, CheckpointError>;
}

/// JSON-based serializer. Requires `S: Serialize + DeserializeOwned`.
pub struct JsonSerializer;

impl<S> Serializer<S> for JsonSerializer
where
    S: Clone + Send + Sync + 'static + serde::Serialize + serde::de::DeserializeOwned,
{
    fn serialize(&self, state: &S) -> Result<Vec<u8>, CheckpointError> {
        serde_json::to_vec(state).map_err(|e| CheckpointError::Serialization(e.to_string()))
    }

    fn deserialize(&self, bytes: &[u8]) -> Result<S, CheckpointError> {
        serde_json::from_slice(bytes).map_err(|e| CheckpointError::Serialization(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Message;
    use crate::state::ChatState;

    /// **Scenario**: Serialize then deserialize yields an equal log.
    #[test]
    fn json_serializer_roundtrip() {
        let ser = JsonSerializer;
        let state = ChatState::new(vec![Message::user("hello"), Message::assistant("hi")]);
        let bytes = ser.serialize(&state).unwrap();
        let restored: ChatState = ser.deserialize(&bytes).unwrap();
        assert_eq!(state, restored);
    }

    /// **Scenario**: Invalid bytes on deserialize return Serialization.
    #[test]
    fn json_serializer_invalid_bytes_fail() {
        let ser = JsonSerializer;
        let result: Result<ChatState, _> = ser.deserialize(b"{ not valid json ]");
        match result {
            Err(CheckpointError::Serialization(msg)) => assert!(!msg.is_empty()),
            other => panic!("expected Serialization error, got {:?}", other),
        }
    }
}

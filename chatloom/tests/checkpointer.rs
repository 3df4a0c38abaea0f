//! Integration tests for the Checkpointer contract, run against every
//! backend through the trait object — what the graph actually holds.

use std::sync::Arc;

use chatloom::{
    Checkpoint, CheckpointSource, Checkpointer, ChatState, MemorySaver, Message, RunnableConfig,
};

fn snapshot(text: &str, step: u64) -> Checkpoint<ChatState> {
    Checkpoint::from_state(
        ChatState::new(vec![Message::user(text), Message::assistant("ok")]),
        CheckpointSource::Update,
        step,
    )
}

fn backends() -> Vec<(&'static str, Arc<dyn Checkpointer<ChatState>>)> {
    let mut backends: Vec<(&'static str, Arc<dyn Checkpointer<ChatState>>)> =
        vec![("memory", Arc::new(MemorySaver::<ChatState>::new()))];
    #[cfg(feature = "sqlite")]
    backends.push((
        "sqlite",
        Arc::new(chatloom::SqliteSaver::<ChatState>::in_memory().unwrap()),
    ));
    backends
}

/// **Scenario**: save(id, L) then load(id) returns a log equal to L, on
/// every backend.
#[tokio::test]
async fn save_load_roundtrip() {
    for (name, saver) in backends() {
        let config = RunnableConfig::for_thread("t1");
        let written = snapshot("hello", 0);
        saver.put(&config, &written).await.unwrap();
        let loaded = saver.get(&config).await.unwrap().unwrap();
        assert_eq!(
            loaded.channel_values, written.channel_values,
            "backend {name}"
        );
    }
}

/// **Scenario**: load twice without an intervening save returns identical
/// logs, on every backend.
#[tokio::test]
async fn load_is_idempotent() {
    for (name, saver) in backends() {
        let config = RunnableConfig::for_thread("t1");
        saver.put(&config, &snapshot("hello", 0)).await.unwrap();
        let first = saver.get(&config).await.unwrap().unwrap();
        let second = saver.get(&config).await.unwrap().unwrap();
        assert_eq!(
            first.channel_values, second.channel_values,
            "backend {name}"
        );
    }
}

/// **Scenario**: saving under {"a","b","a"} lists exactly {"a","b"}, on
/// every backend.
#[tokio::test]
async fn list_thread_ids_deduplicates() {
    for (name, saver) in backends() {
        for id in ["a", "b", "a"] {
            saver
                .put(&RunnableConfig::for_thread(id), &snapshot("x", 0))
                .await
                .unwrap();
        }
        let ids = saver.list_thread_ids().await.unwrap();
        assert_eq!(ids, vec!["a".to_string(), "b".to_string()], "backend {name}");
    }
}

/// **Scenario**: threads do not interfere — saves under one id never show
/// up under another.
#[tokio::test]
async fn threads_are_isolated() {
    for (name, saver) in backends() {
        saver
            .put(&RunnableConfig::for_thread("a"), &snapshot("for a", 0))
            .await
            .unwrap();
        saver
            .put(&RunnableConfig::for_thread("b"), &snapshot("for b", 0))
            .await
            .unwrap();
        let a = saver
            .get(&RunnableConfig::for_thread("a"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            a.channel_values.messages[0].content(),
            "for a",
            "backend {name}"
        );
    }
}

//! HTTP surface for the chat graph: thread listing, history, new-thread
//! allocation, and an SSE streaming chat endpoint.
//!
//! Routes:
//! - `GET  /threads` — saved thread ids (sidebar).
//! - `POST /threads` — allocate a fresh thread id ("new chat").
//! - `GET  /threads/{id}/messages` — renderable history (scrollback).
//! - `POST /chat` — `{thread_id, message}`; SSE of content chunks, then a
//!   final `done` event with the assembled answer.
//!
//! Configure via env: `OPENAI_API_KEY`, `OPENAI_MODEL`, `OPENAI_BASE_URL`,
//! `DB_PATH`, `LISTEN_ADDR`. Loads `.env` from the current directory or its
//! parent (workspace root when run from the crate dir).

use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use chatloom::{
    ChatBuildConfig, ChatRunner, ChatState, Message, RunError, SqliteSaver, StreamEvent,
    ToolRegistry,
};

/// Shared state for all routes.
struct AppState {
    runner: Arc<ChatRunner>,
}

/// Load .env from current directory; if not found, try parent.
fn load_dotenv() {
    if dotenv::dotenv().is_ok() {
        return;
    }
    if let Ok(cwd) = std::env::current_dir() {
        if let Some(parent) = cwd.parent() {
            let env_path = parent.join(".env");
            if env_path.is_file() {
                let _ = dotenv::from_path(env_path);
            }
        }
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,chatloom_server=debug"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn internal_error(e: RunError) -> (StatusCode, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}

#[derive(Serialize)]
struct ThreadsResponse {
    threads: Vec<String>,
}

async fn list_threads(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ThreadsResponse>, (StatusCode, String)> {
    let threads = state.runner.list_threads().await.map_err(internal_error)?;
    Ok(Json(ThreadsResponse { threads }))
}

#[derive(Serialize)]
struct NewThreadResponse {
    thread_id: String,
}

async fn new_thread() -> Json<NewThreadResponse> {
    Json(NewThreadResponse {
        thread_id: uuid::Uuid::new_v4().to_string(),
    })
}

#[derive(Serialize)]
struct RenderedMessage {
    role: &'static str,
    content: String,
}

/// Renderable scrollback: user and assistant text only, tool plumbing and
/// empty tool-call shells excluded.
fn render_history(state: &ChatState) -> Vec<RenderedMessage> {
    state
        .messages
        .iter()
        .filter_map(|m| match m {
            Message::User { content } => Some(RenderedMessage {
                role: "user",
                content: content.clone(),
            }),
            Message::Assistant { content, .. } if !content.is_empty() => Some(RenderedMessage {
                role: "assistant",
                content: content.clone(),
            }),
            _ => None,
        })
        .collect()
}

async fn thread_messages(
    State(state): State<Arc<AppState>>,
    Path(thread_id): Path<String>,
) -> Result<Json<Vec<RenderedMessage>>, (StatusCode, String)> {
    let history = state
        .runner
        .history(&thread_id)
        .await
        .map_err(internal_error)?;
    Ok(Json(render_history(&history)))
}

#[derive(Deserialize)]
struct ChatRequest {
    thread_id: String,
    message: String,
}

/// SSE chat: emits `chunk` events while the model streams, then `done` with
/// the final answer, or `error` if the turn failed.
async fn chat(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ChatRequest>,
) -> Result<Sse<UnboundedReceiverStream<Result<Event, Infallible>>>, (StatusCode, String)> {
    if request.message.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "message must not be empty".into()));
    }
    if request.thread_id.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "thread_id must not be empty".into()));
    }

    let (tx, rx) = tokio::sync::mpsc::unbounded_channel::<Result<Event, Infallible>>();
    let runner = state.runner.clone();

    tokio::spawn(async move {
        let chunk_tx = tx.clone();
        let result = runner
            .stream_with_callback(
                &request.message,
                &request.thread_id,
                Some(move |event: StreamEvent<ChatState>| {
                    if let StreamEvent::Messages { chunk, .. } = event {
                        let data = json!({ "content": chunk.content }).to_string();
                        let _ = chunk_tx.send(Ok(Event::default().event("chunk").data(data)));
                    }
                }),
            )
            .await;

        let event = match result {
            Ok(final_state) => {
                let answer = final_state.last_assistant_content().unwrap_or("");
                Event::default()
                    .event("done")
                    .data(json!({ "content": answer }).to_string())
            }
            Err(e) => Event::default()
                .event("error")
                .data(json!({ "message": e.to_string() }).to_string()),
        };
        let _ = tx.send(Ok(event));
    });

    Ok(Sse::new(UnboundedReceiverStream::new(rx)).keep_alive(KeepAlive::default()))
}

fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/threads", get(list_threads).post(new_thread))
        .route("/threads/:thread_id/messages", get(thread_messages))
        .route("/chat", post(chat))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    load_dotenv();
    init_tracing();

    let config = ChatBuildConfig::from_env();
    let api_key = config
        .openai_api_key
        .clone()
        .ok_or("OPENAI_API_KEY must be set")?;

    info!(
        model = %config.model,
        base_url = ?config.openai_base_url,
        db_path = %config.db_path,
        "runtime config loaded"
    );

    let checkpointer = Arc::new(SqliteSaver::<ChatState>::open(&config.db_path)?);
    let registry = Arc::new(ToolRegistry::builtin());

    let mut openai_config = async_openai::config::OpenAIConfig::new().with_api_key(api_key);
    if let Some(base) = &config.openai_base_url {
        // Strip trailing slash so base + "/chat/completions" never doubles up.
        openai_config = openai_config.with_api_base(base.trim_end_matches('/'));
    }
    let llm = chatloom::ChatOpenAI::with_config(openai_config, config.model.clone())
        .with_tools(registry.specs());

    let runner = ChatRunner::new(Box::new(llm), Some(registry), checkpointer)?;
    let state = Arc::new(AppState {
        runner: Arc::new(runner),
    });

    let addr = std::env::var("LISTEN_ADDR").unwrap_or_else(|_| "127.0.0.1:3000".to_string());
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(addr = %addr, "listening");
    axum::serve(listener, app(state)).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: History rendering keeps user/assistant text and drops
    /// tool plumbing and empty tool-call shells.
    #[test]
    fn render_history_filters_tool_plumbing() {
        let state = ChatState::new(vec![
            Message::user("what is 2 + 3?"),
            Message::assistant_with_calls(
                "",
                vec![chatloom::ToolCall {
                    id: "1".into(),
                    name: "calculator".into(),
                    arguments: serde_json::json!({}),
                }],
            ),
            Message::tool("1", "{\"result\":5.0}"),
            Message::assistant("5"),
        ]);
        let rendered = render_history(&state);
        assert_eq!(rendered.len(), 2);
        assert_eq!(rendered[0].role, "user");
        assert_eq!(rendered[1].role, "assistant");
        assert_eq!(rendered[1].content, "5");
    }
}

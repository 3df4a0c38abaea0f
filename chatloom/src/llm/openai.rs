//! OpenAI Chat Completions client implementing `LlmClient` (feature `openai`).
//!
//! Uses the Chat Completions API via `async_openai`. Requires
//! `OPENAI_API_KEY` (or explicit config). Set tools from
//! `ToolRegistry::specs()` to enable tool_calls in responses; the full log,
//! including assistant tool calls and tool results, is mapped into the
//! request so the model sees its own prior calls.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio_stream::StreamExt;

use crate::error::AgentError;
use crate::llm::{LlmClient, LlmResponse};
use crate::message::{Message, ToolCall};
use crate::stream::MessageChunk;
use crate::tools::ToolSpec;

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionMessageToolCall, ChatCompletionMessageToolCalls,
        ChatCompletionRequestAssistantMessage, ChatCompletionRequestMessage,
        ChatCompletionRequestSystemMessage, ChatCompletionRequestToolMessage,
        ChatCompletionRequestUserMessage, ChatCompletionTool, ChatCompletionTools,
        CreateChatCompletionRequestArgs, FunctionCall, FunctionObject,
    },
    Client,
};

/// OpenAI Chat Completions client.
///
/// Uses `OPENAI_API_KEY` from the environment by default; or provide config
/// via `ChatOpenAI::with_config` (custom key or base URL).
///
/// **Interaction**: implements `LlmClient`; used by `ChatNode`.
pub struct ChatOpenAI {
    client: Client<OpenAIConfig>,
    model: String,
    tools: Option<Vec<ToolSpec>>,
    temperature: Option<f32>,
}

impl ChatOpenAI {
    /// Build client with default config (API key from `OPENAI_API_KEY` env).
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            model: model.into(),
            tools: None,
            temperature: None,
        }
    }

    /// Build client with custom config (e.g. custom API key or base URL).
    pub fn with_config(config: OpenAIConfig, model: impl Into<String>) -> Self {
        Self {
            client: Client::with_config(config),
            model: model.into(),
            tools: None,
            temperature: None,
        }
    }

    /// Set tools for completions (enables tool_calls in responses).
    pub fn with_tools(mut self, tools: Vec<ToolSpec>) -> Self {
        self.tools = Some(tools);
        self
    }

    /// Set temperature (0–2). Lower values are more deterministic.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Convert the log to OpenAI request messages, tool plumbing included.
    fn messages_to_request(messages: &[Message]) -> Vec<ChatCompletionRequestMessage> {
        messages
            .iter()
            .map(|m| match m {
                Message::System { content } => ChatCompletionRequestMessage::System(
                    ChatCompletionRequestSystemMessage::from(content.as_str()),
                ),
                Message::User { content } => ChatCompletionRequestMessage::User(
                    ChatCompletionRequestUserMessage::from(content.as_str()),
                ),
                Message::Assistant {
                    content,
                    tool_calls,
                } if tool_calls.is_empty() => {
                    ChatCompletionRequestMessage::Assistant((content.as_str()).into())
                }
                Message::Assistant {
                    content,
                    tool_calls,
                } => {
                    let calls: Vec<ChatCompletionMessageToolCalls> = tool_calls
                        .iter()
                        .map(|tc| {
                            ChatCompletionMessageToolCalls::Function(
                                ChatCompletionMessageToolCall {
                                    id: tc.id.clone(),
                                    function: FunctionCall {
                                        name: tc.name.clone(),
                                        arguments: tc.arguments.to_string(),
                                    },
                                },
                            )
                        })
                        .collect();
                    ChatCompletionRequestMessage::Assistant(ChatCompletionRequestAssistantMessage {
                        content: if content.is_empty() {
                            None
                        } else {
                            Some(content.as_str().into())
                        },
                        tool_calls: Some(calls),
                        ..Default::default()
                    })
                }
                Message::Tool {
                    tool_call_id,
                    content,
                } => ChatCompletionRequestMessage::Tool(ChatCompletionRequestToolMessage {
                    content: content.as_str().into(),
                    tool_call_id: tool_call_id.clone(),
                }),
            })
            .collect()
    }

    fn tools_to_request(tools: &[ToolSpec]) -> Vec<ChatCompletionTools> {
        tools
            .iter()
            .map(|t| {
                ChatCompletionTools::Function(ChatCompletionTool {
                    function: FunctionObject {
                        name: t.name.clone(),
                        description: t.description.clone(),
                        parameters: Some(t.input_schema.clone()),
                        ..Default::default()
                    },
                })
            })
            .collect()
    }

    fn build_request(
        &self,
        messages: &[Message],
        stream: bool,
    ) -> Result<async_openai::types::chat::CreateChatCompletionRequest, AgentError> {
        let mut args = CreateChatCompletionRequestArgs::default();
        args.model(self.model.clone());
        args.messages(Self::messages_to_request(messages));
        if let Some(ref tools) = self.tools {
            args.tools(Self::tools_to_request(tools));
        }
        if let Some(t) = self.temperature {
            args.temperature(t);
        }
        if stream {
            args.stream(true);
        }
        args.build()
            .map_err(|e| AgentError::Completion(format!("request build failed: {}", e)))
    }
}

/// Parses a tool-call argument string from the wire. Malformed JSON becomes
/// an empty object so the tool sees a dispatch it can reject as data.
fn parse_arguments(raw: &str) -> serde_json::Value {
    if raw.trim().is_empty() {
        return serde_json::json!({});
    }
    serde_json::from_str(raw).unwrap_or_else(|_| serde_json::json!({}))
}

#[async_trait]
impl LlmClient for ChatOpenAI {
    async fn invoke(&self, messages: &[Message]) -> Result<LlmResponse, AgentError> {
        let request = self.build_request(messages, false)?;
        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| AgentError::Completion(format!("OpenAI API error: {}", e)))?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AgentError::Completion("OpenAI returned no choices".to_string()))?;

        let msg = choice.message;
        let content = msg.content.unwrap_or_default();
        let tool_calls: Vec<ToolCall> = msg
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .filter_map(|tc| {
                if let ChatCompletionMessageToolCalls::Function(f) = tc {
                    Some(ToolCall {
                        id: f.id,
                        name: f.function.name,
                        arguments: parse_arguments(&f.function.arguments),
                    })
                } else {
                    None
                }
            })
            .collect();

        Ok(LlmResponse {
            content,
            tool_calls,
        })
    }

    async fn invoke_stream(
        &self,
        messages: &[Message],
        chunk_tx: Option<mpsc::Sender<MessageChunk>>,
    ) -> Result<LlmResponse, AgentError> {
        let request = self.build_request(messages, true)?;
        let mut stream = self
            .client
            .chat()
            .create_stream(request)
            .await
            .map_err(|e| AgentError::Completion(format!("OpenAI API error: {}", e)))?;

        let mut content = String::new();
        // Tool calls arrive as fragments keyed by index; ids and names in the
        // first fragment, argument text accumulated across the rest.
        let mut calls: BTreeMap<u32, (String, String, String)> = BTreeMap::new();

        while let Some(item) = stream.next().await {
            let response =
                item.map_err(|e| AgentError::Completion(format!("OpenAI stream error: {}", e)))?;
            for choice in response.choices {
                if let Some(delta) = choice.delta.content {
                    if !delta.is_empty() {
                        content.push_str(&delta);
                        if let Some(tx) = &chunk_tx {
                            let _ = tx.send(MessageChunk { content: delta }).await;
                        }
                    }
                }
                for fragment in choice.delta.tool_calls.unwrap_or_default() {
                    let entry = fragment.index;
                    let slot = calls.entry(entry).or_default();
                    if let Some(id) = fragment.id {
                        slot.0 = id;
                    }
                    if let Some(function) = fragment.function {
                        if let Some(name) = function.name {
                            slot.1 = name;
                        }
                        if let Some(arguments) = function.arguments {
                            slot.2.push_str(&arguments);
                        }
                    }
                }
            }
        }

        let tool_calls = calls
            .into_values()
            .map(|(id, name, arguments)| ToolCall {
                id,
                name,
                arguments: parse_arguments(&arguments),
            })
            .collect();

        Ok(LlmResponse {
            content,
            tool_calls,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// **Scenario**: Builder chain with_tools and with_temperature builds without panic.
    #[test]
    fn chat_openai_builder_chain() {
        let tools = vec![ToolSpec {
            name: "calculator".into(),
            description: Some("math".into()),
            input_schema: json!({ "type": "object", "properties": {} }),
        }];
        let _ = ChatOpenAI::new("gpt-4.1-nano")
            .with_tools(tools)
            .with_temperature(0.2f32);
    }

    /// **Scenario**: with_config uses a custom key without touching the env.
    #[test]
    fn chat_openai_with_config_creates_client() {
        let config = OpenAIConfig::new().with_api_key("test-key");
        let _ = ChatOpenAI::with_config(config, "gpt-4.1-nano");
    }

    /// **Scenario**: Malformed argument text parses to an empty object.
    #[test]
    fn parse_arguments_tolerates_bad_json() {
        assert_eq!(parse_arguments(""), json!({}));
        assert_eq!(parse_arguments("{oops"), json!({}));
        assert_eq!(parse_arguments("{\"a\":1}"), json!({"a": 1}));
    }
}

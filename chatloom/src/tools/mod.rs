//! Tool registry: named, typed capabilities the model may request mid-turn.
//!
//! The set is fixed at process start and immutable thereafter. Dispatch by
//! name; an unknown name is an error the `ToolNode` turns into result data
//! so the model can react. Tools catch their own internal failures (network
//! calls, arithmetic edge cases) and return `{"error": ...}` payloads,
//! because a failed tool call must not kill the conversation.

mod calculator;
mod search;
mod stock;
mod weather;

pub use calculator::CalculatorTool;
pub use search::WebSearchTool;
pub use stock::StockPriceTool;
pub use weather::WeatherTool;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Tool descriptor handed to the completion client.
#[derive(Debug, Clone)]
pub struct ToolSpec {
    pub name: String,
    pub description: Option<String>,
    /// JSON schema of the arguments object.
    pub input_schema: Value,
}

/// Dispatch failure. Non-fatal by design: `ToolNode` encodes these as
/// `{"error": ...}` tool-result content and the turn continues.
#[derive(Debug, Error)]
pub enum ToolError {
    /// No tool with that name is registered.
    #[error("unknown tool: {0}")]
    UnknownTool(String),
    /// The tool itself failed (e.g. the backing HTTP call).
    #[error("tool '{tool}' failed: {message}")]
    Execution { tool: String, message: String },
}

/// One callable capability: a name, an argument schema, and an invoke.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Unique name within the registry.
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// JSON schema of the arguments object.
    fn input_schema(&self) -> Value;

    /// Invokes the tool. Argument problems and domain errors (bad operator,
    /// divide by zero) come back as `Ok` payloads carrying an `error` field;
    /// `Err` is for infrastructure failures the tool cannot phrase itself.
    async fn call(&self, args: Value) -> Result<Value, ToolError>;

    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: self.name().to_string(),
            description: Some(self.description().to_string()),
            input_schema: self.input_schema(),
        }
    }
}

/// Fixed set of named tools. Built at process start; lookup by name.
///
/// **Interaction**: `specs()` feeds the completion client; `dispatch` is
/// called by `ToolNode` once per requested call.
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Registry with every built-in tool the original chat assistant carries:
    /// calculator, stock price, weather, and web search.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register(CalculatorTool);
        registry.register(StockPriceTool::new());
        registry.register(WeatherTool::new());
        registry.register(WebSearchTool::new());
        registry
    }

    pub fn register<T: Tool + 'static>(&mut self, tool: T) {
        self.tools.insert(tool.name().to_string(), Arc::new(tool));
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Registered names, sorted for stable output.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tools.keys().cloned().collect();
        names.sort();
        names
    }

    /// Descriptors for every registered tool.
    pub fn specs(&self) -> Vec<ToolSpec> {
        let mut specs: Vec<ToolSpec> = self.tools.values().map(|t| t.spec()).collect();
        specs.sort_by(|a, b| a.name.cmp(&b.name));
        specs
    }

    /// Looks up `name` and invokes it with `args`.
    pub async fn dispatch(&self, name: &str, args: Value) -> Result<Value, ToolError> {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;
        tool.call(args).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// **Scenario**: dispatch on an unregistered name yields UnknownTool.
    #[tokio::test]
    async fn dispatch_unknown_name_errors() {
        let registry = ToolRegistry::new();
        match registry.dispatch("nonexistent", json!({})).await {
            Err(ToolError::UnknownTool(name)) => assert_eq!(name, "nonexistent"),
            other => panic!("expected UnknownTool, got {:?}", other),
        }
    }

    /// **Scenario**: builtin registry carries the four standard tools.
    #[test]
    fn builtin_registry_names() {
        let registry = ToolRegistry::builtin();
        assert_eq!(
            registry.names(),
            vec!["calculator", "get_stock_price", "get_weather", "web_search"]
        );
    }

    /// **Scenario**: specs expose name, description, and a schema per tool.
    #[test]
    fn specs_cover_every_tool() {
        let registry = ToolRegistry::builtin();
        let specs = registry.specs();
        assert_eq!(specs.len(), registry.len());
        for spec in specs {
            assert!(spec.description.is_some(), "{} has no description", spec.name);
            assert!(spec.input_schema.is_object());
        }
    }
}

//! Web search tool over DuckDuckGo's HTML endpoint.
//!
//! No search API key required: results are extracted from the HTML response
//! by string splitting on the result anchor class.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{json, Value};

use super::{Tool, ToolError};

const DEFAULT_MAX_RESULTS: usize = 5;
const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Serialize)]
struct SearchResult {
    title: String,
    href: String,
}

/// Searches the web via DuckDuckGo and returns titles and links.
pub struct WebSearchTool {
    client: reqwest::Client,
    max_results: usize,
}

impl WebSearchTool {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
                .user_agent("Mozilla/5.0 (compatible; chatloom/0.1)")
                .build()
                .unwrap_or_default(),
            max_results: DEFAULT_MAX_RESULTS,
        }
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }
}

impl Default for WebSearchTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for WebSearchTool {
    fn name(&self) -> &str {
        "web_search"
    }

    fn description(&self) -> &str {
        "Searches the web with DuckDuckGo. Expects {\"query\": string}."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": { "type": "string" },
                "max_results": { "type": "integer", "minimum": 1 }
            },
            "required": ["query"]
        })
    }

    async fn call(&self, args: Value) -> Result<Value, ToolError> {
        let Some(query) = args.get("query").and_then(Value::as_str) else {
            return Ok(json!({ "error": "missing 'query'" }));
        };
        let max_results = args
            .get("max_results")
            .and_then(Value::as_u64)
            .map(|n| n as usize)
            .unwrap_or(self.max_results);

        let url = format!(
            "https://html.duckduckgo.com/html/?q={}",
            urlencoding::encode(query)
        );
        let html = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ToolError::Execution {
                tool: self.name().to_string(),
                message: e.to_string(),
            })?
            .text()
            .await
            .map_err(|e| ToolError::Execution {
                tool: self.name().to_string(),
                message: e.to_string(),
            })?;

        let results = parse_result_anchors(&html, max_results);
        Ok(json!({ "query": query, "results": results }))
    }
}

/// Extracts result anchors (`<a class="result__a" href="...">title</a>`)
/// from the DuckDuckGo HTML page.
fn parse_result_anchors(html: &str, max_results: usize) -> Vec<SearchResult> {
    let mut results = Vec::new();
    for chunk in html.split("result__a").skip(1) {
        if results.len() >= max_results {
            break;
        }
        let href = chunk
            .split("href=\"")
            .nth(1)
            .and_then(|s| s.split('"').next())
            .unwrap_or("");
        let title = chunk
            .split('>')
            .nth(1)
            .and_then(|s| s.split("</a").next())
            .unwrap_or("");
        if !href.is_empty() && !title.is_empty() && href.starts_with("http") {
            results.push(SearchResult {
                title: decode_entities(title),
                href: href.to_string(),
            });
        }
    }
    results
}

fn decode_entities(s: &str) -> String {
    s.replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#x27;", "'")
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = concat!(
        "<a rel=\"nofollow\" class=\"result__a\" href=\"https://example.com/a\">First &amp; foremost</a>",
        "<a rel=\"nofollow\" class=\"result__a\" href=\"https://example.com/b\">Second</a>",
        "<a rel=\"nofollow\" class=\"result__a\" href=\"/relative\">Skipped</a>",
    );

    /// **Scenario**: Anchors parse into title/href pairs with entities decoded.
    #[test]
    fn parses_result_anchors() {
        let results = parse_result_anchors(SAMPLE, 10);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].title, "First & foremost");
        assert_eq!(results[0].href, "https://example.com/a");
        assert_eq!(results[1].title, "Second");
    }

    /// **Scenario**: max_results truncates the list.
    #[test]
    fn respects_max_results() {
        let results = parse_result_anchors(SAMPLE, 1);
        assert_eq!(results.len(), 1);
    }

    /// **Scenario**: A page without result anchors parses to an empty list.
    #[test]
    fn empty_page_yields_no_results() {
        assert!(parse_result_anchors("<html></html>", 5).is_empty());
    }

    /// **Scenario**: A call without a query is an error payload, no request made.
    #[tokio::test]
    async fn missing_query_is_error_payload() {
        let out = WebSearchTool::new().call(json!({})).await.unwrap();
        assert!(out["error"].as_str().unwrap().contains("query"));
    }
}

//! Stock price tool backed by the AlphaVantage quote API.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use super::{Tool, ToolError};

const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Fetches the latest quote for a ticker symbol from AlphaVantage.
/// Reads `ALPHAVANTAGE_API_KEY` from the environment at call time.
pub struct StockPriceTool {
    client: reqwest::Client,
}

impl StockPriceTool {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
                .build()
                .unwrap_or_default(),
        }
    }
}

impl Default for StockPriceTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for StockPriceTool {
    fn name(&self) -> &str {
        "get_stock_price"
    }

    fn description(&self) -> &str {
        "Returns the price of a stock. Uses the AlphaVantage API to fetch the price."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "symbol": { "type": "string", "description": "Ticker symbol, e.g. AAPL" }
            },
            "required": ["symbol"]
        })
    }

    async fn call(&self, args: Value) -> Result<Value, ToolError> {
        let Some(symbol) = args.get("symbol").and_then(Value::as_str) else {
            return Ok(json!({ "error": "missing 'symbol'" }));
        };
        let Ok(api_key) = std::env::var("ALPHAVANTAGE_API_KEY") else {
            return Ok(json!({ "error": "ALPHAVANTAGE_API_KEY is not set" }));
        };

        let url = format!(
            "https://www.alphavantage.co/query?function=GLOBAL_QUOTE&symbol={}&apikey={}",
            urlencoding::encode(symbol),
            urlencoding::encode(&api_key),
        );
        let body: Value = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ToolError::Execution {
                tool: self.name().to_string(),
                message: e.to_string(),
            })?
            .json()
            .await
            .map_err(|e| ToolError::Execution {
                tool: self.name().to_string(),
                message: e.to_string(),
            })?;

        Ok(json!({ "symbol": symbol, "price": body }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: A call without a symbol is an error payload, no request made.
    #[tokio::test]
    async fn missing_symbol_is_error_payload() {
        let out = StockPriceTool::new().call(json!({})).await.unwrap();
        assert!(out["error"].as_str().unwrap().contains("symbol"));
    }
}

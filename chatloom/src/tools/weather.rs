//! Weather tool backed by the Weatherstack current-conditions API.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use super::{Tool, ToolError};

const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Fetches current weather for a location from Weatherstack.
/// Reads `WEATHER_API_KEY` from the environment at call time; the response
/// body is returned to the model verbatim.
pub struct WeatherTool {
    client: reqwest::Client,
}

impl WeatherTool {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
                .build()
                .unwrap_or_default(),
        }
    }
}

impl Default for WeatherTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for WeatherTool {
    fn name(&self) -> &str {
        "get_weather"
    }

    fn description(&self) -> &str {
        "Returns the weather of a location. Uses the Weatherstack API to fetch the weather."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "location": { "type": "string", "description": "City or place name" }
            },
            "required": ["location"]
        })
    }

    async fn call(&self, args: Value) -> Result<Value, ToolError> {
        let Some(location) = args.get("location").and_then(Value::as_str) else {
            return Ok(json!({ "error": "missing 'location'" }));
        };
        let Ok(api_key) = std::env::var("WEATHER_API_KEY") else {
            return Ok(json!({ "error": "WEATHER_API_KEY is not set" }));
        };

        let url = format!(
            "https://api.weatherstack.com/current?access_key={}&query={}",
            urlencoding::encode(&api_key),
            urlencoding::encode(location),
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

        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: A call without a location is an error payload, no request made.
    #[tokio::test]
    async fn missing_location_is_error_payload() {
        let out = WeatherTool::new().call(json!({})).await.unwrap();
        assert!(out["error"].as_str().unwrap().contains("location"));
    }
}

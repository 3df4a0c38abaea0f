//! Build configuration read from the environment.
//!
//! Callers (CLI, server) load `.env` themselves, then call
//! [`ChatBuildConfig::from_env`] and hand the result to their wiring code.

/// Configuration for building a chat runner: model access and persistence.
#[derive(Clone, Debug)]
pub struct ChatBuildConfig {
    /// API key for the completion endpoint (`OPENAI_API_KEY`).
    pub openai_api_key: Option<String>,
    /// Base URL override for OpenAI-compatible backends (`OPENAI_BASE_URL`).
    pub openai_base_url: Option<String>,
    /// Model name (`OPENAI_MODEL`).
    pub model: String,
    /// SQLite database path for the checkpointer (`DB_PATH`).
    pub db_path: String,
}

impl Default for ChatBuildConfig {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            openai_base_url: None,
            model: "gpt-4.1-nano".to_string(),
            db_path: "chatloom.db".to_string(),
        }
    }
}

impl ChatBuildConfig {
    /// Reads the configuration from the environment, falling back to
    /// defaults for anything unset.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            openai_api_key: std::env::var("OPENAI_API_KEY").ok().filter(|s| !s.is_empty()),
            openai_base_url: std::env::var("OPENAI_BASE_URL").ok().filter(|s| !s.is_empty()),
            model: std::env::var("OPENAI_MODEL").unwrap_or(defaults.model),
            db_path: std::env::var("DB_PATH").unwrap_or(defaults.db_path),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: Defaults use the original model and a local db file.
    #[test]
    fn default_config_values() {
        let config = ChatBuildConfig::default();
        assert!(config.openai_api_key.is_none());
        assert_eq!(config.model, "gpt-4.1-nano");
        assert_eq!(config.db_path, "chatloom.db");
    }
}

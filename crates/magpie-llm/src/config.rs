//! Configuration for the model provider

use serde::{Deserialize, Serialize};

/// Default chat-completions endpoint
pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Default extraction model
pub const DEFAULT_MODEL: &str = "xiaomi/mimo-v2-flash:free";

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_temperature() -> f32 {
    0.1
}

/// Configuration for [`crate::OpenRouterProvider`]
///
/// Credentials and model selection are injected here at construction; no
/// component reads them from ambient process state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Chat-completions API base, without trailing slash
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Bearer token for the API
    pub api_key: String,

    /// Model identifier to request
    #[serde(default = "default_model")]
    pub model: String,

    /// Fixed request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Sampling temperature; kept low for stable JSON output
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

impl LlmConfig {
    /// Config pointing at the default endpoint/model with the given key
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            base_url: default_base_url(),
            api_key: api_key.into(),
            model: default_model(),
            timeout_secs: default_timeout_secs(),
            temperature: default_temperature(),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.base_url.is_empty() {
            return Err("base_url must not be empty".to_string());
        }
        if self.api_key.is_empty() {
            return Err("api_key must not be empty".to_string());
        }
        if self.model.is_empty() {
            return Err("model must not be empty".to_string());
        }
        if self.timeout_secs == 0 {
            return Err("timeout_secs must be greater than 0".to_string());
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err("temperature must be within [0, 2]".to_string());
        }
        Ok(())
    }

    /// Load configuration from a TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to a TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_shape_is_valid() {
        let config = LlmConfig::with_api_key("sk-test");
        assert!(config.validate().is_ok());
        assert_eq!(config.timeout_secs, 30);
        assert!((config.temperature - 0.1).abs() < f32::EPSILON);
    }

    #[test]
    fn test_empty_api_key_is_rejected() {
        let config = LlmConfig::with_api_key("");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config = LlmConfig::from_toml(r#"api_key = "sk-test""#).unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.model, DEFAULT_MODEL);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = LlmConfig::with_api_key("sk-test");
        let toml_str = config.to_toml().unwrap();
        let parsed = LlmConfig::from_toml(&toml_str).unwrap();
        assert_eq!(parsed.base_url, config.base_url);
        assert_eq!(parsed.model, config.model);
        assert_eq!(parsed.timeout_secs, config.timeout_secs);
    }
}

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;

/// Root configuration for robotix.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub openai: OpenAiConfig,
    pub ollama: OllamaConfig,
}

impl Config {
    /// Load configuration from a JSON file, then overlay environment
    /// variables. With no path, starts from defaults.
    ///
    /// `OPENAI_API_KEY` always wins over the file; a missing key is not an
    /// error here — the provider fails at call time instead.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(p) => {
                if !p.exists() {
                    return Err(ConfigError::NotFound(p.to_path_buf()));
                }
                let content = std::fs::read_to_string(p)?;
                serde_json::from_str(&content)?
            }
            None => Self::default(),
        };

        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            if !key.is_empty() {
                config.openai.api_key = key;
            }
        }

        Ok(config)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8000".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StoreConfig {
    pub users_file: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            users_file: "users.json".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub api_base: String,
    pub model: String,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_base: "https://api.openai.com/v1".to_string(),
            model: "gpt-3.5-turbo".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OllamaConfig {
    pub api_base: String,
    pub model: String,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            api_base: "http://localhost:11434".to_string(),
            model: "mistral".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.bind, "0.0.0.0:8000");
        assert_eq!(config.store.users_file, "users.json");
        assert_eq!(config.openai.model, "gpt-3.5-turbo");
        assert_eq!(config.ollama.model, "mistral");
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"ollama": {"model": "llama3"}}"#).unwrap();
        assert_eq!(config.ollama.model, "llama3");
        assert_eq!(config.ollama.api_base, "http://localhost:11434");
        assert_eq!(config.openai.model, "gpt-3.5-turbo");
    }
}

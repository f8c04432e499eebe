use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use crate::config::OllamaConfig;
use crate::error::ProviderError;
use crate::util::http;

use super::ChatProvider;

/// Returned when the generation reply carries no `response` field.
pub const FALLBACK_TEXT: &str = "No se pudo generar respuesta.";

/// Locally addressed Ollama generation provider.
pub struct OllamaProvider {
    api_base: String,
    model: String,
}

impl OllamaProvider {
    pub fn new(config: &OllamaConfig) -> Self {
        Self {
            api_base: config.api_base.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        }
    }
}

#[async_trait]
impl ChatProvider for OllamaProvider {
    async fn complete(&self, message: &str) -> Result<String, ProviderError> {
        let url = format!("{}/api/generate", self.api_base);
        let body = json!({
            "model": self.model,
            "prompt": message,
            "stream": false,
        });

        debug!("Ollama request to {} with model {}", url, self.model);

        let response = http::client().post(&url).json(&body).send().await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message: text,
            });
        }

        let data: serde_json::Value = response.json().await?;
        Ok(data
            .get("response")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
            .unwrap_or_else(|| FALLBACK_TEXT.to_string()))
    }

    fn name(&self) -> &'static str {
        "ollama"
    }
}

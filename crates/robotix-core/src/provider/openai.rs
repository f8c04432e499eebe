use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use crate::config::OpenAiConfig;
use crate::error::ProviderError;
use crate::util::http;

use super::ChatProvider;

/// Persona injected ahead of every user message.
const SYSTEM_PROMPT: &str = "Eres un asistente educativo llamado Robotix.";
const TEMPERATURE: f64 = 0.7;
const MAX_TOKENS: u32 = 300;

/// Remote OpenAI chat-completions provider.
pub struct OpenAiProvider {
    api_key: String,
    api_base: String,
    model: String,
}

impl OpenAiProvider {
    pub fn new(config: &OpenAiConfig) -> Self {
        Self {
            api_key: config.api_key.clone(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        }
    }
}

#[async_trait]
impl ChatProvider for OpenAiProvider {
    async fn complete(&self, message: &str) -> Result<String, ProviderError> {
        if self.api_key.is_empty() {
            return Err(ProviderError::NoApiKey);
        }

        let url = format!("{}/chat/completions", self.api_base);
        let body = json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": SYSTEM_PROMPT},
                {"role": "user", "content": message},
            ],
            "temperature": TEMPERATURE,
            "max_tokens": MAX_TOKENS,
        });

        debug!("OpenAI request to {} with model {}", url, self.model);

        let response = http::client()
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message: text,
            });
        }

        let data: serde_json::Value = response.json().await?;
        data.get("choices")
            .and_then(|c| c.get(0))
            .and_then(|choice| choice.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
            .ok_or_else(|| ProviderError::Parse("No message content in response".to_string()))
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}

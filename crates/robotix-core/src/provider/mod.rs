pub mod ollama;
pub mod openai;

use async_trait::async_trait;

use crate::error::ProviderError;

/// A text-in/text-out completion backend.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Send one user message and return the generated text.
    async fn complete(&self, message: &str) -> Result<String, ProviderError>;

    /// Selector this provider answers to ("openai", "ollama").
    fn name(&self) -> &'static str;
}

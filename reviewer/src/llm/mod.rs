//! LLM abstraction layer
//!
//! The reviewer service is consumed as a plain text completion: a system
//! prompt, a user prompt, and an output token budget in; review text out.

mod ollama;

pub use ollama::{list_models, ModelInfo, OllamaClient};

use async_trait::async_trait;

use crate::error::LlmError;

/// Trait for reviewer backends
#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Produce a completion for `user_prompt` under `system_prompt`
    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        max_output_tokens: u32,
    ) -> Result<String, LlmError>;

    /// Get the model name
    fn model(&self) -> &str;
}

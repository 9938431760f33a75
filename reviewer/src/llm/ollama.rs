//! Ollama reviewer implementation

use std::time::Duration;

use async_trait::async_trait;
use ollama_rs::{
    generation::chat::{request::ChatMessageRequest, ChatMessage},
    models::ModelOptions,
    Ollama,
};
use serde::{Deserialize, Serialize};

use super::CompletionService;
use crate::error::LlmError;

const DEFAULT_URL: &str = "http://localhost:11434";

/// Information about an available model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    pub name: String,
    pub size: u64,
    pub modified_at: String,
}

#[derive(Debug, Deserialize)]
struct OllamaTagsResponse {
    models: Vec<ModelInfo>,
}

/// Parse a server URL as a base for `api/...` paths, keeping any path prefix.
///
/// Unparseable or host-less URLs fall back to the local default.
fn base_url(ollama_url: &str) -> Result<url::Url, url::ParseError> {
    let mut url = match url::Url::parse(ollama_url) {
        Ok(url) if url.has_host() => url,
        _ => {
            tracing::warn!("Invalid Ollama URL {:?}, using {}", ollama_url, DEFAULT_URL);
            url::Url::parse(DEFAULT_URL)?
        }
    };
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// List available models from Ollama
pub async fn list_models(ollama_url: &str, timeout: Duration) -> anyhow::Result<Vec<ModelInfo>> {
    let api_url = base_url(ollama_url)?.join("api/tags")?;

    let client = reqwest::Client::builder().timeout(timeout).build()?;
    let response: OllamaTagsResponse = client
        .get(api_url)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    Ok(response.models)
}

/// Ollama client wrapper
pub struct OllamaClient {
    client: Ollama,
    model: String,
    timeout: Duration,
}

impl OllamaClient {
    /// Create a new Ollama client
    pub fn new(url: &str, model: &str, timeout: Duration) -> Self {
        Self {
            client: match base_url(url) {
                Ok(base) => Ollama::builder().url(base).build(),
                Err(_) => Ollama::default(),
            },
            model: model.to_string(),
            timeout,
        }
    }
}

#[async_trait]
impl CompletionService for OllamaClient {
    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        max_output_tokens: u32,
    ) -> Result<String, LlmError> {
        let options =
            ModelOptions::default().num_predict(i32::try_from(max_output_tokens).unwrap_or(i32::MAX));
        let request = ChatMessageRequest::new(
            self.model.clone(),
            vec![
                ChatMessage::system(system_prompt.to_string()),
                ChatMessage::user(user_prompt.to_string()),
            ],
        )
        .options(options);

        let response = tokio::time::timeout(self.timeout, self.client.send_chat_messages(request))
            .await
            .map_err(|_| LlmError::Timeout(self.timeout))?
            .map_err(|e| LlmError::Upstream(e.to_string()))?;

        let content = response.message.content;
        if content.trim().is_empty() {
            return Err(LlmError::EmptyResponse);
        }

        Ok(content)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

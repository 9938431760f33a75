//! Command handlers
//!
//! [`CommandContext`] resolves settings (CLI/env > config file > defaults)
//! and builds the review stack shared by every command.

use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Local, Utc};

use crate::config::{ReviewerFileConfig, StorageBackend};
use crate::db::{KvStore, MemoryStore, SqliteStore};
use crate::history::HistoryStore;
use crate::llm::OllamaClient;
use crate::review::ReviewCoordinator;
use crate::web::{self, AppState, WebConfig};

/// Characters of each review shown by `history`
const HISTORY_PREVIEW_CHARS: usize = 150;

/// Resolved settings shared by command handlers
pub struct CommandContext {
    pub ollama_url: String,
    pub model: String,
    pub file_config: ReviewerFileConfig,
}

impl CommandContext {
    /// Create a new CommandContext from CLI args and file config
    pub fn new(
        ollama_url: Option<String>,
        model: Option<String>,
        file_config: ReviewerFileConfig,
    ) -> Self {
        let ollama_url = ollama_url.unwrap_or_else(|| file_config.llm.url.clone());
        let model = model.unwrap_or_else(|| file_config.llm.model.clone());

        Self {
            ollama_url,
            model,
            file_config,
        }
    }

    /// Load the config file named on the command line, or search for one
    pub fn load_config(path: Option<&Path>) -> Result<ReviewerFileConfig> {
        match path {
            Some(path) => ReviewerFileConfig::load_from_path(path),
            None => ReviewerFileConfig::load(),
        }
    }

    /// Create an OllamaClient configured with the context's settings
    pub fn llm(&self) -> OllamaClient {
        OllamaClient::new(
            &self.ollama_url,
            &self.model,
            Duration::from_secs(self.file_config.llm.timeout_secs),
        )
    }

    /// Open the configured history backend
    pub fn backend(&self) -> Result<Arc<dyn KvStore>> {
        let storage = &self.file_config.storage;
        let backend: Arc<dyn KvStore> = match storage.backend {
            StorageBackend::Sqlite => {
                let store = match &storage.path {
                    Some(path) => SqliteStore::open_at(path),
                    None => SqliteStore::open(),
                }
                .context("Failed to open history database")?;
                Arc::new(store)
            }
            StorageBackend::Memory => {
                tracing::warn!("Using in-memory history; reviews are lost on exit");
                Arc::new(MemoryStore::new())
            }
        };
        Ok(backend)
    }

    /// Build a coordinator over the configured backend and reviewer
    pub fn coordinator(&self) -> Result<ReviewCoordinator> {
        let store =
            HistoryStore::new(self.backend()?).with_max_history(self.file_config.storage.max_history);
        Ok(ReviewCoordinator::new(store, Arc::new(self.llm()))
            .with_max_output_tokens(self.file_config.llm.max_tokens))
    }
}

/// Handle the `serve` command
pub async fn run_serve(ctx: &CommandContext, host: Option<String>, port: Option<u16>) -> Result<()> {
    let config = WebConfig {
        host: host.unwrap_or_else(|| ctx.file_config.server.host.clone()),
        port: port.unwrap_or(ctx.file_config.server.port),
    };
    tracing::info!("Reviewing with {} at {}", ctx.model, ctx.ollama_url);

    let state = AppState::new(ctx.coordinator()?, ctx.ollama_url.clone());
    web::serve(config, state).await
}

/// Handle the `review` command
pub async fn run_review(
    ctx: &CommandContext,
    file: Option<&Path>,
    language: Option<String>,
    user: &str,
) -> Result<()> {
    let code = match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read code from stdin")?;
            buf
        }
    };
    let language = language.or_else(|| file.and_then(language_from_extension));

    let coordinator = ctx.coordinator()?;
    let outcome = coordinator.review(user, &code, language.as_deref()).await?;

    println!("{}", outcome.review);
    eprintln!("\nReviews completed for {}: {}", user, outcome.history + 1);
    Ok(())
}

/// Handle the `history` command
pub async fn run_history(ctx: &CommandContext, user: &str, json: bool) -> Result<()> {
    let coordinator = ctx.coordinator()?;
    let history = coordinator.get_history(user).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&history)?);
        return Ok(());
    }

    if history.is_empty() {
        println!("No review history for {}.", user);
        return Ok(());
    }

    println!("Recent reviews for {} ({}):\n", user, history.len());
    for record in history.iter().rev() {
        let when = DateTime::<Utc>::from_timestamp_millis(record.timestamp)
            .map(|t| t.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| record.timestamp.to_string());
        let preview: String = record.review.chars().take(HISTORY_PREVIEW_CHARS).collect();
        println!(
            "[{}] {}\n  {}\n",
            when,
            record.language.as_deref().unwrap_or("code"),
            preview.replace('\n', " ")
        );
    }
    Ok(())
}

/// Guess a language tag from a file extension
fn language_from_extension(path: &Path) -> Option<String> {
    let tag = match path.extension()?.to_str()? {
        "rs" => "rust",
        "py" => "python",
        "js" | "mjs" | "cjs" => "javascript",
        "ts" | "tsx" => "typescript",
        "go" => "go",
        "java" => "java",
        "c" | "h" => "c",
        "cc" | "cpp" | "cxx" | "hpp" => "cpp",
        "rb" => "ruby",
        "sh" => "bash",
        _ => return None,
    };
    Some(tag.to_string())
}

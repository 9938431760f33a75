//! Review coordination
//!
//! One `review()` call:
//! 1. Rejects empty code
//! 2. Locks the identity's history (serializing reviews per identity)
//! 3. Composes a prompt biased by the most recent reviews
//! 4. Calls the reviewer service
//! 5. Appends the new record, only if the reviewer produced text
//!
//! The history write lock is held across the reviewer call so concurrent
//! reviews for the same identity cannot overwrite each other's records.
//! History reads see the last committed log and never wait on that lock.

use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::error::{ReviewError, ReviewResult, StorageError};
use crate::history::{HistoryStore, ReviewRecord};
use crate::llm::CompletionService;
use crate::prompt::{self, SYSTEM_PROMPT};

/// Default output token budget for the reviewer
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 1024;

/// Result of a successful review
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewOutcome {
    /// Review text from the reviewer service
    pub review: String,
    /// History size before this review was recorded
    pub history: usize,
}

/// Orchestrates review requests over a history store and a reviewer service
pub struct ReviewCoordinator {
    store: HistoryStore,
    reviewer: Arc<dyn CompletionService>,
    max_output_tokens: u32,
}

impl ReviewCoordinator {
    /// Create a coordinator
    pub fn new(store: HistoryStore, reviewer: Arc<dyn CompletionService>) -> Self {
        Self {
            store,
            reviewer,
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
        }
    }

    /// Set the output token budget passed to the reviewer
    pub fn with_max_output_tokens(mut self, max_output_tokens: u32) -> Self {
        self.max_output_tokens = max_output_tokens;
        self
    }

    /// Model name of the underlying reviewer
    pub fn model(&self) -> &str {
        self.reviewer.model()
    }

    /// Review `code` for `identity` and remember the result
    pub async fn review(
        &self,
        identity: &str,
        code: &str,
        language: Option<&str>,
    ) -> ReviewResult<ReviewOutcome> {
        if code.trim().is_empty() {
            return Err(ReviewError::Validation("Code is required".to_string()));
        }
        let language = language.filter(|l| !l.is_empty());

        let mut history = self.store.lock(identity).await?;
        let prior = history.len();
        let prompt = prompt::build(code, language, history.records());

        tracing::debug!(
            "Reviewing {} chars of {} for {} ({} prior reviews)",
            code.len(),
            language.unwrap_or("code"),
            identity,
            prior
        );

        let started = Instant::now();
        let review = match self
            .reviewer
            .complete(SYSTEM_PROMPT, &prompt, self.max_output_tokens)
            .await
        {
            Ok(review) => review,
            Err(e) => {
                tracing::warn!("Review for {} failed after {:?}: {}", identity, started.elapsed(), e);
                return Err(e.into());
            }
        };
        tracing::info!(
            "Review for {} completed in {:?} ({} prior reviews)",
            identity,
            started.elapsed(),
            prior
        );

        let record = ReviewRecord::new(code, language.map(str::to_string), review.clone());
        if let Err(e) = history.append(record).await {
            tracing::error!("Failed to persist review for {}: {}", identity, e);
            return Err(e.into());
        }

        Ok(ReviewOutcome {
            review,
            history: prior,
        })
    }

    /// Get an identity's committed history, oldest first
    pub async fn get_history(&self, identity: &str) -> Result<Vec<ReviewRecord>, StorageError> {
        self.store.read(identity).await
    }
}

//! AI code review service with per-user review memory
//!
//! Each review is recorded in the reviewing user's bounded history, and the
//! most recent reviews are summarized into the next prompt so the reviewer
//! keeps an eye on patterns it has flagged before.

pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod history;
pub mod llm;
pub mod logging;
pub mod prompt;
pub mod review;
pub mod web;

pub use error::{LlmError, ReviewError, StorageError};
pub use history::{HistoryStore, ReviewRecord, MAX_HISTORY};
pub use review::{ReviewCoordinator, ReviewOutcome};

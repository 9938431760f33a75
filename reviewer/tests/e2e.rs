//! E2E test against a live Ollama
//!
//! Requires:
//! - Ollama running (default: http://localhost:11434, override with OLLAMA_URL)
//! - A model pulled (default: llama3.1:8b, override with OLLAMA_MODEL)
//!
//! Run with: cargo test --test e2e -- --include-ignored

use std::sync::Arc;
use std::time::Duration;

use code_reviewer::db::SqliteStore;
use code_reviewer::llm::OllamaClient;
use code_reviewer::{HistoryStore, ReviewCoordinator};

fn ollama_url() -> String {
    std::env::var("OLLAMA_URL").unwrap_or_else(|_| "http://localhost:11434".to_string())
}

fn model() -> String {
    std::env::var("OLLAMA_MODEL").unwrap_or_else(|_| "llama3.1:8b".to_string())
}

#[tokio::test]
#[ignore = "requires Ollama"]
async fn test_review_with_live_model() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let db_path = dir.path().join("history.db");

    let reviewer = OllamaClient::new(&ollama_url(), &model(), Duration::from_secs(300));
    let store = HistoryStore::new(Arc::new(
        SqliteStore::open_at(&db_path).expect("Failed to open database"),
    ));
    let coordinator = ReviewCoordinator::new(store, Arc::new(reviewer)).with_max_output_tokens(256);

    let first = coordinator
        .review("e2e", "def add(a, b):\n    return a - b", Some("python"))
        .await
        .expect("First review failed");
    println!("First review:\n{}", first.review);
    assert_eq!(first.history, 0);
    assert!(!first.review.trim().is_empty());

    let second = coordinator
        .review("e2e", "def sub(a, b):\n    return a + b", Some("python"))
        .await
        .expect("Second review failed");
    assert_eq!(second.history, 1);

    // Reopen to confirm both reviews were persisted
    let reopened = HistoryStore::new(Arc::new(
        SqliteStore::open_at(&db_path).expect("Failed to reopen database"),
    ));
    let history = reopened.read("e2e").await.expect("Failed to read history");
    assert_eq!(history.len(), 2);
    assert_eq!(history[1].review, second.review);
}

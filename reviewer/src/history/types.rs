//! Review history record types

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// One completed review, immutable once created
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewRecord {
    /// The code that was reviewed
    pub code: String,
    /// Language tag supplied with the code, if any
    #[serde(default)]
    pub language: Option<String>,
    /// Review text produced by the reviewer service
    pub review: String,
    /// Creation time in epoch milliseconds
    pub timestamp: i64,
}

impl ReviewRecord {
    /// Create a record stamped with the current time
    pub fn new(code: impl Into<String>, language: Option<String>, review: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            language,
            review: review.into(),
            timestamp: Utc::now().timestamp_millis(),
        }
    }
}

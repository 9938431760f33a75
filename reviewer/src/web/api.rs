//! REST API handlers

use std::time::Duration;

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use super::state::AppState;
use crate::error::ReviewError;
use crate::history::{ReviewRecord, DEFAULT_IDENTITY};
use crate::review::ReviewOutcome;

/// How long the health check waits for Ollama
const HEALTH_PROBE_TIMEOUT: Duration = Duration::from_secs(3);

/// Client-facing message for reviewer failures; details stay in the logs
const REVIEW_SERVICE_ERROR: &str = "Review service unavailable";

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    fn new(msg: impl Into<String>) -> Self {
        Self { error: msg.into() }
    }
}

type ApiError = (StatusCode, Json<ErrorResponse>);

/// Map a review failure to a status code and a short client-facing message
fn review_error_response(err: &ReviewError) -> ApiError {
    match err {
        ReviewError::Validation(msg) => (StatusCode::BAD_REQUEST, Json(ErrorResponse::new(msg))),
        ReviewError::ReviewService(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::new(REVIEW_SERVICE_ERROR)),
        ),
        ReviewError::Storage(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::new("Failed to access review history")),
        ),
    }
}

/// Treat a missing or empty user id as the shared default identity
fn resolve_identity(user_id: Option<String>) -> String {
    user_id
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| DEFAULT_IDENTITY.to_string())
}

/// Review request body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRequest {
    #[serde(default)]
    pub code: String,
    pub language: Option<String>,
    pub user_id: Option<String>,
}

/// Review a code snippet and record it in the caller's history
pub async fn review(
    State(state): State<AppState>,
    payload: Result<Json<ReviewRequest>, JsonRejection>,
) -> Result<Json<ReviewOutcome>, ApiError> {
    let Json(req) = payload.map_err(|e| {
        tracing::debug!("Rejected review body: {}", e);
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("Request body must be JSON with a code field")),
        )
    })?;

    let identity = resolve_identity(req.user_id);
    match state
        .coordinator
        .review(&identity, &req.code, req.language.as_deref())
        .await
    {
        Ok(outcome) => Ok(Json(outcome)),
        Err(e) => {
            if !matches!(e, ReviewError::Validation(_)) {
                tracing::error!("Review failed for {}: {}", identity, e);
            }
            Err(review_error_response(&e))
        }
    }
}

/// History query parameters
#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
}

/// Get the caller's review history, oldest first
pub async fn history(
    State(state): State<AppState>,
    Query(params): Query<HistoryParams>,
) -> Result<Json<Vec<ReviewRecord>>, ApiError> {
    let identity = resolve_identity(params.user_id);
    match state.coordinator.get_history(&identity).await {
        Ok(records) => Ok(Json(records)),
        Err(e) => {
            tracing::error!("Failed to read history for {}: {}", identity, e);
            let err = ReviewError::from(e);
            Err(review_error_response(&err))
        }
    }
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub model: String,
    pub ollama_url: String,
    pub reviewer_reachable: bool,
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let reviewer_reachable =
        match crate::llm::list_models(&state.ollama_url, HEALTH_PROBE_TIMEOUT).await {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!("Ollama health probe failed: {}", e);
                false
            }
        };

    Json(HealthResponse {
        status: "ok".to_string(),
        model: state.model().to_string(),
        ollama_url: state.ollama_url.clone(),
        reviewer_reachable,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{LlmError, StorageError};

    #[test]
    fn test_resolve_identity() {
        assert_eq!(resolve_identity(None), "default");
        assert_eq!(resolve_identity(Some(String::new())), "default");
        assert_eq!(resolve_identity(Some("user_abc".to_string())), "user_abc");
    }

    #[test]
    fn test_status_mapping() {
        let (status, _) = review_error_response(&ReviewError::Validation("Code is required".into()));
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = review_error_response(&ReviewError::from(LlmError::EmptyResponse));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

        let (status, Json(body)) = review_error_response(&ReviewError::from(LlmError::Upstream(
            "error sending request for url (http://10.0.0.7:11434/api/chat)".into(),
        )));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error, REVIEW_SERVICE_ERROR);

        let (status, Json(body)) = review_error_response(&ReviewError::from(
            StorageError::Unavailable("/var/lib/secret/path locked".into()),
        ));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!body.error.contains("/var/lib"));
    }

    #[test]
    fn test_review_request_field_names() {
        let req: ReviewRequest =
            serde_json::from_str(r#"{"code":"x","language":"go","userId":"u1"}"#).unwrap();
        assert_eq!(req.code, "x");
        assert_eq!(req.language.as_deref(), Some("go"));
        assert_eq!(req.user_id.as_deref(), Some("u1"));

        let req: ReviewRequest = serde_json::from_str("{}").unwrap();
        assert!(req.code.is_empty());
    }
}

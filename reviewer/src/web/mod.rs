//! Web server module
//!
//! Routes:
//! - `POST /api/review` review a snippet and remember it
//! - `GET /api/history?userId=` past reviews for a user
//! - `GET /api/health` reviewer connectivity

pub mod api;
pub mod state;

use anyhow::{Context, Result};
use axum::{
    http::{header, Method, StatusCode},
    response::{Html, IntoResponse},
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub use state::AppState;

/// Configuration for the web server
pub struct WebConfig {
    pub host: String,
    pub port: u16,
}

/// Start the web server and run until Ctrl-C
pub async fn serve(config: WebConfig, state: AppState) -> Result<()> {
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port))
        .await
        .with_context(|| format!("Failed to bind {}:{}", config.host, config.port))?;
    tracing::info!("Starting web server on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Web server stopped");
    Ok(())
}

/// Create the router with all routes
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    let api_routes = Router::new()
        .route("/review", post(api::review))
        .route("/history", get(api::history))
        .route("/health", get(api::health_check));

    Router::new()
        .route("/", get(index))
        .route("/index.html", get(index))
        .nest("/api", api_routes)
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "Not Found")
}

/// Landing page listing the API
async fn index() -> Html<&'static str> {
    Html(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>AI Code Reviewer</title>
    <style>
        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif;
            max-width: 640px;
            margin: 80px auto;
            padding: 20px;
            background: #1a1a2e;
            color: #eee;
        }
        h1 { color: #667eea; }
        code {
            background: #16213e;
            padding: 2px 8px;
            border-radius: 4px;
        }
        pre {
            background: #16213e;
            padding: 16px;
            border-radius: 8px;
            overflow-x: auto;
        }
    </style>
</head>
<body>
    <h1>AI Code Reviewer</h1>
    <p>Reviews remember each user's past feedback and focus on recurring patterns.</p>
    <h2>API Endpoints</h2>
    <ul>
        <li><code>POST /api/review</code> - Review code: <code>{"code", "language", "userId"}</code></li>
        <li><code>GET /api/history?userId=</code> - Past reviews, oldest first</li>
        <li><code>GET /api/health</code> - Health check</li>
    </ul>
    <pre>curl -X POST localhost:8787/api/review \
  -H 'Content-Type: application/json' \
  -d '{"code": "print(1)", "language": "python"}'</pre>
</body>
</html>"#,
    )
}

//! Plain-text endpoints.

use std::path::Path;

use axum::extract::State;

use crate::error::ApiError;
use crate::AppState;

/// GET /health
///
/// Returns "ok" to indicate the server is running.
pub async fn health() -> &'static str {
    "ok"
}

/// GET /robots.txt
pub async fn robots(State(state): State<AppState>) -> Result<String, ApiError> {
    read_text(&state.robots_path, "robots.txt").await
}

/// GET /about
///
/// The analysis engine's license text.
pub async fn about(State(state): State<AppState>) -> Result<String, ApiError> {
    read_text(&state.license_path, "License").await
}

async fn read_text(path: &Path, what: &'static str) -> Result<String, ApiError> {
    tokio::fs::read_to_string(path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            tracing::warn!(path = %path.display(), "{} file is missing", what);
            ApiError::NotFound(what)
        } else {
            ApiError::Io {
                what,
                message: e.to_string(),
            }
        }
    })
}

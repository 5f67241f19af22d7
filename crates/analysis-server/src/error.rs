//! API error type and its HTTP mapping.
//!
//! Every error response has the body `{"detail": "<message>"}`.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chess_analysis::AnalysisError;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Analysis(#[from] AnalysisError),
    /// The request body is not valid JSON for the endpoint.
    #[error("{0}")]
    InvalidBody(String),
    /// The analysis did not finish before the request deadline.
    #[error("Analysis timed out")]
    Timeout,
    /// The blocking analysis task panicked or was cancelled.
    #[error("Analysis task failed: {0}")]
    TaskFailed(String),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("Failed to read {what}: {message}")]
    Io {
        what: &'static str,
        message: String,
    },
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Analysis(e) if e.is_client_error() => StatusCode::BAD_REQUEST,
            ApiError::Analysis(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::InvalidBody(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Timeout => StatusCode::GATEWAY_TIMEOUT,
            ApiError::TaskFailed(_) | ApiError::Io { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidBody(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, status = status.as_u16(), "Request failed");
        }
        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use chess_analysis::{EngineError, ShapeError};

    async fn detail(error: ApiError) -> (StatusCode, serde_json::Value) {
        let response = error.into_response();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_invalid_fen_body() {
        let (status, body) = detail(AnalysisError::InvalidPosition.into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"detail": "Invalid FEN"}));
    }

    #[tokio::test]
    async fn test_invalid_move_body() {
        let (status, body) = detail(AnalysisError::InvalidMove.into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"detail": "Invalid move"}));
    }

    #[test]
    fn test_status_mapping() {
        let shape = ApiError::from(AnalysisError::from(ShapeError::MissingScore { row: 0 }));
        assert_eq!(shape.status(), StatusCode::BAD_REQUEST);

        let engine = ApiError::from(AnalysisError::from(EngineError::InitFailed));
        assert_eq!(engine.status(), StatusCode::INTERNAL_SERVER_ERROR);

        assert_eq!(ApiError::Timeout.status(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(
            ApiError::InvalidBody("missing field `fen`".to_string()).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(ApiError::NotFound("License").status(), StatusCode::NOT_FOUND);
    }
}

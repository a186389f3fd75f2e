use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Resume text extraction failed: {0}")]
    ResumeExtraction(String),

    #[error("Role inference failed: {0}")]
    RoleInference(String),

    #[error("Source '{name}' failed: {message}")]
    Source { name: String, message: String },

    #[error("Embedding provider unavailable: {0}")]
    EmbeddingUnavailable(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn source(source: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Source {
            name: source.into(),
            message: message.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            // Fatal to the request: the user must re-upload a readable PDF.
            AppError::ResumeExtraction(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg.clone()),
            // Only surfaces when the caller supplied no manual keywords.
            AppError::RoleInference(msg) => (StatusCode::BAD_GATEWAY, msg.clone()),
            AppError::Source { .. } => {
                // Adapter failures are swallowed by the aggregator; reaching
                // here means every source failed with no records to show.
                tracing::error!("Unrecovered source error: {self}");
                (StatusCode::BAD_GATEWAY, self.to_string())
            }
            AppError::EmbeddingUnavailable(msg) => {
                tracing::error!("Embedding error escaped the lexical fallback: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = axum::Json(json!({ "error": message }));
        (status, body).into_response()
    }
}

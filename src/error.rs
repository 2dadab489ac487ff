use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use sqlx::Error as SqlxError;
use thiserror::Error as ThisError;
use tracing::error;

#[derive(Debug, ThisError)]
pub enum SiftError {
    #[error("model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("invalid model artifact: {0}")]
    Artifact(String),

    #[error("vectorizer produces {vectorizer} features but model expects {model}")]
    ArtifactMismatch { vectorizer: usize, model: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    DatabaseError(#[from] SqlxError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Template error: {0}")]
    Template(#[from] minijinja::Error),

    #[error("password hash error: {0}")]
    PasswordHash(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden")]
    Forbidden,

    #[error("a retrain job is already {0}")]
    RetrainInProgress(&'static str),

    #[error("{0}")]
    RetrainFailed(String),

    #[error("Ractor error: {0}")]
    RactorError(String),
}

impl From<argon2::password_hash::Error> for SiftError {
    fn from(e: argon2::password_hash::Error) -> Self {
        SiftError::PasswordHash(e.to_string())
    }
}

impl IntoResponse for SiftError {
    fn into_response(self) -> axum::response::Response {
        let (status, code, message) = match self {
            SiftError::ModelUnavailable(_) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "MODEL_UNAVAILABLE",
                "AI Model not loaded".to_string(),
            ),
            SiftError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Unauthorized".to_string(),
            ),
            SiftError::Forbidden => (
                StatusCode::FORBIDDEN,
                "FORBIDDEN",
                "Permission denied.".to_string(),
            ),
            SiftError::RetrainInProgress(state) => (
                StatusCode::CONFLICT,
                "RETRAIN_IN_PROGRESS",
                format!("A retrain job is already {state}."),
            ),
            SiftError::RetrainFailed(detail) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "RETRAIN_FAILED",
                detail,
            ),
            other => {
                error!(error = %other, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred.".to_string(),
                )
            }
        };
        let body = ApiErrorResponse {
            error: ApiErrorBody {
                code: code.to_string(),
                message,
            },
        };
        (status, Json(body)).into_response()
    }
}

/// Standardized API error response body
#[derive(Serialize)]
pub struct ApiErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Serialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorBody,
}

//! HTTP error handling and response types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use log::error;
use serde::{Deserialize, Serialize};

use crate::db::repository::RepositoryError;
use crate::db::schema::SchemaValidationError;
use crate::db::services::DocumentError;
use crate::error::{InputError, PipelineError};
use crate::services::{IngestError, VisualisationError};

/// API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Application error type for HTTP handlers.
#[derive(Debug)]
pub enum AppError {
    /// Invalid request body
    BadRequest(String),
    /// Caller-side input error (selection, file names, columns)
    Input(InputError),
    /// A document does not match the output contract
    Schema(SchemaValidationError),
    /// The CSV extracts could not be wrangled
    Pipeline(PipelineError),
    Internal(String),
    Repository(RepositoryError),
}

impl AppError {
    fn status_and_body(self) -> (StatusCode, ApiError) {
        match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, ApiError::new("BAD_REQUEST", msg)),
            AppError::Input(e) => (
                StatusCode::BAD_REQUEST,
                ApiError::new("INVALID_INPUT", e.to_string()),
            ),
            AppError::Schema(e) => {
                let body = ApiError::new("SCHEMA_VIOLATION", e.to_string());
                let body = match serde_json::to_string(&e) {
                    Ok(details) => body.with_details(details),
                    Err(_) => body,
                };
                (StatusCode::UNPROCESSABLE_ENTITY, body)
            }
            AppError::Pipeline(e) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ApiError::new("PIPELINE_ERROR", e.to_string()),
            ),
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::new("INTERNAL_ERROR", msg),
            ),
            AppError::Repository(e) => {
                let msg = e.to_string();
                if e.is_retryable() {
                    (
                        StatusCode::SERVICE_UNAVAILABLE,
                        ApiError::new("REPOSITORY_UNAVAILABLE", msg),
                    )
                } else {
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        ApiError::new("REPOSITORY_ERROR", msg),
                    )
                }
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();
        if status.is_server_error() {
            error!("{}: {}", body.code, body.message);
        }
        (status, Json(body)).into_response()
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        AppError::Repository(err)
    }
}

impl From<InputError> for AppError {
    fn from(err: InputError) -> Self {
        AppError::Input(err)
    }
}

impl From<DocumentError> for AppError {
    fn from(err: DocumentError) -> Self {
        match err {
            DocumentError::Schema(e) => AppError::Schema(e),
            DocumentError::Repository(e) => AppError::Repository(e),
            DocumentError::InvalidFile { .. } => AppError::BadRequest(err.to_string()),
            DocumentError::Io { .. } => AppError::Internal(err.to_string()),
        }
    }
}

impl From<IngestError> for AppError {
    fn from(err: IngestError) -> Self {
        match err {
            IngestError::Input(e) => AppError::Input(e),
            IngestError::Pipeline(e) => AppError::Pipeline(e),
            IngestError::Document(e) => e.into(),
        }
    }
}

impl From<VisualisationError> for AppError {
    fn from(err: VisualisationError) -> Self {
        match err {
            VisualisationError::Input(e) => AppError::Input(e),
            VisualisationError::Schema(e) => AppError::Schema(e),
            VisualisationError::Repository(e) => AppError::Repository(e),
        }
    }
}

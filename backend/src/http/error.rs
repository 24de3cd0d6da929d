//! HTTP error handling and response types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::db::repository::RepositoryError;
use crate::services::NightSkyError;

/// API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling
    pub code: String,
    pub message: String,
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
    /// Invalid request (validation error)
    BadRequest { message: String, details: Option<String> },
    /// The engine is not ready to answer (time scales not initialized)
    Unavailable(String),
    Internal(String),
    Repository(RepositoryError),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) | AppError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error = match self {
            AppError::BadRequest { message, details } => {
                let error = ApiError::new("BAD_REQUEST", message);
                match details {
                    Some(details) => error.with_details(details),
                    None => error,
                }
            }
            AppError::Unavailable(msg) => ApiError::new("UNAVAILABLE", msg),
            AppError::Internal(msg) => ApiError::new("INTERNAL_ERROR", msg),
            AppError::Repository(e) => {
                log::error!("Store failure (retryable: {}): {}", e.is_retryable(), e);
                ApiError::new("REPOSITORY_ERROR", e.to_string())
            }
        };

        (status, Json(error)).into_response()
    }
}

impl From<NightSkyError> for AppError {
    fn from(err: NightSkyError) -> Self {
        match err {
            NightSkyError::Validation { message, context } => AppError::BadRequest {
                message,
                details: context.details,
            },
            NightSkyError::Initialization { message, .. } => AppError::Unavailable(message),
            NightSkyError::Repository(e) => AppError::Repository(e),
        }
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        AppError::Repository(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

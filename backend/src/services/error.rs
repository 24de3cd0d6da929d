//! Error type for the night-sky services.
//!
//! Missing planets or stars are not errors anywhere in the service layer:
//! the orchestrator falls back to a neutral attitude or an empty candidate
//! set. Errors surface only for invalid input, an uninitialized time
//! context, or a failing store.

pub use crate::db::repository::ErrorContext;
use crate::db::repository::RepositoryError;

/// Result type for service operations.
pub type NightSkyResultOf<T> = Result<T, NightSkyError>;

#[derive(Debug, thiserror::Error)]
pub enum NightSkyError {
    /// The time context was used before `initialize` was called.
    #[error("Initialization error: {message} {context}")]
    Initialization {
        message: String,
        context: ErrorContext,
    },

    /// A request carried out-of-range or non-finite parameters.
    #[error("Validation error: {message} {context}")]
    Validation {
        message: String,
        context: ErrorContext,
    },

    /// The star or orbital-elements store failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl NightSkyError {
    pub fn initialization_with_context(message: impl Into<String>, context: ErrorContext) -> Self {
        Self::Initialization {
            message: message.into(),
            context,
        }
    }

    pub fn validation_with_context(message: impl Into<String>, context: ErrorContext) -> Self {
        Self::Validation {
            message: message.into(),
            context,
        }
    }
}

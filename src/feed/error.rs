//! Error types raised by feed collaborators.

use std::sync::Arc;
use thiserror::Error;

use crate::resource::{Failure, FailureCode};

/// Result type for source operations.
pub type SourceResult<T> = Result<T, SourceError>;

/// Errors returned by snapshot, content, and headline sources.
///
/// A failed fetch never clears published feed state; it surfaces as a
/// [`Failure`] envelope through [`From<SourceError>`].
#[derive(Debug, Clone, Error)]
pub enum SourceError {
    /// The backend could not be reached.
    #[error("source unavailable: {0}")]
    Unavailable(String),

    /// The backend answered with a classified rejection.
    #[error("request rejected ({code}): {message}")]
    Rejected {
        /// Backend classification.
        code: FailureCode,
        /// Backend explanation.
        message: String,
    },

    /// Any other backend failure.
    #[error("source failure: {0}")]
    Backend(Arc<dyn std::error::Error + Send + Sync>),
}

impl SourceError {
    /// Code used for [`SourceError::Unavailable`].
    pub const UNAVAILABLE: &'static str = "unavailable";

    /// Creates an unavailability error.
    #[must_use]
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable(reason.into())
    }

    /// Creates a classified rejection.
    #[must_use]
    pub fn rejected(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Rejected {
            code: FailureCode::new(code),
            message: message.into(),
        }
    }

    /// Wraps a backend error.
    pub fn backend(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Backend(Arc::new(err))
    }

    /// Returns the failure code this error maps to.
    #[must_use]
    pub fn failure_code(&self) -> FailureCode {
        match self {
            Self::Unavailable(_) => FailureCode::new(Self::UNAVAILABLE),
            Self::Rejected { code, .. } => code.clone(),
            Self::Backend(_) => FailureCode::unknown(),
        }
    }
}

impl From<SourceError> for Failure {
    fn from(err: SourceError) -> Self {
        let code = err.failure_code();
        let message = match err {
            SourceError::Rejected { message, .. } => message,
            other => other.to_string(),
        };
        Self::with_code(message, code)
    }
}

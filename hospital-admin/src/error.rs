//! Error types for the entity stores.

use thiserror::Error;

/// Rejected form input. Safe to show to the administrator as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    Missing(&'static str),

    #[error("{field} is invalid: {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error("No action was requested")]
    NoAction,
}

impl ValidationError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// Store error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Input failed server-side checks.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The addressed record does not exist.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Any database failure, including rolled-back transactions.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Password hashing failed.
    #[error("Password hashing failed: {0}")]
    PasswordHash(String),
}

impl Error {
    /// Message for the rendered page. Storage details stay in the logs.
    pub fn user_message(&self) -> String {
        match self {
            Error::Validation(e) => e.to_string(),
            Error::NotFound(_) => self.to_string(),
            Error::Database(_) | Error::PasswordHash(_) => {
                "The change could not be saved. Please try again or contact support.".to_string()
            }
        }
    }

    /// Returns true if this error came from storage rather than from input.
    pub fn is_storage(&self) -> bool {
        matches!(self, Error::Database(_) | Error::PasswordHash(_))
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

//! Error types module
//!
//! All core failures are unified under the `AppError` enum. Business-rule
//! failures (`Validation`, `Forbidden`, `NotFound`, `InvalidTransition`,
//! `Conflict`) are typed results the caller can match on and are never retried
//! by the core; `Database`/`Internal` come from the persistence boundary.
//!
//! The `Database` variant and `From<sqlx::Error>` are gated behind the `sqlx`
//! feature so the pure domain logic can be built without a database stack.

#[cfg(feature = "sqlx")]
use sqlx::Error as SqlxError;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for contention outcomes like booking conflicts
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
/// to the request-handling layer that sits in front of the core.
pub trait ErrorMetadata {
    /// HTTP status code the outer layer should map this error to
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "INVALID_TRANSITION")
    fn error_code(&self) -> &'static str;

    /// Whether this error is recoverable (can be retried by the caller)
    fn is_recoverable(&self) -> bool;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Malformed or out-of-range input
    #[error("Validation error: {0}")]
    Validation(String),

    /// Permission or role-rank check failed
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Referenced entity absent or outside the caller's tenant scope.
    /// Deliberately indistinguishable between "does not exist" and "belongs
    /// to another tenant" so tenant existence never leaks.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Booking status edge not allowed
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    /// Availability overlap, optimistic-concurrency exhaustion, or duplicate key
    #[error("Conflict: {0}")]
    Conflict(String),

    #[cfg(feature = "sqlx")]
    #[error("Database error: {0}")]
    Database(#[source] SqlxError),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

#[cfg(feature = "sqlx")]
impl From<SqlxError> for AppError {
    fn from(err: SqlxError) -> Self {
        AppError::Database(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        // The Display impl already prefixes "Validation error:".
        AppError::Validation(err.to_string())
    }
}

/// Static metadata per variant: (http_status, error_code, recoverable, log_level).
fn app_error_static_metadata(err: &AppError) -> (u16, &'static str, bool, LogLevel) {
    match err {
        AppError::Validation(_) => (400, "VALIDATION_ERROR", false, LogLevel::Debug),
        AppError::Forbidden(_) => (403, "FORBIDDEN", false, LogLevel::Debug),
        AppError::NotFound(_) => (404, "NOT_FOUND", false, LogLevel::Debug),
        AppError::InvalidTransition(_) => (409, "INVALID_TRANSITION", false, LogLevel::Debug),
        AppError::Conflict(_) => (409, "CONFLICT", true, LogLevel::Warn),
        #[cfg(feature = "sqlx")]
        AppError::Database(_) => (500, "DATABASE_ERROR", true, LogLevel::Error),
        AppError::Internal(_) => (500, "INTERNAL_ERROR", true, LogLevel::Error),
        AppError::InternalWithSource { .. } => (500, "INTERNAL_ERROR", true, LogLevel::Error),
    }
}

impl AppError {
    /// Get the error type name for detailed error responses
    pub fn error_type(&self) -> &str {
        match self {
            AppError::Validation(_) => "Validation",
            AppError::Forbidden(_) => "Forbidden",
            AppError::NotFound(_) => "NotFound",
            AppError::InvalidTransition(_) => "InvalidTransition",
            AppError::Conflict(_) => "Conflict",
            #[cfg(feature = "sqlx")]
            AppError::Database(_) => "Database",
            AppError::Internal(_) => "Internal",
            AppError::InternalWithSource { .. } => "Internal",
        }
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn is_recoverable(&self) -> bool {
        app_error_static_metadata(self).2
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).3
    }

    fn client_message(&self) -> String {
        match self {
            AppError::Validation(msg) => msg.clone(),
            AppError::Forbidden(msg) => msg.clone(),
            AppError::NotFound(msg) => msg.clone(),
            AppError::InvalidTransition(msg) => msg.clone(),
            AppError::Conflict(msg) => msg.clone(),
            #[cfg(feature = "sqlx")]
            AppError::Database(_) => "Failed to access database".to_string(),
            AppError::Internal(_) => "Internal server error".to_string(),
            AppError::InternalWithSource { .. } => "Internal server error".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_metadata_not_found() {
        let err = AppError::NotFound("Booking not found".to_string());
        assert_eq!(err.http_status_code(), 404);
        assert_eq!(err.error_code(), "NOT_FOUND");
        assert!(!err.is_recoverable());
        assert_eq!(err.client_message(), "Booking not found");
        assert_eq!(err.log_level(), LogLevel::Debug);
    }

    #[test]
    fn test_error_metadata_conflict_is_recoverable() {
        let err = AppError::Conflict("Room is not available for these dates".to_string());
        assert_eq!(err.http_status_code(), 409);
        assert_eq!(err.error_code(), "CONFLICT");
        assert!(err.is_recoverable());
        assert_eq!(err.log_level(), LogLevel::Warn);
    }

    #[test]
    fn test_error_metadata_internal_hides_details() {
        let err = AppError::Internal("pool exhausted".to_string());
        assert_eq!(err.http_status_code(), 500);
        assert_eq!(err.client_message(), "Internal server error");
        assert_eq!(err.log_level(), LogLevel::Error);
    }

    #[test]
    fn test_validator_errors_display_the_prefix_once() {
        let mut errors = validator::ValidationErrors::new();
        errors.add(
            "number_of_guests",
            validator::ValidationError::new("range"),
        );
        let err: AppError = errors.into();
        let displayed = err.to_string();
        assert!(displayed.starts_with("Validation error: "));
        assert_eq!(displayed.matches("Validation error:").count(), 1);
    }

    #[test]
    fn test_invalid_transition_metadata() {
        let err = AppError::InvalidTransition("checked_out from pending".to_string());
        assert_eq!(err.http_status_code(), 409);
        assert_eq!(err.error_code(), "INVALID_TRANSITION");
        assert_eq!(err.error_type(), "InvalidTransition");
    }
}

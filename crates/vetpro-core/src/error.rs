//! Error types module
//!
//! This module provides the core error types used throughout VetPro.
//! All errors are unified under the `AppError` enum which can represent validation,
//! database, local storage, authentication and tenant-context failures.
//!
//! The `Database` variant and `From<sqlx::Error>` are gated behind the `sqlx` feature.

#[cfg(feature = "sqlx")]
use sqlx::Error as SqlxError;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for declined or missing data
    Warn,
    /// Error level - for backend failures
    Error,
}

/// Metadata describing how an error is presented to the person using the application.
pub trait ErrorMetadata {
    /// Machine-readable error code (e.g., "DATABASE_ERROR")
    fn error_code(&self) -> &'static str;

    /// Message shown to the user. Backend failures collapse to a generic alert.
    fn client_message(&self) -> String;

    /// Validation errors are raised before any gateway call is made.
    fn is_validation(&self) -> bool;

    /// Whether details should be hidden from the user
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[cfg(feature = "sqlx")]
    #[error("Database error: {0}")]
    Database(#[source] SqlxError),

    #[cfg(not(feature = "sqlx"))]
    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Local storage error: {0}")]
    Storage(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Tenant context error: {0}")]
    TenantContext(String),

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

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Storage(format!("JSON error: {}", err))
    }
}

impl From<uuid::Error> for AppError {
    fn from(err: uuid::Error) -> Self {
        AppError::Validation(format!("Invalid identifier: {}", err))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Validation(crate::validation::describe_errors(&err))
    }
}

/// Static metadata for each variant: (error_code, validation, sensitive, log_level).
fn app_error_static_metadata(err: &AppError) -> (&'static str, bool, bool, LogLevel) {
    match err {
        AppError::Database(_) => ("DATABASE_ERROR", false, true, LogLevel::Error),
        AppError::Validation(_) => ("VALIDATION_ERROR", true, false, LogLevel::Debug),
        AppError::NotFound(_) => ("NOT_FOUND", false, false, LogLevel::Debug),
        AppError::Storage(_) => ("STORAGE_ERROR", false, true, LogLevel::Error),
        AppError::Auth(_) => ("AUTH_ERROR", false, false, LogLevel::Warn),
        AppError::TenantContext(_) => ("TENANT_CONTEXT_ERROR", false, false, LogLevel::Warn),
        AppError::Internal(_) | AppError::InternalWithSource { .. } => {
            ("INTERNAL_ERROR", false, true, LogLevel::Error)
        }
    }
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation(message.into())
    }

    pub fn not_found(entity: &str, id: impl std::fmt::Display) -> Self {
        AppError::NotFound(format!("{} {} not found", entity, id))
    }

    /// Emit the error through `tracing` at its configured level, tagged with the user action
    /// that failed.
    pub fn log(&self, action: &str) {
        match self.log_level() {
            LogLevel::Debug => tracing::debug!(action, error = %self, "Operation rejected"),
            LogLevel::Warn => tracing::warn!(action, error = %self, "Operation failed"),
            LogLevel::Error => tracing::error!(
                action,
                error = %self.detailed_message(),
                "Operation failed"
            ),
        }
    }

    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

impl ErrorMetadata for AppError {
    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).0
    }

    fn is_validation(&self) -> bool {
        app_error_static_metadata(self).1
    }

    fn is_sensitive(&self) -> bool {
        app_error_static_metadata(self).2
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).3
    }

    fn client_message(&self) -> String {
        match self {
            AppError::Database(_) | AppError::Storage(_) => {
                "The operation could not be completed. Please try again.".to_string()
            }
            AppError::Validation(ref msg) => msg.clone(),
            AppError::NotFound(ref msg) => msg.clone(),
            AppError::Auth(ref msg) => msg.clone(),
            AppError::TenantContext(ref msg) => msg.clone(),
            AppError::Internal(_) | AppError::InternalWithSource { .. } => {
                "Unexpected error".to_string()
            }
        }
    }
}

//! Custom error types and handling
//!
//! This module defines the judge's error types. Only configuration and
//! lookup failures ever reach the caller as errors; per-test-case failures
//! are folded into results by the judging service.

use crate::codegen::CodegenError;

/// Application-wide error type
#[derive(Debug, thiserror::Error)]
pub enum JudgeError {
    // Request errors
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),

    // Resource errors
    #[error("Not found: {0}")]
    NotFound(String),

    // Code generation and registry errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    // Persistence errors
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    // Flow control
    #[error("Judging cancelled")]
    Cancelled,

    // Internal errors
    #[error("Internal error")]
    Internal(#[from] anyhow::Error),
}

impl JudgeError {
    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::UnsupportedLanguage(_) => "UNSUPPORTED_LANGUAGE",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::Storage(_) => "STORAGE_ERROR",
            Self::Serialization(_) => "SERIALIZATION_ERROR",
            Self::Cancelled => "CANCELLED",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Whether the caller supplied something wrong (as opposed to a fault on our side)
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::UnsupportedLanguage(_) | Self::NotFound(_)
        )
    }
}

impl From<CodegenError> for JudgeError {
    fn from(err: CodegenError) -> Self {
        match err {
            CodegenError::UnsupportedLanguage(language) => JudgeError::UnsupportedLanguage(language),
            other => JudgeError::Configuration(other.to_string()),
        }
    }
}

impl From<sqlx::Error> for JudgeError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => JudgeError::NotFound("Resource not found".to_string()),
            _ => JudgeError::Storage(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for JudgeError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        JudgeError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for JudgeError {
    fn from(err: serde_json::Error) -> Self {
        JudgeError::Serialization(err.to_string())
    }
}

impl From<validator::ValidationErrors> for JudgeError {
    fn from(err: validator::ValidationErrors) -> Self {
        JudgeError::Validation(err.to_string())
    }
}

/// Result type alias using JudgeError
pub type JudgeResult<T> = Result<T, JudgeError>;

//! Error types for plotweb-core
//!
//! Data-quality problems in imports never surface here: unparseable cells
//! degrade to defaults and identity-less rows are dropped inside the parser.
//! Only structural and file-level problems become errors.

use thiserror::Error;
use serde::{Deserialize, Serialize};
use std::io;

/// Error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Registry snapshot not loaded
    NotLoaded,
    /// Property file not found
    FileNotFound,
    /// User not found
    UserNotFound,
    /// Message not found
    MessageNotFound,
    /// Import failed
    ImportFailed,
    /// IO error
    IoError,
    /// Invalid data format
    InvalidFormat,
    /// Internal error
    InternalError,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCode::NotLoaded => write!(f, "NOT_LOADED"),
            ErrorCode::FileNotFound => write!(f, "FILE_NOT_FOUND"),
            ErrorCode::UserNotFound => write!(f, "USER_NOT_FOUND"),
            ErrorCode::MessageNotFound => write!(f, "MESSAGE_NOT_FOUND"),
            ErrorCode::ImportFailed => write!(f, "IMPORT_FAILED"),
            ErrorCode::IoError => write!(f, "IO_ERROR"),
            ErrorCode::InvalidFormat => write!(f, "INVALID_FORMAT"),
            ErrorCode::InternalError => write!(f, "INTERNAL_ERROR"),
        }
    }
}

/// Error severity for logging
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSeverity {
    Warning,
    Error,
    Critical,
}

/// Detailed error information for API responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetails {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Core registry errors
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Registry snapshot not loaded")]
    NotLoaded,

    #[error("Property file not found: {file_no}")]
    FileNotFound { file_no: String },

    #[error("User not found: {id}")]
    UserNotFound { id: String },

    #[error("Message not found: {id}")]
    MessageNotFound { id: String },

    #[error("Import failed: {message}")]
    ImportFailed { message: String },

    #[error("IO error")]
    IoError(#[from] io::Error),

    #[error("Invalid registry snapshot: {message}")]
    InvalidFormat { message: String },
}

impl CoreError {
    /// Map to an error code for API responses
    pub fn code(&self) -> ErrorCode {
        match self {
            CoreError::NotLoaded => ErrorCode::NotLoaded,
            CoreError::FileNotFound { .. } => ErrorCode::FileNotFound,
            CoreError::UserNotFound { .. } => ErrorCode::UserNotFound,
            CoreError::MessageNotFound { .. } => ErrorCode::MessageNotFound,
            CoreError::ImportFailed { .. } => ErrorCode::ImportFailed,
            CoreError::IoError(_) => ErrorCode::IoError,
            CoreError::InvalidFormat { .. } => ErrorCode::InvalidFormat,
        }
    }

    /// Severity used when logging the error
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            CoreError::FileNotFound { .. }
            | CoreError::UserNotFound { .. }
            | CoreError::MessageNotFound { .. } => ErrorSeverity::Warning,
            CoreError::ImportFailed { .. } | CoreError::NotLoaded => ErrorSeverity::Error,
            CoreError::IoError(_) | CoreError::InvalidFormat { .. } => ErrorSeverity::Critical,
        }
    }

    /// Build the detailed representation
    pub fn details(&self) -> ErrorDetails {
        ErrorDetails {
            code: self.code(),
            message: self.to_string(),
            details: None,
        }
    }

    /// Log the error at its severity level
    pub fn log(&self) {
        match self.severity() {
            ErrorSeverity::Warning => log::warn!("{}", self),
            ErrorSeverity::Error => log::error!("{}", self),
            ErrorSeverity::Critical => log::error!("CRITICAL: {}", self),
        }
    }
}

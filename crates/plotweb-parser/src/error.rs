//! Error types for plotweb-parser

use thiserror::Error;
use std::io;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Invalid export format: {message}")]
    InvalidFormat { message: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("IO error")]
    IoError(#[from] io::Error),

    #[error("Internal error")]
    InternalError,
}

//! Provider framework error types

use thiserror::Error;

/// Errors raised by the resource framework itself
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Resource type not supported: {0}")]
    ResourceTypeNotFound(String),

    #[error("Resource not found in state: {0}")]
    ResourceNotFound(String),

    #[error("Missing required attribute: {0}")]
    MissingAttribute(String),

    #[error("Attribute {key} must be {expected}")]
    TypeMismatch { key: String, expected: &'static str },

    #[error("Unknown attribute {key} in {context}")]
    UnknownAttribute { key: String, context: String },

    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("State file error: {0}")]
    StateError(String),

    #[error("Lock acquisition failed: {0}")]
    LockError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ProviderError>;

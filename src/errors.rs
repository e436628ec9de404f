//! Error types for IncidentBuddy
//!
//! One error enum for the whole crate. The retry wrapper consults
//! [`IncidentError::is_transient`] to decide whether an attempt may be repeated.

use thiserror::Error;

/// Main error type for incident resolution
#[derive(Error, Debug)]
pub enum IncidentError {
    /// Completion service answered with an error or unusable status
    #[error("Completion service error: {0}")]
    ServiceError(String),

    /// Completion service answered 2xx but the body had no usable content
    #[error("Malformed completion response: {0}")]
    MalformedResponse(String),

    /// HTTP client errors
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Incident store errors
    #[error("Store error: {0}")]
    StoreError(#[from] rusqlite::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// All attempts of a retried operation failed
    #[error("{operation} failed after {attempts} attempts: {last_error}")]
    RetriesExhausted {
        operation: String,
        attempts: u32,
        last_error: String,
    },

    /// Generic errors with context
    #[error("Incident error: {0}")]
    Generic(String),
}

impl IncidentError {
    /// Whether a retry might succeed where this attempt failed
    pub fn is_transient(&self) -> bool {
        match self {
            IncidentError::ServiceError(_) => true,
            IncidentError::MalformedResponse(_) => true,
            IncidentError::HttpError(_) => true,
            IncidentError::SerializationError(_) => true,
            IncidentError::Generic(_) => true,

            IncidentError::StoreError(_) => false,
            IncidentError::IoError(_) => false,
            IncidentError::ConfigError(_) => false,
            IncidentError::RetriesExhausted { .. } => false,
        }
    }
}

/// Result type alias for incident operations
pub type Result<T> = std::result::Result<T, IncidentError>;

/// Convert anyhow errors to IncidentError
impl From<anyhow::Error> for IncidentError {
    fn from(err: anyhow::Error) -> Self {
        IncidentError::Generic(err.to_string())
    }
}

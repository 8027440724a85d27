// --- File: crates/odmark_common/src/error.rs ---
use std::fmt;
use thiserror::Error;

/// The base error type for all Odmark errors.
///
/// This enum provides a common set of error variants that can be used across all crates.
/// Each crate can extend this by implementing From<SpecificError> for OdmarkError.
#[derive(Error, Debug)]
pub enum OdmarkError {
    /// Error occurred while parsing data
    #[error("Failed to parse data: {0}")]
    ParseError(String),

    /// Error occurred due to missing or invalid configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Error occurred during authentication or authorization
    #[error("Authentication error: {0}")]
    AuthError(String),

    /// Error occurred during validation
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Error occurred during a document store operation
    #[error("Store error: {0}")]
    StoreError(String),

    /// Error occurred during external service call
    #[error("External service error: {service_name} - {message}")]
    ExternalServiceError {
        service_name: String,
        message: String,
    },

    /// Error occurred due to a conflict (e.g., resource already exists)
    #[error("Conflict: {0}")]
    ConflictError(String),

    /// Error occurred due to a resource not being found
    #[error("Not found: {0}")]
    NotFoundError(String),

    /// Error occurred due to an internal error
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// A trait for converting errors to HTTP status codes.
///
/// This trait can be implemented by error types to provide a consistent way
/// to convert errors to HTTP status codes.
pub trait HttpStatusCode {
    /// Returns the HTTP status code for this error.
    fn status_code(&self) -> u16;
}

impl HttpStatusCode for OdmarkError {
    fn status_code(&self) -> u16 {
        match self {
            OdmarkError::ParseError(_) => 400,
            OdmarkError::ConfigError(_) => 500,
            OdmarkError::AuthError(_) => 401,
            OdmarkError::ValidationError(_) => 400,
            OdmarkError::StoreError(_) => 500,
            OdmarkError::ExternalServiceError { .. } => 502,
            OdmarkError::ConflictError(_) => 409,
            OdmarkError::NotFoundError(_) => 404,
            OdmarkError::InternalError(_) => 500,
        }
    }
}

impl From<serde_json::Error> for OdmarkError {
    fn from(err: serde_json::Error) -> Self {
        OdmarkError::ParseError(err.to_string())
    }
}

impl From<std::io::Error> for OdmarkError {
    fn from(err: std::io::Error) -> Self {
        OdmarkError::InternalError(err.to_string())
    }
}

// Utility functions for error handling
pub fn config_error<T: fmt::Display>(message: T) -> OdmarkError {
    OdmarkError::ConfigError(message.to_string())
}

pub fn validation_error<T: fmt::Display>(message: T) -> OdmarkError {
    OdmarkError::ValidationError(message.to_string())
}

pub fn not_found<T: fmt::Display>(message: T) -> OdmarkError {
    OdmarkError::NotFoundError(message.to_string())
}

pub fn conflict<T: fmt::Display>(message: T) -> OdmarkError {
    OdmarkError::ConflictError(message.to_string())
}

pub fn external_service_error<T: fmt::Display>(service_name: &str, message: T) -> OdmarkError {
    OdmarkError::ExternalServiceError {
        service_name: service_name.to_string(),
        message: message.to_string(),
    }
}

pub fn internal_error<T: fmt::Display>(message: T) -> OdmarkError {
    OdmarkError::InternalError(message.to_string())
}

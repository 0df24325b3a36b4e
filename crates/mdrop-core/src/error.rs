//! Request-level error taxonomy.
//!
//! Every failure a download request can hit collapses into one of three
//! classes, each mapped to a single HTTP status by the server module.

use thiserror::Error;

/// Error returned by validation, fetching, or the service facade.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MdropError {
    /// Malformed URL, unsupported format, unknown size, wrong content type,
    /// upstream error status, or missing parameters.
    #[error("{0}")]
    BadRequest(String),
    /// Declared or realized size exceeds the per-type ceiling.
    #[error("{0}")]
    PayloadTooLarge(String),
    /// Disk failure, transport failure, or a panicked worker.
    #[error("{0}")]
    Internal(String),
}

impl MdropError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        MdropError::BadRequest(message.into())
    }

    pub fn too_large(message: impl Into<String>) -> Self {
        MdropError::PayloadTooLarge(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        MdropError::Internal(message.into())
    }

    /// Numeric HTTP status for this error class.
    pub fn status_code(&self) -> u16 {
        match self {
            MdropError::BadRequest(_) => 400,
            MdropError::PayloadTooLarge(_) => 413,
            MdropError::Internal(_) => 500,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            MdropError::BadRequest(m) | MdropError::PayloadTooLarge(m) | MdropError::Internal(m) => m,
        }
    }
}

pub type Result<T> = std::result::Result<T, MdropError>;

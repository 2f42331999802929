//! # Provider Errors
//!
//! Error taxonomy shared by the router and every table handler.

use thiserror::Error;

use crate::store::StoreError;

/// Result type for router and handler operations
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Errors raised to the immediate caller of a provider operation
#[derive(Debug, Error)]
pub enum ProviderError {
    /// No handler for the table segment, or the URI shape is not one the
    /// handler recognizes
    #[error("Unknown URI: {0}")]
    UnknownResource(String),

    /// Malformed input for the requested operation
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Inputs were valid but the store produced no row id
    #[error("Failed to insert row into {0}")]
    WriteFailure(String),

    /// The store failed for reasons outside the taxonomy above
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl ProviderError {
    /// Create an unknown resource error naming the offending URI
    pub fn unknown_resource(uri: impl ToString) -> Self {
        Self::UnknownResource(uri.to_string())
    }

    /// Create an invalid argument error
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Create a write failure error naming the target URI
    pub fn write_failure(uri: impl ToString) -> Self {
        Self::WriteFailure(uri.to_string())
    }

    /// Stable error code for responses
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnknownResource(_) => "UNKNOWN_RESOURCE",
            Self::InvalidArgument(_) => "INVALID_ARGUMENT",
            Self::WriteFailure(_) => "WRITE_FAILURE",
            Self::Store(_) => "STORE_ERROR",
        }
    }

    /// HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::UnknownResource(_) => 404,
            Self::InvalidArgument(_) => 400,
            Self::WriteFailure(_) => 500,
            Self::Store(_) => 500,
        }
    }
}

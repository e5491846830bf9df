//! Error types shared by the store and its adapters

use thiserror::Error;

/// Errors surfaced by the client store
///
/// A missing client is not an error: lookups return `Ok(None)`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The backing medium cannot be reached or written (transient)
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),

    /// A required field is missing or malformed (permanent)
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl StoreError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        StoreError::StorageUnavailable(message.into())
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        StoreError::InvalidInput(message.into())
    }

    /// Whether retrying later may succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::StorageUnavailable(_))
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;

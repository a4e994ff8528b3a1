//! Error handling for heap pages

use crate::storage::record_id::RecordId;
use thiserror::Error;

/// Common result type for heapstore operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for heap page operations
///
/// Running out of room on a page and reaching the end of a page's records are
/// ordinary outcomes and are reported through return values, not through this
/// type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Input that can never succeed, whatever the page occupancy
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// Record id out of range, tombstoned, or naming another page
    #[error("Record not found: {0}")]
    RecordNotFound(RecordId),
    /// Page bytes violate the heap page layout
    #[error("Page corruption: {0}")]
    Corruption(String),
}

impl Error {
    /// Create an invalid input error
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Error::InvalidInput(msg.into())
    }

    /// Create a corruption error
    pub fn corruption<S: Into<String>>(msg: S) -> Self {
        Error::Corruption(msg.into())
    }

    /// Check if this is an invalid input error
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Error::InvalidInput(_))
    }

    /// Check if this is a record not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::RecordNotFound(_))
    }

    /// Check if this is a corruption error
    pub fn is_corruption(&self) -> bool {
        matches!(self, Error::Corruption(_))
    }

    /// Check if the page is still usable after this error
    pub fn is_recoverable(&self) -> bool {
        match self {
            Error::InvalidInput(_) | Error::RecordNotFound(_) => true,
            Error::Corruption(_) => false,
        }
    }
}

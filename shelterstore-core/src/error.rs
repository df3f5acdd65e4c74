//! Error and result types for store operations.
//!
//! Use [`StoreResult<T>`] as the return type for fallible operations. The error
//! taxonomy deliberately separates failures a caller can act on: construction
//! failures are fatal and no store value exists afterwards, while every
//! per-operation failure leaves the store usable.

use bson::error::Error as BsonError;
use thiserror::Error;

/// Represents all possible errors raised by the store layer.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Required configuration is missing or malformed (e.g. an empty database
    /// or collection name). Raised at construction, never suppressed.
    #[error("Configuration error: {0}")]
    Configuration(String),
    /// The engine could not be reached or rejected authentication while the
    /// store was being constructed.
    #[error("Connection error: {0}")]
    Connection(String),
    /// An operation argument had the wrong shape (e.g. a non-mapping query).
    /// The operation was rejected before any engine call.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    /// A rescue-training category outside the criteria table. No query is run.
    #[error("Unknown rescue category: {0}")]
    UnknownCategory(String),
    /// Error converting between document representations.
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// An operational fault reported by the underlying database engine.
    #[error("Backend error: {0}")]
    Backend(String),
}

/// A specialized `Result` type for store operations.
///
/// `Ok(0)` or `Ok(vec![])` means the operation ran and nothing matched;
/// an `Err` means it was rejected or the engine faulted.
pub type StoreResult<T> = Result<T, StoreError>;

impl From<BsonError> for StoreError {
    fn from(err: BsonError) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

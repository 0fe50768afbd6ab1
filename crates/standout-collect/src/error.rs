//! Error types for the collect crate.
//!
//! Lookups that find nothing are not errors: they return `Option`. The
//! variants here are reserved for calls that break an operation's contract.

use thiserror::Error;

/// Errors that can occur when transforming or mutating a collection.
#[derive(Debug, Error)]
pub enum CollectError {
    /// `chunk` was asked for chunks of zero items.
    #[error("chunk size must be at least 1")]
    InvalidChunkSize,

    /// `every` was asked for a step of zero.
    #[error("step must be at least 1")]
    InvalidStep,

    /// A value had to become a map key but is not a string, number or bool.
    #[error("{kind} values cannot be used as collection keys")]
    UnusableKey { kind: &'static str },

    /// Operator token passed to `where_op` is not recognized.
    #[error("unknown comparison operator '{0}'")]
    UnknownOperator(String),

    /// More random items were requested than the collection holds.
    #[error("requested {requested} items but the collection only has {available}")]
    NotEnoughItems { requested: usize, available: usize },

    /// `put` on a list targeted a position past the end.
    #[error("index {index} is out of bounds for a list of {len} items")]
    IndexOutOfBounds { index: usize, len: usize },

    /// A named key was used where a list position is required.
    #[error("key '{0}' is not a list position")]
    NotAnIndex(String),

    /// JSON encoding or decoding failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for collect operations.
pub type Result<T> = std::result::Result<T, CollectError>;

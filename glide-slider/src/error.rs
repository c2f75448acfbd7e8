//! Error types surfaced by the slider engine.
//!
//! Only configuration can fail from the caller's point of view. Commit sink
//! failures are reported through [`CommitError`] to the log and never
//! propagate back into gesture handling.

use std::error::Error as StdError;

use thiserror::Error;

/// Failure reported by a [`CommitSink`](crate::CommitSink).
#[derive(Debug, Error)]
pub enum CommitError {
    /// The sink refused the value.
    #[error("commit rejected: {0}")]
    Rejected(String),
    /// The sink failed with an underlying error.
    #[error("commit failed: {0}")]
    Failed(#[source] Box<dyn StdError + Send + Sync>),
    /// The sink panicked while producing or driving its future.
    #[error("commit sink panicked: {0}")]
    Panicked(String),
}

impl CommitError {
    /// Creates a [`CommitError::Rejected`] from a message.
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected(message.into())
    }

    /// Wraps an arbitrary error as [`CommitError::Failed`].
    pub fn failed(error: impl Into<Box<dyn StdError + Send + Sync>>) -> Self {
        Self::Failed(error.into())
    }
}

/// Invalid bounds for a [`ValueRange`](crate::ValueRange).
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum RangeError {
    /// The upper bound must be finite and strictly greater than the fixed
    /// lower bound of zero.
    #[error("max value must be finite and greater than zero, got {0}")]
    InvalidMax(f32),
}

/// Failure while parsing a hex color string.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ColorParseError {
    /// The string did not start with `#`.
    #[error("color `{0}` must start with `#`")]
    MissingHash(String),
    /// The digit count was not 3, 4, 6 or 8.
    #[error("color `{0}` must have 3, 4, 6 or 8 hex digits")]
    InvalidLength(String),
    /// A character was not a hex digit.
    #[error("color `{0}` contains a non-hex digit")]
    InvalidDigit(String),
}

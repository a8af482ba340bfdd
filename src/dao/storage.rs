//! Storage error types shared by every engine.

use thiserror::Error;

/// Result alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Error raised by storage backends regardless of the underlying engine.
#[derive(Debug, Error)]
pub enum StorageError {
    /// A transaction precondition did not hold; nothing was written.
    #[error("storage conflict: {message}")]
    Conflict {
        /// Which precondition failed.
        message: String,
    },
    /// The operation did not complete within the configured limit.
    #[error("storage operation `{operation}` timed out")]
    Timeout {
        /// Store method that was cut off.
        operation: &'static str,
    },
}

impl StorageError {
    /// Construct a conflict error for a rejected transaction.
    pub fn conflict(message: impl Into<String>) -> Self {
        StorageError::Conflict {
            message: message.into(),
        }
    }
}

//! Error type shared by every fallible operation of the crate.
//!
//! Failures are local and synchronous: an operation that returns an error
//! has left the dictionary exactly as it found it.

use alloc::string::String;
use thiserror::Error;

/// Errors reported by [`Dictionary`](crate::Dictionary), its cursors and views.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DictError {
    /// Insert-if-absent was called with a key that is already present.
    #[error("an entry with the same key already exists")]
    DuplicateKey,

    /// Indexed access of a key that is not present.
    #[error("the given key was not present in the dictionary")]
    KeyNotFound,

    /// An argument was outside its valid range.
    #[error("invalid argument: {message}")]
    InvalidArgument {
        /// What was wrong with the argument.
        message: String,
    },

    /// A cursor was used after the dictionary was mutated.
    #[error("dictionary was modified; enumeration cannot continue")]
    InvalidatedIterator,

    /// A cursor was read before its first successful advance or after it
    /// was exhausted.
    #[error("enumeration has either not started or has already finished")]
    InvalidCursorState,

    /// A mutation was attempted through a read-only view.
    #[error("operation not supported on a read-only view: {operation}")]
    UnsupportedOperation {
        /// Name of the rejected operation.
        operation: &'static str,
    },

    /// A snapshot could not be restored.
    #[error("malformed snapshot: {message}")]
    MalformedSnapshot {
        /// What was wrong with the snapshot.
        message: String,
    },
}

impl DictError {
    /// Create an invalid argument error
    pub fn invalid_argument<M: Into<String>>(message: M) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create an unsupported operation error
    pub fn unsupported(operation: &'static str) -> Self {
        Self::UnsupportedOperation { operation }
    }

    /// Create a malformed snapshot error
    pub fn malformed_snapshot<M: Into<String>>(message: M) -> Self {
        Self::MalformedSnapshot {
            message: message.into(),
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = core::result::Result<T, DictError>;

//! Error types for Tabula
//!
//! This module defines all error types used throughout the system.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.
//!
//! Every variant maps onto one [`ErrorKind`] so callers can branch on the
//! category without matching every variant.

use crate::change::PayloadKind;
use crate::types::ViewId;
use std::io;
use thiserror::Error;

/// Result type alias for Tabula operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Tabula
#[derive(Debug, Error)]
pub enum Error {
    /// Requested entity does not exist (view scope, change, payload, unsupported type)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Caller supplied an unusable argument (blank table id, malformed range)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Payload was requested as a different kind than the one stored
    #[error("Type mismatch: expected {expected} payload, found {actual}")]
    TypeMismatch {
        /// Name of the payload type the caller asked for
        expected: &'static str,
        /// Kind of the stored payload
        actual: PayloadKind,
    },

    /// I/O error from an underlying store
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Data corruption detected (gaps in a change log, inconsistent payloads)
    #[error("Data corruption: {0}")]
    Corruption(String),

    /// Scope closure could not be fully computed
    #[error("Failed to resolve scope of view {view_id}: {source}")]
    ResolutionFailure {
        /// View whose scope was being resolved
        view_id: ViewId,
        /// Underlying cause
        #[source]
        source: Box<Error>,
    },

    /// Component wiring is incomplete or inconsistent
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Caller cancelled the operation
    #[error("Operation cancelled")]
    Cancelled,

    /// A configured bound was exceeded
    #[error("Limit exceeded: {0}")]
    LimitExceeded(String),
}

/// Error category
///
/// Collapses storage-level variants (`Io`, `Serialization`, `Corruption`)
/// into a single `IoFailure` category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Missing entity
    NotFound,
    /// Bad caller input
    InvalidArgument,
    /// Payload loaded as the wrong type
    TypeMismatch,
    /// Storage, decode, or corruption failure
    IoFailure,
    /// Scope closure failed
    ResolutionFailure,
    /// Construction-time wiring failure
    Configuration,
    /// Cancelled by the caller
    Cancelled,
    /// Bound exceeded
    LimitExceeded,
}

impl Error {
    /// Category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::NotFound(_) => ErrorKind::NotFound,
            Error::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Error::TypeMismatch { .. } => ErrorKind::TypeMismatch,
            Error::Io(_) | Error::Serialization(_) | Error::Corruption(_) => ErrorKind::IoFailure,
            Error::ResolutionFailure { .. } => ErrorKind::ResolutionFailure,
            Error::Configuration(_) => ErrorKind::Configuration,
            Error::Cancelled => ErrorKind::Cancelled,
            Error::LimitExceeded(_) => ErrorKind::LimitExceeded,
        }
    }

    /// Shorthand for `NotFound`
    pub fn not_found(msg: impl Into<String>) -> Self {
        Error::NotFound(msg.into())
    }

    /// Shorthand for `InvalidArgument`
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Error::InvalidArgument(msg.into())
    }

    /// Shorthand for `Corruption`
    pub fn corruption(msg: impl Into<String>) -> Self {
        Error::Corruption(msg.into())
    }

    /// Shorthand for `Configuration`
    pub fn configuration(msg: impl Into<String>) -> Self {
        Error::Configuration(msg.into())
    }

    /// Wrap `cause` as a scope resolution failure for `view_id`
    pub fn resolution_failure(view_id: ViewId, cause: Error) -> Self {
        Error::ResolutionFailure {
            view_id,
            source: Box::new(cause),
        }
    }

    /// Whether this error was raised by a storage or decode failure
    pub fn is_io_failure(&self) -> bool {
        self.kind() == ErrorKind::IoFailure
    }
}

impl From<rmp_serde::decode::Error> for Error {
    fn from(e: rmp_serde::decode::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<rmp_serde::encode::Error> for Error {
    fn from(e: rmp_serde::encode::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

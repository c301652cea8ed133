//! Template Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// A placeholder resolution error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for placeholder resolution.
pub type Result<T> = std::result::Result<T, Error>;

/// Why a single placeholder could not be resolved.
///
/// Neither is fatal: the placeholder is left verbatim and resolution moves on
/// to the next one.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The placeholder names a key that isn't in the context.
    #[display("key '{_0}' not found")]
    UnknownTemplateKey(#[error(not(source))] String),
    /// The width or pad field of the placeholder is malformed.
    #[display("invalid template format: {_0}")]
    TemplateFormatError(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        false
    }
}

//! EXIF Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// An EXIF error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for EXIF operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    #[display("file not found: {}", _0.display())]
    NotFound(#[error(not(source))] PathBuf),
    /// The file has no readable EXIF data. Don't retry with the same file.
    #[display("invalid image file format")]
    InvalidImage,
    /// A date/time tag doesn't follow `YYYY:MM:DD HH:MM:SS`.
    #[display("invalid timestamp: {_0}")]
    InvalidTimestamp(#[error(not(source))] String),
    #[display("I/O error")]
    Io,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorKind::Io)
    }
}

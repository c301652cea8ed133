//! Calculator Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// A calculation error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for calculation operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// Every variant describes a malformed calculation request. They are fatal to
/// that single calculation, never to a whole batch.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// A photo or image dimension was zero, negative or not a number.
    #[display("photo and image dimensions must be positive")]
    InvalidDimension,
    /// Both bounds were supplied and the minimum exceeds the maximum.
    #[display("minimum DPI {min} is greater than maximum DPI {max}")]
    InvalidBounds { min: u32, max: u32 },
    /// The scanner's resolution menu contains a non-positive entry.
    #[display("scanner resolutions must be positive, found: {_0}")]
    InvalidMenuEntry(#[error(not(source))] u32),
    /// The rounding code is not one of `nr`, `mx` or `mn`.
    #[display("unknown rounding mode: {_0}")]
    InvalidRounding(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        // The same request always produces the same answer.
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kind_display() {
        assert_eq!(
            ErrorKind::InvalidBounds { min: 600, max: 300 }.to_string(),
            "minimum DPI 600 is greater than maximum DPI 300"
        );
        assert_eq!(ErrorKind::InvalidMenuEntry(0).to_string(), "scanner resolutions must be positive, found: 0");
        assert!(!ErrorKind::InvalidDimension.is_retryable());
    }
}

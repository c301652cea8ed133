//! Configuration Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A configuration error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for configuration operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The settings file does not exist.
    #[display("settings file not found: {}", _0.display())]
    NotFound(#[error(not(source))] PathBuf),
    /// The settings file exists but could not be read or parsed.
    #[display("unable to read settings from: {}", _0.display())]
    Parse(#[error(not(source))] PathBuf),
    #[display("settings section not found: [{_0}]")]
    MissingSection(#[error(not(source))] String),
    #[display("settings key not found: [{section}] {key}")]
    MissingKey { section: String, key: String },
    /// A `${...}` reference points at a key that doesn't exist.
    #[display("bad reference '{reference}' in [{section}] {key}")]
    Interpolation { section: String, key: String, reference: String },
    /// References nest too deeply, most likely a cycle.
    #[display("references nest too deeply in [{section}] {key}")]
    InterpolationDepth { section: String, key: String },
    #[display("unable to write settings to: {}", _0.display())]
    Write(#[error(not(source))] PathBuf),
    /// Application defaults could not be extracted from their sources.
    #[display("invalid application defaults")]
    Defaults,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorKind::Write(_))
    }
}

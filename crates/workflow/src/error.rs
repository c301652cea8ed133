//! Workflow Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A workflow error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for workflow operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// Any of these aborts the current batch item only.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// No engine is registered under this name.
    #[display("unknown workflow engine: {_0}")]
    UnknownEngine(#[error(not(source))] String),
    /// A settings file is missing, unreadable or lacks a required value.
    #[display("error loading workflow settings")]
    Settings,
    /// The settings file for the scanning program could not be written.
    #[display("error overwriting the engine settings file '{}'", _0.display())]
    SettingsWrite(#[error(not(source))] PathBuf),
    #[display("file '{}' not found", _0.display())]
    ProgramNotFound(#[error(not(source))] PathBuf),
    /// The scanning program could not be started.
    #[display("unable to launch the scanning program")]
    Launch,
    /// The scanning program exited without producing the expected file.
    #[display("output file '{}' not found", _0.display())]
    OutputNotFound(#[error(not(source))] PathBuf),
    #[display("error moving file from '{}' to '{}'", from.display(), to.display())]
    Move { from: PathBuf, to: PathBuf },
    #[display("I/O error")]
    Io,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        // Retrying means re-running the whole batch item, which is up to the
        // operator.
        false
    }
}

//! Application Error Types

use derive_more::{Display, Error};
use std::path::PathBuf;

pub type Error = exn::Exn<ErrorKind>;
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Reading from or writing to the terminal failed.
    #[display("terminal I/O error")]
    Terminal,
    /// The resolution calculation rejected the entered values.
    #[display("unable to calculate the scan resolution")]
    Calculation,
    #[display("folder doesn't exist: {}", _0.display())]
    FolderNotFound(#[error(not(source))] PathBuf),
    #[display("unknown batch type: {_0}")]
    UnknownBatch(#[error(not(source))] String),
    #[display("unable to open log file '{}'", _0.display())]
    Logging(#[error(not(source))] PathBuf),
    #[display("unable to install the interrupt handler")]
    Interrupt,
    #[display("workflow failed")]
    Workflow,
}

//! Scanning workflows.
//!
//! A [`Workflow`] drives an external scanning program for one batch item:
//! it prepares the program's settings, runs it to completion and moves what
//! it produced to its final, template-derived location. Engines are looked up
//! by name in a [`Registry`] populated explicitly at start-up.

pub mod error;
mod files;
mod program;
mod registry;
pub mod system;
pub mod vuescan;

use crate::error::Result;
use scan_batcher_template::Context;
use std::path::{Path, PathBuf};
use time::UtcOffset;

pub use crate::registry::{Factory, Registry};

/// Everything an engine needs to know about the installation it runs in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineOptions {
    /// The installation settings file (where the scanning program lives).
    pub settings: PathBuf,
    /// Offset used to turn file modification times into local date/times.
    /// Determine it before any threads are spawned.
    pub local_offset: UtcOffset,
}

/// One end-to-end scan: configure, run, relocate.
pub trait Workflow {
    /// The engine name this workflow is registered under.
    fn name(&self) -> &'static str;

    /// Runs the workflow described by the job directory `workflow_path`.
    ///
    /// `context` starts with the caller's template values; the workflow adds
    /// what it learns along the way (user name, capture date) so the caller
    /// can inspect it afterwards.
    fn run(&self, context: &mut Context, workflow_path: &Path) -> Result<()>;
}

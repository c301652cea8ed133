//! Batch drivers: where the values for each workflow run come from.
//!
//! | Kind        | Items                                              |
//! |-------------|----------------------------------------------------|
//! | `calculate` | none; one interactive resolution calculation only  |
//! | `scan`      | `scan_dpi`, one per interactive calculation, forever |
//! | `process`   | `path` and `filename`, one per matching file        |

mod folder;
mod interactive;

use crate::error::{ErrorKind, Result};
use scan_batcher_template::Context;
use std::path::PathBuf;

pub use folder::Folder;
pub use interactive::{Dimensions, Interactive, Limits};

/// Pattern matching every file.
pub const ALL_FILES: &str = "*.*";

/// A source of batch items.
pub trait Batch {
    /// The template values for the next workflow run, or `None` once the batch
    /// is exhausted. An error affects this item only; the batch may be asked
    /// for the next one.
    fn next_item(&mut self) -> Result<Option<Context>>;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Kind {
    Calculate,
    Scan,
    Process { folder: PathBuf, pattern: String },
}
impl Kind {
    /// Parses the batch kind and its arguments. No arguments means [`Kind::Scan`].
    pub fn parse(args: &[String]) -> Result<Self> {
        let Some((kind, rest)) = args.split_first() else {
            return Ok(Self::Scan);
        };
        match (kind.to_lowercase().as_str(), rest) {
            ("" | "scan", _) => Ok(Self::Scan),
            ("calculate", _) => Ok(Self::Calculate),
            ("process", [folder]) => Ok(Self::Process { folder: folder.into(), pattern: ALL_FILES.to_string() }),
            ("process", [folder, pattern, ..]) => Ok(Self::Process { folder: folder.into(), pattern: pattern.clone() }),
            _ => exn::bail!(ErrorKind::UnknownBatch(args.join(" "))),
        }
    }

    /// Whether items of this batch are handed to a workflow.
    pub fn runs_workflow(&self) -> bool {
        !matches!(self, Self::Calculate)
    }
}

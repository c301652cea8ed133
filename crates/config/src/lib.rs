//! Configuration for scan-batcher.
//!
//! Two unrelated kinds of configuration live here:
//!
//! - [`Settings`]: INI files driving a scanning workflow. One file belongs to
//!   the installation (where the scanner program lives), one to each job
//!   (where output goes, how files are named, which scanner options to use).
//!   Values may reference each other with `${key}` or `${section:key}`; these
//!   references are expanded on load. `{...}` placeholders are left alone for
//!   the template engine to resolve at use time.
//! - [`Defaults`]: application defaults for the command line, layered from a
//!   TOML file in the user's configuration directory and `SCAN_BATCHER_*`
//!   environment variables.

mod defaults;
pub mod error;
mod interpolate;
mod merge;
mod settings;

pub use crate::defaults::{DEFAULTS_FILE_NAME, Defaults, config_dir};
pub use crate::merge::merge_engine_sections;
pub use crate::settings::{DEFAULT_SECTION, Section, Settings};

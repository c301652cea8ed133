//! Runtime placeholder substitution.
//!
//! Settings values (paths, file names) may embed placeholders that are filled
//! from a [`Context`] of run-time facts: the current user, the chosen DPI, the
//! capture date of a scanned file, or anything passed on the command line.
//!
//! # Syntax
//!
//! | Placeholder                | Meaning                                          |
//! |----------------------------|--------------------------------------------------|
//! | `{key}`                    | the value as-is                                  |
//! | `{key:width}`              | at least `width` characters, left-aligned        |
//! | `{key:width:align}`        | `align` is `<` (left), `>` (right) or `^` (center) |
//! | `{key:width:align:pad}`    | padded with the single character `pad`           |
//!
//! Values longer than `width` are never truncated. An unknown alignment falls
//! back to left. A placeholder whose key is missing, or whose width or pad is
//! malformed, is left in the output verbatim and reported, without affecting
//! the other placeholders in the string.
//!
//! # Example
//!
//! ```
//! use scan_batcher_template::{Context, resolve};
//!
//! let mut context = Context::new();
//! context.insert("user_name", "alice");
//! context.insert("scan_dpi", 600);
//!
//! assert_eq!(resolve("scan_{user_name:10:>:_}.tif", &context), "scan______alice.tif");
//! assert_eq!(resolve("{scan_dpi:5:>:0}dpi/{missing}", &context), "00600dpi/{missing}");
//! ```

mod context;
pub mod error;
mod placeholder;
mod resolve;

pub use crate::context::{Context, Value};
pub use crate::placeholder::{Alignment, MAX_WIDTH, Placeholder};
pub use crate::resolve::{Failure, Resolved, render, resolve};

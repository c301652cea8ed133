//! Scan resolution recommendation.
//!
//! Given the physical size of a photo (centimeters), the pixel size wanted for
//! its digitized image, optional DPI bounds and the set of resolutions the
//! scanner actually supports, [`calculate`] produces:
//!
//! - the **calculated** DPI: the raw requirement so that neither side of the
//!   image is under-resolved,
//! - the **recommended** DPI: the requirement snapped to the scanner's menu
//!   with a [`Rounding`] policy, then clamped to the bounds, and
//! - the **options**: every menu resolution with the pixel length it yields
//!   along the photo's long side.
//!
//! Photo and image dimensions may be given in either orientation.
//!
//! ```
//! use scan_batcher_calculator::{Rounding, ScanRequest};
//!
//! let result = ScanRequest::new((15.0, 10.0), (3000, 2000))
//!     .with_menu([150, 300, 600])
//!     .with_rounding(Rounding::Down)
//!     .calculate()
//!     .unwrap();
//! assert_eq!(result.recommended_dpi, 300);
//! ```

mod calculate;
pub mod error;
mod rounding;

pub use crate::calculate::{CM_PER_INCH, DpiOption, DpiResult, ScanRequest, calculate, validate_limits};
pub use crate::rounding::Rounding;

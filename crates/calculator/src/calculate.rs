use crate::Rounding;
use crate::error::{ErrorKind, Result};
use tracing::instrument;

/// Centimeters in one inch.
pub const CM_PER_INCH: f64 = 2.54;

/// A single resolution calculation.
///
/// Dimensions may be supplied in either orientation; they are normalized to
/// long/short sides before any arithmetic.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ScanRequest {
    /// Photo width and height in centimeters.
    pub photo: (f64, f64),
    /// Wanted image width and height in pixels.
    pub image: (u32, u32),
    pub min_dpi: Option<u32>,
    pub max_dpi: Option<u32>,
    /// Resolutions the scanner supports, in any order. May be empty.
    pub dpi_menu: Vec<u32>,
    pub rounding: Rounding,
}
impl ScanRequest {
    pub fn new(photo: (f64, f64), image: (u32, u32)) -> Self {
        Self { photo, image, ..Self::default() }
    }

    pub fn with_bounds(mut self, min_dpi: impl Into<Option<u32>>, max_dpi: impl Into<Option<u32>>) -> Self {
        self.min_dpi = min_dpi.into();
        self.max_dpi = max_dpi.into();
        self
    }

    pub fn with_menu(mut self, dpi_menu: impl IntoIterator<Item = u32>) -> Self {
        self.dpi_menu = dpi_menu.into_iter().collect();
        self
    }

    pub fn with_rounding(mut self, rounding: Rounding) -> Self {
        self.rounding = rounding;
        self
    }

    /// Shorthand for [`calculate(&self)`](calculate).
    pub fn calculate(&self) -> Result<DpiResult> {
        calculate(self)
    }
}

/// A selectable scanner resolution and the pixel length it produces along the
/// photo's long side.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DpiOption {
    pub dpi: u32,
    pub pixels: u64,
}
impl DpiOption {
    /// Pairs `dpi` with the pixel length of `photo_side` centimeters scanned at
    /// that resolution, truncated.
    pub fn for_side(dpi: u32, photo_side: f64) -> Self {
        Self { dpi, pixels: (f64::from(dpi) * photo_side / CM_PER_INCH) as u64 }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct DpiResult {
    /// The unconstrained requirement.
    pub calculated_dpi: f64,
    /// The requirement after menu discretization and bound clamping.
    pub recommended_dpi: u32,
    /// One entry per menu resolution, ascending by DPI.
    pub options: Vec<DpiOption>,
}

/// Computes the calculated and recommended DPI for a request.
///
/// Validation happens before any arithmetic: dimensions must be positive
/// ([`ErrorKind::InvalidDimension`]), bounds must be ordered
/// ([`ErrorKind::InvalidBounds`]) and menu entries positive
/// ([`ErrorKind::InvalidMenuEntry`]).
///
/// Bounds are hard constraints applied after the menu snap, so the result can
/// land off the menu. When the menu narrows the bounds so that the minimum
/// exceeds the maximum, the minimum wins.
#[instrument(level = "debug", ret, err(Display))]
pub fn calculate(request: &ScanRequest) -> Result<DpiResult> {
    let (photo_w, photo_h) = request.photo;
    let (image_w, image_h) = request.image;
    // Also rejects NaN and infinities.
    let positive = |side: f64| side.is_finite() && side > 0.0;
    if !(positive(photo_w) && positive(photo_h)) || image_w == 0 || image_h == 0 {
        exn::bail!(ErrorKind::InvalidDimension);
    }
    validate_limits(request.min_dpi, request.max_dpi, &request.dpi_menu)?;

    let photo_long = photo_w.max(photo_h);
    let photo_short = photo_w.min(photo_h);
    let image_long = image_w.max(image_h);
    let image_short = image_w.min(image_h);

    let mut menu = request.dpi_menu.clone();
    menu.sort_unstable();

    let min_dpi = match (request.min_dpi, menu.first()) {
        (Some(min), Some(&smallest)) => Some(min.max(smallest)),
        (min, smallest) => min.or(smallest.copied()),
    };
    let max_dpi = match (request.max_dpi, menu.last()) {
        (Some(max), Some(&largest)) => Some(max.min(largest)),
        (max, largest) => max.or(largest.copied()),
    };

    let calculated_dpi = f64::max(
        f64::from(image_long) / (photo_long / CM_PER_INCH),
        f64::from(image_short) / (photo_short / CM_PER_INCH),
    );

    let mut recommended = discretize(calculated_dpi, &menu, request.rounding);
    if let Some(max) = max_dpi {
        recommended = recommended.min(f64::from(max));
    }
    if let Some(min) = min_dpi {
        recommended = recommended.max(f64::from(min));
    }
    tracing::trace!(calculated_dpi, recommended, ?min_dpi, ?max_dpi, "Resolution constrained");

    Ok(DpiResult {
        calculated_dpi,
        // Truncates toward zero (saturating), never rounds.
        recommended_dpi: recommended as u32,
        options: menu.iter().map(|&dpi| DpiOption::for_side(dpi, photo_long)).collect(),
    })
}

/// Checks the parts of a request that don't depend on the photo: bounds must
/// be ordered and menu entries positive.
///
/// Scanner limits are usually fixed for a whole batch, so callers can reject
/// them once up front instead of on every calculation.
pub fn validate_limits(min_dpi: Option<u32>, max_dpi: Option<u32>, dpi_menu: &[u32]) -> Result<()> {
    if let (Some(min), Some(max)) = (min_dpi, max_dpi)
        && min > max
    {
        exn::bail!(ErrorKind::InvalidBounds { min, max });
    }
    if let Some(&entry) = dpi_menu.iter().find(|&&d| d == 0) {
        exn::bail!(ErrorKind::InvalidMenuEntry(entry));
    }
    Ok(())
}

/// Snaps `calculated` onto the sorted `menu`.
///
/// An exact match is returned as-is whatever the rounding; a requirement above
/// the whole menu yields its largest entry; an empty menu leaves the value
/// untouched.
fn discretize(calculated: f64, menu: &[u32], rounding: Rounding) -> f64 {
    let Some(&largest) = menu.last() else {
        return calculated;
    };
    let Some(index) = menu.iter().position(|&dpi| f64::from(dpi) >= calculated) else {
        return f64::from(largest);
    };
    let upper = f64::from(menu[index]);
    // Nothing below the first entry to round down to.
    if index == 0 || upper == calculated {
        return upper;
    }
    let lower = f64::from(menu[index - 1]);
    match rounding {
        Rounding::Nearest if calculated - lower <= upper - calculated => lower,
        Rounding::Nearest => upper,
        Rounding::Up => upper,
        Rounding::Down => lower,
    }
}

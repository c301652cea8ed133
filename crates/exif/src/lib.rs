//! EXIF metadata of scanned images.
//!
//! [`extract`] reads every tag of an image into [`Tags`], grouped by the IFD
//! it was found in. Only the capture timestamp is interpreted
//! ([`digitized_at`], [`parse_timestamp`]); everything else is kept as raw
//! text for logging.

pub mod error;

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use exif::{Context, In, Reader, Value};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use time::PrimitiveDateTime;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use tracing::instrument;

/// EXIF date/time layout, e.g. `2024:03:07 09:05:01`.
const TIMESTAMP_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]:[month]:[day] [hour]:[minute]:[second]");

/// The image file directory a tag was read from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, derive_more::Display)]
pub enum Group {
    /// Primary image.
    #[display("IFD0")]
    Ifd0,
    /// Thumbnail.
    #[display("IFD1")]
    Ifd1,
    #[display("EXIFIFD")]
    ExifIfd,
    #[display("GPSIFD")]
    GpsIfd,
}

/// Group → tag name → raw value.
pub type Tags = BTreeMap<Group, BTreeMap<String, String>>;

/// Reads all EXIF tags of the image at `path`.
///
/// ASCII values are kept verbatim; other values use their display form.
/// Interoperability tags are skipped.
#[instrument(level = "debug", fields(path = %path.as_ref().display()))]
pub fn extract(path: impl AsRef<Path>) -> Result<Tags> {
    let path = path.as_ref();
    if !path.is_file() {
        exn::bail!(ErrorKind::NotFound(path.to_path_buf()));
    }
    let file = File::open(path).or_raise(|| ErrorKind::Io)?;
    let exif = Reader::new().read_from_container(&mut BufReader::new(file)).or_raise(|| ErrorKind::InvalidImage)?;

    let mut tags = Tags::new();
    for field in exif.fields() {
        let group = match (field.tag.context(), field.ifd_num) {
            (Context::Tiff, ifd) if ifd == In::PRIMARY => Group::Ifd0,
            (Context::Tiff, _) => Group::Ifd1,
            (Context::Exif, _) => Group::ExifIfd,
            (Context::Gps, _) => Group::GpsIfd,
            _ => continue,
        };
        let value = match &field.value {
            Value::Ascii(parts) => parts.iter().map(|p| String::from_utf8_lossy(p)).collect::<Vec<_>>().join(" "),
            _ => field.display_value().to_string(),
        };
        tags.entry(group).or_default().insert(field.tag.to_string(), value);
    }
    tracing::debug!(groups = tags.len(), "EXIF tags extracted");
    Ok(tags)
}

/// The raw `DateTimeDigitized` value, if present.
pub fn digitized_at(tags: &Tags) -> Option<&str> {
    tags.get(&Group::ExifIfd)?.get("DateTimeDigitized").map(String::as_str)
}

/// Parses an EXIF `YYYY:MM:DD HH:MM:SS` timestamp.
pub fn parse_timestamp(value: &str) -> Result<PrimitiveDateTime> {
    let value = value.trim_end_matches('\0').trim();
    PrimitiveDateTime::parse(value, TIMESTAMP_FORMAT).or_raise(|| ErrorKind::InvalidTimestamp(value.to_string()))
}

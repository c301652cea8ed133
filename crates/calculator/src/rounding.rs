use crate::error::{Error, ErrorKind};
use std::fmt;
use std::str::FromStr;

/// How a raw DPI requirement that falls between two scanner resolutions is
/// turned into one of them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum Rounding {
    /// Whichever neighbouring resolution is numerically closer. Ties go to
    /// the lower one.
    #[default]
    #[cfg_attr(feature = "cli", value(name = "nr", alias = "nearest"))]
    #[cfg_attr(feature = "serde", serde(rename = "nr", alias = "nearest"))]
    Nearest,
    /// The next resolution at or above the requirement.
    #[cfg_attr(feature = "cli", value(name = "mx", alias = "up"))]
    #[cfg_attr(feature = "serde", serde(rename = "mx", alias = "up"))]
    Up,
    /// The resolution just below the requirement.
    #[cfg_attr(feature = "cli", value(name = "mn", alias = "down"))]
    #[cfg_attr(feature = "serde", serde(rename = "mn", alias = "down"))]
    Down,
}
impl Rounding {
    /// The short code used on the command line and in configuration files.
    pub fn as_code(&self) -> &'static str {
        match self {
            Self::Nearest => "nr",
            Self::Up => "mx",
            Self::Down => "mn",
        }
    }
}
impl FromStr for Rounding {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "nr" | "nearest" => Ok(Self::Nearest),
            "mx" | "up" => Ok(Self::Up),
            "mn" | "down" => Ok(Self::Down),
            other => exn::bail!(ErrorKind::InvalidRounding(other.to_string())),
        }
    }
}
impl fmt::Display for Rounding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_code())
    }
}

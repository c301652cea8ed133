use crate::error::{Error, ErrorKind};
use std::str::FromStr;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Alignment {
    #[default]
    Left,
    Right,
    Center,
}
impl Alignment {
    /// Anything other than `<`, `>` or `^` is left alignment.
    fn from_field(field: &str) -> Self {
        match field {
            ">" => Self::Right,
            "^" => Self::Center,
            _ => Self::Left,
        }
    }
}

/// The parsed inside of a `{key:width:align:pad}` placeholder.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Placeholder {
    pub key: String,
    /// Minimum width in characters.
    pub width: usize,
    pub alignment: Alignment,
    pub pad: char,
}
impl Placeholder {
    /// The key is everything before the first `:`.
    pub fn key_of(inner: &str) -> &str {
        inner.split(':').next().unwrap_or_default()
    }

    /// Formats `value` into a field of at least [`width`](Self::width)
    /// characters. Longer values pass through untouched.
    pub fn format(&self, value: impl ToString) -> String {
        let value = value.to_string();
        let missing = self.width.saturating_sub(value.chars().count());
        if missing == 0 {
            return value;
        }
        let (before, after) = match self.alignment {
            Alignment::Left => (0, missing),
            Alignment::Right => (missing, 0),
            Alignment::Center => (missing / 2, missing - missing / 2),
        };
        let mut formatted = String::with_capacity(value.len() + missing * self.pad.len_utf8());
        formatted.extend(std::iter::repeat_n(self.pad, before));
        formatted.push_str(&value);
        formatted.extend(std::iter::repeat_n(self.pad, after));
        formatted
    }
}
impl FromStr for Placeholder {
    type Err = Error;

    /// Parses the text between the braces. Fields after the fourth are ignored.
    fn from_str(inner: &str) -> std::result::Result<Self, Self::Err> {
        let mut fields = inner.split(':');
        let key = fields.next().unwrap_or_default().to_string();
        let width = match fields.next() {
            Some(width) => parse_width(width).ok_or_else(|| format_error(inner))?,
            None => 0,
        };
        let alignment = fields.next().map(Alignment::from_field).unwrap_or_default();
        let pad = match fields.next() {
            None => ' ',
            Some(pad) => {
                let mut chars = pad.chars();
                match (chars.next(), chars.next()) {
                    (None, _) => ' ',
                    (Some(c), None) => c,
                    (Some(_), Some(_)) => return Err(format_error(inner)),
                }
            },
        };
        Ok(Self { key, width, alignment, pad })
    }
}

/// Widest field a placeholder may ask for.
pub const MAX_WIDTH: usize = u16::MAX as usize;

fn parse_width(field: &str) -> Option<usize> {
    field.trim().parse().ok().filter(|&width| width <= MAX_WIDTH)
}

fn format_error(inner: &str) -> Error {
    Error::new(ErrorKind::TemplateFormatError(inner.to_string()))
}

use crate::error::{ErrorKind, Result};
use crate::interpolate::interpolate;
use exn::{OptionExt, ResultExt};
use ini::{Ini, ParseOption};
use std::fmt;
use std::path::Path;
use tracing::instrument;

/// An ordered set of `key = value` pairs.
///
/// Keys are case-insensitive: they are stored lower-cased.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Section {
    name: String,
    entries: Vec<(String, String)>,
}
impl Section {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), entries: Vec::new() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        let key = key.to_lowercase();
        self.entries.iter().find(|(k, _)| *k == key).map(|(_, v)| v.as_str())
    }

    /// Replaces the value of an existing key in place, or appends a new one.
    pub fn set(&mut self, key: impl AsRef<str>, value: impl Into<String>) {
        let key = key.as_ref().to_lowercase();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Section whose keys every other section inherits.
pub const DEFAULT_SECTION: &str = "DEFAULT";

/// A parsed INI file with all `${...}` references expanded.
///
/// Section names are case-sensitive; section and key order is preserved so
/// that written files read the same as their sources. Keys missing from a
/// section fall back to [`DEFAULT_SECTION`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Settings {
    sections: Vec<Section>,
}
impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads and interpolates an INI file.
    #[instrument(level = "debug", fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            exn::bail!(ErrorKind::NotFound(path.to_path_buf()));
        }
        tracing::info!(path = %path.display(), "Loading settings");
        let text = std::fs::read_to_string(path).or_raise(|| ErrorKind::Parse(path.to_path_buf()))?;
        let settings = Self::parse(&text).or_raise(|| ErrorKind::Parse(path.to_path_buf()))?;
        tracing::info!(path = %path.display(), sections = settings.sections.len(), "Settings loaded");
        Ok(settings)
    }

    /// Parses and interpolates INI text.
    ///
    /// Backslashes and quotes are taken literally so that Windows paths
    /// survive. Indented lines continue the previous value. Keys outside of
    /// any section are ignored.
    pub fn parse(text: &str) -> Result<Self> {
        let options = ParseOption {
            enabled_quote: false,
            enabled_escape: false,
            enabled_indented_mutiline_value: true,
            ..ParseOption::default()
        };
        let ini = Ini::load_from_str_opt(text, options)
            .or_raise(|| ErrorKind::Parse(std::path::PathBuf::from("<text>")))?;
        let mut raw = Self::new();
        for (name, properties) in ini.iter() {
            let Some(name) = name else {
                if !properties.is_empty() {
                    tracing::warn!(keys = properties.len(), "Ignoring settings outside of any section");
                }
                continue;
            };
            let section = raw.section_mut(name);
            for (key, value) in properties.iter() {
                section.set(key, value);
            }
        }
        interpolate(&raw)
    }

    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.name == name)
    }

    /// Returns the named section, appending an empty one if it doesn't exist.
    pub fn section_mut(&mut self, name: &str) -> &mut Section {
        let index = match self.sections.iter().position(|s| s.name == name) {
            Some(index) => index,
            None => {
                self.sections.push(Section::new(name));
                self.sections.len() - 1
            },
        };
        &mut self.sections[index]
    }

    pub fn sections(&self) -> impl Iterator<Item = &Section> {
        self.sections.iter()
    }

    pub fn has_section(&self, name: &str) -> bool {
        self.section(name).is_some()
    }

    /// Looks up a value, failing with [`ErrorKind::MissingSection`] or
    /// [`ErrorKind::MissingKey`].
    pub fn get(&self, section: &str, key: &str) -> Result<&str> {
        if !self.has_section(section) {
            exn::bail!(ErrorKind::MissingSection(section.to_string()));
        }
        self.lookup(section, key)
            .ok_or_raise(|| ErrorKind::MissingKey { section: section.to_string(), key: key.to_string() })
    }

    /// A key of `section`, or of [`DEFAULT_SECTION`] when the section lacks it.
    pub(crate) fn lookup(&self, section: &str, key: &str) -> Option<&str> {
        let found = self.section(section)?;
        found.get(key).or_else(|| self.section(DEFAULT_SECTION).and_then(|s| s.get(key)))
    }

    pub fn set(&mut self, section: &str, key: &str, value: impl Into<String>) {
        self.section_mut(section).set(key, value);
    }

    /// Returns a copy with every value passed through `f`.
    pub fn map_values(&self, mut f: impl FnMut(&str) -> String) -> Self {
        let sections = self
            .sections
            .iter()
            .map(|section| Section {
                name: section.name.clone(),
                entries: section.entries.iter().map(|(k, v)| (k.clone(), f(v))).collect(),
            })
            .collect();
        Self { sections }
    }

    /// Writes the settings as INI text, replacing the file.
    #[instrument(level = "debug", skip(self), fields(path = %path.as_ref().display()))]
    pub fn write(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        std::fs::write(path, self.to_string()).or_raise(|| ErrorKind::Write(path.to_path_buf()))
    }
}
impl fmt::Display for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for section in &self.sections {
            writeln!(f, "[{}]", section.name)?;
            for (key, value) in section.iter() {
                // Continuation lines must stay indented to remain part of the value.
                writeln!(f, "{key} = {}", value.replace('\n', "\n    "))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

//! Application defaults for command-line options.

use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use scan_batcher_calculator::Rounding;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::instrument;

/// File name of the defaults file inside [`config_dir`].
pub const DEFAULTS_FILE_NAME: &str = "scan-batcher.toml";
const ENV_PREFIX: &str = "SCAN_BATCHER_";

/// The user's configuration directory for scan-batcher, if the platform has one.
pub fn config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "scan-batcher").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Defaults for everything the command line can also set.
///
/// Sources, lowest precedence first: built-in values, `scan-batcher.toml` in
/// [`config_dir`], an explicitly given TOML file, then `SCAN_BATCHER_*`
/// environment variables (e.g. `SCAN_BATCHER_DPIS=[300,600,1200]`).
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Defaults {
    /// Workflow engine name.
    pub engine: String,
    pub rounding: Rounding,
    pub min_dpi: Option<u32>,
    pub max_dpi: Option<u32>,
    /// Resolutions the scanner supports.
    pub dpis: Vec<u32>,
    /// Installation settings file of the engine. When unset, the engine looks
    /// for `<engine>.ini` in [`config_dir`].
    pub settings: Option<PathBuf>,
    pub log_file: PathBuf,
}
impl Default for Defaults {
    fn default() -> Self {
        Self {
            engine: "vuescan".to_string(),
            rounding: Rounding::Nearest,
            min_dpi: None,
            max_dpi: None,
            dpis: Vec::new(),
            settings: None,
            log_file: PathBuf::from("scan-batcher.log"),
        }
    }
}
impl Defaults {
    /// Loads defaults from the standard locations plus an optional explicit file.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        Self::load_from(config_dir().as_deref(), explicit)
    }

    /// Loads defaults with the configuration directory given explicitly.
    ///
    /// A missing file in `config_dir` is skipped; a missing `explicit` file is
    /// an error.
    #[instrument(level = "debug")]
    pub fn load_from(config_dir: Option<&Path>, explicit: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(dir) = config_dir {
            figment = figment.merge(Toml::file(dir.join(DEFAULTS_FILE_NAME)));
        }
        if let Some(path) = explicit {
            if !path.is_file() {
                exn::bail!(ErrorKind::NotFound(path.to_path_buf()));
            }
            figment = figment.merge(Toml::file(path));
        }
        let defaults: Self = figment.merge(Env::prefixed(ENV_PREFIX)).extract().or_raise(|| ErrorKind::Defaults)?;
        tracing::debug!(?defaults, "Application defaults loaded");
        Ok(defaults)
    }

    /// The installation settings file for `engine`: the configured one, else
    /// `<engine>.ini` in [`config_dir`].
    pub fn settings_path(&self, engine: &str) -> Option<PathBuf> {
        self.settings.clone().or_else(|| config_dir().map(|dir| dir.join(format!("{engine}.ini"))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_builtin_defaults() {
        let dir = TempDir::new().unwrap();
        let defaults = Defaults::load_from(Some(dir.path()), None).unwrap();
        assert_eq!(defaults.engine, "vuescan");
        assert_eq!(defaults.rounding, Rounding::Nearest);
        assert!(defaults.dpis.is_empty());
    }

    #[test]
    fn test_explicit_file_overrides_config_dir() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(DEFAULTS_FILE_NAME), "rounding = \"mx\"\ndpis = [300, 600]\nmin_dpi = 300\n")
            .unwrap();
        let explicit = dir.path().join("job.toml");
        std::fs::write(&explicit, "dpis = [150, 300, 600, 1200]\n").unwrap();

        let defaults = Defaults::load_from(Some(dir.path()), Some(&explicit)).unwrap();
        assert_eq!(defaults.rounding, Rounding::Up);
        assert_eq!(defaults.min_dpi, Some(300));
        assert_eq!(defaults.dpis, vec![150, 300, 600, 1200]);
    }

    #[test]
    fn test_missing_explicit_file() {
        let dir = TempDir::new().unwrap();
        let explicit = dir.path().join("absent.toml");
        let err = Defaults::load_from(None, Some(&explicit)).unwrap_err();
        assert_eq!(*err, ErrorKind::NotFound(explicit));
    }

    #[test]
    fn test_invalid_rounding() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(DEFAULTS_FILE_NAME), "rounding = \"sideways\"\n").unwrap();
        let err = Defaults::load_from(Some(dir.path()), None).unwrap_err();
        assert_eq!(*err, ErrorKind::Defaults);
    }

    #[test]
    fn test_settings_path_prefers_configured_file() {
        let defaults = Defaults { settings: Some(PathBuf::from("/etc/vuescan.ini")), ..Defaults::default() };
        assert_eq!(defaults.settings_path("silverfast"), Some(PathBuf::from("/etc/vuescan.ini")));
        let unset = Defaults::default();
        assert_eq!(unset.settings_path("vuescan"), config_dir().map(|dir| dir.join("vuescan.ini")));
    }
}

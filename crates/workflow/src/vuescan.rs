//! The VueScan engine.
//!
//! VueScan is configured through an INI file it reads at start-up. This engine
//! writes that file from the job's `[vuescan.*]` sections, runs VueScan until
//! the operator closes it, then moves the scanned file and VueScan's log to
//! the job's output location.
//!
//! # Installation settings
//!
//! ```ini
//! [main]
//! program_path = C:\Program Files\VueScan
//! program_name = vuescan.exe
//! settings_path = C:\Users\{user_name}\AppData\Roaming\VueScan
//! settings_name = vuescan.ini
//! logging_path = ${settings_path}
//! logging_name = vuescan.log
//! ```
//!
//! # Job settings (`<workflow>/workflow.ini`)
//!
//! ```ini
//! [main]
//! description = Family album, 1970s
//! output_path = D:\Archive\{user_name}\{digitization_year}
//! output_file_name = {digitization_year}{digitization_month:2:>:0}{digitization_day:2:>:0}_{scan_dpi}
//!
//! [vuescan]
//! output_path = D:\Scans
//! output_file_name = scan
//! output_extension_name = tif
//!
//! [vuescan.Output]
//! default_folder = ${vuescan:output_path}
//! tiff_file_name = ${vuescan:output_file_name}.${vuescan:output_extension_name}
//! ```
//!
//! An optional `<workflow>/vuescan.ini` provides base VueScan sections that
//! the job's `[vuescan.*]` sections override.

use crate::error::{ErrorKind, Result};
use crate::files::{ensure_dir, move_file};
use crate::program::Program;
use crate::system::add_system_templates;
use crate::{EngineOptions, Workflow};
use exn::ResultExt;
use scan_batcher_config::{Settings, merge_engine_sections};
use scan_batcher_template::Context;
use std::path::{Path, PathBuf};
use time::{OffsetDateTime, PrimitiveDateTime, UtcOffset};
use tracing::instrument;

pub const ENGINE_NAME: &str = "vuescan";
/// Job settings file inside the workflow directory.
pub const WORKFLOW_SETTINGS_NAME: &str = "workflow.ini";
/// Optional base VueScan settings inside the workflow directory.
pub const ENGINE_SETTINGS_NAME: &str = "vuescan.ini";
/// Prefix of job sections that are handed to VueScan.
const SECTION_PREFIX: &str = "vuescan";
/// Prefix of the template keys derived from the capture date.
const CAPTURE_PREFIX: &str = "digitization";
/// Extensions whose capture date comes from EXIF rather than the file's mtime.
const EXIF_EXTENSIONS: [&str; 4] = ["tif", "tiff", "jpg", "jpeg"];

pub struct VueScanWorkflow {
    settings: PathBuf,
    local_offset: UtcOffset,
}
impl VueScanWorkflow {
    pub fn new(options: &EngineOptions) -> Self {
        Self { settings: options.settings.clone(), local_offset: options.local_offset }
    }

    /// [`Factory`](crate::Factory) for the registry.
    pub fn create(options: &EngineOptions) -> Result<Box<dyn Workflow>> {
        Ok(Box::new(Self::new(options)))
    }
}
impl Workflow for VueScanWorkflow {
    fn name(&self) -> &'static str {
        ENGINE_NAME
    }

    #[instrument(skip_all, fields(workflow = %workflow_path.display()))]
    fn run(&self, context: &mut Context, workflow_path: &Path) -> Result<()> {
        tracing::info!("Starting the workflow");
        add_system_templates(context);
        let workflow_path = std::path::absolute(workflow_path).or_raise(|| ErrorKind::Io)?;

        let mut run = Run {
            installation: Settings::load(&self.settings).or_raise(|| ErrorKind::Settings)?,
            job: Settings::load(workflow_path.join(WORKFLOW_SETTINGS_NAME)).or_raise(|| ErrorKind::Settings)?,
            base: load_optional(&workflow_path.join(ENGINE_SETTINGS_NAME))?,
            local_offset: self.local_offset,
            context,
        };
        match run.job_value("main", "description") {
            Ok(description) => tracing::info!(%description, "Workflow description"),
            Err(_) => tracing::debug!("Workflow has no description"),
        }

        run.write_engine_settings()?;
        run.launch()?;
        run.move_output_file()?;
        run.move_log_file()?;
        tracing::info!("Workflow completed successfully");
        Ok(())
    }
}

fn load_optional(path: &Path) -> Result<Option<Settings>> {
    if !path.is_file() {
        return Ok(None);
    }
    Settings::load(path).map(Some).or_raise(|| ErrorKind::Settings)
}

/// State of a single workflow run.
struct Run<'a> {
    installation: Settings,
    job: Settings,
    base: Option<Settings>,
    local_offset: UtcOffset,
    context: &'a mut Context,
}
impl Run<'_> {
    /// An installation value with its placeholders resolved against the current context.
    fn installation_value(&self, section: &str, key: &str) -> Result<String> {
        let value = self.installation.get(section, key).or_raise(|| ErrorKind::Settings)?;
        Ok(self.context.resolve(value))
    }

    /// A job value with its placeholders resolved against the current context.
    fn job_value(&self, section: &str, key: &str) -> Result<String> {
        let value = self.job.get(section, key).or_raise(|| ErrorKind::Settings)?;
        Ok(self.context.resolve(value))
    }

    fn write_engine_settings(&self) -> Result<()> {
        let merged = merge_engine_sections(self.base.as_ref(), &self.job, SECTION_PREFIX)
            .map_values(|value| self.context.resolve(value));
        let path = PathBuf::from(self.installation_value("main", "settings_path")?)
            .join(self.installation_value("main", "settings_name")?);
        merged.write(&path).or_raise(|| ErrorKind::SettingsWrite(path.clone()))?;
        tracing::info!(path = %path.display(), "VueScan settings file overwritten");
        Ok(())
    }

    fn launch(&self) -> Result<()> {
        let program = Program::locate(
            &self.installation_value("main", "program_path")?,
            &self.installation_value("main", "program_name")?,
        )?;
        let output_dir = PathBuf::from(self.job_value("vuescan", "output_path")?);
        ensure_dir(&output_dir).or_raise(|| ErrorKind::Io)?;
        tracing::info!(program = %program.path().display(), "Launching VueScan");
        program.run()?;
        tracing::info!("VueScan is closed");
        Ok(())
    }

    /// Moves the scanned file to `[main] output_path`, named after
    /// `[main] output_file_name` (resolved only now that the capture date is
    /// known) plus the scanned file's own extension.
    fn move_output_file(&mut self) -> Result<PathBuf> {
        let file_name = format!(
            "{}.{}",
            self.job_value("vuescan", "output_file_name")?,
            self.job_value("vuescan", "output_extension_name")?
        );
        let source = PathBuf::from(self.job_value("vuescan", "output_path")?).join(file_name);
        if !source.is_file() {
            exn::bail!(ErrorKind::OutputNotFound(source));
        }
        if let Some(moment) = self.capture_moment(&source) {
            self.context.insert_datetime(CAPTURE_PREFIX, moment);
        }

        let target_dir = PathBuf::from(self.job_value("main", "output_path")?);
        ensure_dir(&target_dir).or_raise(|| ErrorKind::Io)?;
        let target = target_dir.join(format!("{}{}", self.job_value("main", "output_file_name")?, suffix(&source)));
        move_file(&source, &target)
            .or_raise(|| ErrorKind::Move { from: source.clone(), to: target.clone() })?;
        tracing::info!(from = %source.display(), to = %target.display(), "Scanned file moved");
        Ok(target)
    }

    /// Moves VueScan's log next to the scanned file. A missing log is not an error.
    fn move_log_file(&self) -> Result<()> {
        let source = PathBuf::from(self.installation_value("main", "logging_path")?)
            .join(self.installation_value("main", "logging_name")?);
        if !source.is_file() {
            tracing::info!(path = %source.display(), "VueScan logging file not found");
            return Ok(());
        }
        let target = PathBuf::from(self.job_value("main", "output_path")?)
            .join(format!("{}{}", self.job_value("main", "output_file_name")?, suffix(&source)));
        move_file(&source, &target)
            .or_raise(|| ErrorKind::Move { from: source.clone(), to: target.clone() })?;
        tracing::info!(from = %source.display(), to = %target.display(), "Logging file moved");
        Ok(())
    }

    /// When the scanned file was digitized: EXIF `DateTimeDigitized` for image
    /// formats that carry it, the modification time otherwise. `None` when
    /// neither can be determined.
    fn capture_moment(&self, path: &Path) -> Option<PrimitiveDateTime> {
        let extension = path.extension().map(|e| e.to_string_lossy().to_lowercase()).unwrap_or_default();
        if EXIF_EXTENSIONS.contains(&extension.as_str()) {
            let tags = scan_batcher_exif::extract(path)
                .inspect_err(|error| tracing::warn!(%error, path = %path.display(), "Unable to extract EXIF"))
                .ok()?;
            let value = scan_batcher_exif::digitized_at(&tags)?;
            return scan_batcher_exif::parse_timestamp(value)
                .inspect_err(|error| tracing::warn!(%error, "Unable to read the digitization date"))
                .ok();
        }
        let modified = std::fs::metadata(path)
            .and_then(|m| m.modified())
            .inspect_err(|error| tracing::warn!(%error, path = %path.display(), "Unable to read modification time"))
            .ok()?;
        let local = OffsetDateTime::from(modified).to_offset(self.local_offset);
        Some(PrimitiveDateTime::new(local.date(), local.time()))
    }
}

/// The extension of `path` with its leading dot, or nothing.
fn suffix(path: &Path) -> String {
    path.extension().map(|e| format!(".{}", e.to_string_lossy())).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::TempDir;

    /// Lays out an installation and a job under `dir`, with `script` standing
    /// in for the scanning program.
    #[cfg(unix)]
    fn fixture(dir: &Path, script: &str) -> (EngineOptions, PathBuf) {
        use std::os::unix::fs::PermissionsExt;

        let root = dir.to_str().unwrap();
        let bin = dir.join("bin");
        let job = dir.join("job");
        std::fs::create_dir_all(&bin).unwrap();
        std::fs::create_dir_all(&job).unwrap();

        let program = bin.join("fake-vuescan");
        std::fs::write(&program, format!("#!/bin/sh\n{}\n", script.replace("@DIR@", root))).unwrap();
        std::fs::set_permissions(&program, std::fs::Permissions::from_mode(0o755)).unwrap();

        let installation = "[main]\n\
            program_path = @DIR@/bin\n\
            program_name = fake-vuescan\n\
            settings_path = ${program_path}\n\
            settings_name = vuescan.ini\n\
            logging_path = ${program_path}\n\
            logging_name = vuescan.log\n";
        std::fs::write(dir.join("installation.ini"), installation.replace("@DIR@", root)).unwrap();

        let workflow = "[main]\n\
            description = Test album\n\
            output_path = @DIR@/final/{album}\n\
            output_file_name = {album}_{digitization_year}\n\
            [vuescan]\n\
            output_path = @DIR@/raw\n\
            output_file_name = scan\n\
            output_extension_name = txt\n\
            [vuescan.Output]\n\
            default_folder = ${vuescan:output_path}\n\
            tiff_file_name = {album}.tif\n";
        std::fs::write(job.join(WORKFLOW_SETTINGS_NAME), workflow.replace("@DIR@", root)).unwrap();

        let options = EngineOptions { settings: dir.join("installation.ini"), local_offset: UtcOffset::UTC };
        (options, job)
    }

    fn album() -> Context {
        let mut context = Context::new();
        context.insert("album", "family");
        context
    }

    #[cfg(unix)]
    #[test]
    fn test_full_run() {
        let dir = TempDir::new().unwrap();
        let (options, job) =
            fixture(dir.path(), "printf scanned > @DIR@/raw/scan.txt\nprintf log > @DIR@/bin/vuescan.log");
        let mut context = album();

        VueScanWorkflow::new(&options).run(&mut context, &job).unwrap();

        let year = OffsetDateTime::now_utc().year();
        let final_dir = dir.path().join("final/family");
        let output = final_dir.join(format!("family_{year}.txt"));
        assert_eq!(std::fs::read_to_string(&output).unwrap(), "scanned");
        assert_eq!(std::fs::read_to_string(final_dir.join(format!("family_{year}.log"))).unwrap(), "log");
        assert!(!dir.path().join("raw/scan.txt").exists());
        assert!(context.contains("digitization_month"));

        let engine_settings = std::fs::read_to_string(dir.path().join("bin/vuescan.ini")).unwrap();
        assert!(engine_settings.starts_with("[VueScan]\n"));
        assert!(engine_settings.contains("[Output]\n"));
        assert!(engine_settings.contains(&format!("default_folder = {}/raw\n", dir.path().display())));
        assert!(engine_settings.contains("tiff_file_name = family.tif\n"));
    }

    #[cfg(unix)]
    #[test]
    fn test_base_engine_settings_are_merged() {
        let dir = TempDir::new().unwrap();
        let (options, job) = fixture(dir.path(), "printf scanned > @DIR@/raw/scan.txt");
        std::fs::write(job.join(ENGINE_SETTINGS_NAME), "[Output]\ntiff_file_name = base.tif\n[Prefs]\nbeep = 0\n")
            .unwrap();

        VueScanWorkflow::new(&options).run(&mut album(), &job).unwrap();

        let engine_settings = Settings::load(dir.path().join("bin/vuescan.ini")).unwrap();
        assert_eq!(engine_settings.get("Output", "tiff_file_name").unwrap(), "family.tif");
        assert_eq!(engine_settings.get("Prefs", "beep").unwrap(), "0");
    }

    #[cfg(unix)]
    #[test]
    fn test_missing_output_file() {
        let dir = TempDir::new().unwrap();
        let (options, job) = fixture(dir.path(), "exit 0");
        let err = VueScanWorkflow::new(&options).run(&mut album(), &job).unwrap_err();
        assert_eq!(*err, ErrorKind::OutputNotFound(dir.path().join("raw/scan.txt")));
    }

    #[cfg(unix)]
    #[test]
    fn test_missing_program() {
        let dir = TempDir::new().unwrap();
        let (options, job) = fixture(dir.path(), "exit 0");
        std::fs::remove_file(dir.path().join("bin/fake-vuescan")).unwrap();
        let err = VueScanWorkflow::new(&options).run(&mut album(), &job).unwrap_err();
        assert_eq!(*err, ErrorKind::ProgramNotFound(dir.path().join("bin/fake-vuescan")));
    }

    #[test]
    fn test_missing_installation_settings() {
        let dir = TempDir::new().unwrap();
        let options = EngineOptions { settings: dir.path().join("absent.ini"), local_offset: UtcOffset::UTC };
        let err = VueScanWorkflow::new(&options).run(&mut album(), dir.path()).unwrap_err();
        assert_eq!(*err, ErrorKind::Settings);
    }

    #[rstest]
    #[case("a/scan.TIF", ".TIF")]
    #[case("a/scan.tar.gz", ".gz")]
    #[case("a/scan", "")]
    fn test_suffix(#[case] path: &str, #[case] expected: &str) {
        assert_eq!(suffix(Path::new(path)), expected);
    }
}

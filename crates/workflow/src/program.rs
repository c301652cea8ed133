use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

/// An external scanning program.
#[derive(Debug)]
pub(crate) struct Program {
    path: PathBuf,
    /// Working directory the program is started in.
    dir: PathBuf,
}
impl Program {
    /// Finds `name` inside `dir`, or on the `PATH` when `dir` is empty.
    pub(crate) fn locate(dir: &str, name: &str) -> Result<Self> {
        if dir.trim().is_empty() {
            let path = which::which(name).or_raise(|| ErrorKind::ProgramNotFound(PathBuf::from(name)))?;
            tracing::trace!(path = %path.display(), "Discovered program in PATH");
            let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
            return Ok(Self { path, dir });
        }
        let dir = PathBuf::from(dir);
        let path = dir.join(name);
        if !path.is_file() {
            exn::bail!(ErrorKind::ProgramNotFound(path));
        }
        Ok(Self { path, dir })
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    /// Runs the program and blocks until it exits. There is no timeout.
    pub(crate) fn run(&self) -> Result<ExitStatus> {
        let status = Command::new(&self.path).current_dir(&self.dir).status().or_raise(|| ErrorKind::Launch)?;
        if !status.success() {
            tracing::warn!(program = %self.path.display(), %status, "Scanning program exited unsuccessfully");
        }
        Ok(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_locate_in_directory() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("vuescan"), "").unwrap();
        let program = Program::locate(dir.path().to_str().unwrap(), "vuescan").unwrap();
        assert_eq!(program.path(), dir.path().join("vuescan"));
    }

    #[test]
    fn test_locate_missing() {
        let dir = TempDir::new().unwrap();
        let err = Program::locate(dir.path().to_str().unwrap(), "vuescan").unwrap_err();
        assert_eq!(*err, ErrorKind::ProgramNotFound(dir.path().join("vuescan")));
    }

    #[test]
    fn test_locate_missing_in_path() {
        let err = Program::locate("", "definitely-not-a-scanner-program").unwrap_err();
        assert_eq!(*err, ErrorKind::ProgramNotFound(PathBuf::from("definitely-not-a-scanner-program")));
    }
}

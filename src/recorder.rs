//! Log file and terminal output.

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use std::path::Path;
use std::sync::{Mutex, PoisonError};
use time::UtcOffset;
use time::macros::format_description;
use tracing::level_filters::LevelFilter;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::time::OffsetTime;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

/// Default directives for the log file when `RUST_LOG` is unset.
const FILE_DIRECTIVES: &str = "info";

/// Keeps the log file writer alive until [`finish`].
static GUARD: Mutex<Option<WorkerGuard>> = Mutex::new(None);

/// Installs the global subscriber: everything at INFO (or `RUST_LOG`) into a
/// fresh log file at `path`, and `terminal` level and above to stderr.
///
/// Call [`finish`] before the process exits so buffered events reach the file.
pub fn init(path: &Path, terminal: LevelFilter, offset: UtcOffset) -> Result<()> {
    let file = std::fs::File::create(path).or_raise(|| ErrorKind::Logging(path.to_path_buf()))?;
    let (writer, guard) = tracing_appender::non_blocking(file);
    let timer = OffsetTime::new(
        offset,
        format_description!("[year].[month].[day] [hour]:[minute]:[second].[subsecond digits:3]"),
    );
    let file_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(FILE_DIRECTIVES));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer).with_ansi(false).with_timer(timer).with_filter(file_filter))
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false).compact().with_filter(terminal))
        .try_init()
        .or_raise(|| ErrorKind::Logging(path.to_path_buf()))?;
    *GUARD.lock().unwrap_or_else(PoisonError::into_inner) = Some(guard);
    Ok(())
}

/// Flushes and closes the log file. Later events only reach the terminal.
pub fn finish() {
    let guard = GUARD.lock().unwrap_or_else(PoisonError::into_inner).take();
    drop(guard);
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_finish_flushes_log_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("scan-batcher.log");
        init(&path, LevelFilter::OFF, UtcOffset::UTC).unwrap();
        tracing::warn!("Interrupted while idle");
        finish();

        let log = std::fs::read_to_string(&path).unwrap();
        assert!(log.contains("Interrupted while idle"));
        assert!(GUARD.lock().unwrap().is_none());
    }
}

use std::io;
use std::path::Path;

/// Moves a file, replacing the destination. Falls back to copy and delete
/// when source and destination are on different filesystems.
pub(crate) fn move_file(from: &Path, to: &Path) -> io::Result<()> {
    match std::fs::rename(from, to) {
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            tracing::debug!(from = %from.display(), to = %to.display(), "Rename crosses devices; copying instead");
            std::fs::copy(from, to)?;
            std::fs::remove_file(from)
        },
        result => result,
    }
}

/// Creates `path` and its parents unless it already exists.
pub(crate) fn ensure_dir(path: &Path) -> io::Result<()> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "Creating directory");
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

use super::{ALL_FILES, Batch};
use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use scan_batcher_template::Context;
use std::path::{Path, PathBuf};
use tracing::instrument;

/// Every matching file of a folder, in file name order.
#[derive(Debug)]
pub struct Folder {
    files: std::vec::IntoIter<PathBuf>,
}
impl Folder {
    /// Lists the folder now; files added later are not picked up.
    #[instrument(level = "debug", skip_all, fields(folder = %folder.display(), %pattern))]
    pub fn new(folder: &Path, pattern: &str) -> Result<Self> {
        if !folder.is_dir() {
            exn::bail!(ErrorKind::FolderNotFound(folder.to_path_buf()));
        }
        let mut files = Vec::new();
        for entry in std::fs::read_dir(folder).or_raise(|| ErrorKind::FolderNotFound(folder.to_path_buf()))? {
            let path = entry.or_raise(|| ErrorKind::FolderNotFound(folder.to_path_buf()))?.path();
            let matched = path.file_name().is_some_and(|name| matches_pattern(&name.to_string_lossy(), pattern));
            if matched && path.is_file() {
                files.push(path);
            }
        }
        files.sort();
        tracing::info!(count = files.len(), "Files selected for processing");
        Ok(Self { files: files.into_iter() })
    }
}
impl Batch for Folder {
    fn next_item(&mut self) -> Result<Option<Context>> {
        Ok(self.files.next().map(|path| {
            let mut context = Context::new();
            let filename = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
            context.insert("path", path.to_string_lossy().into_owned()).insert("filename", filename);
            context
        }))
    }
}

/// Whether `filename` is selected by `pattern`.
///
/// `*.*` selects everything, `*.ext` and `.ext` compare the extension and
/// anything else must match the end of the name. Comparisons ignore case.
pub fn matches_pattern(filename: &str, pattern: &str) -> bool {
    if pattern == ALL_FILES {
        return true;
    }
    let pattern = pattern.to_lowercase();
    let filename = filename.to_lowercase();
    let extension = Path::new(&filename).extension().map(|e| format!(".{}", e.to_string_lossy())).unwrap_or_default();
    if let Some(rest) = pattern.strip_prefix('*') {
        return extension == rest || extension.strip_prefix('.') == Some(rest);
    }
    if pattern.starts_with('.') {
        return extension == pattern;
    }
    filename.ends_with(&pattern)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::TempDir;

    #[rstest]
    #[case("scan.tif", "*.*", true)]
    #[case("README", "*.*", true)]
    #[case("scan.TIF", "*.tif", true)]
    #[case("scan.tif", ".TIF", true)]
    #[case("scan.tif", "*tif", true)]
    #[case("scan.tiff", "*.tif", false)]
    #[case("scan.jpg", ".tif", false)]
    #[case("family_0001.tif", "0001.tif", true)]
    #[case("family_0002.tif", "0001.tif", false)]
    fn test_matches_pattern(#[case] filename: &str, #[case] pattern: &str, #[case] expected: bool) {
        assert_eq!(matches_pattern(filename, pattern), expected);
    }

    #[test]
    fn test_folder_items() {
        let dir = TempDir::new().unwrap();
        for name in ["b.tif", "a.tif", "c.jpg"] {
            std::fs::write(dir.path().join(name), "").unwrap();
        }
        std::fs::create_dir(dir.path().join("d.tif")).unwrap();

        let mut folder = Folder::new(dir.path(), "*.tif").unwrap();
        let mut names = Vec::new();
        while let Some(item) = folder.next_item().unwrap() {
            assert!(item.contains("path"));
            names.push(item.get("filename").unwrap().to_string());
        }
        assert_eq!(names, vec!["a.tif", "b.tif"]);
    }

    #[test]
    fn test_missing_folder() {
        let dir = TempDir::new().unwrap();
        let err = Folder::new(&dir.path().join("absent"), ALL_FILES).unwrap_err();
        assert_eq!(*err, ErrorKind::FolderNotFound(dir.path().join("absent")));
    }
}

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// A whole-file rewrite with before-text verification.
///
/// The patching layer works on strings; this is where its output meets the
/// filesystem. The file is only replaced if it still holds exactly the text
/// the new contents were computed from.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "FileEdit does nothing until apply() is called"]
pub struct FileEdit {
    /// Path to the file to write
    pub file: PathBuf,
    /// Contents expected on disk, `None` if the file must not exist yet
    pub expected_before: Option<String>,
    /// Contents to write
    pub new_text: String,
}

#[derive(Error, Debug)]
pub enum EditError {
    #[error("{file} changed on disk since it was read")]
    BeforeTextMismatch { file: PathBuf },

    #[error("{file} already exists")]
    UnexpectedFile { file: PathBuf },

    #[error("File I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl EditError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        EditError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Result of applying an edit.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "EditResult should be checked for success/already-applied"]
pub enum EditResult {
    /// File contents were replaced
    Applied { file: PathBuf, bytes_written: usize },
    /// File already held the new contents
    AlreadyApplied { file: PathBuf },
}

impl FileEdit {
    /// Replace `before` (as read from `file`) with `after`.
    pub fn new(
        file: impl Into<PathBuf>,
        before: impl Into<String>,
        after: impl Into<String>,
    ) -> Self {
        Self {
            file: file.into(),
            expected_before: Some(before.into()),
            new_text: after.into(),
        }
    }

    /// Create `file` with `contents`; fails if something else is already there.
    pub fn create(file: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            expected_before: None,
            new_text: contents.into(),
        }
    }

    /// Whether applying would change anything, judged from the expected text.
    pub fn is_noop(&self) -> bool {
        self.expected_before.as_deref() == Some(self.new_text.as_str())
    }

    /// Apply this edit atomically.
    pub fn apply(&self) -> Result<EditResult, EditError> {
        let current = match fs::read_to_string(&self.file) {
            Ok(text) => Some(text),
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => return Err(EditError::io(&self.file, e)),
        };

        if current.as_deref() == Some(self.new_text.as_str()) {
            return Ok(EditResult::AlreadyApplied {
                file: self.file.clone(),
            });
        }

        match (&self.expected_before, &current) {
            (Some(expected), Some(found)) if expected != found => {
                return Err(EditError::BeforeTextMismatch {
                    file: self.file.clone(),
                });
            }
            (Some(_), None) => {
                return Err(EditError::io(
                    &self.file,
                    std::io::Error::new(ErrorKind::NotFound, "file disappeared"),
                ));
            }
            (None, Some(_)) => {
                return Err(EditError::UnexpectedFile {
                    file: self.file.clone(),
                });
            }
            _ => {}
        }

        if let Some(parent) = self.file.parent() {
            fs::create_dir_all(parent).map_err(|e| EditError::io(parent, e))?;
        }
        atomic_write(&self.file, self.new_text.as_bytes())?;

        Ok(EditResult::Applied {
            file: self.file.clone(),
            bytes_written: self.new_text.len(),
        })
    }
}

/// Atomic file write: tempfile + fsync + rename.
///
/// Either the full write succeeds or the old file stays in place.
pub fn atomic_write(path: &Path, content: &[u8]) -> Result<(), EditError> {
    // Same directory keeps the rename on one filesystem
    let parent = path.parent().ok_or_else(|| {
        EditError::io(
            path,
            std::io::Error::new(ErrorKind::InvalidInput, "Path has no parent directory"),
        )
    })?;

    let mut temp =
        tempfile::NamedTempFile::new_in(parent).map_err(|e| EditError::io(path, e))?;
    temp.write_all(content).map_err(|e| EditError::io(path, e))?;
    temp.as_file()
        .sync_all()
        .map_err(|e| EditError::io(path, e))?;
    temp.persist(path).map_err(|e| EditError::io(path, e.error))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_replaces_contents() {
        let temp_dir = tempfile::tempdir().unwrap();
        let file_path = temp_dir.path().join("Main.java");
        fs::write(&file_path, "original content").unwrap();

        let edit = FileEdit::new(&file_path, "original content", "modified content");
        let result = edit.apply().unwrap();

        assert!(matches!(result, EditResult::Applied { .. }));
        assert_eq!(fs::read_to_string(&file_path).unwrap(), "modified content");
    }

    #[test]
    fn test_apply_is_idempotent() {
        let temp_dir = tempfile::tempdir().unwrap();
        let file_path = temp_dir.path().join("Main.java");
        fs::write(&file_path, "patched").unwrap();

        let edit = FileEdit::new(&file_path, "original", "patched");
        let result = edit.apply().unwrap();
        assert!(matches!(result, EditResult::AlreadyApplied { .. }));
    }

    #[test]
    fn test_apply_detects_concurrent_change() {
        let temp_dir = tempfile::tempdir().unwrap();
        let file_path = temp_dir.path().join("Main.java");
        fs::write(&file_path, "someone else wrote this").unwrap();

        let edit = FileEdit::new(&file_path, "original", "patched");
        let result = edit.apply();
        assert!(matches!(result, Err(EditError::BeforeTextMismatch { .. })));
        assert_eq!(
            fs::read_to_string(&file_path).unwrap(),
            "someone else wrote this"
        );
    }

    #[test]
    fn test_create_makes_parent_dirs() {
        let temp_dir = tempfile::tempdir().unwrap();
        let file_path = temp_dir.path().join("res/font/roboto.xml");

        let result = FileEdit::create(&file_path, "<font-family/>").apply().unwrap();
        assert!(matches!(result, EditResult::Applied { bytes_written: 14, .. }));
        assert_eq!(fs::read_to_string(&file_path).unwrap(), "<font-family/>");
    }

    #[test]
    fn test_create_refuses_existing_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let file_path = temp_dir.path().join("roboto.xml");
        fs::write(&file_path, "other").unwrap();

        let result = FileEdit::create(&file_path, "<font-family/>").apply();
        assert!(matches!(result, Err(EditError::UnexpectedFile { .. })));
    }

    #[test]
    fn test_is_noop() {
        assert!(FileEdit::new("a", "x", "x").is_noop());
        assert!(!FileEdit::new("a", "x", "y").is_noop());
        assert!(!FileEdit::create("a", "x").is_noop());
    }
}

//! Patch applicator - runs source patches with idempotency checks
//!
//! This module provides high-level patch application that:
//! - Groups patches by target file and reads each file once
//! - Runs every operation on the in-memory text, in config order
//! - Writes each changed file once, atomically
//! - Reports a result per patch; a failed patch never stops the others

use crate::config::schema::{Operation, PatchDefinition};
use crate::edit::{EditError, EditResult, FileEdit};
use crate::safety::{ProjectGuard, SafetyError};
use crate::source::{
    add_import, insert_in_method, remove_lines_counted, Dialect, PatchError, TextPatch,
};
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Result of applying a single patch
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "PatchResult should be checked for success/failure"]
pub enum PatchResult {
    /// Patch changed the file (or would, in check mode)
    Applied { file: PathBuf },
    /// File already contains the patch
    AlreadyApplied { file: PathBuf },
    /// Nothing to attach the patch to; not an error
    Skipped { file: PathBuf, reason: String },
    /// Anchor not found; file left untouched by this patch
    Failed { file: PathBuf, reason: String },
}

impl PatchResult {
    pub fn file(&self) -> &Path {
        match self {
            PatchResult::Applied { file }
            | PatchResult::AlreadyApplied { file }
            | PatchResult::Skipped { file, .. }
            | PatchResult::Failed { file, .. } => file,
        }
    }
}

impl fmt::Display for PatchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatchResult::Applied { file } => {
                write!(f, "Applied patch to {}", file.display())
            }
            PatchResult::AlreadyApplied { file } => {
                write!(f, "Already applied to {}", file.display())
            }
            PatchResult::Skipped { file, reason } => {
                write!(f, "Skipped on {}: {}", file.display(), reason)
            }
            PatchResult::Failed { file, reason } => {
                write!(f, "Failed on {}: {}", file.display(), reason)
            }
        }
    }
}

/// Errors that prevent a patch from being evaluated at all
#[derive(Debug)]
pub enum ApplicationError {
    /// File I/O error
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Writing the patched file failed
    Edit(EditError),
    /// Target path is outside the project or in build output
    Safety(SafetyError),
}

impl fmt::Display for ApplicationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApplicationError::Io { path, source } => {
                write!(f, "I/O error on {}: {}", path.display(), source)
            }
            ApplicationError::Edit(e) => write!(f, "edit error: {}", e),
            ApplicationError::Safety(e) => write!(f, "unsafe target: {}", e),
        }
    }
}

impl std::error::Error for ApplicationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApplicationError::Io { source, .. } => Some(source),
            ApplicationError::Edit(e) => Some(e),
            ApplicationError::Safety(e) => Some(e),
        }
    }
}

impl From<EditError> for ApplicationError {
    fn from(e: EditError) -> Self {
        ApplicationError::Edit(e)
    }
}

impl From<SafetyError> for ApplicationError {
    fn from(e: SafetyError) -> Self {
        ApplicationError::Safety(e)
    }
}

/// Per-step outcomes, keyed by step id, in evaluation order.
pub type StepResults = Vec<(String, Result<PatchResult, ApplicationError>)>;

/// Whether to write results to disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyMode {
    Write,
    /// Compute results without touching any file
    Check,
}

/// Run a single operation against in-memory text.
pub fn run_operation(
    text: &str,
    operation: &Operation,
    dialect: Dialect,
) -> Result<TextPatch, PatchError> {
    match operation {
        Operation::InsertStatement {
            class,
            method,
            code,
            after_line,
        } => insert_in_method(text, class, method, code, after_line.as_deref(), dialect),
        Operation::AddImport { path } => add_import(text, path, dialect),
        Operation::RemoveLines { contains } => {
            let (patched, removed) = remove_lines_counted(text, contains);
            if removed == 0 {
                Ok(TextPatch::AlreadyApplied)
            } else {
                debug!(removed, needle = contains.as_str(), "removed lines");
                Ok(TextPatch::Applied(patched))
            }
        }
    }
}

/// Patches grouped by resolved target file, in first-seen file order.
struct FileGroups<'a> {
    order: Vec<PathBuf>,
    by_file: HashMap<PathBuf, Vec<&'a PatchDefinition>>,
}

fn group_by_file<'a>(
    patches: &'a [PatchDefinition],
    guard: &ProjectGuard,
    results: &mut StepResults,
) -> FileGroups<'a> {
    let mut groups = FileGroups {
        order: Vec::new(),
        by_file: HashMap::new(),
    };

    for patch in patches {
        match guard.validate_path(&patch.file) {
            Ok(path) => {
                if !groups.by_file.contains_key(&path) {
                    groups.order.push(path.clone());
                }
                groups.by_file.entry(path).or_default().push(patch);
            }
            Err(e) => results.push((patch.id.clone(), Err(ApplicationError::Safety(e)))),
        }
    }

    groups
}

/// Apply patches to files under `guard`'s project root.
///
/// Patches on the same file see each other's output, in config order.
pub fn apply_patches(
    patches: &[PatchDefinition],
    guard: &ProjectGuard,
    dialect: Dialect,
    mode: ApplyMode,
) -> StepResults {
    let mut results = Vec::new();
    let mut groups = group_by_file(patches, guard, &mut results);

    for path in groups.order {
        let file_patches = groups.by_file.remove(&path).unwrap_or_default();
        results.extend(apply_file_patches(&path, &file_patches, dialect, mode));
    }

    results
}

/// Compute the edits `apply_patches` would make, without writing.
///
/// Files that cannot be read or would not change are left out.
pub fn preview_patches(
    patches: &[PatchDefinition],
    guard: &ProjectGuard,
    dialect: Dialect,
) -> Vec<FileEdit> {
    let mut ignored = Vec::new();
    let mut groups = group_by_file(patches, guard, &mut ignored);

    groups
        .order
        .into_iter()
        .filter_map(|path| {
            let file_patches = groups.by_file.remove(&path).unwrap_or_default();
            let original = fs::read_to_string(&path).ok()?;
            let (edit, _) = plan_file(&path, original, &file_patches, dialect);
            (!edit.is_noop()).then_some(edit)
        })
        .collect()
}

/// Run every patch for one file in memory.
fn plan_file(
    path: &Path,
    original: String,
    patches: &[&PatchDefinition],
    dialect: Dialect,
) -> (FileEdit, Vec<(String, PatchResult)>) {
    let mut current = original.clone();
    let mut outcomes = Vec::with_capacity(patches.len());

    for patch in patches {
        let outcome = match run_operation(&current, &patch.operation, dialect) {
            Ok(TextPatch::Applied(text)) => {
                current = text;
                PatchResult::Applied {
                    file: path.to_path_buf(),
                }
            }
            Ok(TextPatch::AlreadyApplied) => PatchResult::AlreadyApplied {
                file: path.to_path_buf(),
            },
            Err(e) if e.is_skip() => {
                debug!(patch = patch.id.as_str(), error = %e, "patch skipped");
                PatchResult::Skipped {
                    file: path.to_path_buf(),
                    reason: e.to_string(),
                }
            }
            Err(e) => {
                warn!(patch = patch.id.as_str(), file = %path.display(), error = %e, "patch failed");
                PatchResult::Failed {
                    file: path.to_path_buf(),
                    reason: e.to_string(),
                }
            }
        };
        outcomes.push((patch.id.clone(), outcome));
    }

    (FileEdit::new(path, original, current), outcomes)
}

fn apply_file_patches(
    path: &Path,
    patches: &[&PatchDefinition],
    dialect: Dialect,
    mode: ApplyMode,
) -> StepResults {
    let original = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(source) => {
            let kind = source.kind();
            let msg = source.to_string();
            return patches
                .iter()
                .map(|patch| {
                    (
                        patch.id.clone(),
                        Err(ApplicationError::Io {
                            path: path.to_path_buf(),
                            source: std::io::Error::new(kind, msg.clone()),
                        }),
                    )
                })
                .collect();
        }
    };

    let (edit, outcomes) = plan_file(path, original, patches, dialect);
    if mode == ApplyMode::Check || edit.is_noop() {
        return outcomes
            .into_iter()
            .map(|(id, outcome)| (id, Ok(outcome)))
            .collect();
    }

    match edit.apply() {
        Ok(result) => {
            if let EditResult::Applied { bytes_written, .. } = result {
                debug!(file = %path.display(), bytes_written, "wrote patched file");
            }
            outcomes
                .into_iter()
                .map(|(id, outcome)| (id, Ok(outcome)))
                .collect()
        }
        Err(e) => {
            // Nothing was written, so every change computed for this file is lost
            let reason = e.to_string();
            outcomes
                .into_iter()
                .map(|(id, outcome)| match outcome {
                    PatchResult::Applied { file } => (
                        id,
                        Ok(PatchResult::Failed {
                            file,
                            reason: reason.clone(),
                        }),
                    ),
                    other => (id, Ok(other)),
                })
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const ACTIVITY: &str = "package com.app;\n\npublic class MainActivity extends ReactActivity {\n  \
        protected void onCreate(Bundle b) {\n    super.onCreate(b);\n  }\n}\n";

    fn setup() -> (TempDir, ProjectGuard) {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("MainActivity.java"), ACTIVITY).unwrap();
        let guard = ProjectGuard::new(dir.path()).unwrap();
        (dir, guard)
    }

    fn patch(id: &str, operation: Operation) -> PatchDefinition {
        PatchDefinition {
            id: id.to_string(),
            file: PathBuf::from("MainActivity.java"),
            operation,
        }
    }

    fn insert_init() -> PatchDefinition {
        patch(
            "init",
            Operation::InsertStatement {
                class: "MainActivity".to_string(),
                method: "onCreate".to_string(),
                code: "Init.run(this);".to_string(),
                after_line: Some("super.onCreate(b);".to_string()),
            },
        )
    }

    #[test]
    fn test_apply_then_reapply() {
        let (dir, guard) = setup();
        let patches = vec![
            insert_init(),
            patch(
                "import",
                Operation::AddImport {
                    path: "com.app.Init".to_string(),
                },
            ),
        ];

        let results = apply_patches(&patches, &guard, Dialect::Java, ApplyMode::Write);
        assert!(results
            .iter()
            .all(|(_, r)| matches!(r, Ok(PatchResult::Applied { .. }))));

        let patched = fs::read_to_string(dir.path().join("MainActivity.java")).unwrap();
        assert!(patched.contains("import com.app.Init;"));
        assert!(patched.contains("super.onCreate(b);\n    Init.run(this);\n"));

        let again = apply_patches(&patches, &guard, Dialect::Java, ApplyMode::Write);
        assert!(again
            .iter()
            .all(|(_, r)| matches!(r, Ok(PatchResult::AlreadyApplied { .. }))));
        assert_eq!(
            fs::read_to_string(dir.path().join("MainActivity.java")).unwrap(),
            patched
        );
    }

    #[test]
    fn test_check_mode_does_not_write() {
        let (dir, guard) = setup();
        let results = apply_patches(&[insert_init()], &guard, Dialect::Java, ApplyMode::Check);
        assert!(matches!(results[0].1, Ok(PatchResult::Applied { .. })));
        assert_eq!(
            fs::read_to_string(dir.path().join("MainActivity.java")).unwrap(),
            ACTIVITY
        );
    }

    #[test]
    fn test_preview_returns_pending_edits_only() {
        let (dir, guard) = setup();
        let edits = preview_patches(&[insert_init()], &guard, Dialect::Java);
        assert_eq!(edits.len(), 1);
        assert!(edits[0].new_text.contains("Init.run(this);"));
        assert_eq!(edits[0].expected_before.as_deref(), Some(ACTIVITY));

        let _ = apply_patches(&[insert_init()], &guard, Dialect::Java, ApplyMode::Write);
        assert!(preview_patches(&[insert_init()], &guard, Dialect::Java).is_empty());
        assert!(dir.path().join("MainActivity.java").exists());
    }

    #[test]
    fn test_failed_patch_does_not_block_others() {
        let (dir, guard) = setup();
        let patches = vec![
            patch(
                "wrong-class",
                Operation::InsertStatement {
                    class: "Other".to_string(),
                    method: "onCreate".to_string(),
                    code: "x();".to_string(),
                    after_line: None,
                },
            ),
            insert_init(),
        ];

        let results = apply_patches(&patches, &guard, Dialect::Java, ApplyMode::Write);
        assert!(matches!(results[0].1, Ok(PatchResult::Failed { .. })));
        assert!(matches!(results[1].1, Ok(PatchResult::Applied { .. })));
        assert!(fs::read_to_string(dir.path().join("MainActivity.java"))
            .unwrap()
            .contains("Init.run(this);"));
    }

    #[test]
    fn test_remove_lines_reports_already_applied_without_match() {
        let (_dir, guard) = setup();
        let results = apply_patches(
            &[patch(
                "remove",
                Operation::RemoveLines {
                    contains: "Legacy".to_string(),
                },
            )],
            &guard,
            Dialect::Java,
            ApplyMode::Write,
        );
        assert!(matches!(results[0].1, Ok(PatchResult::AlreadyApplied { .. })));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let (_dir, guard) = setup();
        let mut missing = insert_init();
        missing.file = PathBuf::from("Nope.java");
        let results = apply_patches(&[missing], &guard, Dialect::Java, ApplyMode::Write);
        assert!(matches!(results[0].1, Err(ApplicationError::Io { .. })));
    }

    #[test]
    fn test_path_outside_project_is_rejected() {
        let (_dir, guard) = setup();
        let mut outside = insert_init();
        outside.file = PathBuf::from("/");
        let results = apply_patches(&[outside], &guard, Dialect::Java, ApplyMode::Write);
        assert!(matches!(results[0].1, Err(ApplicationError::Safety(_))));
    }

    #[test]
    fn test_import_without_package_is_skipped() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("Plain.java"), "class Plain {}\n").unwrap();
        let guard = ProjectGuard::new(dir.path()).unwrap();
        let definition = PatchDefinition {
            id: "import".to_string(),
            file: PathBuf::from("Plain.java"),
            operation: Operation::AddImport {
                path: "a.B".to_string(),
            },
        };
        let results = apply_patches(&[definition], &guard, Dialect::Java, ApplyMode::Write);
        assert!(matches!(results[0].1, Ok(PatchResult::Skipped { .. })));
    }
}

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Build output directories that are regenerated by Gradle and must not be patched.
const GENERATED_DIRS: &[&str] = &["build", "app/build", ".gradle"];

/// Project safety checks to prevent writing outside the Android project.
#[derive(Debug, Clone)]
pub struct ProjectGuard {
    /// Absolute path to the Android project root
    project_root: PathBuf,
    /// Canonical paths to forbidden directories
    forbidden_paths: Vec<PathBuf>,
}

#[derive(Error, Debug)]
pub enum SafetyError {
    #[error("Path is outside project: {path} (project: {project})")]
    OutsideProject { path: PathBuf, project: PathBuf },

    #[error("Path is in generated directory: {path} (forbidden: {forbidden})")]
    ForbiddenPath { path: PathBuf, forbidden: PathBuf },

    #[error("Failed to canonicalize path: {0}")]
    Canonicalize(#[from] std::io::Error),
}

impl ProjectGuard {
    /// Create a new guard for the given project root.
    ///
    /// The root is canonicalized to handle symlinks correctly.
    pub fn new(project_root: impl AsRef<Path>) -> Result<Self, SafetyError> {
        let project_root = project_root.as_ref().canonicalize()?;
        let forbidden_paths = GENERATED_DIRS
            .iter()
            .map(|dir| project_root.join(dir))
            .collect();

        Ok(Self {
            project_root,
            forbidden_paths,
        })
    }

    /// Check if a path is safe to write.
    ///
    /// The path does not need to exist yet (new resource files are created
    /// by the linker); its nearest existing ancestor is canonicalized and the
    /// remaining components are appended. Returns the resolved absolute path.
    pub fn validate_path(&self, path: impl AsRef<Path>) -> Result<PathBuf, SafetyError> {
        let path = path.as_ref();

        let absolute = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.project_root.join(path)
        };

        let resolved = resolve(&absolute)?;
        self.check_resolved(&resolved)?;
        Ok(resolved)
    }

    fn check_resolved(&self, resolved: &Path) -> Result<(), SafetyError> {
        if !resolved.starts_with(&self.project_root) {
            return Err(SafetyError::OutsideProject {
                path: resolved.to_path_buf(),
                project: self.project_root.clone(),
            });
        }

        for forbidden in &self.forbidden_paths {
            if resolved.starts_with(forbidden) {
                return Err(SafetyError::ForbiddenPath {
                    path: resolved.to_path_buf(),
                    forbidden: forbidden.clone(),
                });
            }
        }

        Ok(())
    }

    /// Get the project root.
    pub fn project_root(&self) -> &Path {
        &self.project_root
    }
}

/// Canonicalize the longest existing prefix of `path` and re-attach the rest.
///
/// A `..` below a missing directory stops the walk and fails canonicalization.
fn resolve(path: &Path) -> Result<PathBuf, SafetyError> {
    let mut existing = path.to_path_buf();
    let mut missing = Vec::new();

    while !existing.exists() {
        match existing.file_name() {
            Some(name) => {
                missing.push(name.to_os_string());
                existing.pop();
            }
            None => break,
        }
    }

    let mut resolved = existing.canonicalize()?;
    for name in missing.iter().rev() {
        resolved.push(name);
    }

    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_validate_path_inside_project() {
        let temp_dir = tempfile::tempdir().unwrap();
        let project = temp_dir.path();
        let guard = ProjectGuard::new(project).unwrap();

        let file = project.join("app/src/main/MainApplication.kt");
        fs::create_dir_all(file.parent().unwrap()).unwrap();
        fs::write(&file, b"").unwrap();

        assert!(guard.validate_path(&file).is_ok());
    }

    #[test]
    fn test_validate_missing_file_inside_project() {
        let temp_dir = tempfile::tempdir().unwrap();
        let guard = ProjectGuard::new(temp_dir.path()).unwrap();

        let resolved = guard.validate_path("app/src/main/res/font/roboto.xml").unwrap();
        assert!(resolved.ends_with("app/src/main/res/font/roboto.xml"));
        assert!(resolved.starts_with(guard.project_root()));
    }

    #[test]
    fn test_validate_path_outside_project() {
        let temp_dir = tempfile::tempdir().unwrap();
        let project = temp_dir.path().join("android");
        fs::create_dir_all(&project).unwrap();
        let guard = ProjectGuard::new(&project).unwrap();

        let outside = temp_dir.path().join("outside.kt");
        fs::write(&outside, b"").unwrap();

        let result = guard.validate_path(&outside);
        assert!(matches!(result, Err(SafetyError::OutsideProject { .. })));
    }

    #[test]
    fn test_validate_path_in_build_output() {
        let temp_dir = tempfile::tempdir().unwrap();
        let guard = ProjectGuard::new(temp_dir.path()).unwrap();

        let result = guard.validate_path("app/build/generated/R.java");
        assert!(matches!(result, Err(SafetyError::ForbiddenPath { .. })));
    }

    #[test]
    fn test_parent_dir_below_missing_directory() {
        let temp_dir = tempfile::tempdir().unwrap();
        let guard = ProjectGuard::new(temp_dir.path()).unwrap();

        let result = guard.validate_path("missing/../../escape.kt");
        assert!(result.is_err());
    }

    #[test]
    #[cfg(unix)]
    fn test_validate_symlink_escape() {
        use std::os::unix::fs::symlink;

        let temp_dir = tempfile::tempdir().unwrap();
        let project = temp_dir.path().join("android");
        fs::create_dir_all(&project).unwrap();

        let outside = temp_dir.path().join("outside.kt");
        fs::write(&outside, b"").unwrap();

        let link = project.join("escape.kt");
        symlink(&outside, &link).unwrap();

        let guard = ProjectGuard::new(&project).unwrap();
        let result = guard.validate_path(&link);

        assert!(matches!(result, Err(SafetyError::OutsideProject { .. })));
    }
}

//! Android project layout: where sources and font resources live.

use crate::source::Dialect;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

/// Source roots searched for application classes, relative to the project root.
pub const SOURCE_DIRS: &[&str] = &["app/src/main/java", "app/src/main/kotlin"];

/// Font resource directory, relative to the project root.
pub const FONT_RES_DIR: &str = "app/src/main/res/font";

/// Class whose `onCreate` registers custom fonts.
pub const APPLICATION_CLASS: &str = "MainApplication";

#[derive(Error, Debug)]
pub enum ProjectError {
    #[error("not an Android project: no app/src/main under {0}")]
    NotAndroidProject(PathBuf),

    #[error("no {file} found under {root}")]
    SourceNotFound { file: String, root: PathBuf },

    #[error("failed to scan {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

/// Detect the dialect of the native layer.
///
/// A project counts as Kotlin when its application class is written in
/// Kotlin; everything else is treated as Java.
pub fn detect_dialect(root: &Path) -> Result<Dialect, ProjectError> {
    ensure_android_project(root)?;
    let kotlin_app = format!("{APPLICATION_CLASS}.kt");
    if find_in_sources(root, &kotlin_app)?.is_some() {
        Ok(Dialect::Kotlin)
    } else {
        Ok(Dialect::Java)
    }
}

/// Path of the source file declaring `class_name` in `dialect`.
///
/// The first match in file-name order wins when several packages declare
/// a class of the same name.
pub fn find_source_file(
    root: &Path,
    class_name: &str,
    dialect: Dialect,
) -> Result<PathBuf, ProjectError> {
    ensure_android_project(root)?;
    let file = format!("{class_name}.{}", dialect.extension());
    find_in_sources(root, &file)?.ok_or_else(|| ProjectError::SourceNotFound {
        file,
        root: root.to_path_buf(),
    })
}

/// Directory holding font files and font-family XML.
pub fn font_res_dir(root: &Path) -> PathBuf {
    root.join(FONT_RES_DIR)
}

/// Path of the font-family XML for a normalized family id.
pub fn font_family_xml(root: &Path, family_id: &str) -> PathBuf {
    font_res_dir(root).join(format!("{family_id}.xml"))
}

fn ensure_android_project(root: &Path) -> Result<(), ProjectError> {
    if root.join("app/src/main").is_dir() {
        Ok(())
    } else {
        Err(ProjectError::NotAndroidProject(root.to_path_buf()))
    }
}

fn find_in_sources(root: &Path, file_name: &str) -> Result<Option<PathBuf>, ProjectError> {
    for dir in SOURCE_DIRS {
        let source_dir = root.join(dir);
        if !source_dir.is_dir() {
            continue;
        }

        for entry in WalkDir::new(&source_dir).sort_by_file_name() {
            let entry = entry.map_err(|source| ProjectError::Walk {
                path: source_dir.clone(),
                source,
            })?;
            if entry.file_type().is_file() && entry.file_name().to_str() == Some(file_name) {
                return Ok(Some(entry.into_path()));
            }
        }
    }

    Ok(None)
}

//! Linking font families into an Android project.
//!
//! A link run has two halves. Every family gets a font-family XML under
//! `res/font`, merged with whatever entries the file already holds. Then
//! `MainApplication.onCreate` gets one `addCustomFont` call per family plus
//! the `ReactFontManager` import. Free-standing patches from the config run
//! last, through the same applicator.

use crate::config::{
    apply_patches, preview_patches, ApplicationError, ApplyMode, FontFamily, LinkConfig,
    Operation, PatchDefinition, PatchResult, StepResults,
};
use crate::edit::{EditResult, FileEdit};
use crate::font::{
    add_custom_font_call, parse_xml, to_xml, DescriptorError, FontDescriptorDocument,
    REACT_FONT_MANAGER_IMPORT,
};
use crate::project::{
    detect_dialect, find_source_file, font_family_xml, ProjectError, APPLICATION_CLASS,
};
use crate::safety::{ProjectGuard, SafetyError};
use crate::source::Dialect;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Method of the application class that registers fonts.
pub const REGISTER_METHOD: &str = "onCreate";

#[derive(Error, Debug)]
pub enum LinkError {
    #[error(transparent)]
    Safety(#[from] SafetyError),

    #[error(transparent)]
    Project(#[from] ProjectError),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("existing font-family XML at {path} is malformed: {source}")]
    Descriptor {
        path: PathBuf,
        #[source]
        source: DescriptorError,
    },
}

/// Links fonts into one Android project.
#[derive(Debug, Clone)]
pub struct Linker {
    guard: ProjectGuard,
    dialect: Dialect,
}

impl Linker {
    /// Open a project; the dialect is detected unless given.
    pub fn new(project_root: impl AsRef<Path>, dialect: Option<Dialect>) -> Result<Self, LinkError> {
        let guard = ProjectGuard::new(project_root)?;
        let dialect = match dialect {
            Some(dialect) => dialect,
            None => detect_dialect(guard.project_root())?,
        };
        debug!(root = %guard.project_root().display(), %dialect, "opened project");
        Ok(Self { guard, dialect })
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn project_root(&self) -> &Path {
        self.guard.project_root()
    }

    /// Edit that brings `res/font/<id>.xml` up to date for `family`.
    ///
    /// Entries already in the file are kept; entries for the same style and
    /// weight are replaced in place.
    pub fn descriptor_edit(&self, family: &FontFamily) -> Result<FileEdit, LinkError> {
        let path = self
            .guard
            .validate_path(font_family_xml(self.project_root(), &family.resource_id()))?;

        match fs::read_to_string(&path) {
            Ok(existing) => {
                let mut doc = parse_xml(&existing).map_err(|source| LinkError::Descriptor {
                    path: path.clone(),
                    source,
                })?;
                doc.merge(&family.files);
                let updated = to_xml(&doc);
                Ok(FileEdit::new(path, existing, updated))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                let doc = FontDescriptorDocument::build(&family.files);
                Ok(FileEdit::create(path, to_xml(&doc)))
            }
            Err(source) => Err(LinkError::Io { path, source }),
        }
    }

    /// Patches registering `families` in the application class.
    ///
    /// Calls keep family order: the first goes after `super.onCreate()`,
    /// each following one after its predecessor.
    pub fn font_patches(&self, families: &[FontFamily]) -> Result<Vec<PatchDefinition>, LinkError> {
        if families.is_empty() {
            return Ok(Vec::new());
        }

        let file = self.application_file()?;
        let mut patches = vec![PatchDefinition {
            id: "import-react-font-manager".to_string(),
            file: file.clone(),
            operation: Operation::AddImport {
                path: REACT_FONT_MANAGER_IMPORT.to_string(),
            },
        }];

        let mut anchor = format!("super.{REGISTER_METHOD}()");
        for family in families {
            let id = family.resource_id();
            let code = add_custom_font_call(&family.family, &id, self.dialect);
            patches.push(PatchDefinition {
                id: format!("register-font-{id}"),
                file: file.clone(),
                operation: Operation::InsertStatement {
                    class: APPLICATION_CLASS.to_string(),
                    method: REGISTER_METHOD.to_string(),
                    code: code.clone(),
                    after_line: Some(anchor),
                },
            });
            anchor = code;
        }

        Ok(patches)
    }

    /// Patches removing the registration calls of `families`.
    ///
    /// Font-family XML is left in place.
    pub fn unlink_patches(&self, families: &[String]) -> Result<Vec<PatchDefinition>, LinkError> {
        if families.is_empty() {
            return Ok(Vec::new());
        }

        let file = self.application_file()?;
        Ok(families
            .iter()
            .map(|family| PatchDefinition {
                id: format!("unregister-font-{}", crate::font::normalize_name(family)),
                file: file.clone(),
                operation: Operation::RemoveLines {
                    contains: format!("addCustomFont(this, \"{family}\""),
                },
            })
            .collect())
    }

    /// Run a full link plan.
    ///
    /// Steps that cannot be planned at all (no application class, malformed
    /// XML) abort the run; steps that fail on their own are reported in the
    /// results and the rest continue.
    pub fn link(&self, config: &LinkConfig, mode: ApplyMode) -> Result<StepResults, LinkError> {
        let mut results = Vec::new();

        for family in &config.fonts {
            let edit = self.descriptor_edit(family)?;
            let id = format!("font-family-{}", family.resource_id());
            results.push((id, run_edit(edit, mode)));
        }

        let mut patches = self.font_patches(&config.fonts)?;
        patches.extend(config.patches.iter().cloned());
        results.extend(apply_patches(&patches, &self.guard, self.dialect, mode));

        Ok(results)
    }

    /// Remove the registration calls of `families`.
    pub fn unlink(&self, families: &[String], mode: ApplyMode) -> Result<StepResults, LinkError> {
        let patches = self.unlink_patches(families)?;
        Ok(apply_patches(&patches, &self.guard, self.dialect, mode))
    }

    /// Every file a link run would change, with before and after text.
    pub fn preview(&self, config: &LinkConfig) -> Result<Vec<FileEdit>, LinkError> {
        let mut edits = Vec::new();
        for family in &config.fonts {
            let edit = self.descriptor_edit(family)?;
            if !edit.is_noop() {
                edits.push(edit);
            }
        }

        let mut patches = self.font_patches(&config.fonts)?;
        patches.extend(config.patches.iter().cloned());
        edits.extend(preview_patches(&patches, &self.guard, self.dialect));
        Ok(edits)
    }

    fn application_file(&self) -> Result<PathBuf, LinkError> {
        let file = find_source_file(self.project_root(), APPLICATION_CLASS, self.dialect)?;
        Ok(self.guard.validate_path(file)?)
    }
}

fn run_edit(edit: FileEdit, mode: ApplyMode) -> Result<PatchResult, ApplicationError> {
    let file = edit.file.clone();
    if edit.is_noop() {
        return Ok(PatchResult::AlreadyApplied { file });
    }
    if mode == ApplyMode::Check {
        return Ok(PatchResult::Applied { file });
    }

    match edit.apply()? {
        EditResult::Applied { bytes_written, .. } => {
            debug!(file = %file.display(), bytes_written, "wrote font-family XML");
            Ok(PatchResult::Applied { file })
        }
        EditResult::AlreadyApplied { .. } => Ok(PatchResult::AlreadyApplied { file }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::FontFileRecord;
    use tempfile::TempDir;

    const JAVA_APP: &str = "package com.app;\n\n\
public class MainApplication extends Application implements ReactApplication {\n  \
@Override\n  \
public void onCreate() {\n    \
super.onCreate();\n    \
SoLoader.init(this, false);\n  \
}\n}\n";

    const APP_PATH: &str = "app/src/main/java/com/app/MainApplication.java";

    fn java_project() -> TempDir {
        let dir = TempDir::new().unwrap();
        let app = dir.path().join(APP_PATH);
        fs::create_dir_all(app.parent().unwrap()).unwrap();
        fs::write(&app, JAVA_APP).unwrap();
        dir
    }

    fn family(name: &str, files: &[(&str, u16, bool)]) -> FontFamily {
        FontFamily {
            family: name.to_string(),
            id: None,
            files: files
                .iter()
                .map(|(file, weight, italic)| FontFileRecord::new(*file, *weight, *italic))
                .collect(),
        }
    }

    fn config(fonts: Vec<FontFamily>) -> LinkConfig {
        LinkConfig {
            fonts,
            ..LinkConfig::default()
        }
    }

    #[test]
    fn test_detects_java() {
        let dir = java_project();
        let linker = Linker::new(dir.path(), None).unwrap();
        assert_eq!(linker.dialect(), Dialect::Java);
    }

    #[test]
    fn test_link_writes_xml_and_registration() {
        let dir = java_project();
        let linker = Linker::new(dir.path(), None).unwrap();
        let plan = config(vec![
            family("Roboto", &[("roboto_regular.ttf", 400, false)]),
            family("Open Sans", &[("open_sans.ttf", 400, false)]),
        ]);

        let results = linker.link(&plan, ApplyMode::Write).unwrap();
        assert_eq!(results.len(), 5);
        assert!(results
            .iter()
            .all(|(_, r)| matches!(r, Ok(PatchResult::Applied { .. }))));

        let xml = fs::read_to_string(dir.path().join("app/src/main/res/font/roboto.xml")).unwrap();
        assert!(xml.contains("app:font=\"@font/roboto_regular\""));

        let app = fs::read_to_string(dir.path().join(APP_PATH)).unwrap();
        assert!(app.contains(&format!("package com.app;\n\nimport {REACT_FONT_MANAGER_IMPORT};")));
        let roboto = app
            .find("addCustomFont(this, \"Roboto\", R.font.roboto);")
            .unwrap();
        let open_sans = app
            .find("addCustomFont(this, \"Open Sans\", R.font.open_sans);")
            .unwrap();
        let super_call = app.find("super.onCreate();").unwrap();
        assert!(super_call < roboto && roboto < open_sans);
    }

    #[test]
    fn test_relink_is_noop() {
        let dir = java_project();
        let linker = Linker::new(dir.path(), None).unwrap();
        let plan = config(vec![family("Roboto", &[("roboto.ttf", 400, false)])]);

        let _ = linker.link(&plan, ApplyMode::Write).unwrap();
        let app = fs::read_to_string(dir.path().join(APP_PATH)).unwrap();

        let again = linker.link(&plan, ApplyMode::Write).unwrap();
        assert!(again
            .iter()
            .all(|(_, r)| matches!(r, Ok(PatchResult::AlreadyApplied { .. }))));
        assert_eq!(fs::read_to_string(dir.path().join(APP_PATH)).unwrap(), app);
        assert!(linker.preview(&plan).unwrap().is_empty());
    }

    #[test]
    fn test_relink_merges_descriptor() {
        let dir = java_project();
        let linker = Linker::new(dir.path(), None).unwrap();

        let first = config(vec![family("Roboto", &[("roboto.ttf", 400, false)])]);
        let _ = linker.link(&first, ApplyMode::Write).unwrap();

        let second = config(vec![family("Roboto", &[("roboto_bold.ttf", 700, false)])]);
        let _ = linker.link(&second, ApplyMode::Write).unwrap();

        let xml = fs::read_to_string(dir.path().join("app/src/main/res/font/roboto.xml")).unwrap();
        let doc = parse_xml(&xml).unwrap();
        assert_eq!(doc.len(), 2);
    }

    #[test]
    fn test_check_mode_writes_nothing() {
        let dir = java_project();
        let linker = Linker::new(dir.path(), None).unwrap();
        let plan = config(vec![family("Roboto", &[("roboto.ttf", 400, false)])]);

        let results = linker.link(&plan, ApplyMode::Check).unwrap();
        assert!(results
            .iter()
            .all(|(_, r)| matches!(r, Ok(PatchResult::Applied { .. }))));
        assert!(!dir.path().join("app/src/main/res/font").exists());
        assert_eq!(fs::read_to_string(dir.path().join(APP_PATH)).unwrap(), JAVA_APP);

        let preview = linker.preview(&plan).unwrap();
        assert_eq!(preview.len(), 2);
    }

    #[test]
    fn test_unlink_removes_registration() {
        let dir = java_project();
        let linker = Linker::new(dir.path(), None).unwrap();
        let plan = config(vec![family("Roboto", &[("roboto.ttf", 400, false)])]);
        let _ = linker.link(&plan, ApplyMode::Write).unwrap();

        let results = linker
            .unlink(&["Roboto".to_string()], ApplyMode::Write)
            .unwrap();
        assert!(matches!(results[0].1, Ok(PatchResult::Applied { .. })));

        let app = fs::read_to_string(dir.path().join(APP_PATH)).unwrap();
        assert!(!app.contains("addCustomFont"));
        assert!(app.contains("super.onCreate();"));
        assert!(dir.path().join("app/src/main/res/font/roboto.xml").exists());
    }

    #[test]
    fn test_missing_application_class() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("app/src/main")).unwrap();
        let linker = Linker::new(dir.path(), Some(Dialect::Kotlin)).unwrap();
        let plan = config(vec![family("Roboto", &[("roboto.ttf", 400, false)])]);

        assert!(matches!(
            linker.link(&plan, ApplyMode::Write),
            Err(LinkError::Project(ProjectError::SourceNotFound { .. }))
        ));
    }

    #[test]
    fn test_malformed_descriptor_aborts() {
        let dir = java_project();
        let xml = dir.path().join("app/src/main/res/font/roboto.xml");
        fs::create_dir_all(xml.parent().unwrap()).unwrap();
        fs::write(&xml, "not xml").unwrap();

        let linker = Linker::new(dir.path(), None).unwrap();
        let plan = config(vec![family("Roboto", &[("roboto.ttf", 400, false)])]);
        assert!(matches!(
            linker.link(&plan, ApplyMode::Write),
            Err(LinkError::Descriptor { .. })
        ));
    }
}

use crate::font::{normalize_name, FontFileRecord};
use crate::source::Dialect;
use serde::Deserialize;
use std::fmt;
use std::ops::RangeInclusive;
use std::path::PathBuf;

/// Weights accepted for a font file.
pub const FONT_WEIGHT_RANGE: RangeInclusive<u16> = 1..=1000;

/// A link plan: font families to register plus free-standing source patches.
#[derive(Debug, Deserialize, Default, Clone)]
pub struct LinkConfig {
    #[serde(default)]
    pub meta: Metadata,
    #[serde(default)]
    pub fonts: Vec<FontFamily>,
    #[serde(default)]
    pub patches: Vec<PatchDefinition>,
}

impl LinkConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();

        if self.fonts.is_empty() && self.patches.is_empty() {
            issues.push(ValidationIssue::EmptyConfig);
        }

        for family in &self.fonts {
            if family.family.trim().is_empty() {
                issues.push(ValidationIssue::MissingField {
                    owner: None,
                    field: "fonts.family",
                });
                continue;
            }
            if family.resource_id().is_empty() {
                issues.push(ValidationIssue::InvalidCombo {
                    owner: Some(family.family.clone()),
                    message: "family name has no characters usable in a resource name"
                        .to_string(),
                });
            }
            if family.files.is_empty() {
                issues.push(ValidationIssue::MissingField {
                    owner: Some(family.family.clone()),
                    field: "fonts.files",
                });
            }
            for file in &family.files {
                if file.name.trim().is_empty() {
                    issues.push(ValidationIssue::MissingField {
                        owner: Some(family.family.clone()),
                        field: "fonts.files.name",
                    });
                }
                if !FONT_WEIGHT_RANGE.contains(&file.weight) {
                    issues.push(ValidationIssue::WeightOutOfRange {
                        family: family.family.clone(),
                        file: file.name.clone(),
                        weight: file.weight,
                    });
                }
            }
        }

        for patch in &self.patches {
            if patch.id.trim().is_empty() {
                issues.push(ValidationIssue::MissingField {
                    owner: None,
                    field: "id",
                });
            }
            if patch.file.as_os_str().is_empty() {
                issues.push(ValidationIssue::MissingField {
                    owner: Some(patch.id.clone()),
                    field: "file",
                });
            }

            let required: Vec<(&'static str, &str)> = match &patch.operation {
                Operation::InsertStatement {
                    class,
                    method,
                    code,
                    ..
                } => vec![
                    ("operation.class", class.as_str()),
                    ("operation.method", method.as_str()),
                    ("operation.code", code.as_str()),
                ],
                Operation::AddImport { path } => vec![("operation.path", path.as_str())],
                Operation::RemoveLines { contains } => {
                    vec![("operation.contains", contains.as_str())]
                }
            };
            for (field, value) in required {
                if value.trim().is_empty() {
                    issues.push(ValidationIssue::MissingField {
                        owner: Some(patch.id.clone()),
                        field,
                    });
                }
            }
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { issues })
        }
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct Metadata {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Overrides dialect detection
    #[serde(default)]
    pub dialect: Option<Dialect>,
}

/// A font family and the files that make it up.
#[derive(Debug, Deserialize, Clone)]
pub struct FontFamily {
    /// Name the JS side uses in `fontFamily`
    pub family: String,
    /// Resource name override; defaults to the normalized family name
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub files: Vec<FontFileRecord>,
}

impl FontFamily {
    /// Resource name of the family's XML (`R.font.<id>`).
    pub fn resource_id(&self) -> String {
        match &self.id {
            Some(id) => normalize_name(id),
            None => normalize_name(&self.family),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct PatchDefinition {
    pub id: String,
    /// Source file; relative paths are resolved against the project root
    pub file: PathBuf,
    pub operation: Operation,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Operation {
    /// Insert a statement into a method body, once
    InsertStatement {
        class: String,
        method: String,
        code: String,
        #[serde(default)]
        after_line: Option<String>,
    },
    /// Add an import after the package declaration
    AddImport { path: String },
    /// Remove every line containing a literal substring
    RemoveLines { contains: String },
}

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, issue) in self.issues.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    EmptyConfig,
    MissingField {
        owner: Option<String>,
        field: &'static str,
    },
    InvalidCombo {
        owner: Option<String>,
        message: String,
    },
    WeightOutOfRange {
        family: String,
        file: String,
        weight: u16,
    },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::EmptyConfig => {
                write!(f, "link config contains no fonts and no patches")
            }
            ValidationIssue::MissingField { owner, field } => match owner {
                Some(owner) => write!(f, "'{owner}' missing required field '{field}'"),
                None => write!(f, "entry missing required field '{field}'"),
            },
            ValidationIssue::InvalidCombo { owner, message } => match owner {
                Some(owner) => write!(f, "'{owner}' has invalid configuration: {message}"),
                None => write!(f, "invalid configuration: {message}"),
            },
            ValidationIssue::WeightOutOfRange {
                family,
                file,
                weight,
            } => write!(
                f,
                "font '{file}' of family '{family}' has weight {weight}, expected 1..=1000"
            ),
        }
    }
}

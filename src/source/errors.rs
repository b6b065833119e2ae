use thiserror::Error;

/// Reasons a source patch could not be applied.
///
/// None of these are fatal: the operation that reports one leaves the input
/// text untouched, so callers can keep going with the next file or step.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PatchError {
    #[error("class {class} not found")]
    ClassNotFound { class: String },

    #[error("method {method} not found in class {class}")]
    MethodNotFound { class: String, method: String },

    #[error("could not find closing brace for method {method} in class {class}")]
    BodyNotFound { class: String, method: String },

    #[error("line \"{line}\" not found in method body")]
    AnchorLineNotFound { line: String },

    #[error("no package declaration to attach import {import} to")]
    ImportAnchorMissing { import: String },

    #[error("invalid anchor pattern: {message}")]
    InvalidPattern { message: String },
}

impl From<regex::Error> for PatchError {
    fn from(e: regex::Error) -> Self {
        PatchError::InvalidPattern {
            message: e.to_string(),
        }
    }
}

impl PatchError {
    /// Whether the failure means "nothing to attach to" rather than a broken patch.
    pub fn is_skip(&self) -> bool {
        matches!(self, PatchError::ImportAnchorMissing { .. })
    }
}

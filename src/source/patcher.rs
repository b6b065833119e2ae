use crate::source::errors::PatchError;
use crate::source::grammar::Dialect;
use crate::source::locator::{locate, Span};
use tracing::{debug, warn};

/// Indentation placed in front of every inserted statement.
pub const INDENT: &str = "    ";

/// Outcome of a text mutation that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "TextPatch carries the patched text"]
pub enum TextPatch {
    /// The mutation produced new text
    Applied(String),
    /// The text already contains the mutation; nothing changed
    AlreadyApplied,
}

impl TextPatch {
    pub fn is_applied(&self) -> bool {
        matches!(self, TextPatch::Applied(_))
    }

    /// The resulting text, given the text the patch was computed from.
    pub fn into_text(self, original: &str) -> String {
        match self {
            TextPatch::Applied(text) => text,
            TextPatch::AlreadyApplied => original.to_string(),
        }
    }
}

/// Resolve a patch result to text, falling back to `original` on failure.
///
/// Failures are reported through `tracing` and otherwise swallowed, which
/// lets a sequence of independent steps run to completion.
pub fn keep_on_error(original: &str, result: Result<TextPatch, PatchError>) -> String {
    match result {
        Ok(patch) => patch.into_text(original),
        Err(e) if e.is_skip() => {
            debug!(error = %e, "patch skipped");
            original.to_string()
        }
        Err(e) => {
            warn!(error = %e, "patch not applied");
            original.to_string()
        }
    }
}

/// Insert `snippet` into the body described by `span`, exactly once.
///
/// If the trimmed snippet already occurs in the body the text is left alone.
/// With `after_line`, the snippet goes on a new line right after the first
/// body line containing it; otherwise right before the closing brace.
pub fn insert(
    text: &str,
    span: Span,
    snippet: &str,
    after_line: Option<&str>,
) -> Result<TextPatch, PatchError> {
    let body = span.body(text);

    if body.contains(snippet.trim()) {
        debug!(snippet = snippet.trim(), "snippet already present");
        return Ok(TextPatch::AlreadyApplied);
    }

    // Inserted lines follow the body's own line endings
    let newline = if body.contains("\r\n") { "\r\n" } else { "\n" };

    let insert_at = match after_line.map(str::trim).filter(|line| !line.is_empty()) {
        Some(anchor) => {
            let found = body
                .find(anchor)
                .ok_or_else(|| PatchError::AnchorLineNotFound {
                    line: anchor.to_string(),
                })?;
            let match_end = found + anchor.len();
            let line_end = body[match_end..]
                .find(newline)
                .map_or(body.len(), |rel| match_end + rel);
            span.body_start() + line_end
        }
        None => span.close,
    };

    let mut patched =
        String::with_capacity(text.len() + snippet.len() + INDENT.len() + newline.len());
    patched.push_str(&text[..insert_at]);
    patched.push_str(newline);
    patched.push_str(INDENT);
    patched.push_str(snippet);
    patched.push_str(&text[insert_at..]);

    Ok(TextPatch::Applied(patched))
}

/// Locate `class.method` and insert `snippet` into its body.
pub fn insert_in_method(
    text: &str,
    class: &str,
    method: &str,
    snippet: &str,
    after_line: Option<&str>,
    dialect: Dialect,
) -> Result<TextPatch, PatchError> {
    let span = locate(text, class, method, dialect)?;
    insert(text, span, snippet, after_line)
}

use crate::source::braces::match_delimiter;
use crate::source::errors::PatchError;
use crate::source::grammar::Dialect;
use tracing::debug;

/// Byte offsets of a body's opening `{` and its matching `}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    /// Offset of the opening brace
    pub open: usize,
    /// Offset of the closing brace
    pub close: usize,
}

impl Span {
    /// Offset of the first byte inside the body.
    pub fn body_start(&self) -> usize {
        self.open + 1
    }

    /// The text between the braces.
    pub fn body<'a>(&self, text: &'a str) -> &'a str {
        &text[self.body_start()..self.close]
    }
}

/// Regex-driven locator for methods inside classes.
///
/// There is no parser behind this: the class and method are found by their
/// declaration shapes, and only the method's extent is computed by brace
/// balancing.
#[derive(Debug, Clone, Copy)]
pub struct AnchorLocator {
    dialect: Dialect,
}

impl AnchorLocator {
    pub fn new(dialect: Dialect) -> Self {
        Self { dialect }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Locate the body of `method` declared after the first declaration of `class`.
    pub fn locate(&self, text: &str, class: &str, method: &str) -> Result<Span, PatchError> {
        let grammar = self.dialect.grammar();

        let class_match = grammar
            .class_regex(class)?
            .find(text)
            .ok_or_else(|| PatchError::ClassNotFound {
                class: class.to_string(),
            })?;

        // Declarations before the class anchor are skipped, never searched backward.
        let method_match = grammar
            .method_regex(method)?
            .find_iter(text)
            .find(|m| m.start() > class_match.start())
            .ok_or_else(|| PatchError::MethodNotFound {
                class: class.to_string(),
                method: method.to_string(),
            })?;

        let body_not_found = || PatchError::BodyNotFound {
            class: class.to_string(),
            method: method.to_string(),
        };

        let open = text[method_match.start()..]
            .find('{')
            .map(|rel| method_match.start() + rel)
            .ok_or_else(body_not_found)?;
        let close = match_delimiter(text, open).ok_or_else(body_not_found)?;

        debug!(class, method, open, close, "located method body");
        Ok(Span { open, close })
    }
}

/// Locate `class.method` in `text` using the grammar of `dialect`.
pub fn locate(
    text: &str,
    class: &str,
    method: &str,
    dialect: Dialect,
) -> Result<Span, PatchError> {
    AnchorLocator::new(dialect).locate(text, class, method)
}

//! Regex-anchored patching of generated Android sources.
//!
//! Anchors (class and method declarations, package lines) are found with
//! per-dialect patterns; a method's extent is found by brace balancing.
//! Every operation borrows the source text and returns new text, so a
//! failed step leaves the caller's copy untouched.

pub mod braces;
pub mod errors;
pub mod grammar;
pub mod lines;
pub mod locator;
pub mod patcher;

pub use braces::match_delimiter;
pub use errors::PatchError;
pub use grammar::{Dialect, Grammar};
pub use lines::{add_import, remove_lines, remove_lines_counted};
pub use locator::{locate, AnchorLocator, Span};
pub use patcher::{insert, insert_in_method, keep_on_error, TextPatch, INDENT};

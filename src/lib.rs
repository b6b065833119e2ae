//! Font Linker: registers custom fonts in React Native Android projects
//!
//! Linking a font family touches two kinds of files: a font-family XML
//! resource under `res/font`, and the application class, which needs an
//! `addCustomFont` call in `onCreate` plus the `ReactFontManager` import.
//!
//! # Architecture
//!
//! Source patching never parses Java or Kotlin. A method body is found with
//! regex anchors for the class and method followed by brace matching, and
//! every patch is a pure `&str -> TextPatch` function. File I/O happens only
//! at the edges, in [`FileEdit`].
//!
//! # Safety
//!
//! - Every patch is idempotent; re-running a link changes nothing
//! - A patch whose anchor is missing leaves the text untouched and is reported
//! - Atomic file writes (tempfile + fsync + rename)
//! - Writes are confined to the project root and kept out of build output
//!
//! # Example
//!
//! ```
//! use font_linker::source::{insert_in_method, Dialect, TextPatch};
//!
//! let source = "class MainApplication : Application(), ReactApplication {\n  \
//!     override fun onCreate() {\n    super.onCreate()\n  }\n}\n";
//!
//! let patched = insert_in_method(
//!     source,
//!     "MainApplication",
//!     "onCreate",
//!     "initFonts()",
//!     Some("super.onCreate()"),
//!     Dialect::Kotlin,
//! )
//! .unwrap();
//!
//! match patched {
//!     TextPatch::Applied(text) => assert!(text.contains("super.onCreate()\n    initFonts()")),
//!     TextPatch::AlreadyApplied => unreachable!(),
//! }
//! ```

pub mod cache;
pub mod config;
pub mod edit;
pub mod font;
pub mod link;
pub mod project;
pub mod safety;
pub mod source;

// Re-exports
pub use config::{
    apply_patches, load_from_path, load_from_str, ApplicationError, ApplyMode, ConfigError,
    LinkConfig, PatchResult,
};
pub use edit::{EditError, EditResult, FileEdit};
pub use font::{
    fallback_weight, parse_xml, to_xml, FontDescriptorDocument, FontDescriptorEntry,
    FontFileRecord, FontStyle,
};
pub use link::{LinkError, Linker};
pub use project::{detect_dialect, ProjectError};
pub use safety::{ProjectGuard, SafetyError};
pub use source::{locate, match_delimiter, Dialect, PatchError, Span, TextPatch};

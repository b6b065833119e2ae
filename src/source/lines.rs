use crate::source::errors::PatchError;
use crate::source::grammar::Dialect;
use crate::source::patcher::TextPatch;
use tracing::debug;

/// Add `import <import_path>` right after the package declaration.
///
/// Returns [`TextPatch::AlreadyApplied`] if the import is present and
/// [`PatchError::ImportAnchorMissing`] if the file has no package line.
pub fn add_import(
    text: &str,
    import_path: &str,
    dialect: Dialect,
) -> Result<TextPatch, PatchError> {
    let grammar = dialect.grammar();

    if grammar.import_regex(import_path)?.is_match(text) {
        debug!(import = import_path, "import already present");
        return Ok(TextPatch::AlreadyApplied);
    }

    let package = grammar
        .package_regex()?
        .find(text)
        .ok_or_else(|| PatchError::ImportAnchorMissing {
            import: import_path.to_string(),
        })?;

    let statement = grammar.import_statement(import_path);
    let mut patched = String::with_capacity(text.len() + statement.len() + 2);
    patched.push_str(&text[..package.end()]);
    patched.push_str("\n\n");
    patched.push_str(&statement);
    patched.push_str(&text[package.end()..]);

    Ok(TextPatch::Applied(patched))
}

/// Drop every line that contains `needle` literally.
pub fn remove_lines(text: &str, needle: &str) -> String {
    remove_lines_counted(text, needle).0
}

/// Like [`remove_lines`], also returning how many lines were dropped.
pub fn remove_lines_counted(text: &str, needle: &str) -> (String, usize) {
    let mut removed = 0;
    let kept: Vec<&str> = text
        .split('\n')
        .filter(|line| {
            let hit = line.contains(needle);
            if hit {
                removed += 1;
            }
            !hit
        })
        .collect();
    (kept.join("\n"), removed)
}

#[cfg(test)]
mod tests {
    use super::*;

    const IMPORT: &str = "com.facebook.react.views.text.ReactFontManager";

    #[test]
    fn test_add_import_java() {
        let text = "package com.app;\n\nimport android.app.Application;\n";
        let patched = add_import(text, IMPORT, Dialect::Java)
            .unwrap()
            .into_text(text);
        assert_eq!(
            patched,
            "package com.app;\n\nimport com.facebook.react.views.text.ReactFontManager;\n\nimport android.app.Application;\n"
        );
    }

    #[test]
    fn test_add_import_kotlin() {
        let text = "package com.app\n\nimport android.app.Application\n";
        let patched = add_import(text, IMPORT, Dialect::Kotlin)
            .unwrap()
            .into_text(text);
        assert!(patched.starts_with(
            "package com.app\n\nimport com.facebook.react.views.text.ReactFontManager\n"
        ));
        assert!(!patched.contains("ReactFontManager;"));
    }

    #[test]
    fn test_add_import_twice_is_identical() {
        let text = "package com.app;\n\npublic class Main {}\n";
        let once = add_import(text, IMPORT, Dialect::Java)
            .unwrap()
            .into_text(text);
        let twice = add_import(&once, IMPORT, Dialect::Java)
            .unwrap()
            .into_text(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_add_import_without_package() {
        let text = "public class Main {}\n";
        let err = add_import(text, IMPORT, Dialect::Java).unwrap_err();
        assert!(err.is_skip());
    }

    #[test]
    fn test_remove_lines() {
        let text = "one\nfont A\ntwo\nfont B\nthree";
        assert_eq!(remove_lines(text, "font"), "one\ntwo\nthree");
    }

    #[test]
    fn test_remove_lines_is_literal() {
        let text = "a.b\naxb\n";
        let (out, removed) = remove_lines_counted(text, "a.b");
        assert_eq!(out, "axb\n");
        assert_eq!(removed, 1);
    }

    #[test]
    fn test_remove_lines_no_match() {
        let text = "alpha\nbeta\n";
        let (out, removed) = remove_lines_counted(text, "gamma");
        assert_eq!(out, text);
        assert_eq!(removed, 0);
    }
}

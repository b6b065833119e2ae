use crate::source::Dialect;
use heck::ToSnakeCase;
use std::path::Path;

/// Class providing `addCustomFont` in React Native's Android runtime.
pub const REACT_FONT_MANAGER_IMPORT: &str = "com.facebook.react.views.text.ReactFontManager";

/// Turn a display name into an Android resource name (`[a-z0-9_]`).
///
/// "Open Sans" becomes `open_sans`, "Roboto-BoldItalic" becomes
/// `roboto_bold_italic`.
pub fn normalize_name(name: &str) -> String {
    name.to_snake_case()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect()
}

/// Resource id of a font file: its base name without extension.
pub fn font_resource_id(file_name: &str) -> String {
    Path::new(file_name)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// `@font/<id>` reference used inside resource XML.
pub fn font_resource_ref(file_name: &str) -> String {
    format!("@font/{}", font_resource_id(file_name))
}

/// The statement registering a font family with `ReactFontManager`.
pub fn add_custom_font_call(family: &str, font_id: &str, dialect: Dialect) -> String {
    format!(
        "ReactFontManager.getInstance().addCustomFont(this, \"{family}\", R.font.{font_id}){}",
        dialect.terminator()
    )
}

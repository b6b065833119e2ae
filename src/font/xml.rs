//! XML form of font-family resources.
//!
//! Output matches what Android resource tooling expects:
//!
//! ```xml
//! <?xml version="1.0" encoding="utf-8"?>
//! <font-family xmlns:app="http://schemas.android.com/apk/res-auto">
//!   <font app:fontStyle="normal" app:fontWeight="400" app:font="@font/roboto"/>
//! </font-family>
//! ```
//!
//! Attribute order is fixed. The reader accepts any well-formed font-family
//! resource; it is used to carry entries over when a family is linked again.

use crate::font::descriptor::{FontDescriptorDocument, FontDescriptorEntry, FontStyle};
use roxmltree::{Document, Node};
use thiserror::Error;

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="utf-8"?>"#;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DescriptorError {
    #[error("malformed XML: {message}")]
    Malformed { message: String },

    #[error("no <font-family> element found")]
    MissingRoot,

    #[error("<font> element {index} is missing attribute {attribute}")]
    MissingAttribute {
        index: usize,
        attribute: &'static str,
    },

    #[error("<font> element {index} has invalid weight '{value}'")]
    InvalidWeight { index: usize, value: String },

    #[error("<font> element {index} has invalid style '{value}'")]
    InvalidStyle { index: usize, value: String },
}

/// Serializer options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlFormat {
    /// Indentation of child elements
    pub indent: String,
    /// Emit the `<?xml ...?>` declaration
    pub declaration: bool,
}

impl Default for XmlFormat {
    fn default() -> Self {
        Self {
            indent: "  ".to_string(),
            declaration: true,
        }
    }
}

impl XmlFormat {
    /// Serialize `doc`. The result ends with a newline.
    pub fn write(&self, doc: &FontDescriptorDocument) -> String {
        let mut out = String::new();
        if self.declaration {
            out.push_str(XML_DECLARATION);
            out.push('\n');
        }

        let root = format!(r#"<font-family xmlns:app="{}""#, xml_escape(&doc.namespace));
        if doc.entries.is_empty() {
            out.push_str(&root);
            out.push_str("/>\n");
            return out;
        }

        out.push_str(&root);
        out.push_str(">\n");
        for entry in &doc.entries {
            out.push_str(&self.indent);
            out.push_str(&format!(
                r#"<font app:fontStyle="{}" app:fontWeight="{}" app:font="{}"/>"#,
                entry.style,
                entry.weight,
                xml_escape(&entry.font_ref)
            ));
            out.push('\n');
        }
        out.push_str("</font-family>\n");
        out
    }
}

/// Serialize with the default format.
pub fn to_xml(doc: &FontDescriptorDocument) -> String {
    XmlFormat::default().write(doc)
}

/// Read a font-family resource.
///
/// `<font>` children of the `<font-family>` root are read in document order;
/// attributes are looked up by namespace (the one bound to `app`, else res-auto).
pub fn parse_xml(input: &str) -> Result<FontDescriptorDocument, DescriptorError> {
    let xml = Document::parse(input).map_err(|e| DescriptorError::Malformed {
        message: e.to_string(),
    })?;
    let root = xml.root_element();
    if !root.has_tag_name("font-family") {
        return Err(DescriptorError::MissingRoot);
    }

    let mut doc = FontDescriptorDocument::default();
    if let Some(ns) = root.lookup_namespace_uri(Some("app")) {
        doc.namespace = ns.to_string();
    }
    let ns = doc.namespace.clone();

    let fonts = root
        .children()
        .filter(|node| node.is_element() && node.has_tag_name("font"));
    for (index, node) in fonts.enumerate() {
        doc.upsert(read_entry(node, &ns, index)?);
    }

    Ok(doc)
}

fn read_entry(
    node: Node<'_, '_>,
    ns: &str,
    index: usize,
) -> Result<FontDescriptorEntry, DescriptorError> {
    let get = |local: &str, attribute: &'static str| {
        node.attribute((ns, local))
            .ok_or(DescriptorError::MissingAttribute { index, attribute })
    };

    let style_value = get("fontStyle", "app:fontStyle")?;
    let style =
        FontStyle::parse(style_value.trim()).ok_or_else(|| DescriptorError::InvalidStyle {
            index,
            value: style_value.to_string(),
        })?;

    let weight_value = get("fontWeight", "app:fontWeight")?;
    let weight = weight_value
        .trim()
        .parse::<u16>()
        .map_err(|_| DescriptorError::InvalidWeight {
            index,
            value: weight_value.to_string(),
        })?;

    let font_ref = get("font", "app:font")?.to_string();

    Ok(FontDescriptorEntry {
        style,
        weight,
        font_ref,
    })
}

fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

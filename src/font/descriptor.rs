use crate::font::naming::font_resource_ref;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Namespace bound to the `app:` prefix in font-family resources.
pub const ANDROID_RES_AUTO_NS: &str = "http://schemas.android.com/apk/res-auto";

/// One physical font asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontFileRecord {
    /// File name, e.g. `roboto_bold.ttf`
    pub name: String,
    /// Weight, 1..=1000
    pub weight: u16,
    #[serde(rename = "italic", default)]
    pub is_italic: bool,
}

impl FontFileRecord {
    pub fn new(name: impl Into<String>, weight: u16, is_italic: bool) -> Self {
        Self {
            name: name.into(),
            weight,
            is_italic,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    Normal,
    Italic,
}

impl FontStyle {
    pub fn as_str(self) -> &'static str {
        match self {
            FontStyle::Normal => "normal",
            FontStyle::Italic => "italic",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "normal" => Some(FontStyle::Normal),
            "italic" => Some(FontStyle::Italic),
            _ => None,
        }
    }
}

impl fmt::Display for FontStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A `<font>` element of a font-family resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontDescriptorEntry {
    pub style: FontStyle,
    pub weight: u16,
    /// `@font/<id>` reference
    pub font_ref: String,
}

impl FontDescriptorEntry {
    /// Uniqueness key within a document.
    pub fn key(&self) -> (FontStyle, u16) {
        (self.style, self.weight)
    }
}

impl From<&FontFileRecord> for FontDescriptorEntry {
    fn from(record: &FontFileRecord) -> Self {
        FontDescriptorEntry {
            style: if record.is_italic {
                FontStyle::Italic
            } else {
                FontStyle::Normal
            },
            weight: record.weight,
            font_ref: font_resource_ref(&record.name),
        }
    }
}

/// A font-family resource: ordered entries, unique by (style, weight).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontDescriptorDocument {
    pub namespace: String,
    pub entries: Vec<FontDescriptorEntry>,
}

impl Default for FontDescriptorDocument {
    fn default() -> Self {
        Self {
            namespace: ANDROID_RES_AUTO_NS.to_string(),
            entries: Vec::new(),
        }
    }
}

impl FontDescriptorDocument {
    /// Build a document from records in order.
    ///
    /// A later record with the same style and weight replaces the earlier
    /// entry in place, so it wins while keeping the earlier position.
    pub fn build(records: &[FontFileRecord]) -> Self {
        let mut doc = Self::default();
        doc.merge(records);
        doc
    }

    /// Fold more records into the document with the same replacement rule.
    pub fn merge(&mut self, records: &[FontFileRecord]) {
        for record in records {
            self.upsert(FontDescriptorEntry::from(record));
        }
    }

    /// Insert `entry`, replacing any entry with the same (style, weight).
    pub fn upsert(&mut self, entry: FontDescriptorEntry) {
        match self.entries.iter_mut().find(|e| e.key() == entry.key()) {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

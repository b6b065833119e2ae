//! Font-family resource generation.

pub mod descriptor;
pub mod naming;
pub mod weight;
pub mod xml;

pub use descriptor::{
    FontDescriptorDocument, FontDescriptorEntry, FontFileRecord, FontStyle, ANDROID_RES_AUTO_NS,
};
pub use naming::{
    add_custom_font_call, font_resource_id, font_resource_ref, normalize_name,
    REACT_FONT_MANAGER_IMPORT,
};
pub use weight::fallback_weight;
pub use xml::{parse_xml, to_xml, DescriptorError, XmlFormat};

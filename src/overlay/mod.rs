//! Annotation families kept in sync with the document
//!
//! Each family owns the handles it created and nothing else. Rebuilding a
//! family always retires every handle from the previous cycle first.

mod bounding_box;
mod glyphs;
mod label;
mod zones;

pub use bounding_box::BoundingBoxOverlay;
pub use glyphs::{markers_for_line, GlyphFamily};
pub use label::LabelOverlay;
pub use zones::ZoneFamily;

//! Collaborator seams between the overlay synchronizer and its host editor
//!
//! The host owns the text model, the coordinate mapping, the annotation
//! surface and the frame clock. The synchronizer only talks to them through
//! these traits.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::coordinates::{DocPos, ViewPoint, ViewRect};
use crate::syntax::{TokenType, Tokenizer};

// === Handles ===

/// Handle of an overlay element (bounding box, label)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OverlayId(pub u64);

/// Handle of a zone placed between lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ZoneId(pub u64);

/// Handle of a zero-width glyph marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MarkerId(pub u64);

// === Annotation descriptions ===

/// Where an overlay element is anchored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum OverlayPlacement {
    /// Positioned by explicit view coordinates
    Absolute,
    TopRight,
    BottomRight,
    TopCenter,
}

/// Overlay element as handed to the host
#[derive(Debug, Clone, PartialEq)]
pub struct OverlaySpec {
    /// Stable element name, e.g. for styling
    pub name: String,
    pub placement: OverlayPlacement,
    /// Text content, empty for purely decorative elements
    pub text: String,
}

/// Zero-width marker placed after a token
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlyphMarker {
    /// 1-based line
    pub line: u32,
    /// 1-based column the marker sits at
    pub column: u32,
    /// Type of the token the marker closes
    pub token_type: TokenType,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnnotationError {
    UnknownOverlay(OverlayId),
    UnknownZone(ZoneId),
    UnknownMarker(MarkerId),
}

impl std::fmt::Display for AnnotationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnnotationError::UnknownOverlay(id) => write!(f, "Unknown overlay: {}", id.0),
            AnnotationError::UnknownZone(id) => write!(f, "Unknown zone: {}", id.0),
            AnnotationError::UnknownMarker(id) => write!(f, "Unknown marker: {}", id.0),
        }
    }
}

impl std::error::Error for AnnotationError {}

// === Collaborator traits ===

/// Read access to the live document
pub trait TextModel: Send + Sync {
    fn line_count(&self) -> u32;
    /// Text of a 1-based line, without terminator
    fn line_content(&self, line: u32) -> Option<String>;
    /// Last valid 1-based column of a line
    fn line_max_column(&self, line: u32) -> Option<u32>;
    fn language_id(&self) -> String;
}

/// Document position to view pixel mapping
pub trait CoordinateMapper: Send + Sync {
    /// `None` when the position is not currently rendered
    fn doc_to_view(&self, pos: DocPos) -> Option<ViewPoint>;
    fn visible_content_width(&self) -> f32;
}

/// Surface that owns live annotations
pub trait AnnotationHost: Send + Sync {
    fn add_overlay(&self, spec: OverlaySpec) -> OverlayId;
    fn set_overlay_rect(&self, id: OverlayId, rect: ViewRect) -> Result<(), AnnotationError>;
    fn remove_overlay(&self, id: OverlayId) -> Result<(), AnnotationError>;

    fn add_zone(&self, after_line: u32, height: f32) -> ZoneId;
    fn remove_zone(&self, id: ZoneId) -> Result<(), AnnotationError>;

    /// Retire `previous` and add `markers` as one batch, returning the new
    /// handles in the same order as `markers`
    fn replace_markers(&self, previous: &[MarkerId], markers: &[GlyphMarker]) -> Vec<MarkerId>;
}

/// The host's display-refresh facility
pub trait FrameScheduler: Send + Sync {
    /// Ask for one `AnimationFrame` event before the next paint
    fn request_frame(&self);
}

/// Change notifications the synchronizer reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorEvent {
    ContentChanged,
    ScrollChanged,
    LayoutChanged,
    AnimationFrame,
}

/// Everything the synchronizer needs from one editor instance
#[derive(Clone)]
pub struct EditorBinding {
    pub model: Arc<dyn TextModel>,
    pub viewport: Arc<dyn CoordinateMapper>,
    pub tokenizer: Arc<dyn Tokenizer>,
    pub annotations: Arc<dyn AnnotationHost>,
    pub frames: Arc<dyn FrameScheduler>,
}

impl EditorBinding {
    /// Bind every seam to one host that implements all of them
    pub fn from_host<H>(host: Arc<H>, tokenizer: Arc<dyn Tokenizer>) -> Self
    where
        H: TextModel + CoordinateMapper + AnnotationHost + FrameScheduler + 'static,
    {
        Self {
            model: host.clone(),
            viewport: host.clone(),
            tokenizer,
            annotations: host.clone(),
            frames: host,
        }
    }
}

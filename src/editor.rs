//! Headless editor host
//!
//! A complete in-process host for the overlay synchronizer: a document, a
//! viewport, an annotation store and a frame flag. Zones take up vertical
//! space, so lines after a zone are pushed down just like in a rendered
//! editor. Positions outside the visible vertical range are not resolved.

use crossbeam::queue::SegQueue;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::annotations::AnnotationStore;
use crate::coordinates::{DocPos, LayoutPos, ViewPoint, ViewRect, Viewport};
use crate::document::{Document, Edit};
use crate::host::{
    AnnotationError, AnnotationHost, CoordinateMapper, EditorEvent, FrameScheduler, GlyphMarker,
    MarkerId, OverlayId, OverlaySpec, TextModel, ZoneId,
};
use crate::synchronizer::OverlaySynchronizer;

pub struct HeadlessEditor {
    document: Document,
    viewport: RwLock<Viewport>,
    annotations: AnnotationStore,
    events: SegQueue<EditorEvent>,
    frame_requested: AtomicBool,
}

impl HeadlessEditor {
    pub fn new(document: Document, viewport: Viewport) -> Self {
        Self {
            document,
            viewport: RwLock::new(viewport),
            annotations: AnnotationStore::new(),
            events: SegQueue::new(),
            frame_requested: AtomicBool::new(false),
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn annotations(&self) -> &AnnotationStore {
        &self.annotations
    }

    /// Copy of the current viewport state
    pub fn viewport(&self) -> Viewport {
        self.viewport.read().clone()
    }

    // === Mutations (each queues the matching notification) ===

    pub fn apply_edit(&self, edit: Edit) {
        self.document.edit(edit);
        self.document.flush();
        self.events.push(EditorEvent::ContentChanged);
    }

    /// Insert text at a 1-based position; false if the position does not exist
    pub fn insert_at(&self, pos: DocPos, text: &str) -> bool {
        match self.document.read().offset_at(pos) {
            Some(offset) => {
                self.apply_edit(Edit::Insert {
                    pos: offset,
                    text: text.to_string(),
                });
                true
            }
            None => false,
        }
    }

    /// Set the vertical scroll offset in layout pixels
    pub fn scroll_to(&self, y: f32) {
        self.viewport.write().scroll.y = y.max(0.0);
        self.events.push(EditorEvent::ScrollChanged);
    }

    pub fn layout(&self, width: f32, height: f32) {
        self.viewport.write().resize(width, height);
        self.events.push(EditorEvent::LayoutChanged);
    }

    /// Take all queued notifications in the order they happened
    pub fn drain_events(&self) -> Vec<EditorEvent> {
        let mut events = Vec::new();
        while let Some(event) = self.events.pop() {
            events.push(event);
        }
        events
    }

    /// Consume the pending frame request, if any
    pub fn take_frame_request(&self) -> bool {
        self.frame_requested.swap(false, Ordering::AcqRel)
    }

    /// Deliver queued notifications, then the frame if one was requested
    pub fn dispatch(&self, sync: &mut OverlaySynchronizer) {
        for event in self.drain_events() {
            sync.handle_event(event);
        }
        if self.take_frame_request() {
            sync.handle_event(EditorEvent::AnimationFrame);
        }
    }

    // === Layout ===

    /// Layout y of the top of a 1-based line, including zones above it
    pub fn line_top(&self, line: u32) -> f32 {
        let line_height = self.viewport.read().metrics.line_height;
        line.saturating_sub(1) as f32 * line_height + self.annotations.zone_height_before(line)
    }

    /// Total layout height of all lines and zones
    pub fn content_height(&self) -> f32 {
        self.line_top(self.document.read().line_count() + 1)
    }
}

impl TextModel for HeadlessEditor {
    fn line_count(&self) -> u32 {
        self.document.read().line_count()
    }

    fn line_content(&self, line: u32) -> Option<String> {
        self.document.read().line(line).map(str::to_string)
    }

    fn line_max_column(&self, line: u32) -> Option<u32> {
        self.document.read().line_max_column(line)
    }

    fn language_id(&self) -> String {
        self.document.language().to_string()
    }
}

impl CoordinateMapper for HeadlessEditor {
    fn doc_to_view(&self, pos: DocPos) -> Option<ViewPoint> {
        let snapshot = self.document.read();
        let line_text = snapshot.line(pos.line)?;
        let max_column = snapshot.line_max_column(pos.line)?;
        if pos.column == 0 || pos.column > max_column {
            return None;
        }

        let top = self.line_top(pos.line);
        let viewport = self.viewport.read();
        let line_height = viewport.metrics.line_height;
        if !viewport.is_rendered(top, line_height) {
            return None;
        }

        let layout = LayoutPos {
            x: viewport.column_to_layout_x(line_text, pos.column),
            y: top,
        };
        let view = viewport.layout_to_view(layout);
        Some(ViewPoint {
            x: view.x,
            y: view.y,
            height: line_height,
        })
    }

    fn visible_content_width(&self) -> f32 {
        self.viewport.read().visible_content_width()
    }
}

impl AnnotationHost for HeadlessEditor {
    fn add_overlay(&self, spec: OverlaySpec) -> OverlayId {
        self.annotations.add_overlay(spec)
    }

    fn set_overlay_rect(&self, id: OverlayId, rect: ViewRect) -> Result<(), AnnotationError> {
        self.annotations.set_overlay_rect(id, rect)
    }

    fn remove_overlay(&self, id: OverlayId) -> Result<(), AnnotationError> {
        self.annotations.remove_overlay(id)
    }

    fn add_zone(&self, after_line: u32, height: f32) -> ZoneId {
        self.annotations.add_zone(after_line, height)
    }

    fn remove_zone(&self, id: ZoneId) -> Result<(), AnnotationError> {
        self.annotations.remove_zone(id)
    }

    fn replace_markers(&self, previous: &[MarkerId], markers: &[GlyphMarker]) -> Vec<MarkerId> {
        self.annotations.replace_markers(previous, markers)
    }
}

impl FrameScheduler for HeadlessEditor {
    fn request_frame(&self) {
        self.frame_requested.store(true, Ordering::Release);
    }
}

//! Overlay synchronizer - keeps annotation families aligned with a live view
//!
//! Two states: unbound (no editor) and bound (after `initialize`). Every call
//! other than `initialize` is a no-op while unbound.
//!
//! Scroll and layout changes update immediately. Content changes are
//! coalesced: the first one requests a frame from the host, later ones are
//! absorbed until that frame arrives, and the frame runs a single update
//! against whatever the document looks like by then.

use crate::config::SyncConfig;
use crate::coordinates::ViewRect;
use crate::host::{EditorBinding, EditorEvent, MarkerId, OverlayId, ZoneId};
use crate::overlay::{BoundingBoxOverlay, GlyphFamily, LabelOverlay, ZoneFamily};

pub struct OverlaySynchronizer {
    config: SyncConfig,
    session: Option<Session>,
    /// A content change is waiting for the next frame
    pending_frame: bool,
}

/// Everything owned while bound to one editor
struct Session {
    binding: EditorBinding,
    bounding_box: Option<BoundingBoxOverlay>,
    label: Option<LabelOverlay>,
    zones: ZoneFamily,
    glyphs: GlyphFamily,
}

impl OverlaySynchronizer {
    pub fn new(config: SyncConfig) -> Self {
        Self {
            config,
            session: None,
            pending_frame: false,
        }
    }

    pub fn is_bound(&self) -> bool {
        self.session.is_some()
    }

    /// Bind to an editor, replacing any previous binding
    pub fn initialize(&mut self, binding: EditorBinding) {
        if self.is_bound() {
            self.teardown();
        }

        let host = binding.annotations.as_ref();
        let bounding_box = self
            .config
            .families
            .bounding_box
            .then(|| BoundingBoxOverlay::attach(host, self.config.overlay.box_margin));
        let label = self
            .config
            .label
            .as_ref()
            .map(|label| LabelOverlay::attach(host, label));

        tracing::info!(
            "Overlay synchronizer bound ({} lines, language {})",
            binding.model.line_count(),
            binding.model.language_id()
        );

        self.session = Some(Session {
            bounding_box,
            label,
            zones: ZoneFamily::new(self.config.overlay.zone_height),
            glyphs: GlyphFamily::new(),
            binding,
        });
    }

    /// Recompute every enabled family from the current document state
    pub fn update(&mut self) {
        self.pending_frame = false;
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let families = self.config.families;
        let binding = &session.binding;
        let host = binding.annotations.as_ref();

        if families.zones {
            session.zones.rebuild(binding.model.as_ref(), host);
        }
        if families.glyphs {
            session
                .glyphs
                .rebuild(binding.model.as_ref(), binding.tokenizer.as_ref(), host);
        }
        // Zones move lines down, so the box is measured after they are placed
        let box_applied = match session.bounding_box.as_mut() {
            Some(overlay) => overlay.update(binding.model.as_ref(), binding.viewport.as_ref(), host),
            None => false,
        };

        tracing::debug!(
            "Overlay update: {} zones, {} markers, box {}",
            session.zones.ids().len(),
            session.glyphs.ids().len(),
            if box_applied { "applied" } else { "kept" }
        );
    }

    /// Remove every live annotation and unbind
    pub fn teardown(&mut self) {
        self.pending_frame = false;
        let Some(mut session) = self.session.take() else {
            return;
        };
        let host = session.binding.annotations.as_ref();

        session.zones.clear(host);
        session.glyphs.clear(host);
        if let Some(overlay) = session.bounding_box.take() {
            overlay.detach(host);
        }
        if let Some(label) = session.label.take() {
            label.detach(host);
        }

        tracing::info!("Overlay synchronizer unbound");
    }

    // === Change notifications ===

    pub fn on_content_changed(&mut self) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        if !self.config.overlay.coalesce_content_changes {
            self.update();
            return;
        }
        if !self.pending_frame {
            self.pending_frame = true;
            session.binding.frames.request_frame();
        }
    }

    pub fn on_scroll_changed(&mut self) {
        self.update();
    }

    pub fn on_layout_changed(&mut self) {
        self.update();
    }

    /// Run the deferred update, if a content change asked for one
    pub fn on_frame(&mut self) {
        if self.pending_frame {
            self.update();
        }
    }

    pub fn handle_event(&mut self, event: EditorEvent) {
        match event {
            EditorEvent::ContentChanged => self.on_content_changed(),
            EditorEvent::ScrollChanged => self.on_scroll_changed(),
            EditorEvent::LayoutChanged => self.on_layout_changed(),
            EditorEvent::AnimationFrame => self.on_frame(),
        }
    }

    // === Inspection ===

    pub fn has_pending_update(&self) -> bool {
        self.pending_frame
    }

    /// Geometry last applied to the bounding box
    pub fn bounding_box(&self) -> Option<ViewRect> {
        self.session
            .as_ref()
            .and_then(|s| s.bounding_box.as_ref())
            .and_then(BoundingBoxOverlay::rect)
    }

    pub fn bounding_box_id(&self) -> Option<OverlayId> {
        self.session
            .as_ref()
            .and_then(|s| s.bounding_box.as_ref())
            .map(BoundingBoxOverlay::id)
    }

    pub fn label_id(&self) -> Option<OverlayId> {
        self.session
            .as_ref()
            .and_then(|s| s.label.as_ref())
            .map(LabelOverlay::id)
    }

    pub fn zone_ids(&self) -> &[ZoneId] {
        self.session.as_ref().map(|s| s.zones.ids()).unwrap_or(&[])
    }

    pub fn marker_ids(&self) -> &[MarkerId] {
        self.session.as_ref().map(|s| s.glyphs.ids()).unwrap_or(&[])
    }
}

impl Drop for OverlaySynchronizer {
    fn drop(&mut self) {
        self.teardown();
    }
}

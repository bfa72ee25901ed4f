use crate::coordinates::{DocPos, ViewRect};
use crate::host::{
    AnnotationHost, CoordinateMapper, OverlayId, OverlayPlacement, OverlaySpec, TextModel,
};

/// Rectangle framing the whole document
///
/// When either end of the document cannot be resolved to view coordinates
/// the previous rectangle is kept as is.
pub struct BoundingBoxOverlay {
    id: OverlayId,
    rect: Option<ViewRect>,
    margin: f32,
}

impl BoundingBoxOverlay {
    pub const NAME: &'static str = "overlay.bounding-box";

    /// Register the (still unpositioned) overlay element with the host
    pub fn attach(host: &dyn AnnotationHost, margin: f32) -> Self {
        let id = host.add_overlay(OverlaySpec {
            name: Self::NAME.to_string(),
            placement: OverlayPlacement::Absolute,
            text: String::new(),
        });
        Self {
            id,
            rect: None,
            margin,
        }
    }

    pub fn id(&self) -> OverlayId {
        self.id
    }

    /// Last applied geometry
    pub fn rect(&self) -> Option<ViewRect> {
        self.rect
    }

    /// Recompute and apply; returns false when the cycle was skipped
    pub fn update(
        &mut self,
        model: &dyn TextModel,
        viewport: &dyn CoordinateMapper,
        host: &dyn AnnotationHost,
    ) -> bool {
        let Some(rect) = Self::compute(model, viewport, self.margin) else {
            tracing::trace!("Bounding box unresolved, keeping {:?}", self.rect);
            return false;
        };

        if let Err(err) = host.set_overlay_rect(self.id, rect) {
            tracing::warn!("Failed to position bounding box: {}", err);
            return false;
        }
        self.rect = Some(rect);
        true
    }

    /// Rectangle from the start of line 1 to the end of the last line
    pub fn compute(
        model: &dyn TextModel,
        viewport: &dyn CoordinateMapper,
        margin: f32,
    ) -> Option<ViewRect> {
        let last_line = model.line_count();
        if last_line == 0 {
            return None;
        }

        let start = viewport.doc_to_view(DocPos::new(1, 1))?;
        let end_column = model.line_max_column(last_line)?;
        let end = viewport.doc_to_view(DocPos::new(last_line, end_column))?;

        Some(ViewRect {
            x: start.x,
            y: start.y,
            width: (viewport.visible_content_width() - margin).max(0.0),
            height: end.y + end.height - start.y,
        })
    }

    pub fn detach(self, host: &dyn AnnotationHost) {
        if let Err(err) = host.remove_overlay(self.id) {
            tracing::warn!("Bounding box already gone: {}", err);
        }
    }
}

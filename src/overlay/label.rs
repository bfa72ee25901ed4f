use crate::config::LabelConfig;
use crate::host::{AnnotationHost, OverlayId, OverlaySpec};

/// Static text overlay anchored by placement preference
///
/// Added once per binding; it does not follow document changes.
pub struct LabelOverlay {
    id: OverlayId,
}

impl LabelOverlay {
    pub const NAME: &'static str = "overlay.label";

    pub fn attach(host: &dyn AnnotationHost, config: &LabelConfig) -> Self {
        let id = host.add_overlay(OverlaySpec {
            name: Self::NAME.to_string(),
            placement: config.placement,
            text: config.text.clone(),
        });
        Self { id }
    }

    pub fn id(&self) -> OverlayId {
        self.id
    }

    pub fn detach(self, host: &dyn AnnotationHost) {
        if let Err(err) = host.remove_overlay(self.id) {
            tracing::warn!("Label overlay already gone: {}", err);
        }
    }
}

use crate::host::{AnnotationHost, TextModel, ZoneId};

/// One fixed-height zone after every line
///
/// Zones are positional, so every rebuild removes all of them and recreates
/// the full set in line order.
pub struct ZoneFamily {
    ids: Vec<ZoneId>,
    height: f32,
}

impl ZoneFamily {
    pub fn new(height: f32) -> Self {
        Self {
            ids: Vec::new(),
            height,
        }
    }

    /// Live handles, in increasing line order
    pub fn ids(&self) -> &[ZoneId] {
        &self.ids
    }

    pub fn rebuild(&mut self, model: &dyn TextModel, host: &dyn AnnotationHost) {
        self.clear(host);

        let line_count = model.line_count();
        self.ids.reserve(line_count as usize);
        for line in 1..=line_count {
            self.ids.push(host.add_zone(line, self.height));
        }
    }

    pub fn clear(&mut self, host: &dyn AnnotationHost) {
        for id in self.ids.drain(..) {
            if let Err(err) = host.remove_zone(id) {
                tracing::warn!("Stale zone handle: {}", err);
            }
        }
    }
}

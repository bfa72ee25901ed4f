//! In-process annotation surface
//!
//! Tracks every live overlay, zone and marker by handle. Handles are never
//! reused, so a stale handle is always rejected.

use ahash::AHashMap;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::coordinates::ViewRect;
use crate::host::{
    AnnotationError, AnnotationHost, GlyphMarker, MarkerId, OverlayId, OverlaySpec, ZoneId,
};

/// A live overlay element and its last applied geometry
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayState {
    pub spec: OverlaySpec,
    pub rect: Option<ViewRect>,
}

/// A live zone between lines
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Zone {
    pub after_line: u32,
    pub height: f32,
}

#[derive(Default)]
struct StoreState {
    overlays: AHashMap<OverlayId, OverlayState>,
    zones: AHashMap<ZoneId, Zone>,
    markers: AHashMap<MarkerId, GlyphMarker>,
}

#[derive(Default)]
pub struct AnnotationStore {
    state: Mutex<StoreState>,
    next_id: AtomicU64,
}

impl AnnotationStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn overlay(&self, id: OverlayId) -> Option<OverlayState> {
        self.state.lock().overlays.get(&id).cloned()
    }

    pub fn overlay_count(&self) -> usize {
        self.state.lock().overlays.len()
    }

    /// Live zones ordered by the line they follow
    pub fn zones(&self) -> Vec<(ZoneId, Zone)> {
        let state = self.state.lock();
        let mut zones: Vec<_> = state.zones.iter().map(|(id, zone)| (*id, *zone)).collect();
        zones.sort_by_key(|(id, zone)| (zone.after_line, *id));
        zones
    }

    pub fn zone_count(&self) -> usize {
        self.state.lock().zones.len()
    }

    pub fn contains_zone(&self, id: ZoneId) -> bool {
        self.state.lock().zones.contains_key(&id)
    }

    /// Total height of zones that sit above the given 1-based line
    pub fn zone_height_before(&self, line: u32) -> f32 {
        self.state
            .lock()
            .zones
            .values()
            .filter(|zone| zone.after_line < line)
            .map(|zone| zone.height)
            .sum()
    }

    /// Live markers in document order
    pub fn markers(&self) -> Vec<(MarkerId, GlyphMarker)> {
        let state = self.state.lock();
        let mut markers: Vec<_> = state.markers.iter().map(|(id, m)| (*id, *m)).collect();
        markers.sort_by_key(|(id, m)| (m.line, m.column, *id));
        markers
    }

    pub fn marker_count(&self) -> usize {
        self.state.lock().markers.len()
    }

    pub fn contains_marker(&self, id: MarkerId) -> bool {
        self.state.lock().markers.contains_key(&id)
    }
}

impl AnnotationHost for AnnotationStore {
    fn add_overlay(&self, spec: OverlaySpec) -> OverlayId {
        let id = OverlayId(self.allocate());
        self.state
            .lock()
            .overlays
            .insert(id, OverlayState { spec, rect: None });
        id
    }

    fn set_overlay_rect(&self, id: OverlayId, rect: ViewRect) -> Result<(), AnnotationError> {
        let mut state = self.state.lock();
        let overlay = state
            .overlays
            .get_mut(&id)
            .ok_or(AnnotationError::UnknownOverlay(id))?;
        overlay.rect = Some(rect);
        Ok(())
    }

    fn remove_overlay(&self, id: OverlayId) -> Result<(), AnnotationError> {
        self.state
            .lock()
            .overlays
            .remove(&id)
            .map(|_| ())
            .ok_or(AnnotationError::UnknownOverlay(id))
    }

    fn add_zone(&self, after_line: u32, height: f32) -> ZoneId {
        let id = ZoneId(self.allocate());
        self.state
            .lock()
            .zones
            .insert(id, Zone { after_line, height });
        id
    }

    fn remove_zone(&self, id: ZoneId) -> Result<(), AnnotationError> {
        self.state
            .lock()
            .zones
            .remove(&id)
            .map(|_| ())
            .ok_or(AnnotationError::UnknownZone(id))
    }

    fn replace_markers(&self, previous: &[MarkerId], markers: &[GlyphMarker]) -> Vec<MarkerId> {
        let ids: Vec<MarkerId> = markers.iter().map(|_| MarkerId(self.allocate())).collect();

        let mut state = self.state.lock();
        for id in previous {
            if state.markers.remove(id).is_none() {
                tracing::warn!("Ignoring unknown marker {} in batch replace", id.0);
            }
        }
        state.markers.extend(ids.iter().copied().zip(markers.iter().copied()));
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::OverlayPlacement;
    use crate::syntax::TokenType;

    fn marker(line: u32, column: u32) -> GlyphMarker {
        GlyphMarker {
            line,
            column,
            token_type: TokenType::Text,
        }
    }

    #[test]
    fn test_removed_zone_is_rejected() {
        let store = AnnotationStore::new();
        let zone = store.add_zone(1, 20.0);
        assert!(store.contains_zone(zone));

        assert_eq!(store.remove_zone(zone), Ok(()));
        assert_eq!(store.remove_zone(zone), Err(AnnotationError::UnknownZone(zone)));
    }

    #[test]
    fn test_zone_height_before() {
        let store = AnnotationStore::new();
        store.add_zone(1, 20.0);
        store.add_zone(2, 10.0);
        store.add_zone(3, 5.0);

        assert_eq!(store.zone_height_before(1), 0.0);
        assert_eq!(store.zone_height_before(2), 20.0);
        assert_eq!(store.zone_height_before(4), 35.0);
    }

    #[test]
    fn test_replace_markers_is_one_batch() {
        let store = AnnotationStore::new();
        let first = store.replace_markers(&[], &[marker(1, 2), marker(1, 4)]);
        assert_eq!(store.marker_count(), 2);

        let second = store.replace_markers(&first, &[marker(2, 3)]);
        assert_eq!(second.len(), 1);
        assert_eq!(store.marker_count(), 1);
        assert!(first.iter().all(|id| !store.contains_marker(*id)));
        assert_eq!(store.markers()[0].1, marker(2, 3));
    }

    #[test]
    fn test_overlay_geometry() {
        let store = AnnotationStore::new();
        let id = store.add_overlay(OverlaySpec {
            name: "box".into(),
            placement: OverlayPlacement::Absolute,
            text: String::new(),
        });
        assert_eq!(store.overlay(id).and_then(|o| o.rect), None);

        let rect = ViewRect {
            x: 1.0,
            y: 2.0,
            width: 3.0,
            height: 4.0,
        };
        store.set_overlay_rect(id, rect).unwrap();
        assert_eq!(store.overlay(id).and_then(|o| o.rect), Some(rect));

        store.remove_overlay(id).unwrap();
        assert_eq!(
            store.set_overlay_rect(id, rect),
            Err(AnnotationError::UnknownOverlay(id))
        );
    }
}

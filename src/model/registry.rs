use serde::{Deserialize, Serialize};
use slotmap::{SlotMap, new_key_type};
use tracing::{debug, trace};

use crate::common::collections::HashMap;
use crate::layout_engine::{Orientation, Zone, ZoneBoundary, ZoneId};
use crate::sys::geometry::Rect;
use crate::sys::screen::ScreenId;
use crate::sys::window::{WindowFrameAccessor, WindowId};

new_key_type! {
    pub struct SnappedWindowId;
}

/// Default distance, in points, a window may drift before it counts as
/// unsnapped.
pub const UNSNAP_THRESHOLD: f64 = 50.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnappedWindow {
    pub window: WindowId,
    pub zone_id: ZoneId,
    /// Zone rectangle in the bottom-left-origin space.
    pub zone_frame: Rect,
    pub screen_id: ScreenId,
    /// Window-space frame from the last snap or resize.
    pub last_known_frame: Rect,
}

impl SnappedWindow {
    /// The zone this window occupies, for boundary detection.
    pub fn zone(&self) -> Zone {
        Zone {
            id: self.zone_id,
            frame: self.zone_frame,
            highlighted: false,
        }
    }
}

/// Tracks which window occupies which zone.
#[derive(Debug)]
pub struct SnappedWindowRegistry {
    entries: SlotMap<SnappedWindowId, SnappedWindow>,
    by_window: HashMap<WindowId, SnappedWindowId>,
    unsnap_threshold: f64,
}

impl Default for SnappedWindowRegistry {
    fn default() -> Self { Self::new(UNSNAP_THRESHOLD) }
}

impl SnappedWindowRegistry {
    pub fn new(unsnap_threshold: f64) -> Self {
        SnappedWindowRegistry {
            entries: SlotMap::default(),
            by_window: HashMap::default(),
            unsnap_threshold,
        }
    }

    pub fn set_unsnap_threshold(&mut self, threshold: f64) { self.unsnap_threshold = threshold; }

    pub fn len(&self) -> usize { self.entries.len() }

    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    /// Records `window` as occupying a zone, replacing any previous entry for
    /// the same window.
    pub fn register(
        &mut self,
        window: WindowId,
        zone_id: ZoneId,
        zone_frame: Rect,
        frame: Rect,
        screen_id: ScreenId,
    ) -> SnappedWindowId {
        let entry = SnappedWindow {
            window,
            zone_id,
            zone_frame,
            screen_id,
            last_known_frame: frame,
        };
        if let Some(&id) = self.by_window.get(&window) {
            if let Some(existing) = self.entries.get_mut(id) {
                debug!(?window, zone = ?zone_id, "re-snapped window");
                *existing = entry;
                return id;
            }
        }
        debug!(?window, zone = ?zone_id, screen = %entry.screen_id, "snapped window");
        let id = self.entries.insert(entry);
        self.by_window.insert(window, id);
        id
    }

    pub fn unregister(&mut self, window: WindowId) -> Option<SnappedWindow> {
        let id = self.by_window.remove(&window)?;
        let entry = self.entries.remove(id);
        if entry.is_some() {
            debug!(?window, "unsnapped window");
        }
        entry
    }

    pub fn get(&self, window: WindowId) -> Option<&SnappedWindow> {
        self.by_window.get(&window).and_then(|&id| self.entries.get(id))
    }

    pub fn get_by_id(&self, id: SnappedWindowId) -> Option<&SnappedWindow> { self.entries.get(id) }

    pub fn iter(&self) -> impl Iterator<Item = &SnappedWindow> + '_ { self.entries.values() }

    pub fn windows_on_screen<'a>(
        &'a self,
        screen_id: &'a ScreenId,
    ) -> impl Iterator<Item = &'a SnappedWindow> + 'a {
        self.entries.values().filter(move |w| &w.screen_id == screen_id)
    }

    pub fn window_for_zone(&self, zone_id: ZoneId) -> Option<&SnappedWindow> {
        self.entries.values().find(|w| w.zone_id == zone_id)
    }

    /// Distinct screens with at least one snapped window, sorted.
    pub fn screens(&self) -> Vec<ScreenId> {
        let mut screens: Vec<ScreenId> = self.entries.values().map(|w| w.screen_id.clone()).collect();
        screens.sort();
        screens.dedup();
        screens
    }

    pub fn clear_all(&mut self) {
        if !self.entries.is_empty() {
            debug!(count = self.entries.len(), "clearing snapped windows");
        }
        self.entries.clear();
        self.by_window.clear();
    }

    /// Drops entries whose window is gone or has drifted away from the frame
    /// it was snapped to. Returns the windows that were removed.
    pub fn refresh_states(&mut self, accessor: &dyn WindowFrameAccessor) -> Vec<WindowId> {
        let threshold = self.unsnap_threshold;
        let stale: Vec<WindowId> = self
            .entries
            .values()
            .filter(|entry| match accessor.frame(entry.window) {
                Ok(live) => {
                    let moved = !live.same_as(&entry.last_known_frame, threshold);
                    if moved {
                        trace!(window = ?entry.window, %live, last = %entry.last_known_frame, "window drifted");
                    }
                    moved
                }
                Err(err) => {
                    trace!(window = ?entry.window, %err, "window frame unavailable");
                    true
                }
            })
            .map(|entry| entry.window)
            .collect();
        for &window in &stale {
            self.unregister(window);
        }
        stale
    }

    pub fn update_frame(&mut self, window: WindowId, frame: Rect) -> bool {
        let Some(&id) = self.by_window.get(&window) else {
            return false;
        };
        match self.entries.get_mut(id) {
            Some(entry) => {
                entry.last_known_frame = frame;
                true
            }
            None => false,
        }
    }

    /// Moves the shared edge of the two zones on either side of `boundary`
    /// by `delta`, so later boundary detection sees the resized layout.
    pub fn shift_zone_edge(&mut self, boundary: &ZoneBoundary, delta: f64) {
        if delta == 0.0 {
            return;
        }
        for entry in self.entries.values_mut() {
            let frame = &mut entry.zone_frame;
            if entry.zone_id == boundary.lower_or_left {
                match boundary.orientation {
                    Orientation::Vertical => frame.size.width += delta,
                    Orientation::Horizontal => frame.size.height += delta,
                }
            } else if entry.zone_id == boundary.upper_or_right {
                match boundary.orientation {
                    Orientation::Vertical => {
                        frame.origin.x += delta;
                        frame.size.width -= delta;
                    }
                    Orientation::Horizontal => {
                        frame.origin.y += delta;
                        frame.size.height -= delta;
                    }
                }
            }
        }
    }

    /// Forgets every window snapped to a screen that is no longer present.
    pub fn remove_screens_not_in(&mut self, screens: &[ScreenId]) -> Vec<WindowId> {
        let gone: Vec<WindowId> = self
            .entries
            .values()
            .filter(|w| !screens.contains(&w.screen_id))
            .map(|w| w.window)
            .collect();
        for &window in &gone {
            self.unregister(window);
        }
        gone
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use test_log::test;

    use super::*;
    use crate::layout_engine::detect_boundaries;
    use crate::sys::geometry::Span1D;
    use crate::sys::window::SimulatedWindows;

    const LEFT: Rect = Rect::from_xywh(0.0, 0.0, 960.0, 1080.0);
    const RIGHT: Rect = Rect::from_xywh(960.0, 0.0, 960.0, 1080.0);

    fn main_screen() -> ScreenId { ScreenId::new("main") }

    #[test]
    fn register_is_an_upsert() {
        let mut registry = SnappedWindowRegistry::default();
        let window = WindowId::new(1, 1);
        let first = ZoneId::next();
        let second = ZoneId::next();
        let a = registry.register(window, first, LEFT, LEFT, main_screen());
        let b = registry.register(window, second, RIGHT, RIGHT, main_screen());
        assert_eq!(a, b);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get_by_id(a).map(|w| w.zone_id), Some(second));
        assert!(registry.window_for_zone(first).is_none());
        assert_eq!(registry.window_for_zone(second).map(|w| w.window), Some(window));
    }

    #[test]
    fn unregister_and_clear() {
        let mut registry = SnappedWindowRegistry::default();
        let a = WindowId::new(1, 1);
        let b = WindowId::new(2, 1);
        registry.register(a, ZoneId::next(), LEFT, LEFT, main_screen());
        registry.register(b, ZoneId::next(), RIGHT, RIGHT, ScreenId::new("side"));
        assert_eq!(registry.windows_on_screen(&main_screen()).count(), 1);
        assert!(registry.unregister(a).is_some());
        assert!(registry.unregister(a).is_none());
        assert_eq!(registry.screens(), vec![ScreenId::new("side")]);
        registry.clear_all();
        assert!(registry.is_empty());
        assert!(registry.get(b).is_none());
    }

    #[test]
    fn refresh_drops_closed_and_moved_windows() {
        let windows = SimulatedWindows::new();
        let closed = WindowId::new(1, 1);
        let nudged = WindowId::new(1, 2);
        let moved = WindowId::new(1, 3);
        windows.insert(nudged, Rect::from_xywh(30.0, 0.0, 960.0, 1080.0));
        windows.insert(moved, Rect::from_xywh(500.0, 300.0, 960.0, 1080.0));

        let mut registry = SnappedWindowRegistry::default();
        for window in [closed, nudged, moved] {
            registry.register(window, ZoneId::next(), LEFT, LEFT, main_screen());
        }

        let mut removed = registry.refresh_states(&windows);
        removed.sort();
        assert_eq!(removed, vec![closed, moved]);
        assert_eq!(registry.iter().map(|w| w.window).collect::<Vec<_>>(), vec![nudged]);
    }

    #[test]
    fn shift_zone_edge_keeps_zones_adjacent() {
        let mut registry = SnappedWindowRegistry::default();
        let left_zone = ZoneId::next();
        let right_zone = ZoneId::next();
        registry.register(WindowId::new(1, 1), left_zone, LEFT, LEFT, main_screen());
        registry.register(WindowId::new(1, 2), right_zone, RIGHT, RIGHT, main_screen());

        let zones: Vec<Zone> = registry.iter().map(SnappedWindow::zone).collect();
        let boundary = detect_boundaries(&zones).remove(0);
        registry.shift_zone_edge(&boundary, -160.0);

        let zones: Vec<Zone> = registry.iter().map(SnappedWindow::zone).collect();
        let boundaries = detect_boundaries(&zones);
        assert_eq!(boundaries.len(), 1);
        assert_eq!(boundaries[0].position, 800.0);
        assert_eq!(boundaries[0].range, Span1D::new(0.0, 1080.0));
        assert_eq!(registry.window_for_zone(right_zone).unwrap().zone_frame.size.width, 1120.0);
    }

    #[test]
    fn update_frame_and_screen_pruning() {
        let mut registry = SnappedWindowRegistry::default();
        let a = WindowId::new(1, 1);
        let b = WindowId::new(1, 2);
        registry.register(a, ZoneId::next(), LEFT, LEFT, main_screen());
        registry.register(b, ZoneId::next(), RIGHT, RIGHT, ScreenId::new("gone"));

        assert!(registry.update_frame(a, RIGHT));
        assert!(!registry.update_frame(WindowId::new(9, 9), RIGHT));
        assert_eq!(registry.get(a).unwrap().last_known_frame, RIGHT);

        assert_eq!(registry.remove_screens_not_in(&[main_screen()]), vec![b]);
        assert_eq!(registry.len(), 1);
    }
}

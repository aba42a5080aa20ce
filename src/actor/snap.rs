//! Modifier-triggered snapping.
//!
//! While a window drag is in progress and the snap modifier is held, the
//! coordinator keeps a freshly generated [`ZoneLayout`] and tracks the zone
//! under the cursor. Ending the drag commits the window into that zone.

use std::mem;

use tracing::{debug, trace, warn};

use crate::layout_engine::{ZoneId, ZoneLayout};
use crate::model::SnappedWindowRegistry;
use crate::sys::event::ModifierFlags;
use crate::sys::geometry::{Point, Rect};
use crate::sys::screen::CoordinateConverter;
use crate::sys::window::{DraggedWindowInfo, FrameError, WindowFrameAccessor, WindowId};
use crate::ui::Overlay;

#[derive(Debug, Clone)]
pub struct SnapSession {
    pub window: DraggedWindowInfo,
    pub modifiers: ModifierFlags,
    pub layout: ZoneLayout,
    pub active_zone: Option<ZoneId>,
    /// Last cursor position reported during this drag.
    pub cursor: Option<Point>,
}

#[derive(Debug, Clone, Default)]
pub enum SnapState {
    #[default]
    Idle,
    Snapping(SnapSession),
}

/// How a drag ended.
#[derive(Debug, Clone, PartialEq)]
pub enum SnapOutcome {
    /// Snap mode was not active.
    Inactive,
    /// The drag ended outside every zone.
    NoZone,
    Snapped {
        window: WindowId,
        zone: ZoneId,
        frame: Rect,
    },
    Failed(FrameError),
}

pub struct SnapDragCoordinator {
    state: SnapState,
    snap_modifier: ModifierFlags,
}

impl SnapDragCoordinator {
    pub fn new(snap_modifier: ModifierFlags) -> Self {
        SnapDragCoordinator {
            state: SnapState::Idle,
            snap_modifier,
        }
    }

    pub fn state(&self) -> &SnapState { &self.state }

    pub fn session(&self) -> Option<&SnapSession> {
        match &self.state {
            SnapState::Snapping(session) => Some(session),
            SnapState::Idle => None,
        }
    }

    pub fn is_snapping(&self) -> bool { matches!(self.state, SnapState::Snapping(_)) }

    pub fn active_zone(&self) -> Option<ZoneId> { self.session().and_then(|s| s.active_zone) }

    pub fn snap_modifier(&self) -> ModifierFlags { self.snap_modifier }

    pub fn set_snap_modifier(&mut self, modifiers: ModifierFlags) { self.snap_modifier = modifiers; }

    fn holds_snap_modifier(&self, modifiers: ModifierFlags) -> bool {
        !self.snap_modifier.is_empty() && modifiers.contains(self.snap_modifier)
    }

    /// Enters snap mode when a window is being dragged with the snap
    /// modifier held. Returns whether snap mode is now active.
    pub fn drag_started(
        &mut self,
        window: Option<DraggedWindowInfo>,
        modifiers: ModifierFlags,
        zones_for: &dyn Fn(ModifierFlags) -> ZoneLayout,
        overlay: &mut dyn Overlay,
    ) -> bool {
        let Some(window) = window else {
            trace!("drag without a window");
            return false;
        };
        if !self.holds_snap_modifier(modifiers) {
            trace!(%modifiers, "drag without the snap modifier");
            return false;
        }
        if self.is_snapping() {
            overlay.hide();
        }

        let layout = zones_for(modifiers);
        debug!(window = ?window.window, %modifiers, zones = layout.zones().count(), "snap mode started");
        overlay.show(&layout.all_zones());
        overlay.set_highlighted_zone(None);
        self.state = SnapState::Snapping(SnapSession {
            window,
            modifiers,
            layout,
            active_zone: None,
            cursor: None,
        });
        true
    }

    pub fn drag_moved(&mut self, point: Point, overlay: &mut dyn Overlay) {
        let SnapState::Snapping(session) = &mut self.state else {
            return;
        };
        session.cursor = Some(point);
        Self::update_active_zone(session, overlay);
    }

    fn update_active_zone(session: &mut SnapSession, overlay: &mut dyn Overlay) {
        let zone = session.cursor.and_then(|p| session.layout.zone_at(p)).map(|(_, z)| z.id);
        if zone != session.active_zone {
            trace!(?zone, "active zone changed");
            session.active_zone = zone;
            session.layout.set_highlighted(zone);
            overlay.set_highlighted_zone(zone);
        }
    }

    /// Regenerates zones for a new modifier combination, or cancels snap
    /// mode when the snap modifier was released.
    pub fn modifiers_changed(
        &mut self,
        modifiers: ModifierFlags,
        zones_for: &dyn Fn(ModifierFlags) -> ZoneLayout,
        overlay: &mut dyn Overlay,
    ) {
        if !self.is_snapping() {
            return;
        }
        if !self.holds_snap_modifier(modifiers) {
            debug!(%modifiers, "snap modifier released");
            self.cancel(overlay);
            return;
        }
        let SnapState::Snapping(session) = &mut self.state else {
            return;
        };
        if session.modifiers == modifiers {
            return;
        }
        session.modifiers = modifiers;
        Self::replace_layout(session, zones_for(modifiers), overlay);
    }

    /// Rebuilds zones after a screen or preset change.
    pub fn regenerate(&mut self, zones_for: &dyn Fn(ModifierFlags) -> ZoneLayout, overlay: &mut dyn Overlay) {
        if let SnapState::Snapping(session) = &mut self.state {
            let layout = zones_for(session.modifiers);
            Self::replace_layout(session, layout, overlay);
        }
    }

    fn replace_layout(session: &mut SnapSession, layout: ZoneLayout, overlay: &mut dyn Overlay) {
        trace!(zones = layout.zones().count(), "zones regenerated");
        session.layout = layout;
        session.active_zone = None;
        overlay.refresh(&session.layout.all_zones());
        overlay.set_highlighted_zone(None);
        Self::update_active_zone(session, overlay);
    }

    /// Leaves snap mode without touching the window.
    pub fn cancel(&mut self, overlay: &mut dyn Overlay) {
        if let SnapState::Snapping(_) = mem::take(&mut self.state) {
            overlay.hide();
        }
    }

    /// Ends the drag, snapping the window into the active zone if there is
    /// one. The overlay is hidden and the session cleared either way.
    pub fn drag_ended(
        &mut self,
        accessor: &dyn WindowFrameAccessor,
        converter: &CoordinateConverter,
        registry: &mut SnappedWindowRegistry,
        overlay: &mut dyn Overlay,
    ) -> SnapOutcome {
        let SnapState::Snapping(session) = mem::take(&mut self.state) else {
            return SnapOutcome::Inactive;
        };
        overlay.hide();

        let Some(zone_id) = session.active_zone else {
            debug!("drag ended outside every zone");
            return SnapOutcome::NoZone;
        };
        let Some((screen_id, zone)) = session.layout.zone(zone_id) else {
            return SnapOutcome::NoZone;
        };
        let window = session.window.window;
        let Some(target) = converter.rect_to_top_left(zone.frame) else {
            warn!("no coordinate converter; cannot snap");
            return SnapOutcome::Failed(FrameError::SetFailed("screen height unknown".to_string()));
        };

        if let Err(err) = accessor.set_frame(window, target) {
            warn!(?window, %err, "failed to snap window");
            return SnapOutcome::Failed(err);
        }
        // The app may adjust the frame (size increments, minimum sizes).
        let frame = accessor.frame(window).unwrap_or(target);
        registry.register(window, zone_id, zone.frame, frame, screen_id.clone());
        debug!(?window, zone = ?zone_id, %frame, "snapped");
        SnapOutcome::Snapped { window, zone: zone_id, frame }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use test_log::test;

    use super::*;
    use crate::actor::reactor::testing::RecordingOverlay;
    use crate::layout_engine::{BuiltinPreset, ScreenZones, generate};
    use crate::sys::screen::ScreenId;
    use crate::sys::window::SimulatedWindows;

    const SCREEN: Rect = Rect::from_xywh(0.0, 0.0, 1920.0, 1080.0);

    fn zones_for(modifiers: ModifierFlags) -> ZoneLayout {
        let preset = if modifiers.contains(ModifierFlags::CONTROL) {
            BuiltinPreset::Grid2x2
        } else {
            BuiltinPreset::HalfLeftRight
        };
        ZoneLayout {
            screens: vec![ScreenZones {
                screen_id: ScreenId::new("main"),
                preset_id: preset.id().to_string(),
                zones: generate(&preset.preset(), SCREEN, 0.0),
            }],
        }
    }

    struct Harness {
        coordinator: SnapDragCoordinator,
        windows: SimulatedWindows,
        registry: SnappedWindowRegistry,
        overlay: RecordingOverlay,
        converter: CoordinateConverter,
        window: WindowId,
    }

    impl Harness {
        fn new() -> Self {
            let windows = SimulatedWindows::new();
            let window = WindowId::new(7, 1);
            windows.insert(window, Rect::from_xywh(300.0, 200.0, 800.0, 600.0));
            Harness {
                coordinator: SnapDragCoordinator::new(ModifierFlags::SHIFT),
                windows,
                registry: SnappedWindowRegistry::default(),
                overlay: RecordingOverlay::default(),
                converter: CoordinateConverter::new(1080.0),
                window,
            }
        }

        fn info(&self) -> DraggedWindowInfo {
            DraggedWindowInfo::new(
                self.window,
                Rect::from_xywh(300.0, 200.0, 800.0, 600.0),
                Point::new(700.0, 850.0),
            )
        }

        fn start(&mut self, modifiers: ModifierFlags) -> bool {
            let info = self.info();
            self.coordinator.drag_started(Some(info), modifiers, &zones_for, &mut self.overlay)
        }

        fn end(&mut self) -> SnapOutcome {
            self.coordinator.drag_ended(
                &self.windows,
                &self.converter,
                &mut self.registry,
                &mut self.overlay,
            )
        }
    }

    #[test]
    fn snaps_into_the_zone_under_the_cursor() {
        let mut h = Harness::new();
        assert!(h.start(ModifierFlags::SHIFT));
        assert!(h.overlay.visible);

        h.coordinator.drag_moved(Point::new(1500.0, 500.0), &mut h.overlay);
        let zone = h.coordinator.active_zone().unwrap();
        assert_eq!(h.overlay.highlighted, Some(zone));

        let outcome = h.end();
        let expected = Rect::from_xywh(960.0, 0.0, 960.0, 1080.0);
        assert_eq!(outcome, SnapOutcome::Snapped {
            window: h.window,
            zone,
            frame: expected,
        });
        assert_eq!(h.windows.set_calls(), vec![(h.window, expected)]);
        let entry = h.registry.get(h.window).unwrap();
        assert_eq!(entry.zone_id, zone);
        assert_eq!(entry.screen_id, ScreenId::new("main"));
        assert!(!h.overlay.visible);
        assert!(!h.coordinator.is_snapping());
    }

    #[test]
    fn horizontal_zones_are_flipped_into_window_space() {
        let mut h = Harness::new();
        h.start(ModifierFlags::SHIFT | ModifierFlags::CONTROL);
        // Top-right quadrant in bottom-left coordinates.
        h.coordinator.drag_moved(Point::new(1500.0, 900.0), &mut h.overlay);
        h.end();
        assert_eq!(h.windows.set_calls(), vec![(
            h.window,
            Rect::from_xywh(960.0, 0.0, 960.0, 540.0)
        )]);
    }

    #[test]
    fn ending_outside_every_zone_changes_nothing() {
        let mut h = Harness::new();
        h.start(ModifierFlags::SHIFT);
        h.coordinator.drag_moved(Point::new(500.0, 500.0), &mut h.overlay);
        h.coordinator.drag_moved(Point::new(5000.0, 500.0), &mut h.overlay);
        assert_eq!(h.coordinator.active_zone(), None);
        assert_eq!(h.overlay.highlighted, None);

        assert_eq!(h.end(), SnapOutcome::NoZone);
        assert!(h.windows.set_calls().is_empty());
        assert!(h.registry.is_empty());
        assert!(!h.overlay.visible);
    }

    #[test]
    fn releasing_the_snap_modifier_cancels() {
        let mut h = Harness::new();
        h.start(ModifierFlags::SHIFT);
        h.coordinator.drag_moved(Point::new(100.0, 100.0), &mut h.overlay);
        h.coordinator.modifiers_changed(ModifierFlags::empty(), &zones_for, &mut h.overlay);
        assert!(!h.coordinator.is_snapping());
        assert!(!h.overlay.visible);

        assert_eq!(h.end(), SnapOutcome::Inactive);
        assert!(h.windows.set_calls().is_empty());
        assert!(h.registry.is_empty());
    }

    #[test]
    fn changing_modifiers_regenerates_zones() {
        let mut h = Harness::new();
        h.start(ModifierFlags::SHIFT);
        h.coordinator.drag_moved(Point::new(100.0, 100.0), &mut h.overlay);
        let before = h.coordinator.active_zone().unwrap();

        h.coordinator.modifiers_changed(
            ModifierFlags::SHIFT | ModifierFlags::CONTROL,
            &zones_for,
            &mut h.overlay,
        );
        let session = h.coordinator.session().unwrap();
        assert_eq!(session.layout.zones().count(), 4);
        assert_eq!(h.overlay.refreshes, 1);
        // The cursor is re-tested against the new zones.
        let after = h.coordinator.active_zone().unwrap();
        assert_ne!(before, after);
        assert_eq!(
            session.layout.zone(after).unwrap().1.frame,
            Rect::from_xywh(0.0, 0.0, 960.0, 540.0)
        );
    }

    #[test]
    fn drags_without_a_window_or_modifier_stay_idle() {
        let mut h = Harness::new();
        assert!(!h.coordinator.drag_started(
            None,
            ModifierFlags::SHIFT,
            &zones_for,
            &mut h.overlay
        ));
        assert!(!h.start(ModifierFlags::CONTROL));
        assert!(!h.coordinator.is_snapping());
        assert_eq!(h.overlay.shows, 0);
    }

    #[test]
    fn setter_failure_still_cleans_up() {
        let mut h = Harness::new();
        h.windows.fail_sets_for(h.window, "app refused");
        h.start(ModifierFlags::SHIFT);
        h.coordinator.drag_moved(Point::new(100.0, 100.0), &mut h.overlay);
        assert_eq!(
            h.end(),
            SnapOutcome::Failed(FrameError::SetFailed("app refused".to_string()))
        );
        assert!(h.registry.is_empty());
        assert!(!h.overlay.visible);
        assert!(!h.coordinator.is_snapping());
    }

    #[test]
    fn every_entry_into_snap_mode_gets_new_zones() {
        let mut h = Harness::new();
        h.start(ModifierFlags::SHIFT);
        let first: Vec<ZoneId> =
            h.coordinator.session().unwrap().layout.zones().map(|z| z.id).collect();
        h.end();
        h.start(ModifierFlags::SHIFT);
        let second: Vec<ZoneId> =
            h.coordinator.session().unwrap().layout.zones().map(|z| z.id).collect();
        assert!(first.iter().all(|id| !second.contains(id)));
        assert_eq!(h.overlay.shows, 2);
    }
}

use tracing::{debug, trace};

use crate::layout_engine::{Zone, ZoneId};
use crate::sys::event::CursorShape;

/// Presents zones while snap mode is active.
///
/// Zone frames are in the bottom-left-origin space. Implementations must not
/// call back into the reactor.
pub trait Overlay {
    fn show(&mut self, zones: &[Zone]);

    fn hide(&mut self);

    /// Replaces the visible zones without a show animation.
    fn refresh(&mut self, zones: &[Zone]);

    fn set_highlighted_zone(&mut self, zone: Option<ZoneId>);

    fn set_cursor(&mut self, _shape: CursorShape) {}
}

/// Overlay that only writes to the log. Used by replays and headless runs.
#[derive(Debug, Default)]
pub struct LoggingOverlay {
    visible: bool,
    zone_count: usize,
    highlighted: Option<ZoneId>,
}

impl LoggingOverlay {
    pub fn is_visible(&self) -> bool { self.visible }

    pub fn highlighted(&self) -> Option<ZoneId> { self.highlighted }

    pub fn zone_count(&self) -> usize { self.zone_count }
}

impl Overlay for LoggingOverlay {
    fn show(&mut self, zones: &[Zone]) {
        self.visible = true;
        self.zone_count = zones.len();
        debug!(zones = zones.len(), "overlay shown");
    }

    fn hide(&mut self) {
        if self.visible {
            debug!("overlay hidden");
        }
        self.visible = false;
        self.highlighted = None;
    }

    fn refresh(&mut self, zones: &[Zone]) {
        self.zone_count = zones.len();
        trace!(zones = zones.len(), "overlay refreshed");
    }

    fn set_highlighted_zone(&mut self, zone: Option<ZoneId>) {
        if self.highlighted != zone {
            trace!(?zone, "highlight");
            self.highlighted = zone;
        }
    }

    fn set_cursor(&mut self, shape: CursorShape) { trace!(?shape, "cursor"); }
}

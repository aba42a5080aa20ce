use std::cell::RefCell;
use std::rc::Rc;

use crate::layout_engine::{Zone, ZoneId};
use crate::sys::event::CursorShape;
use crate::ui::Overlay;

/// Overlay double that remembers what it was asked to show.
#[derive(Debug, Default)]
pub struct RecordingOverlay {
    pub visible: bool,
    pub zones: Vec<ZoneId>,
    pub highlighted: Option<ZoneId>,
    pub shows: usize,
    pub hides: usize,
    pub refreshes: usize,
    pub cursors: Vec<CursorShape>,
}

impl Overlay for RecordingOverlay {
    fn show(&mut self, zones: &[Zone]) {
        self.visible = true;
        self.shows += 1;
        self.zones = zones.iter().map(|z| z.id).collect();
    }

    fn hide(&mut self) {
        self.visible = false;
        self.hides += 1;
        self.highlighted = None;
    }

    fn refresh(&mut self, zones: &[Zone]) {
        self.refreshes += 1;
        self.zones = zones.iter().map(|z| z.id).collect();
    }

    fn set_highlighted_zone(&mut self, zone: Option<ZoneId>) { self.highlighted = zone; }

    fn set_cursor(&mut self, shape: CursorShape) { self.cursors.push(shape); }
}

/// Lets a test keep a handle on the overlay it gave to a reactor.
impl Overlay for Rc<RefCell<RecordingOverlay>> {
    fn show(&mut self, zones: &[Zone]) { self.borrow_mut().show(zones) }

    fn hide(&mut self) { self.borrow_mut().hide() }

    fn refresh(&mut self, zones: &[Zone]) { self.borrow_mut().refresh(zones) }

    fn set_highlighted_zone(&mut self, zone: Option<ZoneId>) {
        self.borrow_mut().set_highlighted_zone(zone)
    }

    fn set_cursor(&mut self, shape: CursorShape) { self.borrow_mut().set_cursor(shape) }
}

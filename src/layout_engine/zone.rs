use std::num::NonZeroU64;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::sys::geometry::{Point, Rect, Size};
use crate::sys::screen::ScreenId;

static NEXT_ZONE_ID: AtomicU64 = AtomicU64::new(1);

/// Opaque zone identifier. Every generated zone gets a fresh one; ids are
/// never reused within a process.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct ZoneId(NonZeroU64);

impl ZoneId {
    pub fn next() -> ZoneId {
        let raw = NEXT_ZONE_ID.fetch_add(1, Ordering::Relaxed);
        ZoneId(NonZeroU64::new(raw).unwrap_or(NonZeroU64::MIN))
    }
}

/// A zone expressed as fractions of a screen. `y` is measured from the
/// bottom edge.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneDefinition {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl ZoneDefinition {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        ZoneDefinition { x, y, width, height }
    }

    /// Pixel rectangle of this zone on `screen`.
    ///
    /// Edges that touch the screen boundary keep their position; interior
    /// edges are pulled in by half the gap so neighbouring zones end up
    /// exactly `gap` apart. Degenerate definitions clamp to zero size.
    pub fn to_frame(&self, screen: Rect, gap: f64) -> Rect {
        let half_gap = gap / 2.0;

        let mut x = screen.origin.x + screen.size.width * self.x;
        let mut y = screen.origin.y + screen.size.height * self.y;
        let mut width = screen.size.width * self.width;
        let mut height = screen.size.height * self.height;

        if self.x != 0.0 {
            x += half_gap;
            width -= half_gap;
        }
        if self.x + self.width != 1.0 {
            width -= half_gap;
        }
        if self.y != 0.0 {
            y += half_gap;
            height -= half_gap;
        }
        if self.y + self.height != 1.0 {
            height -= half_gap;
        }

        Rect::new(Point::new(x, y), Size::new(width.max(0.0), height.max(0.0)))
    }

    pub fn is_within_unit_square(&self) -> bool {
        let in_unit = |v: f64| (0.0..=1.0).contains(&v);
        in_unit(self.x)
            && in_unit(self.y)
            && in_unit(self.width)
            && in_unit(self.height)
            && self.x + self.width <= 1.0 + f64::EPSILON
            && self.y + self.height <= 1.0 + f64::EPSILON
    }
}

/// A generated drop target on one screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub id: ZoneId,
    /// Bottom-left-origin pixel rectangle.
    pub frame: Rect,
    /// Rendering hint only.
    #[serde(default)]
    pub highlighted: bool,
}

impl Zone {
    pub fn new(frame: Rect) -> Zone {
        Zone {
            id: ZoneId::next(),
            frame,
            highlighted: false,
        }
    }
}

/// The zones generated for one screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenZones {
    pub screen_id: ScreenId,
    pub preset_id: String,
    pub zones: Vec<Zone>,
}

/// Zones for every screen, in screen order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ZoneLayout {
    pub screens: Vec<ScreenZones>,
}

impl ZoneLayout {
    pub fn is_empty(&self) -> bool { self.screens.iter().all(|s| s.zones.is_empty()) }

    pub fn zones(&self) -> impl Iterator<Item = &Zone> + '_ {
        self.screens.iter().flat_map(|s| s.zones.iter())
    }

    /// Concatenated zone list across all screens.
    pub fn all_zones(&self) -> Vec<Zone> { self.zones().cloned().collect() }

    pub fn zone(&self, id: ZoneId) -> Option<(&ScreenId, &Zone)> {
        self.screens
            .iter()
            .find_map(|s| s.zones.iter().find(|z| z.id == id).map(|z| (&s.screen_id, z)))
    }

    /// First zone, in layout order, containing `point`.
    pub fn zone_at(&self, point: Point) -> Option<(&ScreenId, &Zone)> {
        self.screens.iter().find_map(|s| {
            s.zones.iter().find(|z| z.frame.contains(point)).map(|z| (&s.screen_id, z))
        })
    }

    /// Marks `id` as the only highlighted zone.
    pub fn set_highlighted(&mut self, id: Option<ZoneId>) {
        for screen in &mut self.screens {
            for zone in &mut screen.zones {
                zone.highlighted = Some(zone.id) == id;
            }
        }
    }
}

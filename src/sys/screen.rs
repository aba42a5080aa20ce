use serde::{Deserialize, Serialize};

use super::geometry::{Point, Rect};

/// Stable identifier for a display, as reported by the screen enumeration.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScreenId(String);

impl ScreenId {
    pub fn new(id: impl Into<String>) -> ScreenId { ScreenId(id.into()) }

    pub fn as_str(&self) -> &str { &self.0 }
}

impl std::fmt::Display for ScreenId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { f.write_str(&self.0) }
}

/// One entry of the screen enumeration. Both rectangles are in the
/// bottom-left-origin (Cocoa) space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenInfo {
    pub id: ScreenId,
    pub frame: Rect,
    pub visible_frame: Rect,
}

impl ScreenInfo {
    pub fn new(id: impl Into<String>, frame: Rect, visible_frame: Rect) -> Self {
        ScreenInfo {
            id: ScreenId::new(id),
            frame,
            visible_frame,
        }
    }
}

/// Flips a point from the bottom-left-origin space into the top-left-origin
/// space of a primary screen with height `height`.
pub fn to_top_left_origin(point: Point, height: f64) -> Point {
    Point::new(point.x, height - point.y)
}

/// Inverse of [`to_top_left_origin`]. The reflection is its own inverse.
pub fn to_bottom_left_origin(point: Point, height: f64) -> Point {
    Point::new(point.x, height - point.y)
}

/// Rectangles flip their origin and then step back by their own height so the
/// opposite edge lands in the right place.
pub fn rect_to_top_left_origin(rect: Rect, height: f64) -> Rect {
    Rect::new(
        Point::new(rect.origin.x, height - rect.origin.y - rect.size.height),
        rect.size,
    )
}

pub fn rect_to_bottom_left_origin(rect: Rect, height: f64) -> Rect {
    Rect::new(
        Point::new(rect.origin.x, height - rect.origin.y - rect.size.height),
        rect.size,
    )
}

/// Converts between the Quartz (top-left) and Cocoa (bottom-left) coordinate
/// systems.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct CoordinateConverter {
    /// The y offset of the Cocoa origin in the Quartz coordinate system, and
    /// vice versa. This is the height of the primary screen.
    screen_height: f64,
}

/// Creates a `CoordinateConverter` that returns None for any conversion.
impl Default for CoordinateConverter {
    fn default() -> Self { Self { screen_height: f64::NAN } }
}

impl CoordinateConverter {
    pub fn new(screen_height: f64) -> Self {
        if screen_height > 0.0 {
            Self { screen_height }
        } else {
            Self::default()
        }
    }

    /// The primary screen is the first one reported by the enumeration.
    pub fn for_screens(screens: &[ScreenInfo]) -> Self {
        match screens.first() {
            Some(primary) => Self::new(primary.frame.size.height),
            None => Self::default(),
        }
    }

    pub fn is_valid(&self) -> bool { !self.screen_height.is_nan() }

    pub fn screen_height(&self) -> Option<f64> { self.is_valid().then_some(self.screen_height) }

    pub fn to_top_left(&self, point: Point) -> Option<Point> {
        Some(to_top_left_origin(point, self.screen_height()?))
    }

    pub fn to_bottom_left(&self, point: Point) -> Option<Point> {
        Some(to_bottom_left_origin(point, self.screen_height()?))
    }

    pub fn rect_to_top_left(&self, rect: Rect) -> Option<Rect> {
        Some(rect_to_top_left_origin(rect, self.screen_height()?))
    }

    pub fn rect_to_bottom_left(&self, rect: Rect) -> Option<Rect> {
        Some(rect_to_bottom_left_origin(rect, self.screen_height()?))
    }
}

//! Plain geometry types shared by the zone engine, the coordinators and the
//! platform backends.
//!
//! These mirror the Core Graphics point/size/rect layout. The engine and its
//! tests run on every platform, so the Core Graphics types themselves only
//! appear at the macOS backend, through the conversions below.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self { Point { x, y } }
}

#[derive(Debug, Default, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self { Size { width, height } }
}

#[derive(Debug, Default, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub origin: Point,
    pub size: Size,
}

impl Rect {
    pub const ZERO: Rect = Rect {
        origin: Point::ZERO,
        size: Size { width: 0.0, height: 0.0 },
    };

    pub const fn new(origin: Point, size: Size) -> Self { Rect { origin, size } }

    pub const fn from_xywh(x: f64, y: f64, width: f64, height: f64) -> Self {
        Rect {
            origin: Point { x, y },
            size: Size { width, height },
        }
    }

    pub fn min_x(&self) -> f64 { self.origin.x }

    pub fn min_y(&self) -> f64 { self.origin.y }

    pub fn max_x(&self) -> f64 { self.origin.x + self.size.width }

    pub fn max_y(&self) -> f64 { self.origin.y + self.size.height }

    pub fn is_empty(&self) -> bool { self.size.width <= 0.0 || self.size.height <= 0.0 }

    pub fn is_portrait(&self) -> bool { self.size.height > self.size.width }

    /// Half-open containment: the min edges belong to the rect, the max edges
    /// belong to whatever is adjacent.
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.min_x()
            && point.x < self.max_x()
            && point.y >= self.min_y()
            && point.y < self.max_y()
    }

    /// Largest per-component difference in origin or size.
    pub fn max_deviation(&self, other: &Rect) -> f64 {
        [
            (self.origin.x - other.origin.x).abs(),
            (self.origin.y - other.origin.y).abs(),
            (self.size.width - other.size.width).abs(),
            (self.size.height - other.size.height).abs(),
        ]
        .into_iter()
        .fold(0.0, f64::max)
    }

    pub fn same_as(&self, other: &Rect, tolerance: f64) -> bool {
        self.max_deviation(other) <= tolerance
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}, {}x{})",
            self.origin.x, self.origin.y, self.size.width, self.size.height
        )
    }
}

/// A closed interval along one axis.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Span1D {
    pub start: f64,
    pub end: f64,
}

impl Span1D {
    pub const fn new(start: f64, end: f64) -> Self { Span1D { start, end } }

    pub fn len(&self) -> f64 { self.end - self.start }

    pub fn contains(&self, value: f64) -> bool { value >= self.start && value <= self.end }

    /// Overlap of two intervals, `None` unless the open intersection is
    /// non-empty.
    pub fn overlap(&self, other: &Span1D) -> Option<Span1D> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        if end > start { Some(Span1D { start, end }) } else { None }
    }
}

#[cfg(target_os = "macos")]
mod cg {
    use core_graphics_types::geometry::{CGPoint, CGSize};

    use super::{Point, Size};

    impl From<CGPoint> for Point {
        fn from(p: CGPoint) -> Self { Point::new(p.x, p.y) }
    }

    impl From<Point> for CGPoint {
        fn from(p: Point) -> Self { CGPoint::new(p.x, p.y) }
    }

    impl From<CGSize> for Size {
        fn from(s: CGSize) -> Self { Size::new(s.width, s.height) }
    }

    impl From<Size> for CGSize {
        fn from(s: Size) -> Self { CGSize::new(s.width, s.height) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_is_half_open() {
        let rect = Rect::from_xywh(0.0, 0.0, 100.0, 50.0);
        assert!(rect.contains(Point::new(0.0, 0.0)));
        assert!(rect.contains(Point::new(99.9, 49.9)));
        assert!(!rect.contains(Point::new(100.0, 10.0)));
        assert!(!rect.contains(Point::new(10.0, 50.0)));
    }

    #[test]
    fn overlap_requires_positive_length() {
        let a = Span1D::new(0.0, 10.0);
        assert_eq!(a.overlap(&Span1D::new(5.0, 20.0)), Some(Span1D::new(5.0, 10.0)));
        assert_eq!(a.overlap(&Span1D::new(10.0, 20.0)), None);
        assert_eq!(a.overlap(&Span1D::new(-5.0, -1.0)), None);
    }

    #[test]
    fn max_deviation_picks_the_largest_component() {
        let a = Rect::from_xywh(0.0, 0.0, 100.0, 100.0);
        let b = Rect::from_xywh(3.0, -10.0, 140.0, 100.0);
        assert_eq!(a.max_deviation(&b), 40.0);
        assert!(a.same_as(&b, 40.0));
        assert!(!a.same_as(&b, 39.0));
    }
}

use serde::{Deserialize, Serialize};

use super::zone::{Zone, ZoneId};
use crate::common::collections::HashSet;
use crate::sys::geometry::{Point, Span1D};

/// Two edges closer than this are treated as shared.
pub const EDGE_TOLERANCE: f64 = 2.0;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    /// Separates a left zone from a right zone; `position` is an x coordinate.
    Vertical,
    /// Separates a lower zone from an upper zone; `position` is a y coordinate.
    Horizontal,
}

impl Orientation {
    /// Component of `point` perpendicular to a boundary of this orientation.
    pub fn across(self, point: Point) -> f64 {
        match self {
            Orientation::Vertical => point.x,
            Orientation::Horizontal => point.y,
        }
    }

    /// Component of `point` along a boundary of this orientation.
    pub fn along(self, point: Point) -> f64 {
        match self {
            Orientation::Vertical => point.y,
            Orientation::Horizontal => point.x,
        }
    }
}

/// The shared edge between two adjacent zones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneBoundary {
    pub orientation: Orientation,
    pub position: f64,
    pub range: Span1D,
    /// Left zone for vertical boundaries, lower zone for horizontal ones.
    pub lower_or_left: ZoneId,
    pub upper_or_right: ZoneId,
}

impl ZoneBoundary {
    pub fn distance_to(&self, point: Point) -> f64 {
        (self.orientation.across(point) - self.position).abs()
    }

    pub fn is_near(&self, point: Point, tolerance: f64) -> bool {
        self.distance_to(point) <= tolerance && self.range.contains(self.orientation.along(point))
    }
}

pub fn detect_boundaries(zones: &[Zone]) -> Vec<ZoneBoundary> {
    detect_boundaries_with_tolerance(zones, EDGE_TOLERANCE)
}

/// Finds every shared edge in `zones`, sorted by position.
///
/// Edges match when they are closer than `tolerance`. When they don't
/// coincide exactly (a gapped layout) the boundary sits halfway between them.
pub fn detect_boundaries_with_tolerance(zones: &[Zone], tolerance: f64) -> Vec<ZoneBoundary> {
    let mut boundaries = Vec::new();
    let mut seen: HashSet<(ZoneId, ZoneId)> = HashSet::default();

    for (i, a) in zones.iter().enumerate() {
        for b in &zones[i + 1..] {
            let key = if a.id <= b.id { (a.id, b.id) } else { (b.id, a.id) };
            if !seen.insert(key) {
                continue;
            }
            for orientation in [Orientation::Vertical, Orientation::Horizontal] {
                if let Some(boundary) = shared_edge(a, b, orientation, tolerance)
                    .or_else(|| shared_edge(b, a, orientation, tolerance))
                {
                    boundaries.push(boundary);
                }
            }
        }
    }

    boundaries.sort_by(|a, b| a.position.total_cmp(&b.position));
    boundaries
}

/// Boundary where `low`'s trailing edge meets `high`'s leading edge.
fn shared_edge(
    low: &Zone,
    high: &Zone,
    orientation: Orientation,
    tolerance: f64,
) -> Option<ZoneBoundary> {
    let (low_edge, high_edge, low_span, high_span) = match orientation {
        Orientation::Vertical => (
            low.frame.max_x(),
            high.frame.min_x(),
            Span1D::new(low.frame.min_y(), low.frame.max_y()),
            Span1D::new(high.frame.min_y(), high.frame.max_y()),
        ),
        Orientation::Horizontal => (
            low.frame.max_y(),
            high.frame.min_y(),
            Span1D::new(low.frame.min_x(), low.frame.max_x()),
            Span1D::new(high.frame.min_x(), high.frame.max_x()),
        ),
    };
    if (low_edge - high_edge).abs() >= tolerance {
        return None;
    }
    let range = low_span.overlap(&high_span)?;
    let position = if low_edge == high_edge {
        low_edge
    } else {
        (low_edge + high_edge) / 2.0
    };
    Some(ZoneBoundary {
        orientation,
        position,
        range,
        lower_or_left: low.id,
        upper_or_right: high.id,
    })
}

/// First boundary, in sorted order, within `tolerance` of `point`.
pub fn boundary_at(point: Point, boundaries: &[ZoneBoundary], tolerance: f64) -> Option<&ZoneBoundary> {
    boundaries.iter().find(|b| b.is_near(point, tolerance))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::layout_engine::preset::BuiltinPreset;
    use crate::layout_engine::generate;
    use crate::sys::geometry::Rect;

    const SCREEN: Rect = Rect::from_xywh(0.0, 0.0, 1920.0, 1080.0);

    fn zones(preset: BuiltinPreset, gap: f64) -> Vec<Zone> { generate(&preset.preset(), SCREEN, gap) }

    #[test]
    fn two_columns_share_one_vertical_boundary() {
        let zones = zones(BuiltinPreset::HalfLeftRight, 0.0);
        let boundaries = detect_boundaries(&zones);
        assert_eq!(boundaries, vec![ZoneBoundary {
            orientation: Orientation::Vertical,
            position: 960.0,
            range: Span1D::new(0.0, 1080.0),
            lower_or_left: zones[0].id,
            upper_or_right: zones[1].id,
        }]);
    }

    #[test]
    fn left_side_is_found_regardless_of_zone_order() {
        let mut zones = zones(BuiltinPreset::HalfLeftRight, 0.0);
        zones.reverse();
        let boundaries = detect_boundaries(&zones);
        assert_eq!(boundaries.len(), 1);
        assert_eq!(boundaries[0].lower_or_left, zones[1].id);
        assert_eq!(boundaries[0].upper_or_right, zones[0].id);
    }

    #[test]
    fn three_columns_are_sorted_by_position() {
        let zones = zones(BuiltinPreset::Thirds, 0.0);
        let boundaries = detect_boundaries(&zones);
        let positions: Vec<f64> = boundaries.iter().map(|b| b.position).collect();
        assert_eq!(positions, vec![640.0, 1280.0]);
        assert!(boundaries.iter().all(|b| b.orientation == Orientation::Vertical));
    }

    #[test]
    fn grid_has_boundaries_in_both_orientations() {
        let zones = zones(BuiltinPreset::Grid2x2, 0.0);
        let boundaries = detect_boundaries(&zones);
        assert_eq!(boundaries.len(), 4);
        let horizontal: Vec<_> =
            boundaries.iter().filter(|b| b.orientation == Orientation::Horizontal).collect();
        assert_eq!(horizontal.len(), 2);
        assert!(horizontal.iter().all(|b| b.position == 540.0));
        // Diagonal neighbours touch at a corner only.
        assert!(boundaries.iter().all(|b| b.range.len() > 0.0));
    }

    #[test]
    fn gapped_layouts_need_a_wider_tolerance() {
        let gap = 10.0;
        let zones = zones(BuiltinPreset::HalfLeftRight, gap);
        assert!(detect_boundaries(&zones).is_empty());

        let boundaries = detect_boundaries_with_tolerance(&zones, EDGE_TOLERANCE + gap);
        assert_eq!(boundaries.len(), 1);
        assert_eq!(boundaries[0].position, 960.0);
    }

    #[test]
    fn boundary_at_respects_tolerance_and_range() {
        let zones = zones(BuiltinPreset::HalfLeftRight, 0.0);
        let boundaries = detect_boundaries(&zones);
        assert!(boundary_at(Point::new(963.0, 500.0), &boundaries, 4.0).is_some());
        assert!(boundary_at(Point::new(964.0, 500.0), &boundaries, 4.0).is_some());
        assert!(boundary_at(Point::new(965.0, 500.0), &boundaries, 4.0).is_none());
        assert!(boundary_at(Point::new(960.0, 1100.0), &boundaries, 4.0).is_none());
    }

    #[test]
    fn overlapping_boundaries_resolve_to_the_first_detected() {
        let left = Zone::new(Rect::from_xywh(0.0, 0.0, 960.0, 1080.0));
        let right = Zone::new(Rect::from_xywh(960.0, 0.0, 960.0, 1080.0));
        let stacked = Zone::new(Rect::from_xywh(960.0, 0.0, 960.0, 1080.0));
        let boundaries = detect_boundaries(&[left.clone(), right.clone(), stacked.clone()]);
        assert_eq!(boundaries.len(), 2);
        assert!(boundaries.iter().all(|b| b.position == 960.0));

        let hit = boundary_at(Point::new(960.0, 500.0), &boundaries, 4.0).unwrap();
        assert_eq!(hit, &boundaries[0]);
        assert_eq!(hit.lower_or_left, left.id);
        assert_eq!(hit.upper_or_right, right.id);
    }
}

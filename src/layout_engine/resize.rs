use serde::{Deserialize, Serialize};

use super::boundary::Orientation;
use crate::sys::geometry::{Rect, Size};

/// Smallest frame a boundary resize may leave either window with.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MinimumSize {
    pub width: f64,
    pub height: f64,
}

impl Default for MinimumSize {
    fn default() -> Self { MinimumSize { width: 200.0, height: 100.0 } }
}

impl MinimumSize {
    pub fn along(&self, orientation: Orientation) -> f64 {
        match orientation {
            Orientation::Vertical => self.width,
            Orientation::Horizontal => self.height,
        }
    }
}

fn extent(size: Size, orientation: Orientation) -> f64 {
    match orientation {
        Orientation::Vertical => size.width,
        Orientation::Horizontal => size.height,
    }
}

/// Limits `raw` so that neither side of the boundary drops below the minimum.
///
/// Returns zero when the windows are already too small to give anything up.
pub fn clamp_delta(
    raw: f64,
    orientation: Orientation,
    lower: Size,
    upper: Size,
    min: MinimumSize,
) -> f64 {
    let min = min.along(orientation);
    let lo = min - extent(lower, orientation);
    let hi = extent(upper, orientation) - min;
    if !(lo <= hi) || raw.is_nan() {
        return 0.0;
    }
    raw.clamp(lo, hi)
}

/// Moves the shared edge of two bottom-left-origin frames by `delta`.
///
/// The lower/left frame grows its trailing edge; the upper/right frame moves
/// its origin and shrinks by the same amount.
pub fn resize_pair(orientation: Orientation, lower: Rect, upper: Rect, delta: f64) -> (Rect, Rect) {
    let mut lower = lower;
    let mut upper = upper;
    match orientation {
        Orientation::Vertical => {
            lower.size.width += delta;
            upper.origin.x += delta;
            upper.size.width -= delta;
        }
        Orientation::Horizontal => {
            lower.size.height += delta;
            upper.origin.y += delta;
            upper.size.height -= delta;
        }
    }
    (lower, upper)
}

/// Best-effort guess at what the user did to a window between two frame
/// observations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DragKind {
    Unchanged,
    Move,
    Resize,
}

impl DragKind {
    /// A change in size means the window was resized, even when an edge drag
    /// also moved its origin. A pure origin change is a move.
    pub fn classify(before: Rect, after: Rect, tolerance: f64) -> DragKind {
        let size_changed = (before.size.width - after.size.width).abs() > tolerance
            || (before.size.height - after.size.height).abs() > tolerance;
        let origin_changed = (before.origin.x - after.origin.x).abs() > tolerance
            || (before.origin.y - after.origin.y).abs() > tolerance;
        if size_changed {
            DragKind::Resize
        } else if origin_changed {
            DragKind::Move
        } else {
            DragKind::Unchanged
        }
    }
}

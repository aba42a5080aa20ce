//! Dragging the shared edge between two snapped windows.

use std::mem;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::layout_engine::{
    EDGE_TOLERANCE, MinimumSize, Orientation, ZoneBoundary, ZoneId, boundary_at, clamp_delta,
    detect_boundaries_with_tolerance, resize_pair,
};
use crate::model::{SnappedWindow, SnappedWindowRegistry};
use crate::sys::event::CursorShape;
use crate::sys::geometry::{Point, Rect};
use crate::sys::screen::CoordinateConverter;
use crate::sys::window::{WindowFrameAccessor, WindowId};

/// Default distance from a boundary at which the cursor picks it up.
pub const HIT_TOLERANCE: f64 = 4.0;

/// One side of a boundary drag, with its window-space frame at mouse-down.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundaryWindow {
    pub window: WindowId,
    pub start_frame: Rect,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActiveBoundaryDrag {
    pub boundary: ZoneBoundary,
    pub start: Point,
    /// Clamped displacement of the boundary since `start`.
    pub delta: f64,
    pub lower: BoundaryWindow,
    pub upper: BoundaryWindow,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum BoundaryDragState {
    #[default]
    Idle,
    Dragging(ActiveBoundaryDrag),
}

/// Frames written by [`BoundaryDragCoordinator::apply_resize`]. `None` marks
/// a side whose setter failed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AppliedResize {
    pub lower: Option<Rect>,
    pub upper: Option<Rect>,
}

pub struct BoundaryDragCoordinator {
    state: BoundaryDragState,
    min_size: MinimumSize,
    hit_tolerance: f64,
}

impl Default for BoundaryDragCoordinator {
    fn default() -> Self { Self::new(MinimumSize::default(), HIT_TOLERANCE) }
}

impl BoundaryDragCoordinator {
    pub fn new(min_size: MinimumSize, hit_tolerance: f64) -> Self {
        BoundaryDragCoordinator {
            state: BoundaryDragState::Idle,
            min_size,
            hit_tolerance,
        }
    }

    pub fn configure(&mut self, min_size: MinimumSize, hit_tolerance: f64) {
        self.min_size = min_size;
        self.hit_tolerance = hit_tolerance;
    }

    pub fn state(&self) -> &BoundaryDragState { &self.state }

    pub fn is_dragging(&self) -> bool { matches!(self.state, BoundaryDragState::Dragging(_)) }

    pub fn active(&self) -> Option<&ActiveBoundaryDrag> {
        match &self.state {
            BoundaryDragState::Dragging(drag) => Some(drag),
            BoundaryDragState::Idle => None,
        }
    }

    /// Boundaries between snapped windows, detected per screen. Zones on a
    /// gapped layout sit `gap` apart, so the edge tolerance grows with it.
    pub fn boundaries(registry: &SnappedWindowRegistry, gap: f64) -> Vec<ZoneBoundary> {
        let tolerance = EDGE_TOLERANCE + gap.max(0.0);
        let mut boundaries: Vec<ZoneBoundary> = registry
            .screens()
            .iter()
            .flat_map(|screen| {
                let zones: Vec<_> =
                    registry.windows_on_screen(screen).map(SnappedWindow::zone).collect();
                detect_boundaries_with_tolerance(&zones, tolerance)
            })
            .collect();
        boundaries.sort_by(|a, b| a.position.total_cmp(&b.position));
        boundaries
    }

    pub fn boundary_under(
        &self,
        point: Point,
        registry: &SnappedWindowRegistry,
        gap: f64,
    ) -> Option<ZoneBoundary> {
        let boundaries = Self::boundaries(registry, gap);
        boundary_at(point, &boundaries, self.hit_tolerance).cloned()
    }

    /// Cursor shape for hovering at `point`.
    pub fn cursor_for(
        &self,
        point: Point,
        registry: &SnappedWindowRegistry,
        gap: f64,
    ) -> CursorShape {
        match self.boundary_under(point, registry, gap).map(|b| b.orientation) {
            Some(Orientation::Vertical) => CursorShape::ResizeLeftRight,
            Some(Orientation::Horizontal) => CursorShape::ResizeUpDown,
            None => CursorShape::Arrow,
        }
    }

    /// Starts a drag if `point` is on a boundary between two snapped windows
    /// whose frames can be read. Returns whether a drag started.
    pub fn mouse_down(
        &mut self,
        point: Point,
        registry: &SnappedWindowRegistry,
        accessor: &dyn WindowFrameAccessor,
        gap: f64,
    ) -> bool {
        let Some(boundary) = self.boundary_under(point, registry, gap) else {
            return false;
        };
        let side = |zone: ZoneId| -> Option<BoundaryWindow> {
            let entry = registry.window_for_zone(zone)?;
            match accessor.frame(entry.window) {
                Ok(start_frame) => Some(BoundaryWindow { window: entry.window, start_frame }),
                Err(err) => {
                    warn!(window = ?entry.window, %err, "cannot read frame for boundary drag");
                    None
                }
            }
        };
        let lower = side(boundary.lower_or_left);
        let upper = side(boundary.upper_or_right);
        let (Some(lower), Some(upper)) = (lower, upper) else {
            return false;
        };
        debug!(
            orientation = ?boundary.orientation,
            position = boundary.position,
            "boundary drag started"
        );
        self.state = BoundaryDragState::Dragging(ActiveBoundaryDrag {
            boundary,
            start: point,
            delta: 0.0,
            lower,
            upper,
        });
        true
    }

    /// Updates the clamped delta for the cursor at `point` and returns it.
    pub fn mouse_dragged(&mut self, point: Point) -> Option<f64> {
        let min_size = self.min_size;
        let BoundaryDragState::Dragging(drag) = &mut self.state else {
            return None;
        };
        let orientation = drag.boundary.orientation;
        let raw = orientation.across(point) - orientation.across(drag.start);
        drag.delta = clamp_delta(
            raw,
            orientation,
            drag.lower.start_frame.size,
            drag.upper.start_frame.size,
            min_size,
        );
        trace!(raw, delta = drag.delta, "boundary dragged");
        Some(drag.delta)
    }

    /// Window-space frames for both sides at the current delta.
    pub fn target_frames(&self, converter: &CoordinateConverter) -> Option<(Rect, Rect)> {
        let drag = self.active()?;
        let lower = converter.rect_to_bottom_left(drag.lower.start_frame)?;
        let upper = converter.rect_to_bottom_left(drag.upper.start_frame)?;
        let (lower, upper) = resize_pair(drag.boundary.orientation, lower, upper, drag.delta);
        Some((converter.rect_to_top_left(lower)?, converter.rect_to_top_left(upper)?))
    }

    /// Writes the current delta to both windows. A failure on one side is
    /// logged and does not stop the other.
    pub fn apply_resize(
        &self,
        accessor: &dyn WindowFrameAccessor,
        converter: &CoordinateConverter,
    ) -> Option<AppliedResize> {
        let drag = self.active()?;
        let Some((lower, upper)) = self.target_frames(converter) else {
            warn!("no coordinate converter; cannot resize");
            return None;
        };
        let set = |side: &BoundaryWindow, frame: Rect| match accessor.set_frame(side.window, frame) {
            Ok(()) => Some(frame),
            Err(err) => {
                warn!(window = ?side.window, %err, "failed to resize window");
                None
            }
        };
        Some(AppliedResize {
            lower: set(&drag.lower, lower),
            upper: set(&drag.upper, upper),
        })
    }

    /// Ends the drag and hands back its final state. Registry bookkeeping is
    /// left to the caller.
    pub fn mouse_up(&mut self) -> Option<ActiveBoundaryDrag> {
        match mem::take(&mut self.state) {
            BoundaryDragState::Dragging(drag) => {
                debug!(delta = drag.delta, "boundary drag ended");
                Some(drag)
            }
            BoundaryDragState::Idle => None,
        }
    }
}

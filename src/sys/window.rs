//! The window-frame boundary between the core and the OS.
//!
//! Everything the coordinators need from the platform goes through
//! [`WindowFrameAccessor`], so the state machines can run against
//! [`SimulatedWindows`] in tests and recordings.

use std::cell::RefCell;
use std::num::NonZeroU32;
use std::rc::Rc;

pub use nix::libc::pid_t;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::trace;

use super::geometry::{Point, Rect, Size};
use crate::common::collections::HashMap;

/// An identifier representing a window.
///
/// This identifier is only valid for the lifetime of the process that owns it.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct WindowId {
    pub pid: pid_t,
    pub idx: NonZeroU32,
}

impl WindowId {
    #[track_caller]
    pub fn new(pid: pid_t, idx: u32) -> WindowId {
        WindowId {
            pid,
            idx: NonZeroU32::new(idx).expect("window index must be non-zero"),
        }
    }
}

/// Snapshot taken when a drag begins, so later deltas don't need to re-query
/// the OS.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DraggedWindowInfo {
    pub window: WindowId,
    pub pid: pid_t,
    /// Window-space (top-left origin) position at drag start.
    pub initial_position: Point,
    pub initial_size: Size,
    /// Cursor position at drag start, bottom-left origin.
    pub mouse_start: Point,
}

impl DraggedWindowInfo {
    pub fn new(window: WindowId, initial_frame: Rect, mouse_start: Point) -> Self {
        DraggedWindowInfo {
            window,
            pid: window.pid,
            initial_position: initial_frame.origin,
            initial_size: initial_frame.size,
            mouse_start,
        }
    }

    pub fn initial_frame(&self) -> Rect { Rect::new(self.initial_position, self.initial_size) }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    #[error("accessibility permission has not been granted")]
    PermissionDenied,
    #[error("window position is unavailable")]
    PositionUnavailable,
    #[error("window size is unavailable")]
    SizeUnavailable,
    #[error("setting the window frame failed: {0}")]
    SetFailed(String),
}

/// Capability set the core needs from the window system.
///
/// Frames are in the top-left-origin space. Calls are synchronous; a window
/// that no longer exists shows up as an error, never a distinct variant.
pub trait WindowFrameAccessor {
    fn frame(&self, window: WindowId) -> Result<Rect, FrameError>;

    fn set_frame(&self, window: WindowId, frame: Rect) -> Result<(), FrameError>;

    fn is_permission_granted(&self) -> bool;
}

impl<T: WindowFrameAccessor + ?Sized> WindowFrameAccessor for Rc<T> {
    fn frame(&self, window: WindowId) -> Result<Rect, FrameError> { (**self).frame(window) }

    fn set_frame(&self, window: WindowId, frame: Rect) -> Result<(), FrameError> {
        (**self).set_frame(window, frame)
    }

    fn is_permission_granted(&self) -> bool { (**self).is_permission_granted() }
}

/// In-memory window system used for replays and tests.
#[derive(Debug, Default)]
pub struct SimulatedWindows {
    frames: RefCell<HashMap<WindowId, Rect>>,
    failing: RefCell<HashMap<WindowId, String>>,
    set_calls: RefCell<Vec<(WindowId, Rect)>>,
    permission_denied: bool,
}

impl SimulatedWindows {
    pub fn new() -> Self { Self::default() }

    pub fn without_permission() -> Self {
        SimulatedWindows {
            permission_denied: true,
            ..Self::default()
        }
    }

    pub fn insert(&self, window: WindowId, frame: Rect) {
        self.frames.borrow_mut().insert(window, frame);
    }

    /// Simulates the window closing.
    pub fn remove(&self, window: WindowId) { self.frames.borrow_mut().remove(&window); }

    /// Subsequent `set_frame` calls for `window` fail with `reason`.
    pub fn fail_sets_for(&self, window: WindowId, reason: impl Into<String>) {
        self.failing.borrow_mut().insert(window, reason.into());
    }

    pub fn get(&self, window: WindowId) -> Option<Rect> {
        self.frames.borrow().get(&window).copied()
    }

    /// Every `set_frame` call made so far, including failed ones.
    pub fn set_calls(&self) -> Vec<(WindowId, Rect)> { self.set_calls.borrow().clone() }

    pub fn take_set_calls(&self) -> Vec<(WindowId, Rect)> {
        std::mem::take(&mut *self.set_calls.borrow_mut())
    }

    pub fn windows(&self) -> Vec<(WindowId, Rect)> {
        let mut windows: Vec<_> = self.frames.borrow().iter().map(|(w, f)| (*w, *f)).collect();
        windows.sort_by_key(|(w, _)| *w);
        windows
    }
}

impl WindowFrameAccessor for SimulatedWindows {
    fn frame(&self, window: WindowId) -> Result<Rect, FrameError> {
        if self.permission_denied {
            return Err(FrameError::PermissionDenied);
        }
        self.get(window).ok_or(FrameError::PositionUnavailable)
    }

    fn set_frame(&self, window: WindowId, frame: Rect) -> Result<(), FrameError> {
        self.set_calls.borrow_mut().push((window, frame));
        if self.permission_denied {
            return Err(FrameError::PermissionDenied);
        }
        if let Some(reason) = self.failing.borrow().get(&window) {
            return Err(FrameError::SetFailed(reason.clone()));
        }
        match self.frames.borrow_mut().get_mut(&window) {
            Some(current) => {
                trace!(?window, %frame, "simulated set_frame");
                *current = frame;
                Ok(())
            }
            None => Err(FrameError::SetFailed("window does not exist".to_string())),
        }
    }

    fn is_permission_granted(&self) -> bool { !self.permission_denied }
}

//! Utilities for interfacing with OS-specific APIs.

pub mod accessibility;
#[cfg(target_os = "macos")]
pub mod ax;
pub mod event;
pub mod geometry;
pub mod screen;
pub mod window;

pub mod registry;

pub use registry::{SnappedWindow, SnappedWindowId, SnappedWindowRegistry};

pub mod overlay;

pub use overlay::{LoggingOverlay, Overlay};

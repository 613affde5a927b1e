pub mod overlay;
pub mod tooltip;

#[cfg(feature = "egui")]
pub mod painter;

pub use overlay::{DetailOverlay, GrantTable, OverlayContent, OverlayState};
pub use tooltip::Tooltip;

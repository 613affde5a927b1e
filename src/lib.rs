//! # grantmap
//!
//! An interactive choropleth map engine for U.S. states and districts with a
//! grant drill-down overlay.
//!
//! The crate is organised the way a small map engine is: geometry and
//! projection in [`core`], loaded data in [`data`], the filtered feature view
//! in [`layers`], drawing in [`rendering`], pointer/keyboard handling in
//! [`input`], and the tooltip and detail overlay in [`ui`]. Everything is tied
//! together by [`MapView`], the single context object a host drives.

pub mod background;
pub mod core;
pub mod data;
pub mod input;
pub mod layers;
pub mod prelude;
pub mod rendering;
pub mod spatial;
pub mod traits;
pub mod ui;
pub use crate::core::constants;

// Re-export public API
pub use core::{
    bounds::Bounds,
    builder::MapViewBuilder,
    config::{GlobalFilters, MapViewConfig},
    geo::{LatLng, Point},
    map::MapView,
    projection::AlbersUsa,
    viewport::ViewportTransform,
};

pub use data::{
    geojson::{FeatureProperties, GeoCollection, GeoFeature, MapKind},
    grants::{GrantIndex, GrantRecord},
};

pub use input::{events::InputEvent, interaction::SelectionContext};

pub use layers::{filter::FilterEngine, store::GeometryStore};

pub use rendering::{
    context::RenderContext,
    pipeline::{InteractionHooks, RenderPipeline, RenderStyle},
};

pub use ui::{
    overlay::{DetailOverlay, OverlayContent, OverlayState},
    tooltip::Tooltip,
};

pub use traits::GeometrySource;

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, MapError>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("Malformed feature: {0}")]
    MalformedFeature(String),

    #[error("Load error: {0}")]
    Load(String),
}

/// Error type alias for convenience
pub type Error = MapError;

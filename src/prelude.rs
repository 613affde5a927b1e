//! Prelude module for common grantmap types and traits
//!
//! This module re-exports the most commonly used types, traits, and functions
//! for easy importing with `use grantmap::prelude::*;`

pub use crate::core::{
    bounds::Bounds,
    builder::MapViewBuilder,
    config::{CanvasConfig, GlobalFilters, MapViewConfig, SourceConfig, StyleConfig, TooltipConfig},
    geo::{LatLng, Point},
    map::MapView,
    projection::AlbersUsa,
    viewport::ViewportTransform,
};

pub use crate::data::{
    geojson::{FeatureProperties, GeoCollection, GeoFeature, GeoGeometry, MapKind},
    grants::{GrantIndex, GrantRecord, ALL_FUNDING_TYPES},
};

pub use crate::layers::{filter::FilterEngine, store::GeometryStore};

pub use crate::input::{
    events::{InputEvent, KeyCode},
    interaction::{InteractionEvent, SelectionContext},
};

pub use crate::rendering::{
    context::{DrawCommand, RenderContext},
    pipeline::{FillRule, InteractionHooks, RenderPipeline, RenderStyle},
};

pub use crate::spatial::index::{ShapeEnvelope, ShapeIndex};

pub use crate::ui::{
    overlay::{DetailOverlay, GrantTable, OverlayContent, OverlayState},
    tooltip::Tooltip,
};

pub use crate::traits::GeometrySource;

pub use crate::background::LoadOutcome;

#[cfg(feature = "tokio-runtime")]
pub use crate::background::loader::{
    FileGeometrySource, GeometryLoader, HttpGeometrySource, StaticGeometrySource,
};

pub use crate::{Error as MapError, Result};

pub use std::sync::Arc;

pub use fxhash::{FxHashMap as HashMap, FxHashSet as HashSet, FxHasher};

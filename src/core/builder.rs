//! Map view builder for fluent configuration
//!
//! [`MapViewBuilder`] collects configuration, the grant dataset and an
//! optional geometry source, then assembles a [`MapView`] and kicks off the
//! first load.

#[cfg(feature = "tokio-runtime")]
use crate::{
    background::{GeometryLoader, HttpGeometrySource},
    traits::GeometrySource,
};
use crate::{
    core::{
        config::{GlobalFilters, MapViewConfig},
        map::MapView,
    },
    data::{
        geojson::MapKind,
        grants::{GrantIndex, GrantRecord},
    },
    Result,
};
#[cfg(feature = "tokio-runtime")]
use std::sync::Arc;

/// Builder for creating and configuring MapView instances
pub struct MapViewBuilder {
    config: MapViewConfig,
    grants: GrantIndex,
    /// Request the initial map kind as part of `build`
    load_initial: bool,
    #[cfg(feature = "tokio-runtime")]
    source: Option<Arc<dyn GeometrySource>>,
    #[cfg(feature = "tokio-runtime")]
    runtime: Option<tokio::runtime::Handle>,
}

impl MapViewBuilder {
    /// Create a new MapViewBuilder with default settings
    pub fn new() -> Self {
        Self {
            config: MapViewConfig::default(),
            grants: GrantIndex::default(),
            load_initial: true,
            #[cfg(feature = "tokio-runtime")]
            source: None,
            #[cfg(feature = "tokio-runtime")]
            runtime: None,
        }
    }

    pub fn with_config(mut self, config: MapViewConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_canvas_size(mut self, width: f64, height: f64) -> Self {
        self.config.canvas.width = width;
        self.config.canvas.height = height;
        self
    }

    pub fn with_global_filters(mut self, filters: GlobalFilters) -> Self {
        self.config.filters = filters;
        self
    }

    pub fn with_initial_kind(mut self, kind: MapKind) -> Self {
        self.config.initial_kind = kind;
        self
    }

    pub fn with_grants(mut self, grants: GrantIndex) -> Self {
        self.grants = grants;
        self
    }

    pub fn with_grant_records(self, records: Vec<GrantRecord>) -> Self {
        self.with_grants(GrantIndex::new(records))
    }

    /// Skip requesting the initial map kind in `build`
    pub fn without_initial_load(mut self) -> Self {
        self.load_initial = false;
        self
    }

    #[cfg(feature = "tokio-runtime")]
    pub fn with_geometry_source(mut self, source: Arc<dyn GeometrySource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Fetch geometry from the configured source URLs
    #[cfg(feature = "tokio-runtime")]
    pub fn with_http_source(mut self) -> Self {
        self.source = Some(Arc::new(HttpGeometrySource::new(self.config.sources.clone())));
        self
    }

    /// Runtime for geometry loads; defaults to the one `build` is called from
    #[cfg(feature = "tokio-runtime")]
    pub fn with_runtime(mut self, handle: tokio::runtime::Handle) -> Self {
        self.runtime = Some(handle);
        self
    }

    /// Build the map view
    ///
    /// Fails only when a geometry source is set but no tokio runtime is available.
    pub fn build(mut self) -> Result<MapView> {
        let initial_kind = self.config.initial_kind;
        let config = std::mem::take(&mut self.config);
        let grants = std::mem::take(&mut self.grants);
        let mut view = self.attach_loader(MapView::new(config, grants))?;

        if self.load_initial {
            view.toggle_map_kind(initial_kind);
        }
        Ok(view)
    }

    #[cfg(feature = "tokio-runtime")]
    fn attach_loader(&mut self, view: MapView) -> Result<MapView> {
        let Some(source) = self.source.take() else {
            return Ok(view);
        };
        let loader = match self.runtime.take() {
            Some(handle) => GeometryLoader::new(source, handle),
            None => GeometryLoader::current(source)?,
        };
        Ok(view.with_loader(loader))
    }

    #[cfg(not(feature = "tokio-runtime"))]
    fn attach_loader(&mut self, view: MapView) -> Result<MapView> {
        Ok(view)
    }
}

impl Default for MapViewBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let view = MapViewBuilder::new()
            .with_canvas_size(800.0, 500.0)
            .with_global_filters(GlobalFilters::new("2023", "Research"))
            .with_grant_records(vec![GrantRecord::new("VA", 8, "2023")])
            .build()
            .unwrap();

        assert_eq!(view.config().canvas.width, 800.0);
        assert_eq!(view.global_filters().award_year, "2023");
        assert_eq!(view.grants().len(), 1);
        assert_eq!(view.requested_kind(), Some(MapKind::State));
        assert_eq!(view.render_context().width, 800.0);
    }

    #[test]
    fn test_without_initial_load() {
        let view = MapViewBuilder::new()
            .with_initial_kind(MapKind::District)
            .without_initial_load()
            .build()
            .unwrap();
        assert_eq!(view.requested_kind(), None);
    }

    #[cfg(feature = "tokio-runtime")]
    #[test]
    fn test_source_without_runtime_fails() {
        let result = MapViewBuilder::new().with_http_source().build();
        assert!(matches!(result, Err(crate::MapError::Load(_))));
    }
}

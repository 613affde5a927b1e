use crate::{
    data::geojson::{GeoCollection, GeoFeature},
    layers::store::GeometryStore,
    rendering::pipeline::{RenderPipeline, RenderStyle},
};

/// Derives the visible feature subset from the store's collection and filter text
#[derive(Debug, Clone, Default)]
pub struct FilterEngine {
    store: GeometryStore,
    /// Positions into the collection, in collection order
    view: Vec<usize>,
}

impl FilterEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(&self) -> &GeometryStore {
        &self.store
    }

    /// Installs a new collection and re-derives the view with the current filter
    pub fn set_collection(&mut self, collection: GeoCollection) -> Option<GeoCollection> {
        let previous = self.store.replace(collection);
        self.recompute();
        previous
    }

    /// Stores the lowercased text and recomputes the view. `""` shows everything.
    ///
    /// Returns the number of visible features.
    pub fn set_filter(&mut self, text: &str) -> usize {
        self.store.set_filter(text);
        self.recompute();
        log::debug!(
            "filter {:?} matches {} features",
            self.store.filter(),
            self.view.len()
        );
        self.view.len()
    }

    /// Visible features in collection order
    pub fn current_view(&self) -> Vec<&GeoFeature> {
        match self.store.collection() {
            Some(collection) => self.view.iter().map(|&i| &collection.features[i]).collect(),
            None => Vec::new(),
        }
    }

    /// Draws the current view with `style`
    pub fn render_into(&self, pipeline: &mut RenderPipeline, style: &RenderStyle) {
        pipeline.render(&self.current_view(), style);
    }

    fn recompute(&mut self) {
        let filter = self.store.filter();
        self.view = match self.store.collection() {
            Some(collection) => collection
                .features
                .iter()
                .enumerate()
                .filter(|(_, f)| filter.is_empty() || f.label().to_lowercase().contains(filter))
                .map(|(i, _)| i)
                .collect(),
            None => Vec::new(),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::geojson::{FeatureProperties, GeoGeometry, MapKind};

    fn feature(id: &str, name: Option<&str>) -> GeoFeature {
        let geometry = GeoGeometry::Polygon {
            coordinates: vec![vec![[-77.0, 38.0], [-76.0, 38.0], [-76.0, 39.0], [-77.0, 38.0]]],
        };
        GeoFeature::new(
            geometry,
            Some(FeatureProperties {
                id: Some(id.to_string()),
                name: name.map(str::to_string),
                ..Default::default()
            }),
        )
    }

    fn engine() -> FilterEngine {
        let mut engine = FilterEngine::new();
        engine.set_collection(GeoCollection::new(
            MapKind::State,
            vec![
                feature("VA", Some("Virginia")),
                feature("WV", Some("West Virginia")),
                feature("MD", Some("Maryland")),
                feature("XX-01", None),
            ],
        ));
        engine
    }

    fn labels(engine: &FilterEngine) -> Vec<&str> {
        engine.current_view().into_iter().map(|f| f.label()).collect()
    }

    #[test]
    fn test_empty_filter_is_identity() {
        let mut engine = engine();
        engine.set_filter("");
        assert_eq!(
            labels(&engine),
            vec!["Virginia", "West Virginia", "Maryland", "XX-01"]
        );
    }

    #[test]
    fn test_filter_is_case_insensitive_substring() {
        let mut engine = engine();
        assert_eq!(engine.set_filter("VIRG"), 2);
        assert_eq!(labels(&engine), vec!["Virginia", "West Virginia"]);

        // Falls back to the id when there is no name
        engine.set_filter("xx-");
        assert_eq!(labels(&engine), vec!["XX-01"]);

        engine.set_filter("nowhere");
        assert!(engine.current_view().is_empty());
    }

    #[test]
    fn test_filter_survives_collection_swap() {
        let mut engine = engine();
        engine.set_filter("land");
        engine.set_collection(GeoCollection::new(
            MapKind::District,
            vec![feature("MD-01", Some("Maryland 1")), feature("VA-01", Some("Virginia 1"))],
        ));
        assert_eq!(labels(&engine), vec!["Maryland 1"]);
        assert_eq!(engine.store().filter(), "land");
    }

    #[test]
    fn test_no_collection_yields_empty_view() {
        let mut engine = FilterEngine::new();
        assert_eq!(engine.set_filter("a"), 0);
        assert!(engine.current_view().is_empty());
    }
}

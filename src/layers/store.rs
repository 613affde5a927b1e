use crate::data::geojson::{GeoCollection, MapKind};

/// Holds the boundary collection currently on screen and the last-applied text filter
#[derive(Debug, Clone, Default)]
pub struct GeometryStore {
    collection: Option<GeoCollection>,
    filter: String,
}

impl GeometryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Swaps in a freshly loaded collection, returning the one it replaces
    pub fn replace(&mut self, collection: GeoCollection) -> Option<GeoCollection> {
        log::info!(
            "geometry store now holds {} collection ({} features)",
            collection.kind,
            collection.len()
        );
        self.collection.replace(collection)
    }

    pub fn collection(&self) -> Option<&GeoCollection> {
        self.collection.as_ref()
    }

    pub fn kind(&self) -> Option<MapKind> {
        self.collection.as_ref().map(|c| c.kind)
    }

    /// Lowercased filter text last applied
    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub(crate) fn set_filter(&mut self, text: &str) {
        self.filter = text.to_lowercase();
    }

    /// Drops the collection, keeping the filter text
    pub fn clear(&mut self) {
        self.collection = None;
    }
}

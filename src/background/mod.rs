#[cfg(feature = "tokio-runtime")]
pub mod loader;

use crate::{
    data::geojson::{GeoCollection, MapKind},
    Result,
};

#[cfg(feature = "tokio-runtime")]
pub use loader::{FileGeometrySource, GeometryLoader, HttpGeometrySource, StaticGeometrySource};

/// A finished geometry load, stamped with the generation of the request that started it
#[derive(Debug)]
pub struct LoadOutcome {
    pub generation: u64,
    pub kind: MapKind,
    pub result: Result<GeoCollection>,
}

impl LoadOutcome {
    pub fn new(generation: u64, kind: MapKind, result: Result<GeoCollection>) -> Self {
        Self {
            generation,
            kind,
            result,
        }
    }
}

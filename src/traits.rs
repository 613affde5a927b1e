//! Shared trait abstractions

use crate::{
    data::geojson::{GeoCollection, MapKind},
    Result,
};
use async_trait::async_trait;

/// Where boundary collections come from
///
/// Implementations fetch and parse one collection per call. They are shared
/// across loader tasks, so they must be `Send + Sync`.
#[async_trait]
pub trait GeometrySource: Send + Sync {
    async fn load(&self, kind: MapKind) -> Result<GeoCollection>;

    /// Short name for log lines
    fn describe(&self, kind: MapKind) -> String {
        format!("{} geometry", kind)
    }
}

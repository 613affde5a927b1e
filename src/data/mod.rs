pub mod conversion;
pub mod geojson;
pub mod grants;

pub use geojson::{FeatureProperties, GeoCollection, GeoFeature, GeoGeometry, MapKind};
pub use grants::{GrantIndex, GrantRecord};

use crate::core::{bounds::Bounds, geo::LatLng, projection::AlbersUsa};
use crate::data::conversion::{opt_string_or_number, planar_polygons, planar_rings};
use crate::prelude::FxHasher;
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// Which boundary collection a map shows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MapKind {
    #[default]
    State,
    District,
}

impl MapKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MapKind::State => "state",
            MapKind::District => "district",
        }
    }
}

impl std::fmt::Display for MapKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MapKind {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "state" => Ok(MapKind::State),
            "district" | "dma" => Ok(MapKind::District),
            other => Err(crate::Error::ParseError(format!("unknown map kind: {}", other))),
        }
    }
}

/// Boundary geometry. Only polygonal shapes are supported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GeoGeometry {
    Polygon {
        #[serde(deserialize_with = "planar_rings")]
        coordinates: Vec<Vec<[f64; 2]>>,
    },
    MultiPolygon {
        #[serde(deserialize_with = "planar_polygons")]
        coordinates: Vec<Vec<Vec<[f64; 2]>>>,
    },
}

impl GeoGeometry {
    /// Each polygon as its rings (exterior first, then holes)
    pub fn polygons(&self) -> Vec<&[Vec<[f64; 2]>]> {
        match self {
            GeoGeometry::Polygon { coordinates } => vec![coordinates.as_slice()],
            GeoGeometry::MultiPolygon { coordinates } => {
                coordinates.iter().map(|p| p.as_slice()).collect()
            }
        }
    }

    /// Every position in the geometry as a geographic coordinate
    pub fn positions(&self) -> impl Iterator<Item = LatLng> + '_ {
        self.polygons()
            .into_iter()
            .flat_map(|rings| rings.iter())
            .flat_map(|ring| ring.iter())
            .map(|position| LatLng::from_position(*position))
    }

    fn from_value(value: serde_json::Value) -> crate::Result<Self> {
        match value.get("type").and_then(|t| t.as_str()) {
            Some("Polygon") | Some("MultiPolygon") => Ok(serde_json::from_value(value)?),
            Some(other) => Err(crate::Error::InvalidGeometry(format!(
                "unsupported geometry type {}",
                other
            ))),
            None => Err(crate::Error::InvalidGeometry(
                "geometry without a type".to_string(),
            )),
        }
    }
}

/// Property bag attached to a boundary feature
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureProperties {
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "stateCd")]
    pub state_cd: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub district: Option<String>,
    #[serde(default)]
    pub fill: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// One geographic unit: boundary plus metadata
#[derive(Debug, Clone, PartialEq)]
pub struct GeoFeature {
    /// Feature-level GeoJSON id, when present
    pub id: Option<String>,
    pub geometry: GeoGeometry,
    pub properties: Option<FeatureProperties>,
    fill: Option<String>,
}

impl GeoFeature {
    pub fn new(geometry: GeoGeometry, properties: Option<FeatureProperties>) -> Self {
        Self {
            id: None,
            geometry,
            properties,
            fill: None,
        }
    }

    /// Identifier used for hashing and shape bookkeeping
    pub fn unit_id(&self) -> Option<&str> {
        self.properties
            .as_ref()
            .and_then(|p| p.id.as_deref())
            .or(self.id.as_deref())
    }

    /// Display label: `name`, then `id`, then the feature id
    pub fn label(&self) -> &str {
        self.properties
            .as_ref()
            .and_then(|p| p.name.as_deref())
            .or_else(|| self.unit_id())
            .unwrap_or("Unknown")
    }

    /// Fill resolved at load time, if any
    pub fn fill(&self) -> Option<&str> {
        self.fill.as_deref()
    }

    /// Features without a property bag cannot be selected or highlighted
    pub fn is_well_formed(&self) -> bool {
        self.properties.is_some()
    }

    /// Bounding box of this feature under the reference projection
    pub fn reference_bounds(&self, projection: &AlbersUsa) -> Option<Bounds> {
        let points: Vec<_> = self
            .geometry
            .positions()
            .map(|p| projection.project(&p))
            .filter(|p| p.is_finite())
            .collect();
        Bounds::from_points(&points)
    }
}

#[derive(Deserialize)]
struct RawCollection {
    #[serde(default)]
    features: Vec<RawFeature>,
}

#[derive(Deserialize)]
struct RawFeature {
    #[serde(default, deserialize_with = "opt_string_or_number")]
    id: Option<String>,
    #[serde(default)]
    geometry: Option<serde_json::Value>,
    #[serde(default)]
    properties: Option<FeatureProperties>,
}

/// Ordered boundary features of one map kind
#[derive(Debug, Clone, PartialEq)]
pub struct GeoCollection {
    pub kind: MapKind,
    pub features: Vec<GeoFeature>,
}

impl GeoCollection {
    pub fn new(kind: MapKind, features: Vec<GeoFeature>) -> Self {
        Self { kind, features }
    }

    /// Parses a `{"features": [...]}` document.
    ///
    /// Features whose geometry is missing or not polygonal are skipped with a warning.
    pub fn from_str(kind: MapKind, json: &str) -> crate::Result<Self> {
        let raw: RawCollection = serde_json::from_str(json)
            .map_err(|e| crate::Error::ParseError(format!("Invalid {} collection: {}", kind, e)))?;

        let mut features = Vec::with_capacity(raw.features.len());
        for (index, raw_feature) in raw.features.into_iter().enumerate() {
            let geometry = match raw_feature.geometry.map(GeoGeometry::from_value) {
                Some(Ok(geometry)) => geometry,
                Some(Err(e)) => {
                    log::warn!("skipping {} feature #{}: {}", kind, index, e);
                    continue;
                }
                None => {
                    log::warn!("skipping {} feature #{}: no geometry", kind, index);
                    continue;
                }
            };
            let mut feature = GeoFeature::new(geometry, raw_feature.properties);
            feature.id = raw_feature.id;
            features.push(feature);
        }

        log::info!("parsed {} collection with {} features", kind, features.len());
        Ok(Self::new(kind, features))
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, GeoFeature> {
        self.features.iter()
    }

    /// Assigns each feature a fill once: its `fill` property, else a palette
    /// entry chosen by hashing its id, else `default_fill`.
    pub fn resolve_fills(&mut self, palette: &[String], default_fill: &str) {
        for feature in &mut self.features {
            let override_fill = feature.properties.as_ref().and_then(|p| p.fill.clone());
            let fill = override_fill.unwrap_or_else(|| {
                match (palette.is_empty(), feature.unit_id()) {
                    (false, Some(id)) => palette[stable_hash(id) as usize % palette.len()].clone(),
                    _ => default_fill.to_string(),
                }
            });
            feature.fill = Some(fill);
        }
    }

    /// Union of every feature's reference-space bounding box
    pub fn reference_bounds(&self, projection: &AlbersUsa) -> Option<Bounds> {
        self.features
            .iter()
            .filter_map(|f| f.reference_bounds(projection))
            .reduce(|acc, b| acc.union(&b))
    }
}

fn stable_hash(key: &str) -> u64 {
    let mut hasher = FxHasher::default();
    key.hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r##"
    {
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": {"id": "VA-08", "name": "Virginia District 8", "stateCd": "VA", "district": "08"},
                "geometry": {"type": "Polygon", "coordinates": [[[-77.2, 38.7], [-77.0, 38.7], [-77.0, 38.9], [-77.2, 38.7]]]}
            },
            {
                "type": "Feature",
                "id": 51,
                "properties": {"id": 51, "fill": "#123456"},
                "geometry": {"type": "MultiPolygon", "coordinates": [[[[-80.0, 37.0], [-76.0, 37.0], [-76.0, 39.0], [-80.0, 37.0]]]]}
            },
            {
                "type": "Feature",
                "properties": {"id": "pin"},
                "geometry": {"type": "Point", "coordinates": [-77.0, 38.9]}
            },
            {
                "type": "Feature",
                "id": "orphan",
                "geometry": {"type": "Polygon", "coordinates": [[[-78.0, 38.0], [-77.5, 38.0], [-77.5, 38.5], [-78.0, 38.0]]]}
            }
        ]
    }
    "##;

    #[test]
    fn test_parse_skips_unsupported_geometry() {
        let collection = GeoCollection::from_str(MapKind::District, SAMPLE).unwrap();
        assert_eq!(collection.len(), 3);
        assert_eq!(collection.kind, MapKind::District);
    }

    #[test]
    fn test_labels_and_ids() {
        let collection = GeoCollection::from_str(MapKind::District, SAMPLE).unwrap();
        assert_eq!(collection.features[0].label(), "Virginia District 8");
        // Numeric ids are kept as strings
        assert_eq!(collection.features[1].label(), "51");
        let props = collection.features[0].properties.as_ref().unwrap();
        assert_eq!(props.district.as_deref(), Some("08"));
        assert_eq!(props.state_cd.as_deref(), Some("VA"));

        // No properties at all: falls back to the feature id
        let orphan = &collection.features[2];
        assert!(!orphan.is_well_formed());
        assert_eq!(orphan.label(), "orphan");
    }

    #[test]
    fn test_fill_resolution_is_stable() {
        let palette = vec!["#a".to_string(), "#b".to_string(), "#c".to_string()];
        let mut first = GeoCollection::from_str(MapKind::District, SAMPLE).unwrap();
        let mut second = first.clone();
        first.resolve_fills(&palette, "#ccc");
        second.resolve_fills(&palette, "#ccc");

        assert_eq!(first, second);
        assert!(palette.iter().any(|p| Some(p.as_str()) == first.features[0].fill()));
        // Explicit override wins
        assert_eq!(first.features[1].fill(), Some("#123456"));
    }

    #[test]
    fn test_fill_without_palette_uses_default() {
        let mut collection = GeoCollection::from_str(MapKind::State, SAMPLE).unwrap();
        collection.resolve_fills(&[], "#ccc");
        assert_eq!(collection.features[0].fill(), Some("#ccc"));
    }

    #[test]
    fn test_reference_bounds() {
        let collection = GeoCollection::from_str(MapKind::District, SAMPLE).unwrap();
        let bounds = collection.reference_bounds(&AlbersUsa::default()).unwrap();
        assert!(bounds.is_finite());
        assert!(bounds.width() > 0.0);

        let empty = GeoCollection::new(MapKind::State, Vec::new());
        assert!(empty.reference_bounds(&AlbersUsa::default()).is_none());
    }

    #[test]
    fn test_positions_with_altitude() {
        let json = r#"{"type": "FeatureCollection", "features": [{
            "type": "Feature",
            "properties": {"id": "WV"},
            "geometry": {"type": "Polygon", "coordinates": [[[-80.0, 37.0, 0.0], [-79.0, 37.0, 12.5], [-79.0, 38.0, 0.0], [-80.0, 37.0, 0.0]]]}
        }]}"#;
        let collection = GeoCollection::from_str(MapKind::State, json).unwrap();
        assert_eq!(collection.len(), 1);

        let positions: Vec<LatLng> = collection.features[0].geometry.positions().collect();
        assert_eq!(positions.len(), 4);
        assert_eq!(positions[1], LatLng::new(37.0, -79.0));
    }

    #[test]
    fn test_map_kind_parse() {
        assert_eq!("state".parse::<MapKind>().unwrap(), MapKind::State);
        assert_eq!("DMA".parse::<MapKind>().unwrap(), MapKind::District);
        assert!("county".parse::<MapKind>().is_err());
    }
}

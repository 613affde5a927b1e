//! Configuration for the map view
//!
//! Every section has a `Default` so a host can deserialize a partial JSON
//! document and only override what it cares about.

use crate::core::constants::{
    ALL_FUNDING_TYPES, CANVAS_HEIGHT, CANVAS_WIDTH, DEFAULT_AWARD_YEAR, DEFAULT_FILL,
    DEFAULT_STROKE, DISTRICT_MAP_URL, HIGHLIGHT_FILL, STATE_MAP_URL, TOOLTIP_OFFSET, TOOLTIP_SIZE,
};
use crate::data::geojson::MapKind;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MapViewConfig {
    pub canvas: CanvasConfig,
    pub style: StyleConfig,
    pub tooltip: TooltipConfig,
    pub sources: SourceConfig,
    pub filters: GlobalFilters,
    /// Map kind shown at startup
    pub initial_kind: MapKind,
}

impl MapViewConfig {
    pub fn from_json_str(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> crate::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    pub width: f64,
    pub height: f64,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: CANVAS_WIDTH,
            height: CANVAS_HEIGHT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    pub default_fill: String,
    pub stroke_color: String,
    pub highlight_color: String,
    /// Colours assigned to district features by hashing their id
    pub district_palette: Vec<String>,
}

impl StyleConfig {
    /// Palette for a map kind; state features use the default fill
    pub fn palette_for(&self, kind: MapKind) -> &[String] {
        match kind {
            MapKind::State => &[],
            MapKind::District => &self.district_palette,
        }
    }
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            default_fill: DEFAULT_FILL.to_string(),
            stroke_color: DEFAULT_STROKE.to_string(),
            highlight_color: HIGHLIGHT_FILL.to_string(),
            district_palette: [
                "#8dd3c7", "#ffffb3", "#bebada", "#fb8072", "#80b1d3", "#fdb462", "#b3de69",
                "#fccde5", "#d9d9d9", "#bc80bd", "#ccebc5", "#ffed6f",
            ]
            .iter()
            .map(|c| c.to_string())
            .collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TooltipConfig {
    pub offset_x: f64,
    pub offset_y: f64,
    pub width: f64,
    pub height: f64,
}

impl Default for TooltipConfig {
    fn default() -> Self {
        Self {
            offset_x: TOOLTIP_OFFSET.0,
            offset_y: TOOLTIP_OFFSET.1,
            width: TOOLTIP_SIZE.0,
            height: TOOLTIP_SIZE.1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub state_url: String,
    pub district_url: String,
}

impl SourceConfig {
    pub fn url_for(&self, kind: MapKind) -> &str {
        match kind {
            MapKind::State => &self.state_url,
            MapKind::District => &self.district_url,
        }
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            state_url: STATE_MAP_URL.to_string(),
            district_url: DISTRICT_MAP_URL.to_string(),
        }
    }
}

/// Fiscal year and funding type every drill-down is scoped to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalFilters {
    pub award_year: String,
    pub funding_type: String,
}

impl GlobalFilters {
    pub fn new(award_year: impl Into<String>, funding_type: impl Into<String>) -> Self {
        Self {
            award_year: award_year.into(),
            funding_type: funding_type.into(),
        }
    }
}

impl Default for GlobalFilters {
    fn default() -> Self {
        Self::new(DEFAULT_AWARD_YEAR, ALL_FUNDING_TYPES)
    }
}

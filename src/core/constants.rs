//! Core constants for the choropleth view.
//! Keeping them in a single place makes it easier to tweak engine-wide magic numbers.

/// Default canvas width in pixels.
pub const CANVAS_WIDTH: f64 = 960.0;

/// Default canvas height in pixels.
pub const CANVAS_HEIGHT: f64 = 600.0;

/// Fraction of the canvas a fitted collection may occupy (5% margin).
pub const FIT_MARGIN: f64 = 0.95;

/// Smallest extent ratio used when fitting, so a zero-area box never divides by zero.
pub const MIN_EXTENT_RATIO: f64 = 1e-9;

/// Scale used when a collection has no usable bounds at all.
/// Matches the stock Albers USA scale for a 960×600 canvas.
pub const DEFAULT_SCALE: f64 = 1070.0;

/// Fill for features without an override or palette entry.
pub const DEFAULT_FILL: &str = "#ccc";

/// Outline colour for every drawn feature.
pub const DEFAULT_STROKE: &str = "#333";

/// Transient fill while the pointer is over a feature.
pub const HIGHLIGHT_FILL: &str = "orange";

/// Tooltip anchor offset from the pointer, in page pixels.
pub const TOOLTIP_OFFSET: (f64, f64) = (10.0, -20.0);

/// Assumed tooltip box size used for viewport clamping.
pub const TOOLTIP_SIZE: (f64, f64) = (160.0, 28.0);

/// Funding-type sentinel meaning "no funding-type filter".
pub const ALL_FUNDING_TYPES: &str = "All";

/// Fiscal year selected when nothing else is configured.
pub const DEFAULT_AWARD_YEAR: &str = "2024";

/// Remote boundary collection for the state-level map.
pub const STATE_MAP_URL: &str = "https://rcpope.github.io/map-resources/congressional_map.geojson";

/// Remote boundary collection for the district-level map.
pub const DISTRICT_MAP_URL: &str = "https://rcpope.github.io/map-resources/neilson_map.geojson";

/// Class attribute given to drawn feature shapes.
pub const FEATURE_CLASS: &str = "map-feature";

//! Coordinate types
//!
//! [`LatLng`] is a geographic position as read from GeoJSON. [`Point`] is
//! anything planar: reference-projection units, canvas pixels or page
//! pixels, depending on who holds it.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// GeoJSON positions are `[lng, lat]`; any altitude was dropped when parsing
    pub fn from_position(position: [f64; 2]) -> Self {
        Self::new(position[1], position[0])
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// False for points that fell outside every projection inset
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<Point> for geo_types::Coord<f64> {
    fn from(point: Point) -> Self {
        geo_types::Coord {
            x: point.x,
            y: point.y,
        }
    }
}

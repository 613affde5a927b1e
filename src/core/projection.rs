//! Unscaled reference projection for U.S. boundary collections.
//!
//! The composite Albers USA projection draws the lower 48 states with a conic
//! equal-area projection and places Alaska and Hawaii as insets below it. It is
//! evaluated at unit scale with no translation; the [`ViewportTransform`] fitted
//! to a collection supplies the scale and translate that put it on the canvas.
//!
//! [`ViewportTransform`]: crate::core::viewport::ViewportTransform

use crate::core::geo::{LatLng, Point};

/// Conic equal-area projection around a rotated central meridian
#[derive(Debug, Clone, PartialEq)]
pub struct ConicEqualArea {
    n: f64,
    c: f64,
    r0: f64,
    /// Degrees added to longitude before projecting
    rotate: f64,
    /// Projected position of the configured centre, subtracted from every point
    origin: Point,
    /// Inset scale relative to the lower-48 projection
    scale: f64,
    /// Inset offset in unit-scale screen space
    offset: Point,
}

impl ConicEqualArea {
    /// Builds the projection from standard parallels, rotation and centre (all in degrees)
    pub fn new(parallels: (f64, f64), rotate: f64, center: (f64, f64)) -> Self {
        let sy0 = parallels.0.to_radians().sin();
        let n = (sy0 + parallels.1.to_radians().sin()) / 2.0;
        let c = 1.0 + sy0 * (2.0 * n - sy0);
        let r0 = c.sqrt() / n;

        let mut projection = Self {
            n,
            c,
            r0,
            rotate,
            origin: Point::default(),
            scale: 1.0,
            offset: Point::default(),
        };
        // The centre is given in the rotated frame
        projection.origin = projection.raw(center.0.to_radians(), center.1.to_radians());
        projection
    }

    /// Places this projection as an inset: `scale` relative to the main map, then shifted by `offset`
    pub fn with_inset(mut self, scale: f64, offset: Point) -> Self {
        self.scale = scale;
        self.offset = offset;
        self
    }

    fn raw(&self, lambda: f64, phi: f64) -> Point {
        // Clamp keeps the root real for points far outside the parallels
        let r = (self.c - 2.0 * self.n * phi.sin()).max(0.0).sqrt() / self.n;
        let x = lambda * self.n;
        Point::new(r * x.sin(), self.r0 - r * x.cos())
    }

    /// Projects a coordinate into unit-scale screen space (y grows downward)
    pub fn project(&self, lat_lng: &LatLng) -> Point {
        let lambda = wrap_degrees(lat_lng.lng + self.rotate).to_radians();
        let phi = lat_lng.lat.to_radians();
        let p = self.raw(lambda, phi);
        Point::new(
            (p.x - self.origin.x) * self.scale + self.offset.x,
            -(p.y - self.origin.y) * self.scale + self.offset.y,
        )
    }
}

fn wrap_degrees(degrees: f64) -> f64 {
    let wrapped = (degrees + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped == -180.0 && degrees > 0.0 {
        180.0
    } else {
        wrapped
    }
}

/// Composite projection: lower 48 plus Alaska and Hawaii insets
#[derive(Debug, Clone, PartialEq)]
pub struct AlbersUsa {
    lower48: ConicEqualArea,
    alaska: ConicEqualArea,
    hawaii: ConicEqualArea,
}

impl AlbersUsa {
    pub fn new() -> Self {
        Self {
            lower48: ConicEqualArea::new((29.5, 45.5), 96.0, (-0.6, 38.7)),
            alaska: ConicEqualArea::new((55.0, 65.0), 154.0, (-2.0, 58.5))
                .with_inset(0.35, Point::new(-0.307, 0.201)),
            hawaii: ConicEqualArea::new((8.0, 18.0), 157.0, (-3.0, 19.9))
                .with_inset(1.0, Point::new(-0.205, 0.212)),
        }
    }

    /// Projects a coordinate to unit-scale reference space
    pub fn project(&self, lat_lng: &LatLng) -> Point {
        self.region_for(lat_lng).project(lat_lng)
    }

    fn region_for(&self, lat_lng: &LatLng) -> &ConicEqualArea {
        let (lat, lng) = (lat_lng.lat, lat_lng.lng);
        // The Aleutians cross the antimeridian
        if lat >= 50.0 && (lng <= -129.0 || lng >= 170.0) {
            &self.alaska
        } else if lat < 30.0 && lng <= -150.0 {
            &self.hawaii
        } else {
            &self.lower48
        }
    }
}

impl Default for AlbersUsa {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_projects_to_origin() {
        let projection = AlbersUsa::new();
        // Centre is (-0.6, 38.7) in the frame rotated by 96°
        let p = projection.project(&LatLng::new(38.7, -96.6));
        assert!(p.x.abs() < 1e-9);
        assert!(p.y.abs() < 1e-9);
    }

    #[test]
    fn test_orientation() {
        let projection = AlbersUsa::new();
        let seattle = projection.project(&LatLng::new(47.6, -122.3));
        let miami = projection.project(&LatLng::new(25.8, -80.2));

        // West is left, north is up (smaller y)
        assert!(seattle.x < miami.x);
        assert!(seattle.y < miami.y);
    }

    #[test]
    fn test_insets_sit_below_lower48() {
        let projection = AlbersUsa::new();
        let anchorage = projection.project(&LatLng::new(61.2, -149.9));
        let honolulu = projection.project(&LatLng::new(21.3, -157.9));
        let kansas = projection.project(&LatLng::new(38.5, -98.0));

        assert!(anchorage.y > kansas.y);
        assert!(honolulu.y > kansas.y);
        assert!(anchorage.x < kansas.x);
        assert!(honolulu.x < kansas.x);
        assert!(anchorage.is_finite() && honolulu.is_finite());
    }

    #[test]
    fn test_wrap_degrees() {
        assert_eq!(wrap_degrees(190.0), -170.0);
        assert_eq!(wrap_degrees(-190.0), 170.0);
        assert_eq!(wrap_degrees(45.0), 45.0);
    }
}

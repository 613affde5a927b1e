use crate::core::{
    bounds::Bounds,
    constants::{DEFAULT_SCALE, FIT_MARGIN, MIN_EXTENT_RATIO},
    geo::{LatLng, Point},
    projection::AlbersUsa,
};
use crate::data::geojson::GeoCollection;
use serde::{Deserialize, Serialize};

/// Scale and translation that place the unit-scale reference projection on the canvas
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportTransform {
    pub scale: f64,
    pub translate_x: f64,
    pub translate_y: f64,
}

impl ViewportTransform {
    pub fn new(scale: f64, translate_x: f64, translate_y: f64) -> Self {
        Self {
            scale,
            translate_x,
            translate_y,
        }
    }

    /// Default-scale transform centred on the canvas
    pub fn centered(canvas_w: f64, canvas_h: f64) -> Self {
        let (w, h) = sanitize_canvas(canvas_w, canvas_h);
        Self::new(DEFAULT_SCALE * (w / 960.0).min(h / 600.0), w / 2.0, h / 2.0)
    }

    /// Fits a whole collection inside the canvas using the reference projection
    pub fn fit(collection: &GeoCollection, canvas_w: f64, canvas_h: f64) -> Self {
        Self::fit_with(collection, &AlbersUsa::default(), canvas_w, canvas_h)
    }

    /// Like [`fit`](Self::fit) with an explicit reference projection
    pub fn fit_with(
        collection: &GeoCollection,
        projection: &AlbersUsa,
        canvas_w: f64,
        canvas_h: f64,
    ) -> Self {
        let bounds = collection.reference_bounds(projection);
        let transform = Self::fit_bounds(bounds.as_ref(), canvas_w, canvas_h);
        log::debug!(
            "fit {} collection ({} features): scale={:.3} translate=({:.3}, {:.3})",
            collection.kind,
            collection.len(),
            transform.scale,
            transform.translate_x,
            transform.translate_y
        );
        transform
    }

    /// Fits reference-space bounds inside the canvas with a 5% margin.
    ///
    /// Empty, non-finite or zero-area bounds fall back to the default scale,
    /// so the result is always finite.
    pub fn fit_bounds(bounds: Option<&Bounds>, canvas_w: f64, canvas_h: f64) -> Self {
        let (w, h) = sanitize_canvas(canvas_w, canvas_h);

        let Some(bounds) = bounds.filter(|b| b.is_finite()) else {
            return Self::centered(w, h);
        };

        let center = bounds.center();
        let ratio = (bounds.width() / w).max(bounds.height() / h);
        let scale = if ratio > MIN_EXTENT_RATIO {
            FIT_MARGIN / ratio
        } else {
            Self::centered(w, h).scale
        };

        Self::new(scale, w / 2.0 - scale * center.x, h / 2.0 - scale * center.y)
    }

    /// Maps a reference-space point to canvas pixels
    pub fn apply(&self, point: &Point) -> Point {
        Point::new(
            self.scale * point.x + self.translate_x,
            self.scale * point.y + self.translate_y,
        )
    }

    /// Maps a canvas pixel back to reference space
    pub fn invert(&self, pixel: &Point) -> Point {
        Point::new(
            (pixel.x - self.translate_x) / self.scale,
            (pixel.y - self.translate_y) / self.scale,
        )
    }

    /// Projects a geographic coordinate straight to canvas pixels
    pub fn project(&self, projection: &AlbersUsa, lat_lng: &LatLng) -> Point {
        self.apply(&projection.project(lat_lng))
    }

    pub fn is_finite(&self) -> bool {
        self.scale.is_finite() && self.translate_x.is_finite() && self.translate_y.is_finite()
    }
}

impl Default for ViewportTransform {
    fn default() -> Self {
        Self::centered(
            crate::core::constants::CANVAS_WIDTH,
            crate::core::constants::CANVAS_HEIGHT,
        )
    }
}

fn sanitize_canvas(canvas_w: f64, canvas_h: f64) -> (f64, f64) {
    let clamp = |v: f64| if v.is_finite() && v >= 1.0 { v } else { 1.0 };
    (clamp(canvas_w), clamp(canvas_h))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_bounds_fills_canvas_with_margin() {
        let bounds = Bounds::from_coords(-1.0, -0.5, 1.0, 0.5);
        let t = ViewportTransform::fit_bounds(Some(&bounds), 960.0, 600.0);

        // Width is the limiting side: 2 units -> 0.95 * 960 px
        assert!((t.scale - 0.95 * 480.0).abs() < 1e-9);
        let left = t.apply(&bounds.min);
        let right = t.apply(&bounds.max);
        assert!((right.x - left.x - 0.95 * 960.0).abs() < 1e-6);
        assert!(((left.x + right.x) / 2.0 - 480.0).abs() < 1e-9);
        assert!(((left.y + right.y) / 2.0 - 300.0).abs() < 1e-9);
    }

    #[test]
    fn test_fit_bounds_height_limited() {
        let bounds = Bounds::from_coords(0.0, 0.0, 1.0, 2.0);
        let t = ViewportTransform::fit_bounds(Some(&bounds), 960.0, 600.0);
        assert!((t.scale - 0.95 * 300.0).abs() < 1e-9);
    }

    #[test]
    fn test_degenerate_bounds_stay_finite() {
        let point = Bounds::from_coords(0.2, 0.1, 0.2, 0.1);
        let t = ViewportTransform::fit_bounds(Some(&point), 960.0, 600.0);
        assert!(t.is_finite());
        assert!(t.scale > 0.0);
        // The single point lands in the canvas centre
        let p = t.apply(&Point::new(0.2, 0.1));
        assert!((p.x - 480.0).abs() < 1e-9 && (p.y - 300.0).abs() < 1e-9);

        assert!(ViewportTransform::fit_bounds(None, 960.0, 600.0).is_finite());
        let inverted = Bounds::from_coords(1.0, 0.0, 0.0, 1.0);
        assert!(ViewportTransform::fit_bounds(Some(&inverted), 960.0, 600.0).is_finite());
        assert!(ViewportTransform::fit_bounds(Some(&point), 0.0, f64::NAN).is_finite());
    }

    #[test]
    fn test_apply_invert_roundtrip() {
        let t = ViewportTransform::new(500.0, 480.0, 250.0);
        let p = Point::new(0.12, -0.07);
        let back = t.invert(&t.apply(&p));
        assert!((back.x - p.x).abs() < 1e-12);
        assert!((back.y - p.y).abs() < 1e-12);
    }
}

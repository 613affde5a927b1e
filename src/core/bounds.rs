use crate::core::geo::Point;
use rstar::AABB;

/// Axis-aligned box in reference-projection or canvas space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Point,
    pub max: Point,
}

impl Bounds {
    pub fn from_coords(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min: Point::new(min_x, min_y),
            max: Point::new(max_x, max_y),
        }
    }

    /// Box around every finite point; `None` if there is none
    pub fn from_points<'a, I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Point>,
    {
        points
            .into_iter()
            .filter(|p| p.is_finite())
            .fold(None, |acc: Option<Bounds>, p| {
                let point = Self::from_coords(p.x, p.y, p.x, p.y);
                Some(match acc {
                    Some(bounds) => bounds.union(&point),
                    None => point,
                })
            })
    }

    /// Smallest box covering both
    pub fn union(&self, other: &Bounds) -> Bounds {
        Self::from_coords(
            self.min.x.min(other.min.x),
            self.min.y.min(other.min.y),
            self.max.x.max(other.max.x),
            self.max.y.max(other.max.y),
        )
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    pub fn center(&self) -> Point {
        Point::new(
            (self.min.x + self.max.x) / 2.0,
            (self.min.y + self.max.y) / 2.0,
        )
    }

    /// Edges count as inside
    pub fn contains(&self, point: &Point) -> bool {
        (self.min.x..=self.max.x).contains(&point.x) && (self.min.y..=self.max.y).contains(&point.y)
    }

    /// Finite corners with `min <= max`; zero-area boxes qualify
    pub fn is_finite(&self) -> bool {
        self.min.is_finite()
            && self.max.is_finite()
            && self.min.x <= self.max.x
            && self.min.y <= self.max.y
    }

    /// R-tree envelope for this box
    pub fn to_aabb(&self) -> AABB<[f64; 2]> {
        AABB::from_corners([self.min.x, self.min.y], [self.max.x, self.max.y])
    }
}

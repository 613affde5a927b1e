use crate::core::{bounds::Bounds, geo::Point};

use rstar::{PointDistance, RTree, RTreeObject, AABB};

/// Canvas bounding box of one drawn shape
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeEnvelope {
    /// Position in the draw queue; later shapes paint over earlier ones
    pub shape: usize,
    pub bounds: Bounds,
}

impl ShapeEnvelope {
    pub fn new(shape: usize, bounds: Bounds) -> Self {
        Self { shape, bounds }
    }
}

impl RTreeObject for ShapeEnvelope {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.bounds.to_aabb()
    }
}

impl PointDistance for ShapeEnvelope {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        self.envelope().distance_2(point)
    }

    fn contains_point(&self, point: &[f64; 2]) -> bool {
        self.bounds.contains(&Point::new(point[0], point[1]))
    }
}

/// R-tree over the shapes of one frame. Rebuilt on every redraw.
#[derive(Debug, Default)]
pub struct ShapeIndex {
    tree: RTree<ShapeEnvelope>,
}

impl ShapeIndex {
    pub fn new(envelopes: Vec<ShapeEnvelope>) -> Self {
        Self {
            tree: RTree::bulk_load(envelopes),
        }
    }

    /// Shapes whose box contains `point`, topmost first
    pub fn candidates_at(&self, point: &Point) -> Vec<usize> {
        let mut shapes: Vec<usize> = self
            .tree
            .locate_all_at_point(&[point.x, point.y])
            .map(|e| e.shape)
            .collect();
        shapes.sort_unstable_by(|a, b| b.cmp(a));
        shapes
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}

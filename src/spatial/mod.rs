pub mod index;

pub use index::{ShapeEnvelope, ShapeIndex};

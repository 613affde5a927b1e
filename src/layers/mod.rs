pub mod filter;
pub mod store;

pub use filter::FilterEngine;
pub use store::GeometryStore;

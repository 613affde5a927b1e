pub mod context;
pub mod pipeline;
pub mod svg;

// Re-export main types
pub use context::{DrawCommand, PolygonRenderStyle, RenderContext};
pub use pipeline::{FillRule, InteractionHooks, RenderPipeline, RenderStyle};
pub use svg::to_svg;

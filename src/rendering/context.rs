use crate::core::{bounds::Bounds, geo::Point};

/// Resolved paint for one drawn shape
#[derive(Debug, Clone, PartialEq)]
pub struct PolygonRenderStyle {
    pub class_name: String,
    pub fill: String,
    pub stroke: String,
    /// Fill recorded at draw time; hover-out restores it
    pub original_fill: String,
}

/// Commands that can be issued to the render context
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// One feature: every ring of every polygon, in canvas pixels
    Polygon {
        shape: usize,
        unit_id: Option<String>,
        rings: Vec<Vec<Point>>,
        style: PolygonRenderStyle,
    },
}

impl DrawCommand {
    pub fn shape(&self) -> usize {
        match self {
            DrawCommand::Polygon { shape, .. } => *shape,
        }
    }

    pub fn style(&self) -> &PolygonRenderStyle {
        match self {
            DrawCommand::Polygon { style, .. } => style,
        }
    }

    /// Canvas-space bounding box of the command's outline
    pub fn bounds(&self) -> Option<Bounds> {
        match self {
            DrawCommand::Polygon { rings, .. } => Bounds::from_points(rings.iter().flatten()),
        }
    }
}

/// Retained draw output for one canvas
///
/// The queue is the whole picture: hosts paint it as-is and the pipeline
/// rewrites it on every render.
#[derive(Debug, Clone)]
pub struct RenderContext {
    pub width: f64,
    pub height: f64,
    pub drawing_queue: Vec<DrawCommand>,
}

impl RenderContext {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            drawing_queue: Vec::new(),
        }
    }

    /// Begin a frame
    pub fn begin_frame(&mut self) {
        self.drawing_queue.clear();
    }

    /// Queue a feature outline, returning its shape number
    pub fn render_polygon(
        &mut self,
        unit_id: Option<String>,
        rings: Vec<Vec<Point>>,
        style: PolygonRenderStyle,
    ) -> usize {
        let shape = self.drawing_queue.len();
        self.drawing_queue.push(DrawCommand::Polygon {
            shape,
            unit_id,
            rings,
            style,
        });
        shape
    }

    /// Get the current drawing queue
    pub fn get_drawing_queue(&self) -> &[DrawCommand] {
        &self.drawing_queue
    }

    pub fn command(&self, shape: usize) -> Option<&DrawCommand> {
        self.drawing_queue.get(shape)
    }

    /// Repaints one queued shape. Returns false if the shape is gone.
    pub fn set_fill(&mut self, shape: usize, fill: &str) -> bool {
        match self.drawing_queue.get_mut(shape) {
            Some(DrawCommand::Polygon { style, .. }) => {
                style.fill = fill.to_string();
                true
            }
            None => false,
        }
    }

    /// Puts a shape back to the fill it was drawn with
    pub fn restore_fill(&mut self, shape: usize) -> bool {
        match self.drawing_queue.get_mut(shape) {
            Some(DrawCommand::Polygon { style, .. }) => {
                style.fill = style.original_fill.clone();
                true
            }
            None => false,
        }
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
    }

    pub fn len(&self) -> usize {
        self.drawing_queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drawing_queue.is_empty()
    }
}

impl Default for RenderContext {
    fn default() -> Self {
        Self::new(
            crate::core::constants::CANVAS_WIDTH,
            crate::core::constants::CANVAS_HEIGHT,
        )
    }
}

use crate::core::{config::TooltipConfig, geo::Point};

/// Hover label that follows the pointer in page coordinates
#[derive(Debug, Clone, PartialEq)]
pub struct Tooltip {
    pub content: String,
    pub visible: bool,
    /// Top-left corner in page coordinates
    pub position: Point,
    pub config: TooltipConfig,
}

impl Tooltip {
    pub fn new(config: TooltipConfig) -> Self {
        Self {
            content: String::new(),
            visible: false,
            position: Point::default(),
            config,
        }
    }

    /// Shows `content` offset from the pointer, kept inside `viewport`
    pub fn show_at(&mut self, content: impl Into<String>, page: Point, viewport: Point) {
        self.content = content.into();
        self.position = self.place(page, viewport);
        self.visible = true;
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Pointer offset, clamped so the right/bottom edges stay in the viewport
    pub fn place(&self, page: Point, viewport: Point) -> Point {
        let max_x = (viewport.x - self.config.width).max(0.0);
        let max_y = (viewport.y - self.config.height).max(0.0);
        Point::new(
            (page.x + self.config.offset_x).min(max_x).max(0.0),
            (page.y + self.config.offset_y).min(max_y).max(0.0),
        )
    }
}

impl Default for Tooltip {
    fn default() -> Self {
        Self::new(TooltipConfig::default())
    }
}

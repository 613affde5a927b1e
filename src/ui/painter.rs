//! egui rendering for the draw queue, tooltip and overlay

use crate::{
    rendering::context::{DrawCommand, RenderContext},
    ui::{overlay::DetailOverlay, tooltip::Tooltip},
};
use egui::{Color32, FontId, Pos2, Rect, Stroke, Vec2};

/// Parses `#rgb`, `#rrggbb` and a handful of CSS colour names
pub fn parse_css_color(text: &str) -> Option<Color32> {
    let text = text.trim();
    if let Some(hex) = text.strip_prefix('#') {
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        let channel = |s: &str| u8::from_str_radix(s, 16).ok();
        return match hex.len() {
            3 => {
                let mut rgb = hex.chars().map(|c| channel(&c.to_string()).map(|v| v * 17));
                Some(Color32::from_rgb(rgb.next()??, rgb.next()??, rgb.next()??))
            }
            6 => Some(Color32::from_rgb(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
            )),
            _ => None,
        };
    }
    match text.to_ascii_lowercase().as_str() {
        "orange" => Some(Color32::from_rgb(255, 165, 0)),
        "black" => Some(Color32::BLACK),
        "white" => Some(Color32::WHITE),
        "gray" | "grey" => Some(Color32::from_rgb(128, 128, 128)),
        "red" => Some(Color32::from_rgb(255, 0, 0)),
        "green" => Some(Color32::from_rgb(0, 128, 0)),
        "blue" => Some(Color32::from_rgb(0, 0, 255)),
        "yellow" => Some(Color32::from_rgb(255, 255, 0)),
        "steelblue" => Some(Color32::from_rgb(70, 130, 180)),
        _ => None,
    }
}

/// Paints every queued shape with its canvas origin at `origin`.
///
/// egui fills paths as convex shapes, so deeply concave outlines fill
/// approximately; outlines are always exact.
pub fn paint_context(painter: &egui::Painter, origin: Pos2, context: &RenderContext) {
    let to_screen = |p: &crate::core::geo::Point| origin + Vec2::new(p.x as f32, p.y as f32);
    for command in context.get_drawing_queue() {
        let DrawCommand::Polygon { rings, style, .. } = command;
        let fill = parse_css_color(&style.fill).unwrap_or(Color32::LIGHT_GRAY);
        let stroke = Stroke::new(
            0.5,
            parse_css_color(&style.stroke).unwrap_or(Color32::DARK_GRAY),
        );
        for (i, ring) in rings.iter().enumerate() {
            let points: Vec<Pos2> = ring.iter().map(to_screen).collect();
            if points.len() < 3 {
                continue;
            }
            // First ring of each polygon carries the fill; holes are outlined only
            let ring_fill = if i == 0 { fill } else { Color32::TRANSPARENT };
            painter.add(egui::Shape::Path(egui::epaint::PathShape {
                points,
                closed: true,
                fill: ring_fill,
                stroke: stroke.into(),
            }));
        }
    }
}

/// Paints the tooltip at its page position, relative to `page_origin`
pub fn paint_tooltip(painter: &egui::Painter, page_origin: Pos2, tooltip: &Tooltip) {
    if !tooltip.is_visible() {
        return;
    }
    let min = page_origin + Vec2::new(tooltip.position.x as f32, tooltip.position.y as f32);
    let rect = Rect::from_min_size(
        min,
        Vec2::new(tooltip.config.width as f32, tooltip.config.height as f32),
    );
    painter.rect_filled(rect, 4.0, Color32::from_rgba_unmultiplied(255, 255, 255, 230));
    painter.rect_stroke(rect, 4.0, Stroke::new(1.0, Color32::GRAY));
    painter.text(
        rect.left_center() + Vec2::new(6.0, 0.0),
        egui::Align2::LEFT_CENTER,
        &tooltip.content,
        FontId::proportional(13.0),
        Color32::BLACK,
    );
}

/// Shows the overlay window when visible. Returns true if the user closed it.
pub fn show_overlay(ctx: &egui::Context, overlay: &DetailOverlay) -> bool {
    let Some(content) = overlay.content().filter(|_| overlay.is_visible()) else {
        return false;
    };

    let mut close = false;
    egui::Window::new("Grant details")
        .collapsible(false)
        .resizable(true)
        .anchor(egui::Align2::CENTER_CENTER, Vec2::ZERO)
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading(&content.header);
                if ui.button("×").on_hover_text("Close").clicked() {
                    close = true;
                }
            });
            ui.separator();

            if content.table.is_empty() {
                ui.label("No grants match this selection.");
            } else {
                egui::ScrollArea::both().max_height(400.0).show(ui, |ui| {
                    egui::Grid::new("grant-table")
                        .striped(true)
                        .show(ui, |ui| {
                            for header in &content.table.headers {
                                ui.strong(header);
                            }
                            ui.end_row();
                            for row in &content.table.rows {
                                for value in row {
                                    ui.label(value);
                                }
                                ui.end_row();
                            }
                        });
                });
            }

            if ui.button("Close").clicked() {
                close = true;
            }
        });
    close
}

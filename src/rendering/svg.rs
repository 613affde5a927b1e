//! SVG export of a render context
//!
//! Produces one `<path>` per queued shape inside a single `map-group`,
//! carrying the shape's class, current fill, stroke and the fill it was
//! drawn with as `data-original-fill`.

use crate::rendering::context::{DrawCommand, RenderContext};
use std::fmt::Write;

/// Serializes the queued shapes as a standalone SVG document
pub fn to_svg(context: &RenderContext) -> String {
    let mut out = String::new();
    let _ = write!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}"><g class="map-group">"#,
        context.width, context.height
    );
    for command in context.get_drawing_queue() {
        let DrawCommand::Polygon {
            unit_id,
            rings,
            style,
            ..
        } = command;
        let _ = write!(
            out,
            r#"<path class="{}" d="{}" fill="{}" stroke="{}" data-original-fill="{}""#,
            escape_markup(&style.class_name),
            path_data(rings),
            escape_markup(&style.fill),
            escape_markup(&style.stroke),
            escape_markup(&style.original_fill),
        );
        if let Some(id) = unit_id {
            let _ = write!(out, r#" data-id="{}""#, escape_markup(id));
        }
        out.push_str("/>");
    }
    out.push_str("</g></svg>");
    out
}

/// `M x,y L x,y ... Z` for each ring, two decimals
pub fn path_data(rings: &[Vec<crate::core::geo::Point>]) -> String {
    let mut d = String::new();
    for ring in rings {
        for (i, p) in ring.iter().enumerate() {
            let _ = write!(d, "{}{:.2},{:.2}", if i == 0 { "M" } else { "L" }, p.x, p.y);
        }
        if !ring.is_empty() {
            d.push('Z');
        }
    }
    d
}

/// Escapes text for use in markup content and quoted attributes
pub fn escape_markup(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

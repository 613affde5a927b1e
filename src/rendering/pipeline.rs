use crate::{
    core::{
        bounds::Bounds,
        config::StyleConfig,
        constants::FEATURE_CLASS,
        geo::{LatLng, Point},
        projection::AlbersUsa,
        viewport::ViewportTransform,
    },
    data::geojson::{GeoCollection, GeoFeature},
    rendering::context::{PolygonRenderStyle, RenderContext},
    spatial::index::{ShapeEnvelope, ShapeIndex},
};
use geo::Contains;
use geo_types::{LineString, MultiPolygon, Polygon};
use std::fmt;

/// Called when the pointer (or keyboard focus) enters a shape, with the page position
pub type HoverHook = Box<dyn Fn(&GeoFeature, Point)>;
/// Called with the feature a shape was drawn for
pub type FeatureHook = Box<dyn Fn(&GeoFeature)>;

/// Named callbacks the pipeline fires for drawn shapes
#[derive(Default)]
pub struct InteractionHooks {
    pub on_hover: Option<HoverHook>,
    pub on_unhover: Option<FeatureHook>,
    pub on_select: Option<FeatureHook>,
}

impl InteractionHooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_hover(mut self, hook: impl Fn(&GeoFeature, Point) + 'static) -> Self {
        self.on_hover = Some(Box::new(hook));
        self
    }

    pub fn on_unhover(mut self, hook: impl Fn(&GeoFeature) + 'static) -> Self {
        self.on_unhover = Some(Box::new(hook));
        self
    }

    pub fn on_select(mut self, hook: impl Fn(&GeoFeature) + 'static) -> Self {
        self.on_select = Some(Box::new(hook));
        self
    }

    fn hover(&self, feature: &GeoFeature, page: Point) {
        if let Some(hook) = &self.on_hover {
            hook(feature, page);
        }
    }

    fn unhover(&self, feature: &GeoFeature) {
        if let Some(hook) = &self.on_unhover {
            hook(feature);
        }
    }

    fn select(&self, feature: &GeoFeature) {
        if let Some(hook) = &self.on_select {
            hook(feature);
        }
    }
}

impl fmt::Debug for InteractionHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InteractionHooks")
            .field("on_hover", &self.on_hover.is_some())
            .field("on_unhover", &self.on_unhover.is_some())
            .field("on_select", &self.on_select.is_some())
            .finish()
    }
}

/// How a shape's fill is chosen at draw time
#[derive(Default)]
pub enum FillRule {
    /// The fill cached on the feature at load time, else the style default
    #[default]
    Resolved,
    /// One colour for every shape
    Uniform(String),
    Custom(Box<dyn Fn(&GeoFeature) -> String>),
}

impl fmt::Debug for FillRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FillRule::Resolved => f.write_str("Resolved"),
            FillRule::Uniform(color) => f.debug_tuple("Uniform").field(color).finish(),
            FillRule::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Style and behaviour for one render pass
#[derive(Debug)]
pub struct RenderStyle {
    pub class_name: String,
    pub fill: FillRule,
    pub default_fill: String,
    pub stroke_color: String,
    pub highlight_color: String,
    pub hooks: InteractionHooks,
}

impl RenderStyle {
    pub fn from_config(config: &StyleConfig) -> Self {
        Self {
            class_name: FEATURE_CLASS.to_string(),
            fill: FillRule::Resolved,
            default_fill: config.default_fill.clone(),
            stroke_color: config.stroke_color.clone(),
            highlight_color: config.highlight_color.clone(),
            hooks: InteractionHooks::default(),
        }
    }

    pub fn with_hooks(mut self, hooks: InteractionHooks) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn with_fill(mut self, fill: FillRule) -> Self {
        self.fill = fill;
        self
    }

    pub fn fill_of(&self, feature: &GeoFeature) -> String {
        match &self.fill {
            FillRule::Resolved => feature
                .fill()
                .or_else(|| feature.properties.as_ref().and_then(|p| p.fill.as_deref()))
                .unwrap_or(&self.default_fill)
                .to_string(),
            FillRule::Uniform(color) => color.clone(),
            FillRule::Custom(rule) => rule(feature),
        }
    }
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self::from_config(&StyleConfig::default())
    }
}

/// A drawn feature with its canvas-space outline for exact hit-testing
#[derive(Debug, Clone)]
struct Shape {
    feature: GeoFeature,
    outline: MultiPolygon<f64>,
    bounds: Option<Bounds>,
}

/// Projects features onto the canvas and routes pointer/keyboard events to hooks
#[derive(Debug)]
pub struct RenderPipeline {
    projection: AlbersUsa,
    transform: ViewportTransform,
    context: RenderContext,
    shapes: Vec<Shape>,
    index: ShapeIndex,
    hovered: Option<usize>,
    focused: Option<usize>,
}

impl RenderPipeline {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            projection: AlbersUsa::default(),
            transform: ViewportTransform::centered(width, height),
            context: RenderContext::new(width, height),
            shapes: Vec::new(),
            index: ShapeIndex::default(),
            hovered: None,
            focused: None,
        }
    }

    pub fn projection(&self) -> &AlbersUsa {
        &self.projection
    }

    pub fn transform(&self) -> ViewportTransform {
        self.transform
    }

    /// Refits the transform to `collection` for the current canvas size
    pub fn fit_to(&mut self, collection: &GeoCollection) -> ViewportTransform {
        self.transform = ViewportTransform::fit_with(
            collection,
            &self.projection,
            self.context.width,
            self.context.height,
        );
        self.transform
    }

    pub fn context(&self) -> &RenderContext {
        &self.context
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.context.resize(width, height);
    }

    /// Clears all prior output and draws one shape per feature, in order
    pub fn render(&mut self, features: &[&GeoFeature], style: &RenderStyle) {
        if let Some(previous) = self.hovered.take() {
            if let Some(shape) = self.shapes.get(previous) {
                if shape.feature.is_well_formed() {
                    style.hooks.unhover(&shape.feature);
                }
            }
        }
        self.focused = None;
        self.context.begin_frame();
        self.shapes.clear();

        let mut envelopes = Vec::with_capacity(features.len());
        for feature in features {
            let polygons = self.project_feature(feature);
            let fill = style.fill_of(feature);
            let rings: Vec<Vec<Point>> = polygons.iter().flatten().cloned().collect();
            let shape = self.context.render_polygon(
                feature.unit_id().map(str::to_string),
                rings,
                PolygonRenderStyle {
                    class_name: style.class_name.clone(),
                    fill: fill.clone(),
                    stroke: style.stroke_color.clone(),
                    original_fill: fill,
                },
            );

            let bounds = self.context.command(shape).and_then(|c| c.bounds());
            if let Some(bounds) = bounds {
                envelopes.push(ShapeEnvelope::new(shape, bounds));
            }
            self.shapes.push(Shape {
                feature: (*feature).clone(),
                outline: to_multipolygon(&polygons),
                bounds,
            });
        }

        self.index = ShapeIndex::new(envelopes);
        log::debug!("rendered {} shapes", self.shapes.len());
    }

    /// Topmost shape under a canvas position
    pub fn hit_test(&self, canvas: &Point) -> Option<usize> {
        let target = geo_types::Point::from(geo_types::Coord::from(*canvas));
        self.index.candidates_at(canvas).into_iter().find(|&shape| {
            self.shapes
                .get(shape)
                .map(|s| s.outline.contains(&target))
                .unwrap_or(false)
        })
    }

    pub fn feature(&self, shape: usize) -> Option<&GeoFeature> {
        self.shapes.get(shape).map(|s| &s.feature)
    }

    pub fn features(&self) -> impl Iterator<Item = &GeoFeature> {
        self.shapes.iter().map(|s| &s.feature)
    }

    pub fn hovered(&self) -> Option<usize> {
        self.hovered
    }

    pub fn focused(&self) -> Option<usize> {
        self.focused
    }

    /// Enter/leave bookkeeping for a pointer at `canvas`; `page` positions the tooltip.
    ///
    /// Returns the hovered shape, or `None` when it is malformed and so inert.
    pub fn pointer_move(&mut self, canvas: Point, page: Point, style: &RenderStyle) -> Option<usize> {
        let hit = self.hit_test(&canvas);
        if hit != self.hovered {
            self.leave(style);
            if let Some(shape) = hit {
                self.enter(shape, page, style);
            }
        }
        self.hovered.filter(|&shape| self.is_interactive(shape))
    }

    pub fn pointer_leave(&mut self, style: &RenderStyle) {
        self.leave(style);
    }

    /// Fires `on_select` for the shape under `canvas`
    pub fn click(&mut self, canvas: Point, style: &RenderStyle) -> Option<usize> {
        let shape = self.hit_test(&canvas)?;
        self.select(shape, style);
        Some(shape)
    }

    /// Moves keyboard focus to the next shape, wrapping around.
    ///
    /// The tooltip is anchored at the shape's centre shifted by `origin`, the
    /// canvas's top-left corner in page space.
    pub fn focus_next(&mut self, origin: Point, style: &RenderStyle) -> Option<usize> {
        if self.shapes.is_empty() {
            return None;
        }
        let next = match self.focused {
            Some(current) => (current + 1) % self.shapes.len(),
            None => 0,
        };
        self.leave(style);
        let anchor = self.shapes[next]
            .bounds
            .as_ref()
            .map(|b| b.center())
            .unwrap_or_default();
        let anchor = Point::new(anchor.x + origin.x, anchor.y + origin.y);
        self.enter(next, anchor, style);
        self.focused = Some(next);
        self.focused
    }

    pub fn select_focused(&mut self, style: &RenderStyle) -> Option<usize> {
        let shape = self.focused?;
        self.select(shape, style);
        Some(shape)
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    fn is_interactive(&self, shape: usize) -> bool {
        self.shapes
            .get(shape)
            .map_or(false, |drawn| drawn.feature.is_well_formed())
    }

    fn enter(&mut self, shape: usize, page: Point, style: &RenderStyle) {
        self.hovered = Some(shape);
        let Some(drawn) = self.shapes.get(shape) else {
            return;
        };
        if !drawn.feature.is_well_formed() {
            log::error!(
                "feature {:?} has no properties; ignoring hover",
                drawn.feature.label()
            );
            return;
        }
        self.context.set_fill(shape, &style.highlight_color);
        style.hooks.hover(&drawn.feature, page);
    }

    fn leave(&mut self, style: &RenderStyle) {
        let Some(shape) = self.hovered.take() else {
            return;
        };
        let Some(drawn) = self.shapes.get(shape) else {
            return;
        };
        if drawn.feature.is_well_formed() {
            self.context.restore_fill(shape);
            style.hooks.unhover(&drawn.feature);
        }
    }

    fn select(&self, shape: usize, style: &RenderStyle) {
        if let Some(drawn) = self.shapes.get(shape) {
            style.hooks.select(&drawn.feature);
        }
    }

    /// Canvas-space rings, grouped per polygon (exterior first)
    fn project_feature(&self, feature: &GeoFeature) -> Vec<Vec<Vec<Point>>> {
        feature
            .geometry
            .polygons()
            .into_iter()
            .map(|polygon| {
                polygon
                    .iter()
                    .map(|ring| {
                        ring.iter()
                            .map(|&p| self.transform.project(&self.projection, &LatLng::from_position(p)))
                            .filter(|p| p.is_finite())
                            .collect::<Vec<_>>()
                    })
                    .filter(|ring| !ring.is_empty())
                    .collect::<Vec<_>>()
            })
            .filter(|rings| !rings.is_empty())
            .collect()
    }
}

impl Default for RenderPipeline {
    fn default() -> Self {
        Self::new(
            crate::core::constants::CANVAS_WIDTH,
            crate::core::constants::CANVAS_HEIGHT,
        )
    }
}

fn to_multipolygon(polygons: &[Vec<Vec<Point>>]) -> MultiPolygon<f64> {
    let line = |ring: &Vec<Point>| LineString::<f64>::new(ring.iter().map(|&p| p.into()).collect());
    MultiPolygon::new(
        polygons
            .iter()
            .filter_map(|rings| {
                let (exterior, holes) = rings.split_first()?;
                Some(Polygon::new(line(exterior), holes.iter().map(line).collect()))
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::geojson::{FeatureProperties, GeoGeometry, MapKind};
    use crate::rendering::context::DrawCommand;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn square(id: &str, lng: f64, lat: f64, props: bool) -> GeoFeature {
        let geometry = GeoGeometry::Polygon {
            coordinates: vec![vec![
                [lng, lat],
                [lng + 2.0, lat],
                [lng + 2.0, lat + 2.0],
                [lng, lat + 2.0],
                [lng, lat],
            ]],
        };
        let properties = props.then(|| FeatureProperties {
            id: Some(id.to_string()),
            name: Some(format!("Unit {}", id)),
            ..Default::default()
        });
        let mut feature = GeoFeature::new(geometry, properties);
        feature.id = Some(id.to_string());
        feature
    }

    fn fitted(features: &[GeoFeature]) -> RenderPipeline {
        let mut pipeline = RenderPipeline::new(960.0, 600.0);
        pipeline.fit_to(&GeoCollection::new(MapKind::State, features.to_vec()));
        pipeline
    }

    fn recording_style(log: &Rc<RefCell<Vec<String>>>) -> RenderStyle {
        let (hover, unhover, select) = (log.clone(), log.clone(), log.clone());
        RenderStyle::default().with_hooks(
            InteractionHooks::new()
                .on_hover(move |f, _| hover.borrow_mut().push(format!("hover {}", f.label())))
                .on_unhover(move |f| unhover.borrow_mut().push(format!("unhover {}", f.label())))
                .on_select(move |f| select.borrow_mut().push(format!("select {}", f.label()))),
        )
    }

    fn centre_of(pipeline: &RenderPipeline, shape: usize) -> Point {
        pipeline
            .context()
            .command(shape)
            .and_then(|c| c.bounds())
            .map(|b| b.center())
            .unwrap_or_default()
    }

    fn fill_of(pipeline: &RenderPipeline, shape: usize) -> String {
        pipeline
            .context()
            .command(shape)
            .map(|c| c.style().fill.clone())
            .unwrap_or_default()
    }

    #[test]
    fn test_render_replaces_prior_output() {
        let features = vec![square("A", -100.0, 35.0, true), square("B", -90.0, 35.0, true)];
        let mut pipeline = fitted(&features);
        let style = RenderStyle::default();

        let refs: Vec<&GeoFeature> = features.iter().collect();
        pipeline.render(&refs, &style);
        pipeline.render(&refs, &style);
        assert_eq!(pipeline.context().len(), 2);
        assert_eq!(pipeline.len(), 2);

        pipeline.render(&refs[..1], &style);
        assert_eq!(pipeline.context().len(), 1);

        let DrawCommand::Polygon { unit_id, style: drawn, .. } = &pipeline.context().get_drawing_queue()[0];
        assert_eq!(unit_id.as_deref(), Some("A"));
        assert_eq!(drawn.class_name, "map-feature");
        assert_eq!(drawn.fill, "#ccc");
        assert_eq!(drawn.stroke, "#333");
    }

    #[test]
    fn test_shapes_stay_inside_canvas() {
        let features = vec![square("A", -120.0, 30.0, true), square("B", -75.0, 45.0, true)];
        let mut pipeline = fitted(&features);
        pipeline.render(&features.iter().collect::<Vec<_>>(), &RenderStyle::default());

        for command in pipeline.context().get_drawing_queue() {
            let b = command.bounds().unwrap();
            assert!(b.min.x >= 0.0 && b.max.x <= 960.0);
            assert!(b.min.y >= 0.0 && b.max.y <= 600.0);
        }
    }

    #[test]
    fn test_hover_highlights_and_restores() {
        let features = vec![square("A", -100.0, 35.0, true), square("B", -90.0, 35.0, true)];
        let mut pipeline = fitted(&features);
        let log = Rc::new(RefCell::new(Vec::new()));
        let style = recording_style(&log);
        pipeline.render(&features.iter().collect::<Vec<_>>(), &style);

        let a = centre_of(&pipeline, 0);
        let b = centre_of(&pipeline, 1);
        assert_eq!(pipeline.hit_test(&a), Some(0));

        pipeline.pointer_move(a, a, &style);
        assert_eq!(fill_of(&pipeline, 0), "orange");
        // Moving within the same shape fires nothing new
        pipeline.pointer_move(Point::new(a.x + 1.0, a.y), a, &style);

        pipeline.pointer_move(b, b, &style);
        assert_eq!(fill_of(&pipeline, 0), "#ccc");
        assert_eq!(fill_of(&pipeline, 1), "orange");

        pipeline.pointer_leave(&style);
        assert_eq!(fill_of(&pipeline, 1), "#ccc");
        assert_eq!(pipeline.hovered(), None);

        assert_eq!(
            *log.borrow(),
            vec!["hover Unit A", "unhover Unit A", "hover Unit B", "unhover Unit B"]
        );
    }

    #[test]
    fn test_custom_fill_recorded_as_original() {
        let features = vec![square("A", -100.0, 35.0, true)];
        let mut pipeline = fitted(&features);
        let style = RenderStyle::default().with_fill(FillRule::Custom(Box::new(|f| {
            format!("#{}", f.label().len())
        })));
        pipeline.render(&features.iter().collect::<Vec<_>>(), &style);

        let a = centre_of(&pipeline, 0);
        pipeline.pointer_move(a, a, &style);
        pipeline.pointer_leave(&style);
        assert_eq!(fill_of(&pipeline, 0), "#6");
    }

    #[test]
    fn test_click_selects_shape_under_pointer() {
        let features = vec![square("A", -100.0, 35.0, true), square("B", -90.0, 35.0, true)];
        let mut pipeline = fitted(&features);
        let log = Rc::new(RefCell::new(Vec::new()));
        let style = recording_style(&log);
        pipeline.render(&features.iter().collect::<Vec<_>>(), &style);

        assert_eq!(pipeline.click(centre_of(&pipeline, 1), &style), Some(1));
        assert_eq!(pipeline.click(Point::new(-50.0, -50.0), &style), None);
        assert_eq!(*log.borrow(), vec!["select Unit B"]);
    }

    #[test]
    fn test_malformed_hover_is_ignored() {
        let features = vec![square("A", -100.0, 35.0, false)];
        let mut pipeline = fitted(&features);
        let log = Rc::new(RefCell::new(Vec::new()));
        let style = recording_style(&log);
        pipeline.render(&features.iter().collect::<Vec<_>>(), &style);

        let a = centre_of(&pipeline, 0);
        assert_eq!(pipeline.pointer_move(a, a, &style), None);
        assert_eq!(fill_of(&pipeline, 0), "#ccc");
        pipeline.pointer_leave(&style);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_focus_cycles_and_selects() {
        let features = vec![square("A", -100.0, 35.0, true), square("B", -90.0, 35.0, true)];
        let mut pipeline = fitted(&features);
        let log = Rc::new(RefCell::new(Vec::new()));
        let style = recording_style(&log);
        pipeline.render(&features.iter().collect::<Vec<_>>(), &style);

        assert_eq!(pipeline.select_focused(&style), None);
        assert_eq!(pipeline.focus_next(Point::default(), &style), Some(0));
        assert_eq!(pipeline.focus_next(Point::default(), &style), Some(1));
        assert_eq!(pipeline.focus_next(Point::default(), &style), Some(0));
        assert_eq!(pipeline.select_focused(&style), Some(0));
        assert_eq!(fill_of(&pipeline, 0), "orange");
        assert_eq!(fill_of(&pipeline, 1), "#ccc");
        assert_eq!(log.borrow().last().map(String::as_str), Some("select Unit A"));
    }

    #[test]
    fn test_focus_anchor_is_offset_to_page() {
        let features = vec![square("A", -100.0, 35.0, true)];
        let mut pipeline = fitted(&features);
        let anchors = Rc::new(RefCell::new(Vec::new()));
        let seen = anchors.clone();
        let style = RenderStyle::default()
            .with_hooks(InteractionHooks::new().on_hover(move |_, page| seen.borrow_mut().push(page)));
        pipeline.render(&features.iter().collect::<Vec<_>>(), &style);

        let centre = centre_of(&pipeline, 0);
        assert_eq!(pipeline.focus_next(Point::new(100.0, 50.0), &style), Some(0));
        assert_eq!(*anchors.borrow(), vec![Point::new(centre.x + 100.0, centre.y + 50.0)]);
    }
}

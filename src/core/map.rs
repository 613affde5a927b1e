//! The map-view context
//!
//! [`MapView`] owns every piece of mutable view state: the loaded collection
//! and filter, the render pipeline, tooltip, overlay and grant index. A host
//! creates one at startup, forwards events to it, and drops it at teardown.

#[cfg(feature = "tokio-runtime")]
use crate::background::GeometryLoader;
use crate::{
    background::LoadOutcome,
    core::{
        config::{GlobalFilters, MapViewConfig},
        geo::Point,
        viewport::ViewportTransform,
    },
    data::{
        geojson::{GeoCollection, GeoFeature, MapKind},
        grants::GrantIndex,
    },
    input::{
        events::{EventHandled, InputEvent, KeyCode},
        interaction::{InteractionController, InteractionEvent, SelectionContext},
    },
    layers::filter::FilterEngine,
    rendering::{
        context::RenderContext,
        pipeline::{RenderPipeline, RenderStyle},
        svg,
    },
    ui::{overlay::DetailOverlay, tooltip::Tooltip},
};

/// Interactive choropleth view with grant drill-down
pub struct MapView {
    config: MapViewConfig,
    filters: GlobalFilters,
    grants: GrantIndex,
    engine: FilterEngine,
    pipeline: RenderPipeline,
    style: RenderStyle,
    interactions: InteractionController,
    tooltip: Tooltip,
    overlay: DetailOverlay,
    /// Page size used to keep the tooltip on screen
    viewport: Point,
    /// Top-left of the canvas in page space
    canvas_origin: Point,
    requested_kind: Option<MapKind>,
    #[cfg(feature = "tokio-runtime")]
    loader: Option<GeometryLoader>,
}

impl MapView {
    pub fn new(config: MapViewConfig, grants: GrantIndex) -> Self {
        let interactions = InteractionController::new();
        let style = RenderStyle::from_config(&config.style).with_hooks(interactions.hooks());
        Self {
            filters: config.filters.clone(),
            grants,
            engine: FilterEngine::new(),
            pipeline: RenderPipeline::new(config.canvas.width, config.canvas.height),
            style,
            interactions,
            tooltip: Tooltip::new(config.tooltip),
            overlay: DetailOverlay::new(),
            viewport: Point::new(config.canvas.width, config.canvas.height),
            canvas_origin: Point::default(),
            requested_kind: None,
            #[cfg(feature = "tokio-runtime")]
            loader: None,
            config,
        }
    }

    #[cfg(feature = "tokio-runtime")]
    pub fn with_loader(mut self, loader: GeometryLoader) -> Self {
        self.loader = Some(loader);
        self
    }

    pub fn config(&self) -> &MapViewConfig {
        &self.config
    }

    // --- map kind and loading ----------------------------------------------------------------

    /// Switches to `kind`, requesting its collection in the background.
    ///
    /// Returns false if `kind` is already the requested kind. The newest
    /// request always wins when several are in flight.
    pub fn toggle_map_kind(&mut self, kind: MapKind) -> bool {
        if self.requested_kind == Some(kind) {
            return false;
        }
        self.requested_kind = Some(kind);
        log::info!("loading {} map", kind);
        if !self.request_load(kind) {
            log::debug!("no geometry loader; waiting for the host to supply the {} collection", kind);
        }
        true
    }

    #[cfg(feature = "tokio-runtime")]
    fn request_load(&mut self, kind: MapKind) -> bool {
        match self.loader.as_mut() {
            Some(loader) => {
                loader.request(kind);
                true
            }
            None => false,
        }
    }

    #[cfg(not(feature = "tokio-runtime"))]
    fn request_load(&mut self, _kind: MapKind) -> bool {
        false
    }

    /// Kind most recently asked for
    pub fn requested_kind(&self) -> Option<MapKind> {
        self.requested_kind
    }

    /// Kind of the collection currently drawn
    pub fn current_kind(&self) -> Option<MapKind> {
        self.engine.store().kind()
    }

    /// Installs a collection: resolves fills, refits the viewport and redraws
    pub fn load_collection(&mut self, mut collection: GeoCollection) {
        let style = &self.config.style;
        collection.resolve_fills(style.palette_for(collection.kind), &style.default_fill);
        self.requested_kind = Some(collection.kind);
        self.pipeline.fit_to(&collection);
        self.engine.set_collection(collection);
        self.redraw();
    }

    /// Applies one load outcome unless a newer request superseded it.
    ///
    /// Failures are logged and leave the current drawing untouched.
    pub fn apply_load(&mut self, outcome: LoadOutcome) -> bool {
        if let Some(latest) = self.latest_generation() {
            if outcome.generation != latest {
                log::debug!(
                    "dropping stale {} load (generation {}, latest {})",
                    outcome.kind,
                    outcome.generation,
                    latest
                );
                return false;
            }
        }

        match outcome.result {
            Ok(collection) => {
                self.load_collection(collection);
                true
            }
            Err(e) => {
                log::error!("error loading {} map data: {}", outcome.kind, e);
                false
            }
        }
    }

    /// Applies every finished load without blocking. Returns how many were applied.
    pub fn poll_loads(&mut self) -> usize {
        self.drain_loads()
            .into_iter()
            .map(|outcome| self.apply_load(outcome))
            .filter(|applied| *applied)
            .count()
    }

    #[cfg(feature = "tokio-runtime")]
    fn latest_generation(&self) -> Option<u64> {
        self.loader.as_ref().and_then(|l| l.latest_generation())
    }

    #[cfg(not(feature = "tokio-runtime"))]
    fn latest_generation(&self) -> Option<u64> {
        None
    }

    #[cfg(feature = "tokio-runtime")]
    fn drain_loads(&self) -> Vec<LoadOutcome> {
        self.loader.as_ref().map(|l| l.drain()).unwrap_or_default()
    }

    #[cfg(not(feature = "tokio-runtime"))]
    fn drain_loads(&self) -> Vec<LoadOutcome> {
        Vec::new()
    }

    /// Blocks until the newest requested load has been handled or `timeout` passes.
    ///
    /// Returns true if the newest outcome arrived. Not for use on a
    /// current-thread tokio runtime.
    #[cfg(feature = "tokio-runtime")]
    pub fn wait_for_loads(&mut self, timeout: std::time::Duration) -> bool {
        let deadline = std::time::Instant::now() + timeout;
        loop {
            let Some(latest) = self.latest_generation() else {
                return false;
            };
            let remaining = deadline.saturating_duration_since(std::time::Instant::now());
            let outcome = match self.loader.as_ref().and_then(|l| l.recv_timeout(remaining)) {
                Some(outcome) => outcome,
                None => return false,
            };
            let generation = outcome.generation;
            self.apply_load(outcome);
            if generation == latest {
                return true;
            }
        }
    }

    // --- filtering and drawing ---------------------------------------------------------------

    /// Applies the text filter and redraws. Returns the number of visible features.
    pub fn set_filter_text(&mut self, text: &str) -> usize {
        let visible = self.engine.set_filter(text);
        self.redraw();
        visible
    }

    pub fn filter_text(&self) -> &str {
        self.engine.store().filter()
    }

    pub fn current_view(&self) -> Vec<&GeoFeature> {
        self.engine.current_view()
    }

    /// Clears and redraws the current view
    pub fn redraw(&mut self) {
        self.engine.render_into(&mut self.pipeline, &self.style);
        self.process_interactions();
    }

    /// Changes the canvas size, refitting the current collection
    pub fn set_canvas_size(&mut self, width: f64, height: f64) {
        self.config.canvas.width = width;
        self.config.canvas.height = height;
        self.pipeline.resize(width, height);
        if let Some(collection) = self.engine.store().collection() {
            self.pipeline.fit_to(collection);
        }
        self.redraw();
    }

    pub fn transform(&self) -> ViewportTransform {
        self.pipeline.transform()
    }

    pub fn pipeline(&self) -> &RenderPipeline {
        &self.pipeline
    }

    pub fn render_context(&self) -> &RenderContext {
        self.pipeline.context()
    }

    pub fn style(&self) -> &RenderStyle {
        &self.style
    }

    /// Current drawing as an SVG document
    pub fn to_svg(&self) -> String {
        svg::to_svg(self.pipeline.context())
    }

    // --- drill-down --------------------------------------------------------------------------

    pub fn global_filters(&self) -> &GlobalFilters {
        &self.filters
    }

    /// Fiscal year and funding type used by subsequent drill-downs
    pub fn set_global_filters(&mut self, filters: GlobalFilters) {
        log::debug!(
            "global filters: FY {}, funding type {}",
            filters.award_year,
            filters.funding_type
        );
        self.filters = filters;
    }

    pub fn grants(&self) -> &GrantIndex {
        &self.grants
    }

    pub fn set_grants(&mut self, grants: GrantIndex) {
        log::info!("grant index replaced ({} records)", grants.len());
        self.grants = grants;
    }

    /// Opens the overlay for `feature`.
    ///
    /// A feature without properties is logged and ignored; the overlay keeps its state.
    pub fn handle_feature_click(&mut self, feature: &GeoFeature) -> bool {
        match SelectionContext::from_feature(feature) {
            Ok(selection) => {
                self.open_selection(selection);
                true
            }
            Err(e) => {
                log::error!("ignoring click: {}", e);
                false
            }
        }
    }

    pub fn open_selection(&mut self, selection: SelectionContext) {
        log::debug!("opening details for {}", selection.label);
        self.overlay.open(selection, &self.filters, &self.grants);
    }

    pub fn close_overlay(&mut self) {
        self.overlay.close();
    }

    /// Shows the last overlay content again
    pub fn reopen_overlay(&mut self) -> bool {
        self.overlay.reopen()
    }

    pub fn overlay(&self) -> &DetailOverlay {
        &self.overlay
    }

    /// Visible overlay as an HTML fragment
    pub fn overlay_html(&self) -> Option<String> {
        if !self.overlay.is_visible() {
            return None;
        }
        self.overlay.content().map(|c| c.to_html())
    }

    pub fn tooltip(&self) -> &Tooltip {
        &self.tooltip
    }

    /// Where the canvas sits on the page; keyboard focus anchors tooltips from here
    pub fn set_canvas_origin(&mut self, origin: Point) {
        self.canvas_origin = origin;
    }

    // --- input -------------------------------------------------------------------------------

    pub fn handle_input(&mut self, event: InputEvent) -> EventHandled {
        let handled = match event {
            InputEvent::PointerMove { canvas, page } => {
                self.pipeline.pointer_move(canvas, page, &self.style).is_some()
            }
            InputEvent::PointerLeave => {
                let was_hovering = self.pipeline.hovered().is_some();
                self.pipeline.pointer_leave(&self.style);
                was_hovering
            }
            InputEvent::Click { canvas } => self.pipeline.click(canvas, &self.style).is_some(),
            InputEvent::KeyPress { key, .. } => self.handle_key(key),
            InputEvent::Resize { viewport } => {
                self.viewport = viewport;
                true
            }
        };
        self.process_interactions();
        EventHandled::from_bool(handled)
    }

    fn handle_key(&mut self, key: KeyCode) -> bool {
        match key {
            KeyCode::Escape if self.overlay.is_visible() => {
                self.close_overlay();
                true
            }
            KeyCode::Tab => self.pipeline.focus_next(self.canvas_origin, &self.style).is_some(),
            KeyCode::Enter => self.pipeline.select_focused(&self.style).is_some(),
            _ => false,
        }
    }

    /// Applies what the pipeline hooks queued: tooltip updates and selections
    fn process_interactions(&mut self) {
        for event in self.interactions.drain() {
            match event {
                InteractionEvent::Hovered { label, page } => {
                    self.tooltip.show_at(label, page, self.viewport)
                }
                InteractionEvent::Unhovered => self.tooltip.hide(),
                InteractionEvent::Selected(selection) => self.open_selection(selection),
            }
        }
    }
}

impl std::fmt::Debug for MapView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapView")
            .field("requested_kind", &self.requested_kind)
            .field("current_kind", &self.current_kind())
            .field("filter", &self.filter_text())
            .field("shapes", &self.pipeline.len())
            .field("overlay_visible", &self.overlay.is_visible())
            .finish()
    }
}

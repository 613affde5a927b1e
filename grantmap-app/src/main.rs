use anyhow::Context as _;
use grantmap::{
    core::config::MapViewConfig,
    input::events::{InputEvent, KeyCode},
    ui::painter,
    GlobalFilters, GrantIndex, MapKind, MapView, MapViewBuilder, Point,
};
use std::time::Duration;

/// Desktop viewer: `grantmap-app [grants.json] [config.json]`
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let grants = match args.next() {
        Some(path) => load_grants(&path),
        None => {
            log::warn!("no grant dataset given; drill-downs will be empty");
            GrantIndex::default()
        }
    };
    let config = match args.next() {
        Some(path) => MapViewConfig::from_file(&path).with_context(|| format!("reading {}", path))?,
        None => MapViewConfig::default(),
    };

    let view = MapViewBuilder::new()
        .with_config(config)
        .with_grants(grants)
        .with_http_source()
        .with_runtime(tokio::runtime::Handle::current())
        .build()?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1000.0, 760.0])
            .with_title("Grant Map"),
        ..Default::default()
    };

    eframe::run_native(
        "grantmap-app",
        options,
        Box::new(|_cc| Box::new(GrantMapApp::new(view))),
    )
    .map_err(|e| anyhow::anyhow!("viewer failed: {}", e))?;

    Ok(())
}

/// Drill-downs come up empty rather than keeping the map from opening
fn load_grants(path: &str) -> GrantIndex {
    let loaded = std::fs::File::open(path)
        .map_err(grantmap::Error::from)
        .and_then(|file| GrantIndex::from_reader(std::io::BufReader::new(file)));
    match loaded {
        Ok(grants) => {
            log::info!("loaded {} grant records from {}", grants.len(), path);
            grants
        }
        Err(e) => {
            log::error!("failed to read grants from {}: {}", path, e);
            GrantIndex::default()
        }
    }
}

struct GrantMapApp {
    view: MapView,
    filter: String,
    years: Vec<String>,
    funding_types: Vec<String>,
    pointer_inside: bool,
}

impl GrantMapApp {
    fn new(view: MapView) -> Self {
        let mut years = view.grants().fiscal_years();
        let current_year = view.global_filters().award_year.clone();
        if !years.contains(&current_year) {
            years.push(current_year);
            years.sort();
        }
        let mut funding_types = vec![grantmap::data::grants::ALL_FUNDING_TYPES.to_string()];
        funding_types.extend(view.grants().funding_types());

        Self {
            view,
            filter: String::new(),
            years,
            funding_types,
            pointer_inside: false,
        }
    }

    fn toolbar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            let requested = self.view.requested_kind();
            for (kind, label) in [(MapKind::State, "States"), (MapKind::District, "Districts")] {
                if ui.selectable_label(requested == Some(kind), label).clicked() {
                    self.view.toggle_map_kind(kind);
                }
            }
            ui.separator();

            let response = ui.add(
                egui::TextEdit::singleline(&mut self.filter)
                    .hint_text("Filter by state or district")
                    .desired_width(240.0),
            );
            if response.changed() {
                self.view.set_filter_text(&self.filter);
            }
            ui.separator();

            let mut filters = self.view.global_filters().clone();
            egui::ComboBox::from_label("Fiscal year")
                .selected_text(filters.award_year.clone())
                .show_ui(ui, |ui| {
                    for year in &self.years {
                        ui.selectable_value(&mut filters.award_year, year.clone(), year.as_str());
                    }
                });
            egui::ComboBox::from_label("Funding type")
                .selected_text(filters.funding_type.clone())
                .show_ui(ui, |ui| {
                    for funding in &self.funding_types {
                        ui.selectable_value(&mut filters.funding_type, funding.clone(), funding.as_str());
                    }
                });
            if &filters != self.view.global_filters() {
                self.view
                    .set_global_filters(GlobalFilters::new(filters.award_year, filters.funding_type));
            }
        });
    }

    fn canvas(&mut self, ui: &mut egui::Ui) {
        let canvas = self.view.config().canvas;
        let (rect, response) = ui.allocate_exact_size(
            egui::vec2(canvas.width as f32, canvas.height as f32),
            egui::Sense::click(),
        );
        painter::paint_context(ui.painter(), rect.min, self.view.render_context());
        self.view
            .set_canvas_origin(Point::new(rect.min.x as f64, rect.min.y as f64));

        let to_canvas = |pos: egui::Pos2| Point::new((pos.x - rect.min.x) as f64, (pos.y - rect.min.y) as f64);
        match response.hover_pos() {
            Some(pos) => {
                self.pointer_inside = true;
                self.view.handle_input(InputEvent::PointerMove {
                    canvas: to_canvas(pos),
                    page: Point::new(pos.x as f64, pos.y as f64),
                });
            }
            None if self.pointer_inside => {
                self.pointer_inside = false;
                self.view.handle_input(InputEvent::PointerLeave);
            }
            None => {}
        }
        if response.clicked() {
            if let Some(pos) = response.interact_pointer_pos() {
                self.view.handle_input(InputEvent::Click {
                    canvas: to_canvas(pos),
                });
            }
        }
    }

    fn keyboard(&mut self, ctx: &egui::Context) {
        if ctx.memory(|m| m.focus().is_some()) {
            return;
        }
        let keys = [
            (egui::Key::Escape, KeyCode::Escape),
            (egui::Key::Tab, KeyCode::Tab),
            (egui::Key::Enter, KeyCode::Enter),
        ];
        for (key, code) in keys {
            if ctx.input(|i| i.key_pressed(key)) {
                self.view.handle_input(InputEvent::key(code));
            }
        }
    }
}

impl eframe::App for GrantMapApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.view.poll_loads() > 0 {
            log::debug!("{:?}", self.view);
        }
        let screen = ctx.screen_rect().size();
        self.view.handle_input(InputEvent::Resize {
            viewport: Point::new(screen.x as f64, screen.y as f64),
        });

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| self.toolbar(ui));
        egui::CentralPanel::default().show(ctx, |ui| self.canvas(ui));
        self.keyboard(ctx);

        let tooltip_layer = egui::LayerId::new(egui::Order::Tooltip, egui::Id::new("map-tooltip"));
        painter::paint_tooltip(&ctx.layer_painter(tooltip_layer), egui::Pos2::ZERO, self.view.tooltip());

        if painter::show_overlay(ctx, self.view.overlay()) {
            self.view.close_overlay();
        }

        // Loads finish off the UI thread; keep polling while one may be pending
        if self.view.current_kind() != self.view.requested_kind() {
            ctx.request_repaint_after(Duration::from_millis(100));
        }
    }
}

use grantmap::{
    background::StaticGeometrySource,
    input::events::KeyCode,
    FeatureProperties, GeoCollection, GeoFeature, GrantRecord, InputEvent, MapKind,
    MapViewBuilder,
};
use grantmap::data::geojson::GeoGeometry;
use std::{sync::Arc, time::Duration};

fn unit(id: &str, name: &str, state: &str, district: Option<&str>, lng: f64, lat: f64) -> GeoFeature {
    GeoFeature::new(
        GeoGeometry::Polygon {
            coordinates: vec![vec![
                [lng, lat],
                [lng + 1.5, lat],
                [lng + 1.5, lat + 1.0],
                [lng, lat + 1.0],
                [lng, lat],
            ]],
        },
        Some(FeatureProperties {
            id: Some(id.into()),
            name: Some(name.into()),
            state_cd: Some(state.into()),
            district: district.map(Into::into),
            ..Default::default()
        }),
    )
}

/// Drives a map view without any UI: load, filter, drill down, export
fn main() -> grantmap::Result<()> {
    env_logger::init();
    println!("Grant map headless demo");

    let runtime = tokio::runtime::Runtime::new()?;
    let source = StaticGeometrySource::new()
        .with_collection(GeoCollection::new(
            MapKind::State,
            vec![
                unit("51", "Virginia", "VA", None, -80.0, 37.0),
                unit("24", "Maryland", "MD", None, -78.0, 38.5),
            ],
        ))
        .with_collection(GeoCollection::new(
            MapKind::District,
            vec![
                unit("VA-08", "Virginia District 8", "VA", Some("08"), -77.5, 38.5),
                unit("VA-11", "Virginia District 11", "VA", Some("11"), -79.0, 38.5),
            ],
        ))
        .with_delay(MapKind::State, Duration::from_millis(50));

    let mut grant = GrantRecord::new("VA", 8, "2024");
    grant.grantee_nm = Some("Acme University".into());
    grant.award_amt = Some(1_000_000.0);
    grant.funding_type_nm = Some("Research".into());

    let mut view = MapViewBuilder::new()
        .with_grant_records(vec![grant])
        .with_geometry_source(Arc::new(source))
        .with_runtime(runtime.handle().clone())
        .build()?;

    view.wait_for_loads(Duration::from_secs(5));
    println!("state map: {} shapes", view.render_context().len());

    view.toggle_map_kind(MapKind::District);
    view.wait_for_loads(Duration::from_secs(5));
    println!("district map: {} shapes", view.render_context().len());

    let visible = view.set_filter_text("district 8");
    println!("filter {:?}: {} visible", view.filter_text(), visible);

    // Tab focuses the first shape, Enter drills down into it
    view.handle_input(InputEvent::key(KeyCode::Tab));
    println!("tooltip: {}", view.tooltip().content);
    view.handle_input(InputEvent::key(KeyCode::Enter));

    match view.overlay_html() {
        Some(html) => println!("\noverlay:\n{}", html),
        None => println!("\noverlay did not open"),
    }
    view.handle_input(InputEvent::key(KeyCode::Escape));

    println!("\nsvg:\n{}", view.to_svg());
    Ok(())
}

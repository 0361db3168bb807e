//! End-to-end tests of registry → surface → synchronizer, driven the way the
//! viewer drives them every frame

use async_trait::async_trait;
use firemap::prelude::*;
use std::time::Duration;

/// Serves one hiking trail file from memory
struct TrailFiles;

const TRAILS: &str = r#"{
    "type": "FeatureCollection",
    "features": [
        { "type": "Feature", "properties": { "name": "광덕산" },
          "geometry": { "type": "LineString", "coordinates": [[127.02, 36.67], [127.03, 36.68]] } },
        { "type": "Feature", "properties": { "name": "태화산" },
          "geometry": { "type": "MultiLineString", "coordinates": [[[127.07, 36.64], [127.08, 36.65]]] } }
    ]
}"#;

#[async_trait]
impl AssetFetcher for TrailFiles {
    async fn fetch_text(&self, url: &str) -> Result<String> {
        match url {
            "trails.geojson" => Ok(TRAILS.to_string()),
            other => Err(MapError::Layer(format!("unknown file {other}"))),
        }
    }
}

fn registry() -> LayerRegistry {
    LayerRegistry::from_json_str(
        r#"[
            { "name": "A", "type": "soil", "url": "http://localhost:8080/geoserver/ne/wms",
              "layer_names": ["ne:Asan_Cheonan_Soil_1", "ne:Asan_Cheonan_Soil_2", "ne:Asan_Cheonan_Soil_3"] },
            { "name": "T", "type": "hiking_trail", "file_urls": ["trails.geojson", "missing.geojson"] },
            { "name": "M", "type": "mountain_station_markers" }
        ]"#,
    )
    .unwrap()
}

fn mount(registry: &LayerRegistry, state: &UiState) -> MapSurface {
    let mut surface = MapSurface::default();
    surface
        .initialize(
            Viewport::new(LatLng::new(36.7, 127.05), 11.0, Point::new(1024.0, 768.0)),
            registry,
            state,
            Arc::new(TrailFiles),
        )
        .unwrap();
    surface
}

async fn wait_for_loads(surface: &mut MapSurface) -> usize {
    let mut added = 0;
    for _ in 0..200 {
        added += surface.poll_loads();
        if surface.pending_loads() == 0 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    added
}

#[tokio::test]
async fn test_soil_and_hiking_scenario() {
    let registry = registry();
    let mut state = UiState::from_registry(&registry);
    let mut surface = mount(&registry, &state);
    let mut sync = LayerSynchronizer::new();

    // One handle per member, keyed by member name
    assert_eq!(surface.tile_layers().count(), 3);
    assert!(surface.tile_layers().all(|l| !l.is_visible()));

    // Only the existing file contributes features; the missing one is logged
    assert_eq!(wait_for_loads(&mut surface).await, 2);
    let trails = surface.group_layer("T").and_then(GroupLayer::as_vector).unwrap();
    assert_eq!(trails.source().len(), 2);

    state.set_visibility("A", true);
    state.set_visibility("T", true);
    state.toggle_code(FilterCategory::Soil, "05");
    state.toggle_code(FilterCategory::Soil, "01");
    sync.sync(&registry, &mut surface, &mut state);

    assert!(surface.tile_layers().all(|l| l.is_visible()));
    assert!(surface.group_layer("T").unwrap().as_layer().is_visible());
    for layer in surface.tile_layers() {
        assert_eq!(layer.cql_filter(), Some("SLTP_CD IN ('01','05')"));
        assert!(layer
            .source()
            .url(TileCoord::new(109, 50, 7))
            .contains("CQL_FILTER=SLTP_CD+IN+%28%2701%27%2C%2705%27%29"));
    }

    // Hiding the soil group drops its filter and reopens its legend
    state.set_legend_collapsed(FilterCategory::Soil, true);
    state.set_visibility("A", false);
    sync.sync(&registry, &mut surface, &mut state);

    assert!(surface.tile_layers().all(|l| !l.is_visible()));
    assert!(surface.tile_layers().all(|l| l.cql_filter().is_none()));
    assert!(state.filter(FilterCategory::Soil).is_empty());
    assert!(!state.legend_collapsed(FilterCategory::Soil));
    assert!(surface.group_layer("T").unwrap().as_layer().is_visible());
}

#[tokio::test]
async fn test_legend_clicks_toggle_codes() {
    let registry = registry();
    let mut state = UiState::from_registry(&registry);
    let clicks = ["3", "10", "01", "3", "2", "10", "3"];
    for code in clicks {
        state.toggle_code(FilterCategory::Soil, code);
    }
    // Odd click counts: "3" x3, "01" x1, "2" x1
    assert_eq!(state.filter(FilterCategory::Soil).codes(), &["01", "2", "3"]);

    let expression = build_cql_filter(
        FilterCategory::Soil.attribute(),
        state.filter(FilterCategory::Soil).codes(),
    );
    assert_eq!(expression.as_deref(), Some("SLTP_CD IN ('01','2','3')"));

    state.show_all(FilterCategory::Soil);
    assert_eq!(build_cql_filter("SLTP_CD", state.filter(FilterCategory::Soil).codes()), None);
}

#[tokio::test]
async fn test_opacity_round_trip() {
    let registry = registry();
    let mut state = UiState::from_registry(&registry);
    let mut surface = mount(&registry, &state);
    let mut sync = LayerSynchronizer::new();

    state.set_opacity(OpacityBucket::Soil, 0.0);
    state.set_opacity(OpacityBucket::HikingTrail, 0.25);
    sync.sync(&registry, &mut surface, &mut state);
    assert!(surface.tile_layers().all(|l| l.opacity() == 0.0));
    assert_eq!(surface.group_layer("T").unwrap().as_layer().opacity(), 0.25);

    state.set_opacity(OpacityBucket::Soil, 1.0);
    let report = sync.sync(&registry, &mut surface, &mut state);
    assert_eq!(report.opacity, 3);
    assert!(surface.tile_layers().all(|l| l.opacity() == 1.0));
}

#[tokio::test]
async fn test_legend_eligibility() {
    let registry = registry();
    let mut state = UiState::from_registry(&registry);
    assert!(firemap::sync::legend_categories(&registry, &state).is_empty());

    state.set_visibility("M", true);
    state.set_visibility("A", true);
    assert_eq!(
        firemap::sync::legend_categories(&registry, &state),
        vec![LayerCategory::Soil, LayerCategory::MountainStationMarkers]
    );

    state.set_visibility("A", false);
    assert_eq!(
        firemap::sync::legend_categories(&registry, &state),
        vec![LayerCategory::MountainStationMarkers]
    );
}

#[tokio::test]
async fn test_remount_reapplies_state() {
    let registry = registry();
    let mut state = UiState::from_registry(&registry);
    let mut surface = mount(&registry, &state);
    let mut sync = LayerSynchronizer::new();

    state.set_visibility("A", true);
    state.toggle_code(FilterCategory::Soil, "07");
    sync.sync(&registry, &mut surface, &mut state);

    assert!(surface.teardown());
    surface
        .initialize(
            Viewport::new(LatLng::new(36.7, 127.05), 11.0, Point::new(640.0, 480.0)),
            &registry,
            &state,
            Arc::new(TrailFiles),
        )
        .unwrap();

    // Fresh handles start from the stored visibility but without a filter
    assert!(surface.tile_layers().all(|l| l.is_visible() && l.cql_filter().is_none()));
    sync.sync(&registry, &mut surface, &mut state);
    assert!(surface
        .tile_layers()
        .all(|l| l.cql_filter() == Some("SLTP_CD IN ('07')")));
}

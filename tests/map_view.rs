//! Headless egui frames against the map widget and panels
#![cfg(feature = "egui")]

use async_trait::async_trait;
use egui::{Event, Modifiers, PointerButton, Pos2, RawInput, Rect, Vec2};
use firemap::prelude::*;
use firemap::ui::{LegendLayout, LegendPanel, MapView, WeatherPopup};
use firemap::weather::{WeatherPanel, WeatherSource};

struct NoFiles;

#[async_trait]
impl AssetFetcher for NoFiles {
    async fn fetch_text(&self, url: &str) -> Result<String> {
        Err(MapError::Layer(format!("offline: {url}")))
    }
}

struct NoWeather;

#[async_trait]
impl WeatherSource for NoWeather {
    async fn fetch(
        &self,
        _request: &WeatherRequest,
    ) -> std::result::Result<Option<WeatherObservation>, WeatherError> {
        Ok(None)
    }
}

struct Harness {
    ctx: egui::Context,
    view: MapView,
    registry: LayerRegistry,
    state: UiState,
    surface: MapSurface,
    legend: LegendLayout,
}

impl Harness {
    fn new() -> Self {
        let registry = LayerRegistry::default();
        let mut state = UiState::from_registry(&registry);
        state.set_visibility("산악기상관측소", true);

        // Nothing listens on the discard port, tile requests fail fast
        let base_map = BaseMapConfig {
            url_template: "http://127.0.0.1:9/{z}/{x}/{y}.png".into(),
            ..BaseMapConfig::default()
        };
        let station = MountainStation {
            obsid: "1910".into(),
            name: "광덕산".into(),
            area: "충남 천안시".into(),
            latitude: 36.6806,
            longitude: 127.0286,
        };
        let mut surface = MapSurface::new(base_map, vec![station]);
        surface
            .initialize(
                Viewport::new(LatLng::new(36.6806, 127.0286), 12.0, Point::new(800.0, 600.0)),
                &registry,
                &state,
                Arc::new(NoFiles),
            )
            .unwrap();

        Self {
            ctx: egui::Context::default(),
            view: MapView::new(&TileLoadingConfig::default()),
            registry,
            state,
            surface,
            legend: LegendLayout::default(),
        }
    }

    fn frame(&mut self, events: Vec<Event>) -> Rect {
        let input = RawInput {
            screen_rect: Some(Rect::from_min_size(Pos2::ZERO, Vec2::new(800.0, 600.0))),
            events,
            ..Default::default()
        };
        let mut rect = Rect::NOTHING;
        let _ = self.ctx.run(input, |ctx| {
            egui::CentralPanel::default()
                .frame(egui::Frame::none())
                .show(ctx, |ui| {
                    rect = self.view.show(ui, &mut self.surface, &mut self.state).rect;
                });
            self.legend = LegendPanel::default().show(ctx, &self.registry, &mut self.state);
        });
        rect
    }

    fn click(&mut self, pos: Pos2) {
        self.frame(vec![Event::PointerMoved(pos), press(pos, true)]);
        self.frame(vec![press(pos, false)]);
    }
}

fn press(pos: Pos2, pressed: bool) -> Event {
    Event::PointerButton {
        pos,
        button: PointerButton::Primary,
        pressed,
        modifiers: Modifiers::NONE,
    }
}

#[tokio::test]
async fn test_widget_tracks_panel_size() {
    let mut harness = Harness::new();
    let rect = harness.frame(vec![]);

    assert_eq!(rect.size(), Vec2::new(800.0, 600.0));
    let viewport = harness.surface.viewport().unwrap();
    assert_eq!(viewport.size, Point::new(800.0, 600.0));
}

#[tokio::test]
async fn test_click_on_marker_selects_station() {
    let mut harness = Harness::new();
    harness.frame(vec![]);

    let center = Pos2::new(400.0, 300.0);
    harness.frame(vec![Event::PointerMoved(center), press(center, true)]);
    harness.frame(vec![press(center, false)]);

    assert_eq!(
        harness.state.selected_station(),
        Some(&SelectedStation::new("1910", "광덕산"))
    );
}

#[tokio::test]
async fn test_drag_pans_the_view() {
    let mut harness = Harness::new();
    harness.frame(vec![]);
    let before = harness.surface.viewport().unwrap().center;

    let start = Pos2::new(400.0, 300.0);
    let end = Pos2::new(300.0, 300.0);
    harness.frame(vec![Event::PointerMoved(start), press(start, true)]);
    harness.frame(vec![Event::PointerMoved(end)]);
    harness.frame(vec![press(end, false)]);

    let after = harness.surface.viewport().unwrap().center;
    // Dragging left brings eastern ground into view
    assert!(after.lng > before.lng);
    assert!((after.lat - before.lat).abs() < 1e-6);
    assert!(harness.state.selected_station().is_none());
}

#[tokio::test]
async fn test_popup_renders_for_selection() {
    let mut harness = Harness::new();
    let mut panel = WeatherPanel::new(Arc::new(NoWeather));
    harness
        .state
        .select_station(SelectedStation::new("1910", "광덕산"));
    panel.on_selection(harness.state.selection_seq(), harness.state.selected_station());

    let popup = WeatherPopup::default();
    let _ = harness.ctx.run(RawInput::default(), |ctx| {
        popup.show(ctx, &panel, &mut harness.state);
    });

    // Rendering alone must not touch the selection
    assert!(harness.state.selected_station().is_some());
}

#[tokio::test]
async fn test_legend_clicks_reach_ui_state() {
    let mut harness = Harness::new();
    harness.frame(vec![]);
    harness.frame(vec![]);
    assert!(harness.legend.entry(FilterCategory::Soil, "01").is_none());

    let checkbox = harness.legend.checkbox("아산천안 토양").unwrap();
    harness.click(checkbox.center());
    assert!(harness.state.visibility("아산천안 토양"));
    harness.frame(vec![]);

    let row = harness.legend.entry(FilterCategory::Soil, "01").unwrap();
    harness.click(row.center());
    assert_eq!(harness.state.filter(FilterCategory::Soil).codes(), &["01"]);
    harness.frame(vec![]);

    let row = harness.legend.entry(FilterCategory::Soil, "05").unwrap();
    harness.click(row.center());
    assert_eq!(harness.state.filter(FilterCategory::Soil).codes(), &["01", "05"]);
    harness.frame(vec![]);

    let show_all = harness.legend.show_all(FilterCategory::Soil).unwrap();
    harness.click(show_all.center());
    assert!(harness.state.filter(FilterCategory::Soil).is_empty());
    harness.frame(vec![]);

    let heading = harness.legend.heading(FilterCategory::Soil).unwrap();
    harness.click(heading.center());
    assert!(harness.state.legend_collapsed(FilterCategory::Soil));
    harness.frame(vec![]);
    assert!(harness.legend.entry(FilterCategory::Soil, "01").is_none());
    assert!(harness.legend.heading(FilterCategory::Soil).is_some());
}

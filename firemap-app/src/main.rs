use anyhow::Context as _;
use firemap::{
    core::{config::ViewerConfig, geo::Point, viewport::Viewport},
    data::{fetch::HttpFetcher, stations::MountainStation},
    prelude::{Arc, Duration},
    registry::LayerRegistry,
    state::UiState,
    surface::MapSurface,
    sync::LayerSynchronizer,
    ui::{LegendPanel, MapView, WeatherPopup},
    weather::{WeatherClient, WeatherPanel, WeatherState},
};

/// Wildfire layer viewer. An optional argument names a JSON config file.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = match std::env::args().nth(1) {
        Some(path) => ViewerConfig::from_json_file(&path)
            .with_context(|| format!("failed to load config {path}"))?,
        None => ViewerConfig::default(),
    };

    let registry = match &config.registry_path {
        Some(path) => LayerRegistry::from_json_file(path)
            .with_context(|| format!("failed to load layer registry {}", path.display()))?,
        None => LayerRegistry::default(),
    };

    let stations = match &config.stations_path {
        Some(path) => MountainStation::from_json_file(path)
            .with_context(|| format!("failed to load stations {}", path.display()))?,
        None => MountainStation::builtin(),
    };

    let weather = WeatherClient::new(&config.weather).context("invalid weather config")?;

    log::info!(
        "starting viewer: {} layer groups, {} stations",
        registry.len(),
        stations.len()
    );

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_title("Firemap - 산불 레이어 뷰어"),
        ..Default::default()
    };

    eframe::run_native(
        "firemap-app",
        options,
        Box::new(move |_cc| Box::new(FiremapApp::new(config, registry, stations, weather))),
    )
    .map_err(|e| anyhow::anyhow!("viewer exited with an error: {e}"))?;

    Ok(())
}

struct FiremapApp {
    config: ViewerConfig,
    registry: LayerRegistry,
    state: UiState,
    surface: MapSurface,
    sync: LayerSynchronizer,
    weather: WeatherPanel,
    view: MapView,
    legend: LegendPanel,
    popup: WeatherPopup,
    fetcher: Arc<HttpFetcher>,
}

impl FiremapApp {
    fn new(
        config: ViewerConfig,
        registry: LayerRegistry,
        stations: Vec<MountainStation>,
        weather: WeatherClient,
    ) -> Self {
        let state = UiState::from_registry(&registry);
        Self {
            surface: MapSurface::new(config.base_map.clone(), stations),
            view: MapView::new(&config.tile_loading),
            weather: WeatherPanel::new(Arc::new(weather)),
            sync: LayerSynchronizer::new(),
            legend: LegendPanel::default(),
            popup: WeatherPopup::default(),
            fetcher: Arc::new(HttpFetcher::new()),
            config,
            registry,
            state,
        }
    }

    /// Mounts the surface once the central panel has a size
    fn mount(&mut self, size: egui::Vec2) {
        let viewport = Viewport::new(
            self.config.initial_center,
            self.config.initial_zoom,
            Point::new(size.x as f64, size.y as f64),
        );
        if let Err(e) = self
            .surface
            .initialize(viewport, &self.registry, &self.state, self.fetcher.clone())
        {
            log::error!("failed to mount map: {e}");
        }
    }

    /// Moves background results and UI edits onto the layers
    fn pump(&mut self, ctx: &egui::Context) {
        self.surface.poll_loads();

        let report = self.sync.sync(&self.registry, &mut self.surface, &mut self.state);

        self.weather.poll();
        self.weather
            .on_selection(self.state.selection_seq(), self.state.selected_station());

        if !report.is_empty() {
            ctx.request_repaint();
        }
        if matches!(self.weather.state(), WeatherState::Loading) {
            ctx.request_repaint_after(Duration::from_millis(100));
        }
    }
}

impl eframe::App for FiremapApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.pump(ctx);

        egui::CentralPanel::default()
            .frame(egui::Frame::none())
            .show(ctx, |ui| {
                let size = ui.available_size();
                if !self.surface.is_initialized() && size.min_elem() >= 1.0 {
                    self.mount(size);
                }
                self.view.show(ui, &mut self.surface, &mut self.state);
            });

        self.legend.show(ctx, &self.registry, &mut self.state);
        self.popup.show(ctx, &self.weather, &mut self.state);

        // Apply this frame's clicks without waiting for the next input event
        self.pump(ctx);
    }
}

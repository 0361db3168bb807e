//! Marker click through to the weather popup state

use async_trait::async_trait;
use firemap::prelude::*;
use std::sync::Mutex;
use std::time::Duration;

/// Replays a canned service response and records what was asked
struct CannedService {
    status: u16,
    body: &'static str,
    requests: Mutex<Vec<WeatherRequest>>,
}

impl CannedService {
    fn new(status: u16, body: &'static str) -> Arc<Self> {
        Arc::new(Self {
            status,
            body,
            requests: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl WeatherSource for CannedService {
    async fn fetch(
        &self,
        request: &WeatherRequest,
    ) -> std::result::Result<Option<WeatherObservation>, WeatherError> {
        self.requests.lock().unwrap().push(request.clone());
        parse_weather_response(self.status, self.body)
    }
}

struct NoFiles;

#[async_trait]
impl AssetFetcher for NoFiles {
    async fn fetch_text(&self, url: &str) -> Result<String> {
        Err(MapError::Layer(format!("offline: {url}")))
    }
}

const OK_BODY: &str = r#"{
    "response": {
        "header": { "resultCode": "00", "resultMsg": "NORMAL_SERVICE" },
        "body": { "items": { "item": [
            { "obsid": "1910", "obsname": "광덕산", "tm": "2025-05-13 16:00",
              "tm2m": "17.2", "hm2m": 61.0, "wd2mstr": "SW", "wd2m": 225.0, "ws2m": "2.4", "cprn": 0.5 }
        ] } }
    }
}"#;

fn station() -> MountainStation {
    MountainStation {
        obsid: "1910".into(),
        name: "X".into(),
        area: "충남 천안시".into(),
        latitude: 36.6806,
        longitude: 127.0286,
    }
}

fn setup() -> (LayerRegistry, UiState, MapSurface) {
    let registry = LayerRegistry::default();
    let mut state = UiState::from_registry(&registry);
    state.set_visibility("산악기상관측소", true);

    let mut surface = MapSurface::new(BaseMapConfig::default(), vec![station()]);
    surface
        .initialize(
            Viewport::new(LatLng::new(36.6806, 127.0286), 12.0, Point::new(800.0, 600.0)),
            &registry,
            &state,
            Arc::new(NoFiles),
        )
        .unwrap();
    (registry, state, surface)
}

async fn settle(panel: &mut WeatherPanel) {
    for _ in 0..200 {
        panel.poll();
        if !matches!(panel.state(), WeatherState::Loading) {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

#[tokio::test]
async fn test_marker_click_fetches_weather() {
    let (_registry, mut state, surface) = setup();
    let service = CannedService::new(200, OK_BODY);
    let mut panel = WeatherPanel::new(service.clone());
    panel.on_selection(state.selection_seq(), state.selected_station());
    assert_eq!(panel.state(), &WeatherState::Idle);

    // The station sits in the middle of the view
    let outcome = surface.click(Point::new(400.0, 300.0));
    assert_eq!(outcome, ClickOutcome::Station(SelectedStation::new("1910", "X")));
    assert!(state.apply_click(outcome));

    assert!(panel.on_selection(state.selection_seq(), state.selected_station()));
    assert_eq!(panel.state(), &WeatherState::Loading);
    settle(&mut panel).await;

    let requests = service.requests.lock().unwrap().clone();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].obsid, "1910");
    assert_eq!(requests[0].tm.len(), 12);
    assert!(requests[0].tm.ends_with("00"));

    let WeatherState::Ready(Some(obs)) = panel.state() else {
        panic!("expected an observation, got {:?}", panel.state());
    };
    assert_eq!(obs.station_name("X"), "광덕산");
    assert_eq!(obs.temperature(), "17.2");
    assert_eq!(obs.humidity(), "61.0");
    assert_eq!(obs.wind_direction(), "SW");
    assert_eq!(obs.wind_speed(), "2.4");
    assert_eq!(obs.precipitation(), "0.5");
}

#[tokio::test]
async fn test_empty_click_keeps_selection() {
    let (_registry, mut state, surface) = setup();
    let service = CannedService::new(200, OK_BODY);
    let mut panel = WeatherPanel::new(service.clone());

    state.apply_click(surface.click(Point::new(400.0, 300.0)));
    panel.on_selection(state.selection_seq(), state.selected_station());
    settle(&mut panel).await;

    let outcome = surface.click(Point::new(20.0, 20.0));
    assert_eq!(outcome, ClickOutcome::Miss);
    assert!(!state.apply_click(outcome));
    assert!(!panel.on_selection(state.selection_seq(), state.selected_station()));

    assert_eq!(state.selected_station().map(|s| s.station_id.as_str()), Some("1910"));
    assert!(matches!(panel.state(), WeatherState::Ready(Some(_))));
    assert_eq!(service.requests.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_reclicking_same_station_refetches() {
    let (_registry, mut state, surface) = setup();
    let service = CannedService::new(200, OK_BODY);
    let mut panel = WeatherPanel::new(service.clone());

    for _ in 0..2 {
        state.apply_click(surface.click(Point::new(401.0, 299.0)));
        panel.on_selection(state.selection_seq(), state.selected_station());
        settle(&mut panel).await;
    }
    assert_eq!(service.requests.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn test_api_error_is_shown() {
    let (_registry, mut state, surface) = setup();
    let service = CannedService::new(
        200,
        r#"{"response":{"header":{"resultCode":"03","resultMsg":"NO_DATA"}}}"#,
    );
    let mut panel = WeatherPanel::new(service);

    state.apply_click(surface.click(Point::new(400.0, 300.0)));
    panel.on_selection(state.selection_seq(), state.selected_station());
    settle(&mut panel).await;

    assert_eq!(
        panel.state(),
        &WeatherState::Failed("API Error: NO_DATA (Code: 03)".into())
    );
}

#[tokio::test]
async fn test_hiding_markers_closes_popup() {
    let (registry, mut state, mut surface) = setup();
    let mut sync = LayerSynchronizer::new();
    let mut panel = WeatherPanel::new(CannedService::new(200, OK_BODY));

    sync.sync(&registry, &mut surface, &mut state);
    state.apply_click(surface.click(Point::new(400.0, 300.0)));
    panel.on_selection(state.selection_seq(), state.selected_station());
    settle(&mut panel).await;

    state.set_visibility("산악기상관측소", false);
    sync.sync(&registry, &mut surface, &mut state);
    assert!(state.selected_station().is_none());

    panel.on_selection(state.selection_seq(), state.selected_station());
    assert_eq!(panel.state(), &WeatherState::Idle);
    assert_eq!(surface.click(Point::new(400.0, 300.0)), ClickOutcome::Ignored);
}

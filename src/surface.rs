//! The map surface: viewport plus every layer handle created from the registry
//!
//! Handles live in two maps. WMS member layers are keyed by member name,
//! vector and marker layers by group name. Both are created once by
//! [`MapSurface::initialize`] and dropped by [`MapSurface::teardown`]; in
//! between they are only reached through the accessors.

use crate::core::config::BaseMapConfig;
use crate::core::geo::Point;
use crate::core::viewport::Viewport;
use crate::data::fetch::AssetFetcher;
use crate::data::geojson::{read_features, Feature};
use crate::data::stations::MountainStation;
use crate::layers::base::LayerTrait;
use crate::layers::marker::MarkerLayer;
use crate::layers::vector::{LineStyle, VectorLayer};
use crate::layers::wms::WmsTileLayer;
use crate::layers::xyz::XyzTileLayer;
use crate::layers::GroupLayer;
use crate::prelude::{Arc, HashMap};
use crate::registry::{GroupSource, LayerRegistry};
use crate::state::{SelectedStation, UiState};
use crate::{MapError, Result};
use crossbeam_channel::{unbounded, Receiver, Sender};

/// What a click on the map amounted to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    /// A visible station marker was hit
    Station(SelectedStation),
    /// Markers are visible but none is under the cursor
    Miss,
    /// No marker layer is visible, the click was not tested
    Ignored,
}

/// Features parsed off the UI thread, waiting to be appended
struct FeatureLoad {
    group: String,
    url: String,
    result: Result<Vec<Feature>>,
}

struct MapInstance {
    viewport: Viewport,
    base: XyzTileLayer,
    tile_layers: HashMap<String, WmsTileLayer>,
    tile_order: Vec<String>,
    group_layers: HashMap<String, GroupLayer>,
    group_order: Vec<String>,
    loads: Receiver<FeatureLoad>,
    pending_loads: usize,
}

pub struct MapSurface {
    base_map: BaseMapConfig,
    stations: Vec<MountainStation>,
    instance: Option<MapInstance>,
    mounts: u64,
}

impl MapSurface {
    pub fn new(base_map: BaseMapConfig, stations: Vec<MountainStation>) -> Self {
        Self {
            base_map,
            stations,
            instance: None,
            mounts: 0,
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.instance.is_some()
    }

    /// Distinguishes successive mounts; `None` while torn down
    pub fn mount_id(&self) -> Option<u64> {
        self.instance.as_ref().map(|_| self.mounts)
    }

    /// Creates every layer handle for `registry`.
    ///
    /// Fails with [`MapError::AlreadyInitialized`] while a previous instance is
    /// mounted and with [`MapError::InvalidViewport`] for a zero-sized view; in
    /// both cases nothing changes. Data files are fetched in the background and
    /// appended by [`MapSurface::poll_loads`].
    pub fn initialize(
        &mut self,
        viewport: Viewport,
        registry: &LayerRegistry,
        state: &UiState,
        fetcher: Arc<dyn AssetFetcher>,
    ) -> Result<()> {
        if self.instance.is_some() {
            return Err(MapError::AlreadyInitialized);
        }
        if !viewport.has_area() {
            return Err(MapError::InvalidViewport(format!(
                "{}x{} viewport",
                viewport.size.x, viewport.size.y
            )));
        }

        let (tx, rx) = unbounded();
        let mut tile_layers = HashMap::default();
        let mut tile_order = Vec::new();
        let mut group_layers = HashMap::default();
        let mut group_order = Vec::new();
        let mut pending_loads = 0;

        for group in registry.groups() {
            let visible = state.visibility(&group.name);
            let opacity = group
                .category()
                .opacity_bucket()
                .map(|bucket| state.opacity(bucket))
                .unwrap_or(1.0);

            match &group.source {
                GroupSource::Soil(source) | GroupSource::Imsangdo(source) => {
                    for member in &source.layer_names {
                        let layer = WmsTileLayer::new(member, &group.name, &source.url)?
                            .with_visibility(visible)
                            .with_opacity(opacity);
                        tile_layers.insert(member.clone(), layer);
                        tile_order.push(member.clone());
                    }
                }
                GroupSource::HikingTrail(source) => {
                    let layer = VectorLayer::new(
                        group.name.clone(),
                        group.name.clone(),
                        LineStyle::hiking_trail(),
                    )
                    .with_visibility(visible)
                    .with_opacity(opacity);
                    group_layers.insert(group.name.clone(), GroupLayer::Vector(layer));
                    group_order.push(group.name.clone());

                    for url in &source.file_urls {
                        spawn_feature_load(group.name.clone(), url.clone(), fetcher.clone(), tx.clone());
                        pending_loads += 1;
                    }
                }
                GroupSource::MountainStationMarkers => {
                    let layer = MarkerLayer::from_stations(
                        group.name.clone(),
                        group.name.clone(),
                        &self.stations,
                    )
                    .with_visibility(visible);
                    group_layers.insert(group.name.clone(), GroupLayer::Markers(layer));
                    group_order.push(group.name.clone());
                }
            }
        }

        log::info!(
            "map surface initialized: {} tile layers, {} group layers, {} data files pending",
            tile_layers.len(),
            group_layers.len(),
            pending_loads
        );

        self.mounts += 1;
        self.instance = Some(MapInstance {
            viewport,
            base: XyzTileLayer::from_config(&self.base_map),
            tile_layers,
            tile_order,
            group_layers,
            group_order,
            loads: rx,
            pending_loads,
        });
        Ok(())
    }

    /// Appends data files that finished loading; returns the number of features added.
    /// Failed files are logged and leave their layer empty.
    pub fn poll_loads(&mut self) -> usize {
        let Some(instance) = self.instance.as_mut() else {
            return 0;
        };

        let mut added = 0;
        while let Ok(load) = instance.loads.try_recv() {
            instance.pending_loads = instance.pending_loads.saturating_sub(1);
            match load.result {
                Ok(features) => {
                    let Some(layer) = instance
                        .group_layers
                        .get_mut(&load.group)
                        .and_then(GroupLayer::as_vector_mut)
                    else {
                        continue;
                    };
                    log::debug!("{}: {} features from {}", load.group, features.len(), load.url);
                    added += features.len();
                    layer.source_mut().add_features(features);
                }
                Err(e) => {
                    log::warn!("failed to load {} for {}: {}", load.url, load.group, e);
                }
            }
        }
        added
    }

    /// Data files still in flight
    pub fn pending_loads(&self) -> usize {
        self.instance.as_ref().map_or(0, |i| i.pending_loads)
    }

    /// Hit-tests visible marker layers at a container pixel
    pub fn click(&self, pixel: Point) -> ClickOutcome {
        let Some(instance) = self.instance.as_ref() else {
            return ClickOutcome::Ignored;
        };

        let mut tested = false;
        for name in &instance.group_order {
            let Some(markers) = instance.group_layers.get(name).and_then(GroupLayer::as_markers)
            else {
                continue;
            };
            if !markers.is_visible() {
                continue;
            }
            tested = true;
            if let Some(feature) = markers.hit_test(&instance.viewport, pixel) {
                return ClickOutcome::Station(feature.selection());
            }
        }

        if tested {
            ClickOutcome::Miss
        } else {
            ClickOutcome::Ignored
        }
    }

    pub fn viewport(&self) -> Option<&Viewport> {
        self.instance.as_ref().map(|i| &i.viewport)
    }

    pub fn viewport_mut(&mut self) -> Option<&mut Viewport> {
        self.instance.as_mut().map(|i| &mut i.viewport)
    }

    pub fn base_layer(&self) -> Option<&XyzTileLayer> {
        self.instance.as_ref().map(|i| &i.base)
    }

    pub fn tile_layer(&self, member: &str) -> Option<&WmsTileLayer> {
        self.instance.as_ref()?.tile_layers.get(member)
    }

    pub fn tile_layer_mut(&mut self, member: &str) -> Option<&mut WmsTileLayer> {
        self.instance.as_mut()?.tile_layers.get_mut(member)
    }

    pub fn group_layer(&self, name: &str) -> Option<&GroupLayer> {
        self.instance.as_ref()?.group_layers.get(name)
    }

    pub fn group_layer_mut(&mut self, name: &str) -> Option<&mut GroupLayer> {
        self.instance.as_mut()?.group_layers.get_mut(name)
    }

    /// WMS layers in registry order
    pub fn tile_layers(&self) -> impl Iterator<Item = &WmsTileLayer> {
        self.instance.iter().flat_map(|i| {
            i.tile_order
                .iter()
                .filter_map(move |name| i.tile_layers.get(name))
        })
    }

    /// Vector and marker layers in registry order
    pub fn group_layers(&self) -> impl Iterator<Item = &GroupLayer> {
        self.instance.iter().flat_map(|i| {
            i.group_order
                .iter()
                .filter_map(move |name| i.group_layers.get(name))
        })
    }

    /// Drops the map instance and every handle. Returns false if nothing was mounted.
    pub fn teardown(&mut self) -> bool {
        match self.instance.take() {
            Some(instance) => {
                log::info!(
                    "map surface torn down ({} tile layers, {} group layers)",
                    instance.tile_layers.len(),
                    instance.group_layers.len()
                );
                true
            }
            None => false,
        }
    }
}

impl Default for MapSurface {
    fn default() -> Self {
        Self::new(BaseMapConfig::default(), MountainStation::builtin())
    }
}

impl Drop for MapSurface {
    fn drop(&mut self) {
        self.teardown();
    }
}

fn spawn_feature_load(
    group: String,
    url: String,
    fetcher: Arc<dyn AssetFetcher>,
    tx: Sender<FeatureLoad>,
) {
    crate::runtime::spawn(async move {
        let result = match fetcher.fetch_text(&url).await {
            Ok(text) => read_features(&text),
            Err(e) => Err(e),
        };
        // Nobody is listening after teardown
        let _ = tx.send(FeatureLoad { group, url, result });
    });
}

//! Prelude module for common firemap types and traits
//!
//! This module re-exports the most commonly used types, traits, and functions
//! for easy importing with `use firemap::prelude::*;`

pub use crate::core::{
    config::{BaseMapConfig, TileLoadingConfig, ViewerConfig, WeatherConfig},
    geo::{LatLng, LatLngBounds, Point, TileCoord},
    viewport::Viewport,
};

pub use crate::registry::{
    FilterCategory, GroupSource, LayerCategory, LayerGroupConfig, LayerRegistry, OpacityBucket,
};

pub use crate::layers::{
    base::{LayerProperties, LayerTrait, LayerType},
    marker::{MarkerLayer, MarkerStyle, StationFeature},
    vector::{LineStyle, VectorLayer, VectorSource},
    wms::{WmsParams, WmsSource, WmsTileLayer},
    xyz::{XyzSource, XyzTileLayer},
    GroupLayer,
};

pub use crate::data::{
    fetch::{AssetFetcher, HttpFetcher},
    geojson::{read_features, Feature, Geometry},
    stations::MountainStation,
};

pub use crate::filter::{build_cql_filter, compare_codes, CodeFilter};

pub use crate::state::{SelectedStation, UiState};

pub use crate::surface::{ClickOutcome, MapSurface};

pub use crate::sync::LayerSynchronizer;

pub use crate::tiles::source::TileSource;

pub use crate::weather::{
    observation_time, parse_weather_response, WeatherClient, WeatherError, WeatherObservation,
    WeatherPanel, WeatherRequest, WeatherSource, WeatherState,
};

pub use crate::runtime::spawn;

pub use crate::{Error as MapError, Result};

pub use std::{
    pin::Pin,
    sync::Arc,
    time::{Duration, Instant},
};

pub use fxhash::{FxHashMap as HashMap, FxHashSet as HashSet};

pub use futures::Future;

//! Viewer configuration
//!
//! Every endpoint and key the viewer talks to has a compiled-in default in
//! [`crate::core::constants`]. A JSON file may override any subset of them;
//! missing sections fall back to the defaults.

use crate::core::constants::*;
use crate::core::geo::LatLng;
use crate::{MapError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub base_map: BaseMapConfig,
    pub initial_center: LatLng,
    pub initial_zoom: f64,
    pub weather: WeatherConfig,
    pub tile_loading: TileLoadingConfig,
    /// JSON layer table replacing the built-in registry
    pub registry_path: Option<PathBuf>,
    /// JSON station list replacing the built-in dataset
    pub stations_path: Option<PathBuf>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            base_map: BaseMapConfig::default(),
            initial_center: LatLng::new(INITIAL_CENTER_LAT, INITIAL_CENTER_LNG),
            initial_zoom: INITIAL_ZOOM,
            weather: WeatherConfig::default(),
            tile_loading: TileLoadingConfig::default(),
            registry_path: None,
            stations_path: None,
        }
    }
}

impl ViewerConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        log::info!("loading viewer config from {}", path.as_ref().display());
        Self::from_json_str(&text)
    }

    fn validate(&self) -> Result<()> {
        let template = &self.base_map.url_template;
        if !["{z}", "{x}", "{y}"].iter().all(|p| template.contains(p)) {
            return Err(MapError::Config(format!(
                "base map template must contain {{z}}, {{x}} and {{y}}: {template}"
            )));
        }
        if self.tile_loading.cache_size == 0 {
            return Err(MapError::Config("tile cache size must be positive".into()));
        }
        if self.weather.endpoint.is_empty() {
            return Err(MapError::Config("weather endpoint is empty".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BaseMapConfig {
    pub url_template: String,
    pub attribution: String,
    pub max_zoom: u8,
}

impl Default for BaseMapConfig {
    fn default() -> Self {
        Self {
            url_template: VWORLD_XYZ_URL.to_string(),
            attribution: VWORLD_ATTRIBUTION.to_string(),
            max_zoom: VWORLD_MAX_ZOOM,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    pub endpoint: String,
    /// Inserted into the query verbatim, it is issued already encoded
    pub service_key: String,
    pub page_no: u32,
    pub num_of_rows: u32,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            endpoint: WEATHER_API_URL.to_string(),
            service_key: WEATHER_SERVICE_KEY.to_string(),
            page_no: 1,
            num_of_rows: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TileLoadingConfig {
    /// Decoded tiles kept across all tile layers
    pub cache_size: usize,
    /// Requests started per frame
    pub fetch_batch_size: usize,
}

impl Default for TileLoadingConfig {
    fn default() -> Self {
        Self {
            cache_size: 512,
            fetch_batch_size: 8,
        }
    }
}

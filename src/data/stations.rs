//! Mountain weather stations shown as markers

use crate::core::geo::LatLng;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MountainStation {
    /// Observation point id the weather service is keyed by
    pub obsid: String,
    pub name: String,
    pub area: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl MountainStation {
    pub fn position(&self) -> LatLng {
        LatLng::new(self.latitude, self.longitude)
    }

    /// Reads a JSON array of stations
    pub fn from_json_str(json: &str) -> Result<Vec<Self>> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Vec<Self>> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Placeholder stations around Asan and Cheonan.
    ///
    /// The ids and coordinates are sample values, not the weather service's
    /// station list. Deployments load the real list with
    /// [`MountainStation::from_json_file`] through `stations_path`.
    pub fn builtin() -> Vec<Self> {
        BUILTIN
            .iter()
            .map(|&(obsid, name, area, latitude, longitude)| Self {
                obsid: obsid.to_string(),
                name: name.to_string(),
                area: area.to_string(),
                latitude,
                longitude,
            })
            .collect()
    }
}

const BUILTIN: &[(&str, &str, &str, f64, f64)] = &[
    ("1910", "광덕산", "충남 천안시", 36.6806, 127.0286),
    ("1911", "태화산", "충남 공주시", 36.6412, 127.0718),
    ("1912", "흑성산", "충남 천안시", 36.7758, 127.2408),
    ("1913", "성거산", "충남 천안시", 36.8694, 127.2058),
    ("1914", "영인산", "충남 아산시", 36.8525, 126.9447),
    ("1915", "봉수산", "충남 아산시", 36.6508, 126.8481),
];

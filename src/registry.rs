//! Declarative table of logical layer groups
//!
//! A group is the unit the user toggles. Tile-service groups fan out into one
//! WMS layer per member, file-backed and marker groups render as a single
//! layer. Everything that changes at runtime lives in [`crate::state::UiState`];
//! the registry itself is read-only once built.

use crate::core::constants::{
    GEOSERVER_WMS_URL, HIKING_TRAILS_FILE, IMSANGDO_ATTRIBUTE, SOIL_ATTRIBUTE,
};
use crate::prelude::HashSet;
use crate::{MapError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Category tag of a group, picks the renderer and the opacity bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerCategory {
    Soil,
    Imsangdo,
    HikingTrail,
    MountainStationMarkers,
}

impl LayerCategory {
    pub fn filter_category(self) -> Option<FilterCategory> {
        match self {
            Self::Soil => Some(FilterCategory::Soil),
            Self::Imsangdo => Some(FilterCategory::Imsangdo),
            Self::HikingTrail | Self::MountainStationMarkers => None,
        }
    }

    pub fn opacity_bucket(self) -> Option<OpacityBucket> {
        match self {
            Self::Soil => Some(OpacityBucket::Soil),
            Self::Imsangdo => Some(OpacityBucket::Imsangdo),
            Self::HikingTrail => Some(OpacityBucket::HikingTrail),
            Self::MountainStationMarkers => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Soil => "토양도",
            Self::Imsangdo => "임상도",
            Self::HikingTrail => "등산로",
            Self::MountainStationMarkers => "산악기상관측소",
        }
    }
}

/// Categories whose tiles can be restricted by an attribute code filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterCategory {
    Soil,
    Imsangdo,
}

impl FilterCategory {
    pub const ALL: [FilterCategory; 2] = [FilterCategory::Soil, FilterCategory::Imsangdo];

    /// Feature attribute the CQL expression tests
    pub fn attribute(self) -> &'static str {
        match self {
            Self::Soil => SOIL_ATTRIBUTE,
            Self::Imsangdo => IMSANGDO_ATTRIBUTE,
        }
    }

    pub fn layer_category(self) -> LayerCategory {
        match self {
            Self::Soil => LayerCategory::Soil,
            Self::Imsangdo => LayerCategory::Imsangdo,
        }
    }
}

/// Groups sharing one opacity slider value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpacityBucket {
    Soil,
    Imsangdo,
    HikingTrail,
}

impl OpacityBucket {
    pub const ALL: [OpacityBucket; 3] = [
        OpacityBucket::Soil,
        OpacityBucket::Imsangdo,
        OpacityBucket::HikingTrail,
    ];

    pub fn layer_category(self) -> LayerCategory {
        match self {
            Self::Soil => LayerCategory::Soil,
            Self::Imsangdo => LayerCategory::Imsangdo,
            Self::HikingTrail => LayerCategory::HikingTrail,
        }
    }
}

/// Sub-layers published by one WMS endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileServiceSource {
    pub layer_names: Vec<String>,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileSource {
    pub file_urls: Vec<String>,
}

/// What backs a group; each variant carries only its own fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GroupSource {
    Soil(TileServiceSource),
    Imsangdo(TileServiceSource),
    HikingTrail(FileSource),
    MountainStationMarkers,
}

impl GroupSource {
    pub fn category(&self) -> LayerCategory {
        match self {
            Self::Soil(_) => LayerCategory::Soil,
            Self::Imsangdo(_) => LayerCategory::Imsangdo,
            Self::HikingTrail(_) => LayerCategory::HikingTrail,
            Self::MountainStationMarkers => LayerCategory::MountainStationMarkers,
        }
    }

    pub fn tile_service(&self) -> Option<&TileServiceSource> {
        match self {
            Self::Soil(source) | Self::Imsangdo(source) => Some(source),
            Self::HikingTrail(_) | Self::MountainStationMarkers => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerGroupConfig {
    pub name: String,
    #[serde(default)]
    pub visible: bool,
    #[serde(flatten)]
    pub source: GroupSource,
}

impl LayerGroupConfig {
    pub fn new(name: impl Into<String>, source: GroupSource, visible: bool) -> Self {
        Self {
            name: name.into(),
            visible,
            source,
        }
    }

    pub fn category(&self) -> LayerCategory {
        self.source.category()
    }

    /// Member WMS layer names, empty for non-tile groups
    pub fn member_layers(&self) -> &[String] {
        self.source
            .tile_service()
            .map(|s| s.layer_names.as_slice())
            .unwrap_or(&[])
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayerRegistry {
    groups: Vec<LayerGroupConfig>,
}

impl LayerRegistry {
    pub fn new(groups: Vec<LayerGroupConfig>) -> Result<Self> {
        let mut names = HashSet::default();
        let mut members = HashSet::default();

        for group in &groups {
            if group.name.is_empty() {
                return Err(MapError::Config("layer group name is empty".into()));
            }
            if !names.insert(group.name.as_str()) {
                return Err(MapError::Config(format!(
                    "duplicate layer group name: {}",
                    group.name
                )));
            }

            match &group.source {
                GroupSource::Soil(source) | GroupSource::Imsangdo(source) => {
                    if source.url.is_empty() {
                        return Err(MapError::Config(format!(
                            "group {} has no service endpoint",
                            group.name
                        )));
                    }
                    if source.layer_names.is_empty() {
                        return Err(MapError::Config(format!(
                            "group {} has no member layers",
                            group.name
                        )));
                    }
                    for member in &source.layer_names {
                        // Member names key the tile handle map
                        if !members.insert(member.as_str()) {
                            return Err(MapError::Config(format!(
                                "member layer {member} listed twice"
                            )));
                        }
                    }
                }
                GroupSource::HikingTrail(source) => {
                    if source.file_urls.is_empty() {
                        log::warn!("group {} lists no data files", group.name);
                    }
                }
                GroupSource::MountainStationMarkers => {}
            }
        }

        Ok(Self { groups })
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let groups: Vec<LayerGroupConfig> = serde_json::from_str(json)?;
        Self::new(groups)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn groups(&self) -> &[LayerGroupConfig] {
        &self.groups
    }

    pub fn group(&self, name: &str) -> Option<&LayerGroupConfig> {
        self.groups.iter().find(|g| g.name == name)
    }

    pub fn groups_of(&self, category: LayerCategory) -> impl Iterator<Item = &LayerGroupConfig> {
        self.groups.iter().filter(move |g| g.category() == category)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

impl Default for LayerRegistry {
    fn default() -> Self {
        let tile_group = |prefix: &str| TileServiceSource {
            layer_names: (1..=3).map(|i| format!("{prefix}{i}")).collect(),
            url: GEOSERVER_WMS_URL.to_string(),
        };

        Self {
            groups: vec![
                LayerGroupConfig::new(
                    "아산천안 토양",
                    GroupSource::Soil(tile_group("ne:Asan_Cheonan_Soil_")),
                    false,
                ),
                LayerGroupConfig::new(
                    "임상도",
                    GroupSource::Imsangdo(tile_group("ne:imsangdo_part")),
                    false,
                ),
                LayerGroupConfig::new(
                    "등산로",
                    GroupSource::HikingTrail(FileSource {
                        file_urls: vec![HIKING_TRAILS_FILE.to_string()],
                    }),
                    false,
                ),
                LayerGroupConfig::new(
                    "산악기상관측소",
                    GroupSource::MountainStationMarkers,
                    false,
                ),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_registry() {
        let registry = LayerRegistry::default();
        assert_eq!(registry.len(), 4);
        assert!(registry.groups().iter().all(|g| !g.visible));

        let soil = registry.group("아산천안 토양").unwrap();
        assert_eq!(soil.category(), LayerCategory::Soil);
        assert_eq!(
            soil.member_layers(),
            &[
                "ne:Asan_Cheonan_Soil_1",
                "ne:Asan_Cheonan_Soil_2",
                "ne:Asan_Cheonan_Soil_3"
            ]
        );
        assert!(registry.group("등산로").unwrap().member_layers().is_empty());
        // The default table must pass its own validation
        assert!(LayerRegistry::new(registry.groups().to_vec()).is_ok());
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let group = LayerGroupConfig::new("A", GroupSource::MountainStationMarkers, false);
        let result = LayerRegistry::new(vec![group.clone(), group]);
        assert!(matches!(result, Err(MapError::Config(_))));
    }

    #[test]
    fn test_tile_group_needs_members_and_endpoint() {
        let empty_members = LayerGroupConfig::new(
            "A",
            GroupSource::Soil(TileServiceSource {
                layer_names: vec![],
                url: "http://e".into(),
            }),
            false,
        );
        assert!(LayerRegistry::new(vec![empty_members]).is_err());

        let no_url = LayerGroupConfig::new(
            "A",
            GroupSource::Imsangdo(TileServiceSource {
                layer_names: vec!["m".into()],
                url: String::new(),
            }),
            false,
        );
        assert!(LayerRegistry::new(vec![no_url]).is_err());
    }

    #[test]
    fn test_json_table() {
        let registry = LayerRegistry::from_json_str(
            r#"[
                { "name": "A", "type": "soil", "visible": true,
                  "layer_names": ["s1", "s2", "s3"], "url": "http://e/wms" },
                { "name": "B", "type": "hiking_trail", "file_urls": ["trails.geojson"] },
                { "name": "C", "type": "mountain_station_markers" }
            ]"#,
        )
        .unwrap();

        assert_eq!(registry.len(), 3);
        assert!(registry.group("A").unwrap().visible);
        assert!(!registry.group("B").unwrap().visible);
        assert_eq!(registry.groups_of(LayerCategory::Soil).count(), 1);
        assert_eq!(
            registry.group("C").unwrap().category(),
            LayerCategory::MountainStationMarkers
        );
    }

    #[test]
    fn test_unknown_category_rejected() {
        let result = LayerRegistry::from_json_str(r#"[{ "name": "A", "type": "lava" }]"#);
        assert!(matches!(result, Err(MapError::Serialization(_))));
    }

    #[test]
    fn test_category_mappings() {
        assert_eq!(FilterCategory::Soil.attribute(), "SLTP_CD");
        assert_eq!(FilterCategory::Imsangdo.attribute(), "FRTP_CD");
        assert_eq!(LayerCategory::HikingTrail.filter_category(), None);
        assert_eq!(LayerCategory::MountainStationMarkers.opacity_bucket(), None);
        assert_eq!(
            LayerCategory::HikingTrail.opacity_bucket(),
            Some(OpacityBucket::HikingTrail)
        );
    }
}

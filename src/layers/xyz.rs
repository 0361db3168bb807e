use crate::core::config::BaseMapConfig;
use crate::core::geo::TileCoord;
use crate::layers::base::{LayerProperties, LayerTrait, LayerType};
use crate::tiles::source::TileSource;

/// Slippy-map source built from a `{z}/{x}/{y}` URL template
#[derive(Debug, Clone, PartialEq)]
pub struct XyzSource {
    template: String,
    max_zoom: u8,
}

impl XyzSource {
    pub fn new(template: impl Into<String>, max_zoom: u8) -> Self {
        Self {
            template: template.into(),
            max_zoom,
        }
    }

    pub fn template(&self) -> &str {
        &self.template
    }
}

impl TileSource for XyzSource {
    fn url(&self, coord: TileCoord) -> String {
        self.template
            .replace("{z}", &coord.z.to_string())
            .replace("{x}", &coord.x.to_string())
            .replace("{y}", &coord.y.to_string())
    }

    fn max_zoom(&self) -> u8 {
        self.max_zoom
    }
}

/// Base map layer, always drawn beneath every group layer
pub struct XyzTileLayer {
    properties: LayerProperties,
    source: XyzSource,
    attribution: String,
}

impl XyzTileLayer {
    pub fn from_config(config: &BaseMapConfig) -> Self {
        Self {
            properties: LayerProperties::new(
                "base".to_string(),
                "VWorld".to_string(),
                LayerType::Tile,
            )
            .with_z_index(0),
            source: XyzSource::new(config.url_template.clone(), config.max_zoom),
            attribution: config.attribution.clone(),
        }
    }

    pub fn source(&self) -> &XyzSource {
        &self.source
    }

    pub fn attribution(&self) -> &str {
        &self.attribution
    }
}

impl LayerTrait for XyzTileLayer {
    crate::impl_layer_trait!(XyzTileLayer, properties);
}

//! GeoServer WMS tile layers
//!
//! One layer per member of a tile-service group. The CQL filter is part of the
//! request query, so changing it changes every tile URL and the view refetches
//! without the layer being recreated.

use crate::core::constants::{TILE_SIZE, WMS_FORMAT, WMS_VERSION};
use crate::core::geo::TileCoord;
use crate::layers::base::{LayerProperties, LayerTrait, LayerType};
use crate::tiles::source::TileSource;
use crate::{MapError, Result};
use reqwest::Url;

/// GetMap parameters that stay fixed per layer, plus the optional filter
#[derive(Debug, Clone, PartialEq)]
pub struct WmsParams {
    pub layers: String,
    pub styles: String,
    pub format: String,
    pub version: String,
    pub transparent: bool,
    pub tiled: bool,
    pub srs: String,
    cql_filter: Option<String>,
}

impl WmsParams {
    pub fn new(layers: impl Into<String>) -> Self {
        Self {
            layers: layers.into(),
            styles: String::new(),
            format: WMS_FORMAT.to_string(),
            version: WMS_VERSION.to_string(),
            transparent: true,
            tiled: true,
            srs: "EPSG:3857".to_string(),
            cql_filter: None,
        }
    }

    pub fn cql_filter(&self) -> Option<&str> {
        self.cql_filter.as_deref()
    }

    /// `None` removes the parameter from requests. Returns whether anything changed.
    pub fn set_cql_filter(&mut self, filter: Option<String>) -> bool {
        if self.cql_filter == filter {
            return false;
        }
        self.cql_filter = filter;
        true
    }
}

#[derive(Debug, Clone)]
pub struct WmsSource {
    endpoint: Url,
    params: WmsParams,
}

impl WmsSource {
    pub fn new(endpoint: &str, params: WmsParams) -> Result<Self> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| MapError::Config(format!("invalid WMS endpoint {endpoint}: {e}")))?;
        Ok(Self { endpoint, params })
    }

    pub fn endpoint(&self) -> &str {
        self.endpoint.as_str()
    }

    pub fn params(&self) -> &WmsParams {
        &self.params
    }
}

impl TileSource for WmsSource {
    fn url(&self, coord: TileCoord) -> String {
        let [min_x, min_y, max_x, max_y] = coord.mercator_bounds();
        let size = TILE_SIZE.to_string();
        let p = &self.params;

        let mut url = self.endpoint.clone();
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("SERVICE", "WMS")
                .append_pair("REQUEST", "GetMap")
                .append_pair("VERSION", &p.version)
                .append_pair("LAYERS", &p.layers)
                .append_pair("STYLES", &p.styles)
                .append_pair("FORMAT", &p.format)
                .append_pair("TRANSPARENT", if p.transparent { "true" } else { "false" })
                .append_pair("TILED", if p.tiled { "true" } else { "false" })
                .append_pair("SRS", &p.srs)
                .append_pair("WIDTH", &size)
                .append_pair("HEIGHT", &size)
                .append_pair("BBOX", &format!("{min_x},{min_y},{max_x},{max_y}"));
            if let Some(filter) = &p.cql_filter {
                query.append_pair("CQL_FILTER", filter);
            }
        }
        url.into()
    }
}

/// Tile layer handle for one WMS member layer
pub struct WmsTileLayer {
    properties: LayerProperties,
    source: WmsSource,
}

impl WmsTileLayer {
    /// `member` is both the layer id and the `LAYERS` value; `group` is the display name
    pub fn new(member: &str, group: &str, endpoint: &str) -> Result<Self> {
        let source = WmsSource::new(endpoint, WmsParams::new(member))?;
        Ok(Self {
            properties: LayerProperties::new(member.to_string(), group.to_string(), LayerType::Tile)
                .with_z_index(10),
            source,
        })
    }

    pub fn with_visibility(mut self, visible: bool) -> Self {
        self.properties.visible = visible;
        self
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.properties.opacity = opacity.clamp(0.0, 1.0);
        self
    }

    pub fn source(&self) -> &WmsSource {
        &self.source
    }

    pub fn cql_filter(&self) -> Option<&str> {
        self.source.params.cql_filter()
    }

    pub fn set_cql_filter(&mut self, filter: Option<String>) -> bool {
        let changed = self.source.params.set_cql_filter(filter);
        if changed {
            log::debug!(
                "{} CQL_FILTER -> {}",
                self.properties.id,
                self.cql_filter().unwrap_or("<none>")
            );
        }
        changed
    }
}

impl LayerTrait for WmsTileLayer {
    crate::impl_layer_trait!(WmsTileLayer, properties);
}

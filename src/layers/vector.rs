use crate::core::geo::LatLngBounds;
use crate::data::geojson::Feature;
use crate::layers::base::{LayerProperties, LayerTrait, LayerType};
use crate::legend::{parse_hex_color, HIKING_TRAIL_COLOR};

#[cfg(feature = "egui")]
use egui::Color32;

use serde::{Deserialize, Serialize};

/// Serializable color type that can convert to/from egui::Color32
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

#[cfg(feature = "egui")]
impl From<Color32> for SerializableColor {
    fn from(color: Color32) -> Self {
        let [r, g, b, a] = color.to_srgba_unmultiplied();
        Self { r, g, b, a }
    }
}

#[cfg(feature = "egui")]
impl From<SerializableColor> for Color32 {
    fn from(color: SerializableColor) -> Self {
        Color32::from_rgba_unmultiplied(color.r, color.g, color.b, color.a)
    }
}

impl SerializableColor {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub fn from_hex(hex: &str) -> Option<Self> {
        parse_hex_color(hex).map(|[r, g, b, a]| Self { r, g, b, a })
    }

    /// Scales alpha by a layer opacity
    pub fn faded(self, opacity: f32) -> Self {
        let a = (self.a as f32 * opacity.clamp(0.0, 1.0)).round() as u8;
        Self { a, ..self }
    }
}

/// Style for line features
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineStyle {
    /// Line color
    pub color: SerializableColor,
    /// Line width
    pub width: f32,
    /// Alternating dash and gap lengths in pixels (empty for solid line)
    pub dash_pattern: Vec<f32>,
}

impl LineStyle {
    /// Dashed purple stroke used for hiking trails
    pub fn hiking_trail() -> Self {
        Self {
            color: SerializableColor::from_hex(HIKING_TRAIL_COLOR)
                .unwrap_or(SerializableColor::rgb(0x4a, 0x14, 0x8c)),
            width: 2.0,
            dash_pattern: vec![5.0, 5.0],
        }
    }

    pub fn is_dashed(&self) -> bool {
        self.dash_pattern.iter().any(|len| *len > 0.0)
    }
}

impl Default for LineStyle {
    fn default() -> Self {
        Self {
            color: SerializableColor::rgb(0, 0, 255),
            width: 2.0,
            dash_pattern: Vec::new(),
        }
    }
}

/// In-memory feature store filled after the data file arrives
#[derive(Debug, Clone, Default)]
pub struct VectorSource {
    features: Vec<Feature>,
}

impl VectorSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_features(&mut self, features: impl IntoIterator<Item = Feature>) {
        self.features.extend(features);
    }

    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn clear(&mut self) {
        self.features.clear();
    }

    pub fn bounds(&self) -> Option<LatLngBounds> {
        self.features
            .iter()
            .filter_map(|f| f.geometry.bounds())
            .reduce(|a, b| a.union(&b))
    }
}

/// Vector layer for displaying line features
pub struct VectorLayer {
    properties: LayerProperties,
    source: VectorSource,
    style: LineStyle,
}

impl VectorLayer {
    pub fn new(id: String, name: String, style: LineStyle) -> Self {
        Self {
            properties: LayerProperties::new(id, name, LayerType::Vector).with_z_index(20),
            source: VectorSource::new(),
            style,
        }
    }

    pub fn with_visibility(mut self, visible: bool) -> Self {
        self.properties.visible = visible;
        self
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.properties.opacity = opacity.clamp(0.0, 1.0);
        self
    }

    pub fn source(&self) -> &VectorSource {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut VectorSource {
        &mut self.source
    }

    pub fn style(&self) -> &LineStyle {
        &self.style
    }
}

impl LayerTrait for VectorLayer {
    crate::impl_layer_trait!(VectorLayer, properties);

    fn bounds(&self) -> Option<LatLngBounds> {
        self.source.bounds()
    }
}

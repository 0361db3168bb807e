use crate::core::constants::MARKER_HIT_TOLERANCE;
use crate::core::geo::{LatLng, LatLngBounds, Point};
use crate::core::viewport::Viewport;
use crate::data::stations::MountainStation;
use crate::layers::base::{LayerProperties, LayerTrait, LayerType};
use crate::layers::vector::SerializableColor;
use crate::state::SelectedStation;

/// Point feature tagged with the station it represents
#[derive(Debug, Clone, PartialEq)]
pub struct StationFeature {
    pub obsid: String,
    pub name: String,
    pub area: String,
    pub position: LatLng,
}

impl StationFeature {
    pub fn selection(&self) -> SelectedStation {
        SelectedStation::new(self.obsid.clone(), self.name.clone())
    }
}

impl From<&MountainStation> for StationFeature {
    fn from(station: &MountainStation) -> Self {
        Self {
            obsid: station.obsid.clone(),
            name: station.name.clone(),
            area: station.area.clone(),
            position: station.position(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarkerStyle {
    pub radius: f32,
    pub fill_color: SerializableColor,
    pub stroke_color: SerializableColor,
    pub stroke_width: f32,
}

impl Default for MarkerStyle {
    fn default() -> Self {
        Self {
            radius: 7.0,
            // rgba(0, 128, 0, 0.8)
            fill_color: SerializableColor::new(0, 128, 0, 204),
            stroke_color: SerializableColor::rgb(255, 255, 255),
            stroke_width: 1.5,
        }
    }
}

/// Circle markers for the mountain weather stations
pub struct MarkerLayer {
    properties: LayerProperties,
    features: Vec<StationFeature>,
    style: MarkerStyle,
}

impl MarkerLayer {
    pub fn new(id: String, name: String, features: Vec<StationFeature>) -> Self {
        Self {
            properties: LayerProperties::new(id, name, LayerType::Marker).with_z_index(30),
            features,
            style: MarkerStyle::default(),
        }
    }

    pub fn from_stations(id: String, name: String, stations: &[MountainStation]) -> Self {
        Self::new(id, name, stations.iter().map(StationFeature::from).collect())
    }

    pub fn with_visibility(mut self, visible: bool) -> Self {
        self.properties.visible = visible;
        self
    }

    pub fn features(&self) -> &[StationFeature] {
        &self.features
    }

    pub fn style(&self) -> &MarkerStyle {
        &self.style
    }

    /// Closest marker whose drawn circle (plus a small tolerance) covers `pixel`
    pub fn hit_test(&self, viewport: &Viewport, pixel: Point) -> Option<&StationFeature> {
        let reach = (self.style.radius + self.style.stroke_width / 2.0) as f64 + MARKER_HIT_TOLERANCE;

        self.features
            .iter()
            .map(|f| (f, viewport.lat_lng_to_pixel(&f.position).distance_to(&pixel)))
            .filter(|(_, distance)| *distance <= reach)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(feature, _)| feature)
    }
}

impl LayerTrait for MarkerLayer {
    crate::impl_layer_trait!(MarkerLayer, properties);

    fn bounds(&self) -> Option<LatLngBounds> {
        let points: Vec<LatLng> = self.features.iter().map(|f| f.position).collect();
        LatLngBounds::from_points(&points)
    }
}

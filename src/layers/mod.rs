pub mod base;
pub mod macros;
pub mod marker;
pub mod vector;
pub mod wms;
pub mod xyz;

use base::LayerTrait;
use marker::MarkerLayer;
use vector::VectorLayer;

/// Handle registered under a group name: one per file-backed or marker group
pub enum GroupLayer {
    Vector(VectorLayer),
    Markers(MarkerLayer),
}

impl GroupLayer {
    pub fn as_layer(&self) -> &dyn LayerTrait {
        match self {
            GroupLayer::Vector(layer) => layer,
            GroupLayer::Markers(layer) => layer,
        }
    }

    pub fn as_layer_mut(&mut self) -> &mut dyn LayerTrait {
        match self {
            GroupLayer::Vector(layer) => layer,
            GroupLayer::Markers(layer) => layer,
        }
    }

    pub fn as_vector(&self) -> Option<&VectorLayer> {
        match self {
            GroupLayer::Vector(layer) => Some(layer),
            GroupLayer::Markers(_) => None,
        }
    }

    pub fn as_vector_mut(&mut self) -> Option<&mut VectorLayer> {
        match self {
            GroupLayer::Vector(layer) => Some(layer),
            GroupLayer::Markers(_) => None,
        }
    }

    pub fn as_markers(&self) -> Option<&MarkerLayer> {
        match self {
            GroupLayer::Markers(layer) => Some(layer),
            GroupLayer::Vector(_) => None,
        }
    }
}

//! # firemap
//!
//! A wildfire layer viewer built around a declarative layer registry.
//!
//! The registry names logical layer groups (soil, forest stand, hiking
//! trails, mountain weather stations). The [`surface::MapSurface`] turns it
//! into renderable layers once per mount, and the [`sync::LayerSynchronizer`]
//! keeps those layers consistent with the user-facing [`state::UiState`]
//! without recreating them.

pub mod core;
pub mod data;
pub mod filter;
pub mod layers;
pub mod legend;
pub mod prelude;
pub mod registry;
pub mod runtime;
pub mod state;
pub mod surface;
pub mod sync;
pub mod tiles;
pub mod weather;

#[cfg(feature = "egui")]
pub mod ui;

pub use crate::core::constants;

// Re-export public API
pub use core::{
    config::ViewerConfig,
    geo::{LatLng, LatLngBounds, Point, TileCoord},
    viewport::Viewport,
};

pub use registry::{GroupSource, LayerCategory, LayerGroupConfig, LayerRegistry};

pub use state::{SelectedStation, UiState};

pub use surface::{ClickOutcome, MapSurface};

pub use sync::LayerSynchronizer;

pub use weather::{WeatherClient, WeatherObservation, WeatherPanel};

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, MapError>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Layer error: {0}")]
    Layer(String),

    #[error("Invalid viewport: {0}")]
    InvalidViewport(String),

    #[error("Map surface is already initialized")]
    AlreadyInitialized,

    #[error("Image error: {0}")]
    Image(String),
}

/// Error type alias for convenience
pub type Error = MapError;

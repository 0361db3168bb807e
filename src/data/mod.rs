pub mod fetch;
pub mod geojson;
pub mod stations;

pub use fetch::{AssetFetcher, HttpFetcher};
pub use geojson::{read_features, Feature, Geometry};
pub use stations::MountainStation;

use crate::core::geo::{LatLng, LatLngBounds};
use crate::{MapError, Result};
use serde::{Deserialize, Serialize};

/// Raw position; extra ordinates (elevation) are accepted and ignored
pub type Position = Vec<f64>;

/// GeoJSON geometry as it appears on the wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GeoJsonGeometry {
    Point {
        coordinates: Position,
    },
    LineString {
        coordinates: Vec<Position>,
    },
    Polygon {
        coordinates: Vec<Vec<Position>>,
    },
    MultiPoint {
        coordinates: Vec<Position>,
    },
    MultiLineString {
        coordinates: Vec<Vec<Position>>,
    },
    MultiPolygon {
        coordinates: Vec<Vec<Vec<Position>>>,
    },
    GeometryCollection {
        geometries: Vec<GeoJsonGeometry>,
    },
}

/// GeoJSON feature with geometry and properties
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoJsonFeature {
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    pub geometry: Option<GeoJsonGeometry>,
    #[serde(default)]
    pub properties: Option<serde_json::Map<String, serde_json::Value>>,
}

/// Root GeoJSON object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GeoJson {
    Feature(GeoJsonFeature),
    FeatureCollection { features: Vec<GeoJsonFeature> },
}

/// Geometry with positions read as longitude/latitude degrees
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Point(LatLng),
    MultiPoint(Vec<LatLng>),
    LineString(Vec<LatLng>),
    MultiLineString(Vec<Vec<LatLng>>),
    /// Rings, exterior first
    Polygon(Vec<Vec<LatLng>>),
    MultiPolygon(Vec<Vec<Vec<LatLng>>>),
}

impl Geometry {
    /// Every polyline to stroke: line strings and polygon rings
    pub fn lines(&self) -> Vec<&[LatLng]> {
        match self {
            Geometry::Point(_) | Geometry::MultiPoint(_) => Vec::new(),
            Geometry::LineString(line) => vec![line.as_slice()],
            Geometry::MultiLineString(lines) | Geometry::Polygon(lines) => {
                lines.iter().map(Vec::as_slice).collect()
            }
            Geometry::MultiPolygon(polygons) => polygons
                .iter()
                .flat_map(|rings| rings.iter().map(Vec::as_slice))
                .collect(),
        }
    }

    pub fn points(&self) -> Vec<LatLng> {
        match self {
            Geometry::Point(p) => vec![*p],
            Geometry::MultiPoint(points) => points.clone(),
            _ => self.lines().into_iter().flatten().copied().collect(),
        }
    }

    pub fn bounds(&self) -> Option<LatLngBounds> {
        LatLngBounds::from_points(&self.points())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub id: Option<serde_json::Value>,
    pub geometry: Geometry,
    pub properties: serde_json::Map<String, serde_json::Value>,
}

impl Feature {
    pub fn property(&self, key: &str) -> Option<&serde_json::Value> {
        self.properties.get(key)
    }
}

fn position(raw: &Position) -> Result<LatLng> {
    match raw.as_slice() {
        [lng, lat, ..] => Ok(LatLng::from_lng_lat([*lng, *lat])),
        _ => Err(MapError::ParseError(format!(
            "position needs at least two ordinates, got {}",
            raw.len()
        ))),
    }
}

fn positions(raw: &[Position]) -> Result<Vec<LatLng>> {
    raw.iter().map(position).collect()
}

fn rings(raw: &[Vec<Position>]) -> Result<Vec<Vec<LatLng>>> {
    raw.iter().map(|ring| positions(ring)).collect()
}

/// Flattens collections so each returned geometry is a single kind
fn convert(geometry: &GeoJsonGeometry, out: &mut Vec<Geometry>) -> Result<()> {
    match geometry {
        GeoJsonGeometry::Point { coordinates } => out.push(Geometry::Point(position(coordinates)?)),
        GeoJsonGeometry::MultiPoint { coordinates } => {
            out.push(Geometry::MultiPoint(positions(coordinates)?))
        }
        GeoJsonGeometry::LineString { coordinates } => {
            out.push(Geometry::LineString(positions(coordinates)?))
        }
        GeoJsonGeometry::MultiLineString { coordinates } => {
            out.push(Geometry::MultiLineString(rings(coordinates)?))
        }
        GeoJsonGeometry::Polygon { coordinates } => out.push(Geometry::Polygon(rings(coordinates)?)),
        GeoJsonGeometry::MultiPolygon { coordinates } => out.push(Geometry::MultiPolygon(
            coordinates.iter().map(|p| rings(p)).collect::<Result<_>>()?,
        )),
        GeoJsonGeometry::GeometryCollection { geometries } => {
            for inner in geometries {
                convert(inner, out)?;
            }
        }
    }
    Ok(())
}

/// Reads a Feature or FeatureCollection document.
///
/// Coordinates stay in geographic degrees; projection happens at draw time.
/// Features without geometry are skipped.
pub fn read_features(text: &str) -> Result<Vec<Feature>> {
    let document: GeoJson = serde_json::from_str(text)
        .map_err(|e| MapError::ParseError(format!("Invalid GeoJSON: {}", e)))?;

    let raw_features = match document {
        GeoJson::Feature(feature) => vec![feature],
        GeoJson::FeatureCollection { features } => features,
    };

    let mut features = Vec::with_capacity(raw_features.len());
    for raw in raw_features {
        let Some(geometry) = raw.geometry else {
            continue;
        };

        let mut geometries = Vec::new();
        convert(&geometry, &mut geometries)?;

        let properties = raw.properties.unwrap_or_default();
        for geometry in geometries {
            features.push(Feature {
                id: raw.id.clone(),
                geometry,
                properties: properties.clone(),
            });
        }
    }

    Ok(features)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_collection() {
        let text = r#"{
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "geometry": { "type": "LineString", "coordinates": [[127.0, 36.7], [127.1, 36.8, 120.5]] },
                    "properties": { "name": "광덕산 등산로" }
                },
                {
                    "type": "Feature",
                    "geometry": { "type": "MultiLineString", "coordinates": [[[127.2, 36.9], [127.3, 37.0]]] },
                    "properties": null
                },
                { "type": "Feature", "geometry": null, "properties": {} }
            ]
        }"#;

        let features = read_features(text).unwrap();
        assert_eq!(features.len(), 2);
        assert_eq!(
            features[0].geometry,
            Geometry::LineString(vec![LatLng::new(36.7, 127.0), LatLng::new(36.8, 127.1)])
        );
        assert_eq!(
            features[0].property("name").and_then(|v| v.as_str()),
            Some("광덕산 등산로")
        );
        assert_eq!(features[1].geometry.lines().len(), 1);
        assert!(features[1].properties.is_empty());
    }

    #[test]
    fn test_single_feature_and_collection_geometry() {
        let text = r#"{
            "type": "Feature",
            "id": 7,
            "geometry": {
                "type": "GeometryCollection",
                "geometries": [
                    { "type": "Point", "coordinates": [127.0, 36.5] },
                    { "type": "Polygon", "coordinates": [[[0, 0], [1, 0], [1, 1], [0, 0]]] }
                ]
            },
            "properties": {}
        }"#;

        let features = read_features(text).unwrap();
        assert_eq!(features.len(), 2);
        assert_eq!(features[0].geometry, Geometry::Point(LatLng::new(36.5, 127.0)));
        assert_eq!(features[1].id, Some(serde_json::json!(7)));

        let bounds = features[1].geometry.bounds().unwrap();
        assert_eq!(bounds.north_east, LatLng::new(1.0, 1.0));
    }

    #[test]
    fn test_invalid_documents() {
        assert!(matches!(read_features("not json"), Err(MapError::ParseError(_))));
        let short = r#"{ "type": "Feature", "geometry": { "type": "Point", "coordinates": [1] }, "properties": {} }"#;
        assert!(read_features(short).is_err());
    }
}

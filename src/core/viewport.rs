use crate::core::constants::TILE_SIZE;
use crate::core::geo::{LatLng, LatLngBounds, Point, TileCoord};
use serde::{Deserialize, Serialize};

/// Manages the current view of the map: center, zoom, and screen dimensions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// The center of the map view in geographical coordinates
    pub center: LatLng,
    /// The current zoom level
    pub zoom: f64,
    /// The size of the viewport in pixels
    pub size: Point,
    /// The minimum allowed zoom level
    pub min_zoom: f64,
    /// The maximum allowed zoom level
    pub max_zoom: f64,
}

/// A tile that intersects the viewport, with its on-screen placement
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibleTile {
    pub coord: TileCoord,
    /// Top-left corner relative to the viewport origin
    pub offset: Point,
    /// Edge length on screen in pixels
    pub size: f64,
}

impl Viewport {
    /// Creates a new viewport
    pub fn new(center: LatLng, zoom: f64, size: Point) -> Self {
        Self {
            center,
            zoom: zoom.clamp(0.0, 19.0),
            size,
            min_zoom: 0.0,
            max_zoom: 19.0,
        }
    }

    /// A viewport is usable once it has a non-empty area
    pub fn has_area(&self) -> bool {
        self.size.x >= 1.0 && self.size.y >= 1.0
    }

    /// Sets the center of the viewport, clamped to the projectable world
    pub fn set_center(&mut self, center: LatLng) {
        self.center = LatLng::new(
            LatLng::clamp_lat(center.lat),
            center.lng.clamp(-180.0, 180.0),
        );
    }

    /// Sets the zoom level, clamping to valid range
    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = zoom.clamp(self.min_zoom, self.max_zoom);
    }

    /// Sets the viewport size
    pub fn set_size(&mut self, size: Point) {
        self.size = size;
    }

    /// Sets the zoom limits
    pub fn set_zoom_limits(&mut self, min_zoom: f64, max_zoom: f64) {
        self.min_zoom = min_zoom;
        self.max_zoom = max_zoom;
        self.zoom = self.zoom.clamp(min_zoom, max_zoom);
    }

    /// Gets the scale factor for the current zoom level
    pub fn scale(&self) -> f64 {
        2_f64.powf(self.zoom)
    }

    /// Projects a LatLng to world pixel coordinates at the given zoom level (EPSG:3857)
    pub fn project(&self, lat_lng: &LatLng, zoom: Option<f64>) -> Point {
        let z = zoom.unwrap_or(self.zoom);
        let world = TILE_SIZE as f64 * 2_f64.powf(z);
        let mercator = lat_lng.to_mercator();
        let half = std::f64::consts::PI * crate::core::geo::EARTH_RADIUS;

        Point::new(
            (mercator.x + half) / (2.0 * half) * world,
            (half - mercator.y) / (2.0 * half) * world,
        )
    }

    /// Unprojects world pixel coordinates back to LatLng at the given zoom level
    pub fn unproject(&self, pixel: &Point, zoom: Option<f64>) -> LatLng {
        let z = zoom.unwrap_or(self.zoom);
        let world = TILE_SIZE as f64 * 2_f64.powf(z);
        let half = std::f64::consts::PI * crate::core::geo::EARTH_RADIUS;

        LatLng::from_mercator(Point::new(
            pixel.x / world * (2.0 * half) - half,
            half - pixel.y / world * (2.0 * half),
        ))
    }

    /// World pixel coordinate of the viewport's top-left corner
    fn pixel_origin(&self) -> Point {
        self.project(&self.center, None)
            .subtract(&self.size.multiply(0.5))
    }

    /// Converts a geographical coordinate to screen pixel coordinates (container relative)
    pub fn lat_lng_to_pixel(&self, lat_lng: &LatLng) -> Point {
        self.project(lat_lng, None).subtract(&self.pixel_origin())
    }

    /// Converts container pixel coordinates to a geographical coordinate
    pub fn pixel_to_lat_lng(&self, pixel: &Point) -> LatLng {
        self.unproject(&self.pixel_origin().add(pixel), None)
    }

    /// Moves the view by `offset` screen pixels; returns the applied offset
    pub fn pan(&mut self, offset: Point) -> Point {
        let center_px = self.project(&self.center, None).add(&offset);
        let before = self.center;
        self.set_center(self.unproject(&center_px, None));

        self.project(&self.center, None)
            .subtract(&self.project(&before, None))
    }

    /// Zooms the viewport to a specific level, keeping `focus_point` fixed on screen
    pub fn zoom_to(&mut self, zoom: f64, focus_point: Option<Point>) {
        let new_zoom = zoom.clamp(self.min_zoom, self.max_zoom);

        if (new_zoom - self.zoom).abs() < 0.001 {
            return;
        }

        match focus_point {
            Some(focus_screen) => {
                let focus_lat_lng = self.pixel_to_lat_lng(&focus_screen);
                self.zoom = new_zoom;
                let drifted = self.lat_lng_to_pixel(&focus_lat_lng);
                self.pan(drifted.subtract(&focus_screen));
            }
            None => self.zoom = new_zoom,
        }
    }

    /// Gets the current viewport bounds in geographical coordinates
    pub fn bounds(&self) -> LatLngBounds {
        let nw = self.pixel_to_lat_lng(&Point::new(0.0, 0.0));
        let se = self.pixel_to_lat_lng(&self.size);

        LatLngBounds::new(LatLng::new(se.lat, nw.lng), LatLng::new(nw.lat, se.lng))
    }

    /// Integer zoom used to request tiles, capped at `max_tile_zoom`
    pub fn tile_zoom(&self, max_tile_zoom: u8) -> u8 {
        (self.zoom.round().max(0.0) as u8).min(max_tile_zoom)
    }

    /// Every tile covering the viewport at the tile zoom, row by row
    pub fn visible_tiles(&self, max_tile_zoom: u8) -> Vec<VisibleTile> {
        if !self.has_area() {
            return Vec::new();
        }

        let z = self.tile_zoom(max_tile_zoom);
        let factor = 2_f64.powf(self.zoom - z as f64);
        let tile_px = TILE_SIZE as f64 * factor;
        let origin = self.pixel_origin();
        let last = (1_u64 << z) as f64 - 1.0;

        let first_x = (origin.x / tile_px).floor().clamp(0.0, last) as u32;
        let first_y = (origin.y / tile_px).floor().clamp(0.0, last) as u32;
        let last_x = ((origin.x + self.size.x) / tile_px).floor().clamp(0.0, last) as u32;
        let last_y = ((origin.y + self.size.y) / tile_px).floor().clamp(0.0, last) as u32;

        let mut tiles = Vec::new();
        for y in first_y..=last_y {
            for x in first_x..=last_x {
                tiles.push(VisibleTile {
                    coord: TileCoord::new(x, y, z),
                    offset: Point::new(x as f64 * tile_px - origin.x, y as f64 * tile_px - origin.y),
                    size: tile_px,
                });
            }
        }
        tiles
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(LatLng::new(0.0, 0.0), 0.0, Point::new(800.0, 600.0))
    }
}

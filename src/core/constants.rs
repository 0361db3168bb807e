//! Embedded endpoints, keys and engine-wide magic numbers.
//! Keeping them in a single place makes it easier to point a build at another server.

/// Default square tile size in pixels.
pub const TILE_SIZE: u32 = 256;

/// VWorld base map, XYZ template with the API key already in the query.
pub const VWORLD_XYZ_URL: &str =
    "http://xdworld.vworld.kr:8080/2d/Base/201802/{z}/{x}/{y}.png?apiKey=B60B525E-129D-3B8B-880F-77C24CF86AE3";

/// Attribution shown for the base map.
pub const VWORLD_ATTRIBUTION: &str = "© VWorld";

/// Highest zoom served by the base map.
pub const VWORLD_MAX_ZOOM: u8 = 19;

/// GeoServer WMS endpoint shared by the soil and forest-stand layers.
pub const GEOSERVER_WMS_URL: &str = "http://localhost:8080/geoserver/ne/wms";

/// Hiking trail GeoJSON served next to the application.
pub const HIKING_TRAILS_FILE: &str = "merged_hiking_trails.geojson";

/// Mountain weather observation service.
pub const WEATHER_API_URL: &str = "http://apis.data.go.kr/1400377/mtweather/mountListSearch";

/// Service key exactly as issued by the data portal (already percent-encoded).
pub const WEATHER_SERVICE_KEY: &str =
    "q1XWOAcb5VskyP5OQGl%2B08hLR9MyROzs%2Fav5AbVDjLpvMEbcl4qlFU%2BxSf6oxNDm2XGu0ljXk6cjUocIPX7N8Q%3D%3D";

/// Initial view: central South Korea.
pub const INITIAL_CENTER_LAT: f64 = 36.5;
pub const INITIAL_CENTER_LNG: f64 = 127.8;
pub const INITIAL_ZOOM: f64 = 7.0;

/// WMS protocol version requested from GeoServer.
pub const WMS_VERSION: &str = "1.1.1";

/// Image format requested for WMS tiles.
pub const WMS_FORMAT: &str = "image/png";

/// Attribute carrying the soil type code.
pub const SOIL_ATTRIBUTE: &str = "SLTP_CD";

/// Attribute carrying the forest-stand type code.
pub const IMSANGDO_ATTRIBUTE: &str = "FRTP_CD";

/// Extra pixels around a marker that still count as a hit.
pub const MARKER_HIT_TOLERANCE: f64 = 3.0;

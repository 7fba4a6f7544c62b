//! Viewer-wide constants derived from the published map services and the
//! permalink wire format. Keeping them in a single place makes it easier
//! to tweak the magic numbers.

/// Fallback view center (longitude, latitude) when the permalink has none.
pub const DEFAULT_CENTER_LON_LAT: (f64, f64) = (24.94, 60.19);

/// Fallback zoom level.
pub const DEFAULT_ZOOM: f64 = 5.0;

/// Index into the layer catalog used when no valid `layer` is given.
pub const DEFAULT_LAYER_INDEX: usize = 1;

/// Catalog indices seeded for the left / right map of split mode.
pub const DEFAULT_SPLIT_LEFT_INDEX: usize = 1;
pub const DEFAULT_SPLIT_RIGHT_INDEX: usize = 0;

/// Zoom range a permalink may request.
pub const MIN_ZOOM: f64 = 0.0;
pub const MAX_ZOOM: f64 = 28.0;

/// Zoom applied when a place is picked from the search box.
pub const SEARCH_ZOOM: f64 = 14.0;

/// Decimal places used for coordinates in the query string.
pub const COORD_DECIMALS: usize = 7;

/// Decimal places used for the zoom level in the query string.
pub const ZOOM_DECIMALS: i32 = 3;

/// Minimum number of vertices for each drawable geometry.
pub const MIN_LINE_POINTS: usize = 2;
pub const MIN_POLYGON_POINTS: usize = 3;
pub const MIN_MEASURE_POINTS: usize = 2;

/// Stacking order of the layer kinds above the base layer.
pub const Z_WMS_OVERLAY: i32 = 50;
pub const Z_OSM_OVERLAY: i32 = 60;
pub const Z_SEARCH_MARKER: i32 = 100;
pub const Z_CLICK_MARKER: i32 = 101;
pub const Z_DRAWN_LINE: i32 = 102;
pub const Z_DRAWN_POLYGON: i32 = 103;
pub const Z_MEASURE_LINE: i32 = 104;

/// Opacity of WMS overlay tiles.
pub const WMS_OVERLAY_OPACITY: f32 = 0.7;

/// WMTS tile matrix set requested from the capabilities document.
pub const TILE_MATRIX_SET: &str = "WGS84_Pseudo-Mercator";

/// Projection every map instance uses.
pub const EPSG: &str = "EPSG:3857";

/// Colours handed out to OSM datasets in selection order.
pub const OSM_COLOR_PALETTE: [&str; 15] = [
    "#e74c3c", "#3498db", "#2ecc71", "#f39c12", "#9b59b6", "#1abc9c", "#e67e22", "#34495e",
    "#f1c40f", "#e91e63", "#00bcd4", "#4caf50", "#ff9800", "#795548", "#607d8b",
];

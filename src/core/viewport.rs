use crate::core::{
    constants::{MAX_ZOOM, MIN_ZOOM},
    geo::{LonLat, Point},
};
use serde::{Deserialize, Serialize};

/// Map units per pixel at zoom 0 for 256px Web Mercator tiles.
const RESOLUTION_AT_ZOOM_0: f64 = 156_543.033_928_040_97;

/// Tolerance below which two view components count as equal.
const VIEW_EPSILON: f64 = 1e-9;

/// The current view of one map: center, zoom and rotation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    /// The center of the map view in projected coordinates
    pub center: Point,
    /// The current zoom level
    pub zoom: f64,
    /// Rotation in radians, clockwise
    pub rotation: f64,
}

impl ViewState {
    /// Creates a new view
    pub fn new(center: Point, zoom: f64, rotation: f64) -> Self {
        Self {
            center,
            zoom,
            rotation,
        }
    }

    /// Creates a north-up view from a geographic center
    pub fn from_lon_lat(center: LonLat, zoom: f64) -> Self {
        Self::new(center.to_projected(), zoom, 0.0)
    }

    /// The view with zoom held inside the levels a permalink can carry
    ///
    /// A non-finite zoom is replaced by `fallback_zoom`.
    pub fn clamped(self, fallback_zoom: f64) -> Self {
        let zoom = if self.zoom.is_finite() { self.zoom } else { fallback_zoom };
        Self {
            zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
            ..self
        }
    }

    /// The view center in geographic coordinates
    pub fn center_lon_lat(&self) -> LonLat {
        self.center.to_lon_lat()
    }

    /// Map units per pixel at the current zoom
    pub fn resolution(&self) -> f64 {
        RESOLUTION_AT_ZOOM_0 / 2_f64.powf(self.zoom)
    }

    /// Whether both views show the same thing
    pub fn matches(&self, other: &ViewState) -> bool {
        (self.center.x - other.center.x).abs() <= VIEW_EPSILON
            && (self.center.y - other.center.y).abs() <= VIEW_EPSILON
            && (self.zoom - other.zoom).abs() <= VIEW_EPSILON
            && (self.rotation - other.rotation).abs() <= VIEW_EPSILON
    }

    /// Map coordinate under a container pixel for a container of `size` pixels
    pub fn coordinate_at_pixel(&self, pixel: Point, size: Point) -> Point {
        let resolution = self.resolution();
        let dx = (pixel.x - size.x / 2.0) * resolution;
        let dy = (size.y / 2.0 - pixel.y) * resolution;
        let (sin, cos) = self.rotation.sin_cos();
        Point::new(
            self.center.x + dx * cos - dy * sin,
            self.center.y + dx * sin + dy * cos,
        )
    }
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new(Point::default(), 0.0, 0.0)
    }
}

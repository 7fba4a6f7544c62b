use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::core::constants::{COORD_DECIMALS, ZOOM_DECIMALS};

/// Web Mercator projection constants
const EARTH_RADIUS: f64 = 6378137.0;
const MAX_LATITUDE: f64 = 85.0511287798;

/// Mean earth radius used for geodesic lengths.
const MEAN_EARTH_RADIUS: f64 = 6371008.8;

/// A geographic coordinate in decimal degrees, longitude first as on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LonLat {
    pub lon: f64,
    pub lat: f64,
}

impl LonLat {
    /// Creates a new coordinate
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Validates that the coordinates are within valid ranges
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && self.lat >= -90.0
            && self.lat <= 90.0
            && self.lon >= -180.0
            && self.lon <= 180.0
    }

    /// Calculates the great-circle distance to another coordinate in metres
    pub fn distance_to(&self, other: &LonLat) -> f64 {
        let lat1_rad = self.lat.to_radians();
        let lat2_rad = other.lat.to_radians();
        let delta_lat = (other.lat - self.lat).to_radians();
        let delta_lon = (other.lon - self.lon).to_radians();

        let a = (delta_lat / 2.0).sin().powi(2)
            + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

        MEAN_EARTH_RADIUS * c
    }

    /// Clamps latitude to the range Web Mercator can represent
    pub fn clamp_lat(lat: f64) -> f64 {
        lat.clamp(-MAX_LATITUDE, MAX_LATITUDE)
    }

    /// Converts to Web Mercator projection (EPSG:3857)
    pub fn to_projected(&self) -> Point {
        let x = self.lon.to_radians() * EARTH_RADIUS;
        let lat = Self::clamp_lat(self.lat);
        let y = ((PI / 4.0 + lat.to_radians() / 2.0).tan().ln()) * EARTH_RADIUS;
        Point::new(x, y)
    }

    /// Creates a coordinate from Web Mercator metres
    pub fn from_projected(point: Point) -> Self {
        let lon = (point.x / EARTH_RADIUS).to_degrees();
        let lat = (2.0 * (point.y / EARTH_RADIUS).exp().atan() - PI / 2.0).to_degrees();
        Self::new(lon, lat)
    }

    /// Rounds both components to the precision carried by the permalink.
    pub fn quantized(&self) -> Self {
        Self::new(quantize7(self.lon), quantize7(self.lat))
    }

    /// `lon,lat` with both components fixed to 7 decimals.
    pub fn to_pair_string(&self) -> String {
        format!("{},{}", fixed7(self.lon), fixed7(self.lat))
    }

    /// Component-wise comparison within `epsilon` degrees.
    pub fn approx_eq(&self, other: &LonLat, epsilon: f64) -> bool {
        (self.lon - other.lon).abs() <= epsilon && (self.lat - other.lat).abs() <= epsilon
    }
}

impl Default for LonLat {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

impl From<LonLat> for geo_types::Coord<f64> {
    fn from(value: LonLat) -> Self {
        geo_types::coord! { x: value.lon, y: value.lat }
    }
}

/// Represents a point in projected (EPSG:3857) map coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn add(&self, other: &Point) -> Point {
        Point::new(self.x + other.x, self.y + other.y)
    }

    pub fn subtract(&self, other: &Point) -> Point {
        Point::new(self.x - other.x, self.y - other.y)
    }

    pub fn distance_to(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn to_lon_lat(&self) -> LonLat {
        LonLat::from_projected(*self)
    }
}

impl Default for Point {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

/// Projects a geographic path into map coordinates.
pub fn project_path(coords: &[LonLat]) -> Vec<Point> {
    coords.iter().map(LonLat::to_projected).collect()
}

/// Unprojects a map-coordinate path back to geographic coordinates.
pub fn unproject_path(points: &[Point]) -> Vec<LonLat> {
    points.iter().map(Point::to_lon_lat).collect()
}

/// Formats a coordinate component with the 7 fixed decimals of the wire format.
pub fn fixed7(value: f64) -> String {
    format!("{:.*}", COORD_DECIMALS, value)
}

/// Rounds a coordinate component to 7 decimals.
pub fn quantize7(value: f64) -> f64 {
    fixed7(value).parse().unwrap_or(value)
}

/// Rounds a zoom level to 3 decimals.
pub fn round_zoom(zoom: f64) -> f64 {
    let factor = 10_f64.powi(ZOOM_DECIMALS);
    (zoom * factor).round() / factor
}

/// Formats a zoom level rounded to 3 decimals without trailing zeros (`5`, `7.25`).
pub fn format_zoom(zoom: f64) -> String {
    let rounded = round_zoom(zoom);
    if rounded == 0.0 {
        // avoid "-0"
        return "0".to_string();
    }
    format!("{}", rounded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lon_lat_creation() {
        let coord = LonLat::new(24.94, 60.19);
        assert_eq!(coord.lon, 24.94);
        assert_eq!(coord.lat, 60.19);
        assert!(coord.is_valid());
        assert!(!LonLat::new(181.0, 0.0).is_valid());
        assert!(!LonLat::new(f64::NAN, 0.0).is_valid());
    }

    #[test]
    fn test_distance() {
        let helsinki = LonLat::new(24.9384, 60.1699);
        let tampere = LonLat::new(23.7610, 61.4978);
        let distance = helsinki.distance_to(&tampere);

        // Roughly 160 km apart
        assert!((distance - 160_000.0).abs() < 5_000.0);
    }

    #[test]
    fn test_projection_round_trip() {
        let coord = LonLat::new(24.94, 60.19);
        let back = coord.to_projected().to_lon_lat();
        assert!(back.approx_eq(&coord, 1e-9));
    }

    #[test]
    fn test_projection_origin() {
        let origin = LonLat::new(0.0, 0.0).to_projected();
        assert!(origin.x.abs() < 1e-9);
        assert!(origin.y.abs() < 1e-9);
    }

    #[test]
    fn test_fixed_precision_helpers() {
        assert_eq!(fixed7(24.94), "24.9400000");
        assert_eq!(fixed7(-0.123456789), "-0.1234568");
        assert_eq!(quantize7(60.123456789), 60.1234568);
        assert_eq!(LonLat::new(10.0, 60.5).to_pair_string(), "10.0000000,60.5000000");
    }

    #[test]
    fn test_zoom_formatting() {
        assert_eq!(format_zoom(5.0), "5");
        assert_eq!(format_zoom(7.25), "7.25");
        assert_eq!(format_zoom(7.123456), "7.123");
        assert_eq!(format_zoom(11.9996), "12");
        assert_eq!(round_zoom(3.14159), 3.142);
    }
}

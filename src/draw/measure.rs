use crate::core::geo::{LonLat, Point};
use geo::HaversineLength;
use geo_types::{Coord, LineString};

/// Geodesic length of a path in metres
pub fn path_length(coords: &[LonLat]) -> f64 {
    let line: LineString<f64> = coords.iter().copied().map(Coord::from).collect();
    line.haversine_length()
}

/// Length label shown next to a measure line: metres up to 1 km, then km
pub fn format_length(coords: &[LonLat]) -> String {
    let length = path_length(coords);
    if length > 1000.0 {
        format!("{:.2} km", length / 1000.0)
    } else {
        format!("{:.2} m", length)
    }
}

/// Same as [`format_length`] for a path in map coordinates
pub fn format_projected_length(points: &[Point]) -> String {
    let coords: Vec<LonLat> = points.iter().map(Point::to_lon_lat).collect();
    format_length(&coords)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_degree_of_latitude() {
        let coords = [LonLat::new(24.0, 60.0), LonLat::new(24.0, 61.0)];
        // 1 degree on the mean-radius sphere
        assert!((path_length(&coords) - 111_195.08).abs() < 1.0);
        assert_eq!(format_length(&coords), "111.20 km");
    }

    #[test]
    fn test_short_lengths_in_metres() {
        let coords = [LonLat::new(24.0, 60.0), LonLat::new(24.0, 60.001)];
        assert_eq!(format_length(&coords), "111.20 m");
        assert_eq!(format_length(&coords[..1]), "0.00 m");
    }

    #[test]
    fn test_projected_matches_geographic() {
        let coords = [LonLat::new(24.0, 60.0), LonLat::new(25.0, 60.5)];
        let points: Vec<Point> = coords.iter().map(LonLat::to_projected).collect();
        assert_eq!(format_projected_length(&points), format_length(&coords));
    }
}

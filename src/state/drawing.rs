use crate::{core::geo::LonLat, layers::vector::GeometryKind};
use serde::{Deserialize, Serialize};

/// The tool the user currently draws with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DrawingMode {
    Marker,
    Line,
    Polygon,
    Measure,
}

impl DrawingMode {
    /// Geometry the mode sketches; the marker tool places a point instead
    pub fn geometry_kind(self) -> Option<GeometryKind> {
        match self {
            DrawingMode::Marker => None,
            DrawingMode::Line => Some(GeometryKind::Line),
            DrawingMode::Polygon => Some(GeometryKind::Polygon),
            DrawingMode::Measure => Some(GeometryKind::Measure),
        }
    }
}

impl From<GeometryKind> for DrawingMode {
    fn from(kind: GeometryKind) -> Self {
        match kind {
            GeometryKind::Line => DrawingMode::Line,
            GeometryKind::Polygon => DrawingMode::Polygon,
            GeometryKind::Measure => DrawingMode::Measure,
        }
    }
}

/// Geographic coordinates of everything the user has drawn
///
/// This is held once regardless of how many maps are on screen; the layers
/// showing it are rebuilt from here whenever the set of maps changes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DrawingState {
    pub marker: Option<LonLat>,
    pub line: Option<Vec<LonLat>>,
    /// Open ring, the first vertex is not repeated
    pub polygon: Option<Vec<LonLat>>,
    pub measure: Option<Vec<LonLat>>,
}

impl DrawingState {
    pub fn geometry(&self, kind: GeometryKind) -> Option<&[LonLat]> {
        match kind {
            GeometryKind::Line => self.line.as_deref(),
            GeometryKind::Polygon => self.polygon.as_deref(),
            GeometryKind::Measure => self.measure.as_deref(),
        }
    }

    /// Stores `coords` for `kind`, or clears it when there are too few points.
    /// Returns whether a geometry is now stored.
    pub fn set_geometry(&mut self, kind: GeometryKind, coords: Option<Vec<LonLat>>) -> bool {
        let coords = coords.filter(|c| c.len() >= kind.min_points());
        let stored = coords.is_some();
        match kind {
            GeometryKind::Line => self.line = coords,
            GeometryKind::Polygon => self.polygon = coords,
            GeometryKind::Measure => self.measure = coords,
        }
        stored
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_empty(&self) -> bool {
        self.marker.is_none() && self.line.is_none() && self.polygon.is_none() && self.measure.is_none()
    }
}

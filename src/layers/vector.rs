use crate::{
    constants::{
        MIN_LINE_POINTS, MIN_MEASURE_POINTS, MIN_POLYGON_POINTS, Z_DRAWN_LINE, Z_DRAWN_POLYGON,
        Z_MEASURE_LINE,
    },
    core::geo::Point,
    layers::base::{LayerProperties, LayerTrait, LayerType},
    Result,
};
use serde::{Deserialize, Serialize};

/// Stroke / fill used to draw a feature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureStyle {
    pub stroke_color: String,
    pub stroke_width: f32,
    pub fill_color: Option<String>,
    pub line_dash: Option<Vec<f32>>,
}

impl FeatureStyle {
    pub fn drawn_line() -> Self {
        Self {
            stroke_color: "blue".to_string(),
            stroke_width: 3.0,
            fill_color: None,
            line_dash: None,
        }
    }

    pub fn drawn_polygon() -> Self {
        Self {
            stroke_color: "blue".to_string(),
            stroke_width: 2.0,
            fill_color: Some("rgba(0,200,255,0.5)".to_string()),
            line_dash: None,
        }
    }

    pub fn measure_line() -> Self {
        Self {
            stroke_color: "orange".to_string(),
            stroke_width: 3.0,
            fill_color: None,
            line_dash: Some(vec![8.0, 8.0]),
        }
    }
}

/// The three point-sequence drawables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeometryKind {
    Line,
    Polygon,
    Measure,
}

impl GeometryKind {
    pub const ALL: [GeometryKind; 3] = [GeometryKind::Line, GeometryKind::Polygon, GeometryKind::Measure];

    /// Smallest vertex count the kind accepts
    pub fn min_points(self) -> usize {
        match self {
            GeometryKind::Line => MIN_LINE_POINTS,
            GeometryKind::Polygon => MIN_POLYGON_POINTS,
            GeometryKind::Measure => MIN_MEASURE_POINTS,
        }
    }

    /// Drops a repeated first vertex from a polygon ring, unless the ring
    /// would fall below the minimum with it gone
    pub fn open_ring<T: PartialEq>(self, coords: &mut Vec<T>) {
        if self == GeometryKind::Polygon
            && coords.len() > self.min_points()
            && coords.first() == coords.last()
        {
            coords.pop();
        }
    }

    /// Query parameter the kind is stored under
    pub fn param(self) -> &'static str {
        match self {
            GeometryKind::Line => "line",
            GeometryKind::Polygon => "polygon",
            GeometryKind::Measure => "measure",
        }
    }
}

impl std::fmt::Display for GeometryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.param())
    }
}

/// Geometry of a drawn feature, in map coordinates
#[derive(Debug, Clone, PartialEq)]
pub enum DrawnGeometry {
    Line(Vec<Point>),
    /// Polygon vertices without the closing point
    Polygon(Vec<Point>),
    MeasureLine(Vec<Point>),
}

impl DrawnGeometry {
    /// The vertices as drawn; polygons are returned open
    pub fn vertices(&self) -> &[Point] {
        match self {
            DrawnGeometry::Line(points)
            | DrawnGeometry::Polygon(points)
            | DrawnGeometry::MeasureLine(points) => points,
        }
    }

    pub fn kind(&self) -> GeometryKind {
        match self {
            DrawnGeometry::Line(_) => GeometryKind::Line,
            DrawnGeometry::Polygon(_) => GeometryKind::Polygon,
            DrawnGeometry::MeasureLine(_) => GeometryKind::Measure,
        }
    }

    /// Smallest vertex count the geometry kind accepts
    pub fn min_points(&self) -> usize {
        self.kind().min_points()
    }

    pub fn is_complete(&self) -> bool {
        self.vertices().len() >= self.min_points()
    }

    /// Closed outer ring of a polygon
    pub fn ring(&self) -> Option<Vec<Point>> {
        match self {
            DrawnGeometry::Polygon(points) if !points.is_empty() => {
                let mut ring = points.clone();
                ring.push(points[0]);
                Some(ring)
            }
            _ => None,
        }
    }
}

/// A vector layer holding exactly one user-drawn feature
pub struct VectorLayer {
    properties: LayerProperties,
    geometry: DrawnGeometry,
    style: FeatureStyle,
}

impl VectorLayer {
    pub fn line(id: String, points: Vec<Point>) -> Self {
        Self::with_geometry(id, DrawnGeometry::Line(points), FeatureStyle::drawn_line(), Z_DRAWN_LINE)
    }

    pub fn polygon(id: String, mut points: Vec<Point>) -> Self {
        GeometryKind::Polygon.open_ring(&mut points);
        Self::with_geometry(
            id,
            DrawnGeometry::Polygon(points),
            FeatureStyle::drawn_polygon(),
            Z_DRAWN_POLYGON,
        )
    }

    pub fn measure_line(id: String, points: Vec<Point>) -> Self {
        Self::with_geometry(
            id,
            DrawnGeometry::MeasureLine(points),
            FeatureStyle::measure_line(),
            Z_MEASURE_LINE,
        )
    }

    fn with_geometry(id: String, geometry: DrawnGeometry, style: FeatureStyle, z_index: i32) -> Self {
        let properties =
            LayerProperties::new(id, "Drawn feature".to_string(), LayerType::Vector).with_z_index(z_index);
        Self {
            properties,
            geometry,
            style,
        }
    }

    pub fn geometry(&self) -> &DrawnGeometry {
        &self.geometry
    }

    pub fn style(&self) -> &FeatureStyle {
        &self.style
    }
}

impl LayerTrait for VectorLayer {
    crate::impl_layer_trait!(VectorLayer, properties);

    fn options(&self) -> serde_json::Value {
        serde_json::json!({
            "vertices": self.geometry.vertices().len(),
            "style": self.style,
        })
    }

    fn set_options(&mut self, options: serde_json::Value) -> Result<()> {
        if let Some(style) = options.get("style") {
            self.style = serde_json::from_value(style.clone())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pts(n: usize) -> Vec<Point> {
        (0..n).map(|i| Point::new(i as f64, (i * i) as f64)).collect()
    }

    #[test]
    fn test_polygon_drops_closing_vertex() {
        let mut ring = pts(3);
        ring.push(ring[0]);
        let layer = VectorLayer::polygon("p".into(), ring);
        assert_eq!(layer.geometry().vertices().len(), 3);
        assert_eq!(layer.geometry().ring().unwrap().len(), 4);
        assert_eq!(layer.z_index(), Z_DRAWN_POLYGON);
    }

    #[test]
    fn test_closed_triangle_keeps_all_vertices() {
        let mut ring = pts(2);
        ring.push(ring[0]);
        let layer = VectorLayer::polygon("p".into(), ring);
        assert_eq!(layer.geometry().vertices().len(), 3);
        assert!(layer.geometry().is_complete());

        let mut line = pts(3);
        line.push(line[0]);
        GeometryKind::Line.open_ring(&mut line);
        assert_eq!(line.len(), 4);
    }

    #[test]
    fn test_completeness() {
        assert!(!DrawnGeometry::Line(pts(1)).is_complete());
        assert!(DrawnGeometry::Line(pts(2)).is_complete());
        assert!(!DrawnGeometry::Polygon(pts(2)).is_complete());
        assert!(DrawnGeometry::MeasureLine(pts(2)).is_complete());
    }

    #[test]
    fn test_measure_style_is_dashed() {
        let layer = VectorLayer::measure_line("m".into(), pts(2));
        assert_eq!(layer.style().line_dash, Some(vec![8.0, 8.0]));
        assert_eq!(layer.options()["vertices"], 2);
    }
}

use crate::{
    constants::{Z_CLICK_MARKER, Z_SEARCH_MARKER},
    core::geo::{LonLat, Point},
    layers::base::{LayerProperties, LayerTrait, LayerType},
    Result,
};

/// Which marker an icon stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    /// Point placed by the user with the marker tool; part of the permalink
    Click,
    /// Result of a place search; not persisted
    Search,
}

impl MarkerKind {
    pub fn z_index(self) -> i32 {
        match self {
            MarkerKind::Click => Z_CLICK_MARKER,
            MarkerKind::Search => Z_SEARCH_MARKER,
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            MarkerKind::Click => {
                "data:image/svg+xml;utf8,<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"32\" height=\"32\" viewBox=\"0 0 32 32\"><circle cx=\"16\" cy=\"16\" r=\"12\" fill=\"cyan\" stroke=\"black\" stroke-width=\"2\"/></svg>"
            }
            MarkerKind::Search => "https://maps.gstatic.com/mapfiles/api-3/images/spotlight-poi2.png",
        }
    }
}

/// Icon anchored at its bottom center on a single point
pub struct Marker {
    properties: LayerProperties,
    position: LonLat,
    kind: MarkerKind,
}

impl Marker {
    pub fn new(id: String, position: LonLat, kind: MarkerKind) -> Self {
        let properties = LayerProperties::new(id, "Marker".to_string(), LayerType::Marker)
            .with_z_index(kind.z_index());
        Self {
            properties,
            position,
            kind,
        }
    }

    pub fn position(&self) -> LonLat {
        self.position
    }

    /// Marker position in map coordinates
    pub fn coordinate(&self) -> Point {
        self.position.to_projected()
    }

    pub fn kind(&self) -> MarkerKind {
        self.kind
    }
}

impl LayerTrait for Marker {
    crate::impl_layer_trait!(Marker, properties);

    fn options(&self) -> serde_json::Value {
        serde_json::json!({
            "position": {
                "lon": self.position.lon,
                "lat": self.position.lat
            },
            "icon": self.kind.icon(),
            "anchor": [0.5, 1.0]
        })
    }

    fn set_options(&mut self, options: serde_json::Value) -> Result<()> {
        let lon = options["position"]["lon"].as_f64();
        let lat = options["position"]["lat"].as_f64();
        if let (Some(lon), Some(lat)) = (lon, lat) {
            self.position = LonLat::new(lon, lat);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_z_order() {
        let click = Marker::new("c".into(), LonLat::new(24.0, 60.0), MarkerKind::Click);
        let search = Marker::new("s".into(), LonLat::new(24.0, 60.0), MarkerKind::Search);
        assert!(click.z_index() > search.z_index());
        assert_eq!(click.layer_type(), LayerType::Marker);
    }

    #[test]
    fn test_marker_options() {
        let mut marker = Marker::new("c".into(), LonLat::new(24.0, 60.0), MarkerKind::Click);
        assert_eq!(marker.options()["position"]["lat"], 60.0);

        marker
            .set_options(serde_json::json!({"position": {"lon": 25.0, "lat": 61.0}}))
            .unwrap();
        assert_eq!(marker.position(), LonLat::new(25.0, 61.0));
    }
}

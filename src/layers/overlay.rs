use crate::{
    constants::{EPSG, WMS_OVERLAY_OPACITY, Z_OSM_OVERLAY, Z_WMS_OVERLAY},
    core::geo::Point,
    layers::base::{LayerProperties, LayerTrait, LayerType},
    overlays::selection::OverlayKey,
    MapError, Result,
};

/// Edge of the EPSG:3857 world square, in metres.
const WORLD_HALF_EXTENT: f64 = 20_037_508.342_789_244;

/// Pixel size of a WMS tile request.
const WMS_TILE_SIZE: u32 = 256;

/// Semi-transparent tiled WMS layer showing one named server layer
pub struct WmsOverlayLayer {
    properties: LayerProperties,
    key: OverlayKey,
    url: String,
}

impl WmsOverlayLayer {
    pub fn new(key: OverlayKey, url: impl Into<String>) -> Self {
        let properties = LayerProperties::new(key.layer_id(), key.name.clone(), LayerType::WmsOverlay)
            .with_z_index(Z_WMS_OVERLAY)
            .with_opacity(WMS_OVERLAY_OPACITY);
        Self {
            properties,
            key,
            url: url.into(),
        }
    }

    /// Stable identity chosen when the overlay was selected
    pub fn key(&self) -> &OverlayKey {
        &self.key
    }

    /// Value of the `LAYERS` request parameter
    pub fn layers_param(&self) -> &str {
        &self.key.name
    }

    /// GetMap URL for one tile of the WMS tile grid at `resolution`
    pub fn get_map_url(&self, tile_col: i64, tile_row: i64, resolution: f64) -> Result<String> {
        let bbox = tile_bbox(tile_col, tile_row, resolution);
        let mut url = url::Url::parse(&self.url)
            .map_err(|e| MapError::Layer(format!("invalid WMS url '{}': {}", self.url, e)))?;
        url.query_pairs_mut()
            .append_pair("SERVICE", "WMS")
            .append_pair("VERSION", "1.3.0")
            .append_pair("REQUEST", "GetMap")
            .append_pair("FORMAT", "image/png")
            .append_pair("TRANSPARENT", "true")
            .append_pair("LAYERS", self.layers_param())
            .append_pair("STYLES", "")
            .append_pair("WIDTH", &WMS_TILE_SIZE.to_string())
            .append_pair("HEIGHT", &WMS_TILE_SIZE.to_string())
            .append_pair("CRS", EPSG)
            .append_pair("BBOX", &format_bbox(&bbox));
        Ok(url.to_string())
    }

    /// GetFeatureInfo URL for the feature under `coordinate`, asking for HTML
    ///
    /// The request targets the WMS tile containing the coordinate, the same
    /// tile the layer would have fetched for display.
    pub fn get_feature_info_url(&self, coordinate: Point, resolution: f64) -> Result<String> {
        if !(resolution.is_finite() && resolution > 0.0) {
            return Err(MapError::InvalidCoordinates(format!(
                "resolution {} cannot address a tile",
                resolution
            )));
        }
        let tile_extent = WMS_TILE_SIZE as f64 * resolution;
        let tile_col = ((coordinate.x + WORLD_HALF_EXTENT) / tile_extent).floor() as i64;
        let tile_row = ((WORLD_HALF_EXTENT - coordinate.y) / tile_extent).floor() as i64;
        let bbox = tile_bbox(tile_col, tile_row, resolution);

        let i = ((coordinate.x - bbox[0]) / resolution).floor() as i64;
        let j = ((bbox[3] - coordinate.y) / resolution).floor() as i64;

        let mut url = url::Url::parse(&self.url)
            .map_err(|e| MapError::Layer(format!("invalid WMS url '{}': {}", self.url, e)))?;
        url.query_pairs_mut()
            .append_pair("SERVICE", "WMS")
            .append_pair("VERSION", "1.3.0")
            .append_pair("REQUEST", "GetFeatureInfo")
            .append_pair("FORMAT", "image/png")
            .append_pair("TRANSPARENT", "true")
            .append_pair("QUERY_LAYERS", self.layers_param())
            .append_pair("LAYERS", self.layers_param())
            .append_pair("INFO_FORMAT", "text/html")
            .append_pair("I", &i.to_string())
            .append_pair("J", &j.to_string())
            .append_pair("WIDTH", &WMS_TILE_SIZE.to_string())
            .append_pair("HEIGHT", &WMS_TILE_SIZE.to_string())
            .append_pair("CRS", EPSG)
            .append_pair("STYLES", "")
            .append_pair("BBOX", &format_bbox(&bbox));
        Ok(url.to_string())
    }
}

fn tile_bbox(tile_col: i64, tile_row: i64, resolution: f64) -> [f64; 4] {
    let tile_extent = WMS_TILE_SIZE as f64 * resolution;
    let min_x = -WORLD_HALF_EXTENT + tile_col as f64 * tile_extent;
    let max_y = WORLD_HALF_EXTENT - tile_row as f64 * tile_extent;
    [min_x, max_y - tile_extent, min_x + tile_extent, max_y]
}

fn format_bbox(bbox: &[f64; 4]) -> String {
    bbox.iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

impl LayerTrait for WmsOverlayLayer {
    crate::impl_layer_trait!(WmsOverlayLayer, properties);

    fn options(&self) -> serde_json::Value {
        serde_json::json!({
            "url": self.url,
            "params": {
                "LAYERS": self.layers_param(),
                "TRANSPARENT": true,
                "VERSION": "1.3.0",
            },
            "crossOrigin": "anonymous",
        })
    }

    crate::impl_basic_options_setter!();
}

/// Vector layer streaming one GeoJSON dataset from the static OSM folder
pub struct GeoJsonOverlayLayer {
    properties: LayerProperties,
    osm_id: String,
    url: String,
    color: String,
}

impl GeoJsonOverlayLayer {
    pub fn new(osm_id: &str, title: &str, url: impl Into<String>, color: impl Into<String>) -> Self {
        let properties = LayerProperties::new(
            format!("osm:{}", osm_id),
            title.to_string(),
            LayerType::GeoJson,
        )
        .with_z_index(Z_OSM_OVERLAY);
        Self {
            properties,
            osm_id: osm_id.to_string(),
            url: url.into(),
            color: color.into(),
        }
    }

    pub fn osm_id(&self) -> &str {
        &self.osm_id
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn color(&self) -> &str {
        &self.color
    }
}

impl LayerTrait for GeoJsonOverlayLayer {
    crate::impl_layer_trait!(GeoJsonOverlayLayer, properties);

    fn options(&self) -> serde_json::Value {
        serde_json::json!({
            "url": self.url,
            "format": "geojson",
            "osmId": self.osm_id,
            "osmTitle": self.properties.name,
            "osmColor": self.color,
            "style": {
                "circle": { "radius": 6, "fill": self.color, "stroke": "white", "strokeWidth": 2 },
                "stroke": { "color": self.color, "width": 2 },
                "fill": "rgba(0, 0, 255, 0.1)",
            },
        })
    }

    crate::impl_basic_options_setter!();
}

/// Text label pinned to a map coordinate, drawn above all layers
#[derive(Debug, Clone, PartialEq)]
pub struct LabelOverlay {
    pub id: String,
    pub position: Point,
    pub text: String,
}

impl LabelOverlay {
    pub fn new(id: impl Into<String>, position: Point, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            position,
            text: text.into(),
        }
    }
}

use crate::core::geo::LonLat;
use std::f64::consts::PI;

/// Address of one tile in the XYZ / WMTS grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileCoord {
    pub x: u32,
    pub y: u32,
    pub z: u8,
}

impl TileCoord {
    pub fn new(x: u32, y: u32, z: u8) -> Self {
        Self { x, y, z }
    }

    /// Tile containing `lon_lat` at `zoom`
    pub fn from_lon_lat(lon_lat: &LonLat, zoom: u8) -> Self {
        let lat_rad = LonLat::clamp_lat(lon_lat.lat).to_radians();
        let n = 2_f64.powi(zoom as i32);
        let max = (n as u32).saturating_sub(1);

        let x = ((lon_lat.lon + 180.0) / 360.0 * n).floor().max(0.0) as u32;
        let y = ((1.0 - lat_rad.tan().asinh() / PI) / 2.0 * n).floor().max(0.0) as u32;

        Self::new(x.min(max), y.min(max), zoom)
    }

    /// North-west corner of the tile
    pub fn to_lon_lat(&self) -> LonLat {
        let n = 2_f64.powi(self.z as i32);
        let lon = self.x as f64 / n * 360.0 - 180.0;
        let lat = (PI * (1.0 - 2.0 * self.y as f64 / n)).sinh().atan().to_degrees();
        LonLat::new(lon, lat)
    }
}

/// Trait representing anything that can produce tile URLs for a given coordinate.
pub trait TileSource: Send + Sync {
    /// Build a URL for the requested `coord`.
    fn url(&self, coord: TileCoord) -> String;

    /// Attribution shown for the source, if any
    fn attribution(&self) -> Option<&str> {
        None
    }
}

/// Default OpenStreetMap tile server.
pub struct OsmSource {
    subdomains: Vec<&'static str>,
}

impl OsmSource {
    pub fn new() -> Self {
        Self {
            subdomains: vec!["a", "b", "c"],
        }
    }
}

impl Default for OsmSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TileSource for OsmSource {
    fn url(&self, coord: TileCoord) -> String {
        let idx = ((coord.x + coord.y) % self.subdomains.len() as u32) as usize;
        format!(
            "https://{}.tile.openstreetmap.org/{}/{}/{}.png",
            self.subdomains[idx], coord.z, coord.x, coord.y
        )
    }

    fn attribution(&self) -> Option<&str> {
        Some("© OpenStreetMap contributors")
    }
}

/// Plain `{z}/{x}/{y}` template source
///
/// A `{a-c}` placeholder expands to one of the listed subdomains and `{r}`
/// to the retina suffix, which is always empty here.
pub struct XyzSource {
    template: String,
    attribution: Option<String>,
}

impl XyzSource {
    pub fn new(template: impl Into<String>, attribution: Option<String>) -> Self {
        Self {
            template: template.into(),
            attribution,
        }
    }

    pub fn esri_world_imagery() -> Self {
        Self::new(
            "https://services.arcgisonline.com/ArcGIS/rest/services/World_Imagery/MapServer/tile/{z}/{y}/{x}",
            Some("Tiles © Esri".to_string()),
        )
    }

    pub fn carto_dark() -> Self {
        Self::new(
            "https://{a-c}.basemaps.cartocdn.com/dark_all/{z}/{x}/{y}{r}.png",
            Some("© OpenStreetMap contributors © CARTO".to_string()),
        )
    }

    pub fn template(&self) -> &str {
        &self.template
    }
}

impl TileSource for XyzSource {
    fn url(&self, coord: TileCoord) -> String {
        let sub = ["a", "b", "c"][((coord.x + coord.y) % 3) as usize];
        self.template
            .replace("{a-c}", sub)
            .replace("{z}", &coord.z.to_string())
            .replace("{x}", &coord.x.to_string())
            .replace("{y}", &coord.y.to_string())
            .replace("{r}", "")
    }

    fn attribution(&self) -> Option<&str> {
        self.attribution.as_deref()
    }
}

/// REST-encoded WMTS source with the api key appended to each tile request
pub struct WmtsSource {
    template: String,
    api_key: String,
}

impl WmtsSource {
    /// `template` uses the WMTS `{TileMatrix}`, `{TileRow}` and `{TileCol}` placeholders
    pub fn new(template: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            api_key: api_key.into(),
        }
    }

    /// Conventional REST template of a layer on `base_url`, used until a
    /// capabilities document supplies the advertised one
    pub fn rest(base_url: &str, layer: &str, matrix_set: &str, api_key: impl Into<String>) -> Self {
        let template = format!(
            "{}/{}/default/{}/{{TileMatrix}}/{{TileRow}}/{{TileCol}}.png",
            base_url.trim_end_matches('/'),
            layer,
            matrix_set
        );
        Self::new(template, api_key)
    }

    pub fn template(&self) -> &str {
        &self.template
    }
}

impl TileSource for WmtsSource {
    fn url(&self, coord: TileCoord) -> String {
        let url = self
            .template
            .replace("{TileMatrix}", &coord.z.to_string())
            .replace("{TileRow}", &coord.y.to_string())
            .replace("{TileCol}", &coord.x.to_string());
        format!("{}?api-key={}", url, self.api_key)
    }

    fn attribution(&self) -> Option<&str> {
        Some("© Maanmittauslaitos")
    }
}

/// Vector tiles described by a Mapbox style document
pub struct MapboxStyleSource {
    style_url: String,
    access_token: String,
}

impl MapboxStyleSource {
    pub fn new(style_url: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            style_url: style_url.into(),
            access_token: access_token.into(),
        }
    }

    pub fn style_url(&self) -> &str {
        &self.style_url
    }

    /// HTTPS address of the style document
    pub fn style_document_url(&self) -> String {
        let path = self
            .style_url
            .strip_prefix("mapbox://styles/")
            .unwrap_or(&self.style_url);
        format!(
            "https://api.mapbox.com/styles/v1/{}?access_token={}",
            path, self.access_token
        )
    }
}

impl TileSource for MapboxStyleSource {
    fn url(&self, coord: TileCoord) -> String {
        format!(
            "https://api.mapbox.com/v4/mapbox.mapbox-streets-v8/{}/{}/{}.vector.pbf?access_token={}",
            coord.z, coord.x, coord.y, self.access_token
        )
    }

    fn attribution(&self) -> Option<&str> {
        Some("© Mapbox © OpenStreetMap contributors")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tile_coord_helsinki() {
        let coord = TileCoord::from_lon_lat(&LonLat::new(24.94, 60.19), 5);
        assert_eq!(coord, TileCoord::new(18, 9, 5));
        let nw = coord.to_lon_lat();
        assert!(nw.lon <= 24.94 && nw.lat >= 60.19);
    }

    #[test]
    fn test_osm_subdomains() {
        let source = OsmSource::new();
        assert_eq!(
            source.url(TileCoord::new(1, 1, 2)),
            "https://c.tile.openstreetmap.org/2/1/1.png"
        );
    }

    #[test]
    fn test_xyz_template() {
        let url = XyzSource::carto_dark().url(TileCoord::new(0, 0, 1));
        assert_eq!(url, "https://a.basemaps.cartocdn.com/dark_all/1/0/0.png");

        let esri = XyzSource::esri_world_imagery().url(TileCoord::new(3, 4, 5));
        assert!(esri.ends_with("/tile/5/4/3"));
    }

    #[test]
    fn test_wmts_appends_api_key() {
        let source = WmtsSource::rest(
            "https://example.org/wmts/1.0.0/",
            "taustakartta",
            "WGS84_Pseudo-Mercator",
            "KEY",
        );
        assert_eq!(
            source.url(TileCoord::new(2, 3, 4)),
            "https://example.org/wmts/1.0.0/taustakartta/default/WGS84_Pseudo-Mercator/4/3/2.png?api-key=KEY"
        );
    }

    #[test]
    fn test_mapbox_style_document() {
        let source = MapboxStyleSource::new("mapbox://styles/mapbox/dark-v11", "tok");
        assert_eq!(
            source.style_document_url(),
            "https://api.mapbox.com/styles/v1/mapbox/dark-v11?access_token=tok"
        );
    }
}

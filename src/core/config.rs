//! Configuration for the viewer's remote endpoints, credentials and view defaults
//!
//! Every field has a working default, so a config file only needs to name
//! what it changes. Credentials can also come from the environment.

use crate::{
    constants::{
        DEFAULT_CENTER_LON_LAT, DEFAULT_LAYER_INDEX, DEFAULT_SPLIT_LEFT_INDEX,
        DEFAULT_SPLIT_RIGHT_INDEX, DEFAULT_ZOOM, SEARCH_ZOOM, TILE_MATRIX_SET,
    },
    core::geo::LonLat,
    layers::factory::{LayerCatalog, LayerDescriptor},
    overlays::catalog::WmsOverlayInfo,
    Result,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable overriding [`ApiKeys::wmts_api_key`].
pub const ENV_API_KEY: &str = "MAPLINK_API_KEY";
/// Environment variable overriding [`ApiKeys::style_access_token`].
pub const ENV_STYLE_TOKEN: &str = "MAPLINK_STYLE_TOKEN";

/// Remote services the viewer talks to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub wmts_capabilities_url: String,
    /// Root of the REST tile paths, `{base}/{layer}/default/{matrixSet}/...`
    pub wmts_base_url: String,
    pub tile_matrix_set: String,
    pub wms_url: String,
    pub wms_capabilities_url: String,
    pub osm_manifest_url: String,
    /// Prefix the GeoJSON dataset file names are resolved against
    pub osm_data_path: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            wmts_capabilities_url:
                "https://avoin-karttakuva.maanmittauslaitos.fi/avoin/wmts/1.0.0/WMTSCapabilities.xml"
                    .to_string(),
            wmts_base_url: "https://avoin-karttakuva.maanmittauslaitos.fi/avoin/wmts/1.0.0".to_string(),
            tile_matrix_set: TILE_MATRIX_SET.to_string(),
            wms_url: "https://avoinapi.vaylapilvi.fi/vaylatiedot/digiroad/wms".to_string(),
            wms_capabilities_url:
                "https://avoinapi.vaylapilvi.fi/vaylatiedot/digiroad/wms?request=getcapabilities&service=wms"
                    .to_string(),
            osm_manifest_url: "/osm/manifest.json".to_string(),
            osm_data_path: "/osm".to_string(),
        }
    }
}

impl Endpoints {
    /// Capabilities URL with the api key attached as the service expects
    pub fn wmts_capabilities_request(&self, api_key: &str) -> String {
        match url::Url::parse(&self.wmts_capabilities_url) {
            Ok(mut url) => {
                url.query_pairs_mut().append_pair("api-key", api_key);
                url.to_string()
            }
            Err(_) => format!("{}?api-key={}", self.wmts_capabilities_url, api_key),
        }
    }

    /// URL of one GeoJSON dataset file
    pub fn osm_dataset_url(&self, file: &str) -> String {
        format!("{}/{}", self.osm_data_path.trim_end_matches('/'), file)
    }
}

/// Credentials for the tile services
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiKeys {
    pub wmts_api_key: String,
    pub style_access_token: String,
}

/// What the viewer shows when the permalink does not say otherwise
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewDefaults {
    pub center_lon: f64,
    pub center_lat: f64,
    pub zoom: f64,
    pub layer_index: usize,
    pub split_left_index: usize,
    pub split_right_index: usize,
    pub search_zoom: f64,
}

impl Default for ViewDefaults {
    fn default() -> Self {
        Self {
            center_lon: DEFAULT_CENTER_LON_LAT.0,
            center_lat: DEFAULT_CENTER_LON_LAT.1,
            zoom: DEFAULT_ZOOM,
            layer_index: DEFAULT_LAYER_INDEX,
            split_left_index: DEFAULT_SPLIT_LEFT_INDEX,
            split_right_index: DEFAULT_SPLIT_RIGHT_INDEX,
            search_zoom: SEARCH_ZOOM,
        }
    }
}

impl ViewDefaults {
    pub fn center(&self) -> LonLat {
        LonLat::new(self.center_lon, self.center_lat)
    }
}

/// Top-level viewer configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub endpoints: Endpoints,
    pub keys: ApiKeys,
    pub view: ViewDefaults,
    /// Replaces the built-in base layer list when present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_layers: Option<Vec<LayerDescriptor>>,
    /// WMS layers offered next to the capabilities-derived ones
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub generic_overlays: Vec<WmsOverlayInfo>,
}

impl ViewerConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_json_str(&text)?;
        log::info!("Loaded viewer config from {}", path.as_ref().display());
        Ok(config)
    }

    /// Applies `MAPLINK_API_KEY` / `MAPLINK_STYLE_TOKEN` when set
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(
            std::env::var(ENV_API_KEY).ok(),
            std::env::var(ENV_STYLE_TOKEN).ok(),
        )
    }

    fn with_overrides(mut self, api_key: Option<String>, style_token: Option<String>) -> Self {
        if let Some(key) = api_key.filter(|k| !k.is_empty()) {
            self.keys.wmts_api_key = key;
        }
        if let Some(token) = style_token.filter(|t| !t.is_empty()) {
            self.keys.style_access_token = token;
        }
        self
    }

    /// Base layer catalog in effect
    pub fn catalog(&self) -> LayerCatalog {
        match &self.base_layers {
            Some(layers) if !layers.is_empty() => LayerCatalog::new(layers.clone()),
            _ => LayerCatalog::builtin().clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers::factory::BaseLayerKind;

    #[test]
    fn test_defaults() {
        let config = ViewerConfig::default();
        assert_eq!(config.view.center(), LonLat::new(24.94, 60.19));
        assert_eq!(config.view.zoom, 5.0);
        assert_eq!(config.catalog().len(), 11);
        assert_eq!(config.endpoints.osm_dataset_url("a.geojson"), "/osm/a.geojson");
    }

    #[test]
    fn test_partial_json() {
        let config = ViewerConfig::from_json_str(
            r#"{
                "keys": { "wmts_api_key": "abc" },
                "view": { "zoom": 8 },
                "base_layers": [ { "id": "osm", "name": "OSM", "kind": "osm" } ]
            }"#,
        )
        .unwrap();
        assert_eq!(config.keys.wmts_api_key, "abc");
        assert_eq!(config.view.zoom, 8.0);
        assert_eq!(config.view.layer_index, 1);
        let catalog = config.catalog();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.by_index(0).map(|d| d.kind), Some(BaseLayerKind::Osm));
    }

    #[test]
    fn test_overrides() {
        let config = ViewerConfig::default().with_overrides(Some("k".into()), Some(String::new()));
        assert_eq!(config.keys.wmts_api_key, "k");
        assert_eq!(config.keys.style_access_token, "");
    }

    #[test]
    fn test_capabilities_request() {
        let endpoints = Endpoints::default();
        let url = endpoints.wmts_capabilities_request("key-1");
        assert!(url.ends_with("WMTSCapabilities.xml?api-key=key-1"));
    }

    #[test]
    fn test_bad_json_is_error() {
        assert!(ViewerConfig::from_json_str("{ not json").is_err());
    }
}

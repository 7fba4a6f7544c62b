//! Base-layer catalog and the dispatch from descriptor kind to tile source.

use crate::{
    core::config::ViewerConfig,
    layers::tile::TileLayer,
    overlays::catalog::OverlayCatalog,
    tiles::{
        capabilities::WmtsCapabilities,
        source::{MapboxStyleSource, OsmSource, TileSource, WmtsSource, XyzSource},
    },
};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Closed set of base layer kinds the viewer can build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BaseLayerKind {
    Wmts,
    Osm,
    MapboxVector,
    EsriSatellite,
    CartoDark,
}

/// One entry of the base layer catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerDescriptor {
    pub id: String,
    pub name: String,
    pub kind: BaseLayerKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style_url: Option<String>,
}

impl LayerDescriptor {
    pub fn new(id: &str, name: &str, kind: BaseLayerKind) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            kind,
            style_url: None,
        }
    }

    fn mapbox(id: &str, name: &str, style_url: &str) -> Self {
        Self {
            style_url: Some(style_url.to_string()),
            ..Self::new(id, name, BaseLayerKind::MapboxVector)
        }
    }
}

static BUILTIN_LAYERS: Lazy<LayerCatalog> = Lazy::new(|| {
    LayerCatalog::new(vec![
        LayerDescriptor::new("taustakartta", "Taustakartta", BaseLayerKind::Wmts),
        LayerDescriptor::new("maastokartta", "Maastokartta", BaseLayerKind::Wmts),
        LayerDescriptor::new("selkokartta", "Selkokartta", BaseLayerKind::Wmts),
        LayerDescriptor::new("ortokuva", "Ortokuva", BaseLayerKind::Wmts),
        LayerDescriptor::new("osm", "OpenStreetMap", BaseLayerKind::Osm),
        LayerDescriptor::mapbox("mapbox_light", "Mapbox Light", "mapbox://styles/mapbox/light-v11"),
        LayerDescriptor::mapbox("mapbox_dark", "Mapbox Dark", "mapbox://styles/mapbox/dark-v11"),
        LayerDescriptor::mapbox(
            "mapbox_streets",
            "Mapbox Streets",
            "mapbox://styles/mapbox/streets-v12",
        ),
        LayerDescriptor::mapbox(
            "mapbox_outdoors",
            "Mapbox Outdoors",
            "mapbox://styles/mapbox/outdoors-v12",
        ),
        LayerDescriptor::new("esri_world_imagery", "Esri World Imagery", BaseLayerKind::EsriSatellite),
        LayerDescriptor::new("cartodb_dark", "CartoDB Dark", BaseLayerKind::CartoDark),
    ])
});

/// Ordered list of selectable base layers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerCatalog {
    layers: Vec<LayerDescriptor>,
}

impl LayerCatalog {
    pub fn new(layers: Vec<LayerDescriptor>) -> Self {
        Self { layers }
    }

    /// The eleven layers the viewer ships with
    pub fn builtin() -> &'static LayerCatalog {
        &BUILTIN_LAYERS
    }

    pub fn get(&self, id: &str) -> Option<&LayerDescriptor> {
        self.layers.iter().find(|l| l.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.layers.iter().position(|l| l.id == id)
    }

    pub fn by_index(&self, index: usize) -> Option<&LayerDescriptor> {
        self.layers.get(index)
    }

    /// Id at `index`, or the first layer's id when the index is out of range
    pub fn id_at(&self, index: usize) -> String {
        self.by_index(index)
            .or_else(|| self.layers.first())
            .map(|l| l.id.clone())
            .unwrap_or_default()
    }

    /// Display name for `id`, falling back to the id itself
    pub fn display_name<'a>(&'a self, id: &'a str) -> &'a str {
        self.get(id).map(|l| l.name.as_str()).unwrap_or(id)
    }

    pub fn descriptors(&self) -> &[LayerDescriptor] {
        &self.layers
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

impl Default for LayerCatalog {
    fn default() -> Self {
        Self::builtin().clone()
    }
}

/// Builds the base layer for catalog id `layer_id`
///
/// Ids missing from the catalog are requested from the WMTS service like the
/// built-in WMTS layers. WMTS tile templates come from `capabilities` when the
/// document has been loaded and advertises the layer, otherwise from the
/// conventional REST path under the configured base URL.
pub fn create_base_layer(
    layer_id: &str,
    catalog: &LayerCatalog,
    capabilities: Option<&WmtsCapabilities>,
    config: &ViewerConfig,
) -> TileLayer {
    let descriptor = catalog.get(layer_id);
    let kind = descriptor.map(|d| d.kind).unwrap_or(BaseLayerKind::Wmts);
    let name = descriptor.map(|d| d.name.as_str()).unwrap_or(layer_id);

    let source: Box<dyn TileSource> = match kind {
        BaseLayerKind::Osm => Box::new(OsmSource::new()),
        BaseLayerKind::MapboxVector => {
            let style_url = descriptor
                .and_then(|d| d.style_url.clone())
                .unwrap_or_default();
            Box::new(MapboxStyleSource::new(style_url, &config.keys.style_access_token))
        }
        BaseLayerKind::EsriSatellite => Box::new(XyzSource::esri_world_imagery()),
        BaseLayerKind::CartoDark => Box::new(XyzSource::carto_dark()),
        BaseLayerKind::Wmts => {
            let api_key = &config.keys.wmts_api_key;
            let matrix_set = &config.endpoints.tile_matrix_set;
            match capabilities.and_then(|c| c.source_for(layer_id, matrix_set, api_key)) {
                Some(source) => Box::new(source),
                None => {
                    log::debug!("No advertised WMTS template for '{}', using REST path", layer_id);
                    Box::new(WmtsSource::rest(
                        &config.endpoints.wmts_base_url,
                        layer_id,
                        matrix_set,
                        api_key.as_str(),
                    ))
                }
            }
        }
    };

    TileLayer::new(layer_id, name, kind, source)
}

/// Everything needed to build layers for a map slot
#[derive(Clone, Copy)]
pub struct LayerContext<'a> {
    pub catalog: &'a LayerCatalog,
    pub capabilities: Option<&'a WmtsCapabilities>,
    pub overlays: &'a OverlayCatalog,
    pub config: &'a ViewerConfig,
}

impl<'a> LayerContext<'a> {
    pub fn base_layer(&self, layer_id: &str) -> TileLayer {
        create_base_layer(layer_id, self.catalog, self.capabilities, self.config)
    }
}

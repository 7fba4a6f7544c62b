use crate::{
    layers::{
        base::{LayerProperties, LayerTrait, LayerType},
        factory::BaseLayerKind,
    },
    tiles::source::{OsmSource, TileCoord, TileSource},
};

/// Full-extent base layer backed by a [`TileSource`]
///
/// The layer id is always the catalog id it was built for, so the active
/// base layer of a map can be read back without inspecting its source.
pub struct TileLayer {
    properties: LayerProperties,
    kind: BaseLayerKind,
    source: Box<dyn TileSource>,
}

impl TileLayer {
    pub fn new(
        catalog_id: &str,
        name: &str,
        kind: BaseLayerKind,
        source: Box<dyn TileSource>,
    ) -> Self {
        let properties = LayerProperties::new(catalog_id.to_string(), name.to_string(), LayerType::Tile);
        Self {
            properties,
            kind,
            source,
        }
    }

    /// OpenStreetMap base layer under `id`
    pub fn osm(id: &str) -> Self {
        Self::new(id, "OpenStreetMap", BaseLayerKind::Osm, Box::new(OsmSource::new()))
    }

    /// Catalog id this layer was built from
    pub fn catalog_id(&self) -> &str {
        &self.properties.id
    }

    pub fn kind(&self) -> BaseLayerKind {
        self.kind
    }

    pub fn source(&self) -> &dyn TileSource {
        self.source.as_ref()
    }

    pub fn tile_url(&self, coord: TileCoord) -> String {
        self.source.url(coord)
    }
}

impl LayerTrait for TileLayer {
    crate::impl_layer_trait!(TileLayer, properties);

    fn options(&self) -> serde_json::Value {
        serde_json::json!({
            "kind": self.kind,
            "attribution": self.source.attribution(),
        })
    }

    crate::impl_basic_options_setter!();
}

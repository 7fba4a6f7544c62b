use crate::{
    layers::base::{LayerTrait, LayerType},
    MapError, Result,
};

use crate::prelude::HashMap;

/// Manages the layer stack of one map, keeping it ordered by z-index
///
/// The base layer always sits at the bottom of the stack and is replaced
/// in place rather than added alongside.
pub struct LayerManager {
    /// All layers indexed by ID
    layers: HashMap<String, Box<dyn LayerTrait>>,
    /// Ordered list of layer IDs for rendering (sorted by z-index)
    render_order: Vec<String>,
    /// ID of the current base layer, if any
    base_layer: Option<String>,
}

impl LayerManager {
    pub fn new() -> Self {
        Self {
            layers: HashMap::default(),
            render_order: Vec::new(),
            base_layer: None,
        }
    }

    /// Adds a layer to the manager
    pub fn add_layer(&mut self, layer: Box<dyn LayerTrait>) -> Result<()> {
        let layer_id = layer.id().to_string();
        if self.layers.contains_key(&layer_id) {
            return Err(MapError::Layer(format!("layer '{}' already added", layer_id)));
        }
        let z_index = layer.z_index();

        self.layers.insert(layer_id.clone(), layer);

        // Insert in sorted order by z-index, after the base layer
        let insert_pos = self
            .render_order
            .iter()
            .position(|id| {
                Some(id) != self.base_layer.as_ref()
                    && self
                        .layers
                        .get(id)
                        .map(|l| l.z_index() > z_index)
                        .unwrap_or(false)
            })
            .unwrap_or(self.render_order.len());

        self.render_order.insert(insert_pos, layer_id);
        Ok(())
    }

    /// Removes a layer from the manager
    pub fn remove_layer(&mut self, layer_id: &str) -> Option<Box<dyn LayerTrait>> {
        self.render_order.retain(|id| id != layer_id);
        if self.base_layer.as_deref() == Some(layer_id) {
            self.base_layer = None;
        }
        self.layers.remove(layer_id)
    }

    /// Puts `layer` at the bottom of the stack, returning the base layer it replaced
    pub fn set_base_layer(&mut self, layer: Box<dyn LayerTrait>) -> Option<Box<dyn LayerTrait>> {
        let previous = self
            .base_layer
            .take()
            .and_then(|id| self.remove_layer(&id));

        let layer_id = layer.id().to_string();
        // a base layer never shares its id with an overlay
        self.remove_layer(&layer_id);
        self.layers.insert(layer_id.clone(), layer);
        self.render_order.insert(0, layer_id.clone());
        self.base_layer = Some(layer_id);
        previous
    }

    /// The layer at the bottom of the stack
    pub fn base_layer(&self) -> Option<&dyn LayerTrait> {
        self.base_layer
            .as_ref()
            .and_then(|id| self.layers.get(id))
            .map(|l| l.as_ref())
    }

    /// Gets a reference to a layer by ID
    pub fn get_layer(&self, layer_id: &str) -> Option<&dyn LayerTrait> {
        self.layers.get(layer_id).map(|l| l.as_ref())
    }

    /// Applies a function to a specific layer mutably
    pub fn with_layer_mut<F, R>(&mut self, layer_id: &str, f: F) -> Option<R>
    where
        F: FnOnce(&mut dyn LayerTrait) -> R,
    {
        self.layers.get_mut(layer_id).map(|layer| f(layer.as_mut()))
    }

    pub fn contains(&self, layer_id: &str) -> bool {
        self.layers.contains_key(layer_id)
    }

    /// Lists all layer IDs in render order
    pub fn list_layers(&self) -> Vec<String> {
        self.render_order.clone()
    }

    /// Gets all layers in render order
    pub fn layers(&self) -> Vec<&dyn LayerTrait> {
        self.render_order
            .iter()
            .filter_map(|id| self.layers.get(id).map(|l| l.as_ref()))
            .collect()
    }

    /// Layers of one type in render order
    pub fn layers_of_type(&self, layer_type: LayerType) -> Vec<&dyn LayerTrait> {
        self.layers()
            .into_iter()
            .filter(|l| l.layer_type() == layer_type)
            .collect()
    }

    /// Gets the number of layers
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Checks if the manager is empty
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

impl Default for LayerManager {
    fn default() -> Self {
        Self::new()
    }
}

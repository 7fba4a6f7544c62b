//! Headless map instance: one view, one layer stack, queued events.

use crate::{
    core::{
        constants::DEFAULT_ZOOM,
        events::{EventManager, MapEvent},
        geo::Point,
        slot::MapSlot,
        viewport::ViewState,
    },
    layers::{
        base::LayerTrait, manager::LayerManager, overlay::LabelOverlay, vector::GeometryKind,
    },
    MapError, Result,
};

/// Default container size in pixels.
const DEFAULT_SIZE: (f64, f64) = (800.0, 600.0);

/// Page element a map renders into
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container {
    id: String,
    visible: bool,
}

impl Container {
    pub fn new(id: impl Into<String>, visible: bool) -> Self {
        Self {
            id: id.into(),
            visible,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn show(&mut self) {
        self.visible = true;
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }
}

/// An active draw interaction and the sketch it is collecting
#[derive(Debug, Clone, PartialEq)]
pub struct Interaction {
    pub kind: GeometryKind,
    /// Sketch finishes on its own once this many points are placed
    pub max_points: Option<usize>,
    sketch: Vec<Point>,
}

impl Interaction {
    /// Draw interaction for `kind`; lines are two-point segments
    pub fn draw(kind: GeometryKind) -> Self {
        let max_points = match kind {
            GeometryKind::Line => Some(2),
            GeometryKind::Polygon | GeometryKind::Measure => None,
        };
        Self {
            kind,
            max_points,
            sketch: Vec::new(),
        }
    }

    pub fn sketch(&self) -> &[Point] {
        &self.sketch
    }
}

/// A single map instance
pub struct Map {
    slot: MapSlot,
    view: ViewState,
    size: Point,
    target: Option<String>,
    layers: LayerManager,
    labels: Vec<LabelOverlay>,
    interaction: Option<Interaction>,
    marker_click_handler: bool,
    info_click_handler: bool,
    events: EventManager,
}

impl Map {
    pub fn new(slot: MapSlot, view: ViewState) -> Self {
        Self {
            slot,
            view: view.clamped(DEFAULT_ZOOM),
            size: Point::new(DEFAULT_SIZE.0, DEFAULT_SIZE.1),
            target: None,
            layers: LayerManager::new(),
            labels: Vec::new(),
            interaction: None,
            marker_click_handler: false,
            info_click_handler: false,
            events: EventManager::new(),
        }
    }

    pub fn slot(&self) -> MapSlot {
        self.slot
    }

    /// Renders the map into `container`
    ///
    /// A hidden container has no size, so attaching to one fails.
    pub fn attach(&mut self, container: &Container) -> Result<()> {
        if !container.is_visible() {
            return Err(MapError::HiddenContainer(container.id().to_string()));
        }
        self.target = Some(container.id().to_string());
        Ok(())
    }

    /// Detaches the map from its container and stops listening for input
    pub fn detach(&mut self) {
        self.target = None;
        self.marker_click_handler = false;
        self.info_click_handler = false;
        self.interaction = None;
        self.events.clear_events();
    }

    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    pub fn is_attached(&self) -> bool {
        self.target.is_some()
    }

    pub fn size(&self) -> Point {
        self.size
    }

    pub fn set_size(&mut self, size: Point) {
        self.size = size;
    }

    // ---- view --------------------------------------------------------------

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    /// Replaces the whole view; returns whether anything changed
    ///
    /// Zoom is clamped to the permalink's zoom range.
    pub fn set_view(&mut self, view: ViewState) -> bool {
        let view = view.clamped(self.view.zoom);
        if self.view.matches(&view) {
            return false;
        }
        self.view = view;
        self.events.emit(MapEvent::ViewChanged {
            center: view.center,
            zoom: view.zoom,
            rotation: view.rotation,
        });
        self.events.emit(MapEvent::MoveEnd {
            center: view.center,
            zoom: view.zoom,
        });
        true
    }

    pub fn set_center(&mut self, center: Point) -> bool {
        self.set_view(ViewState { center, ..self.view })
    }

    pub fn set_zoom(&mut self, zoom: f64) -> bool {
        self.set_view(ViewState { zoom, ..self.view })
    }

    pub fn set_rotation(&mut self, rotation: f64) -> bool {
        self.set_view(ViewState {
            rotation,
            ..self.view
        })
    }

    pub fn resolution(&self) -> f64 {
        self.view.resolution()
    }

    /// Single click at a container pixel
    pub fn click(&mut self, pixel: Point) {
        let coordinate = self.view.coordinate_at_pixel(pixel, self.size);
        self.events.emit(MapEvent::Click { coordinate, pixel });
    }

    // ---- layers ------------------------------------------------------------

    pub fn add_layer(&mut self, layer: Box<dyn LayerTrait>) -> Result<()> {
        let layer_id = layer.id().to_string();
        self.layers.add_layer(layer)?;
        self.events.emit(MapEvent::LayerAdd { layer_id });
        Ok(())
    }

    pub fn remove_layer(&mut self, layer_id: &str) -> Option<Box<dyn LayerTrait>> {
        let removed = self.layers.remove_layer(layer_id);
        if removed.is_some() {
            self.events.emit(MapEvent::LayerRemove {
                layer_id: layer_id.to_string(),
            });
        }
        removed
    }

    /// Replaces the layer at the bottom of the stack
    pub fn set_base_layer(&mut self, layer: Box<dyn LayerTrait>) {
        let layer_id = layer.id().to_string();
        self.layers.set_base_layer(layer);
        self.events.emit(MapEvent::BaseLayerChange { layer_id });
    }

    /// Id of the current base layer
    pub fn base_layer_id(&self) -> Option<&str> {
        self.layers.base_layer().map(|l| l.id())
    }

    pub fn get_layer(&self, layer_id: &str) -> Option<&dyn LayerTrait> {
        self.layers.get_layer(layer_id)
    }

    /// Typed access to a layer
    pub fn layer_as<T: 'static>(&self, layer_id: &str) -> Option<&T> {
        self.layers.get_layer(layer_id).and_then(|l| l.downcast_ref::<T>())
    }

    pub fn has_layer(&self, layer_id: &str) -> bool {
        self.layers.contains(layer_id)
    }

    pub fn layers(&self) -> &LayerManager {
        &self.layers
    }

    pub fn list_layers(&self) -> Vec<String> {
        self.layers.list_layers()
    }

    /// A tile of `layer_id` failed to load
    pub fn report_tile_error(&mut self, layer_id: &str) {
        self.events.emit(MapEvent::TileLoadError {
            layer_id: layer_id.to_string(),
        });
    }

    // ---- label overlays ----------------------------------------------------

    /// Adds or replaces the label with the same id
    pub fn add_label(&mut self, label: LabelOverlay) {
        self.labels.retain(|l| l.id != label.id);
        self.labels.push(label);
    }

    pub fn remove_label(&mut self, id: &str) -> Option<LabelOverlay> {
        let index = self.labels.iter().position(|l| l.id == id)?;
        Some(self.labels.remove(index))
    }

    pub fn label(&self, id: &str) -> Option<&LabelOverlay> {
        self.labels.iter().find(|l| l.id == id)
    }

    pub fn labels(&self) -> &[LabelOverlay] {
        &self.labels
    }

    // ---- interactions ------------------------------------------------------

    /// Starts a draw interaction, replacing any running one
    pub fn add_interaction(&mut self, interaction: Interaction) {
        self.interaction = Some(interaction);
    }

    pub fn remove_interaction(&mut self) -> Option<Interaction> {
        self.interaction.take()
    }

    pub fn interaction(&self) -> Option<&Interaction> {
        self.interaction.as_ref()
    }

    /// Places a sketch point; returns the finished sketch once the
    /// interaction's point limit is reached
    pub fn add_sketch_point(&mut self, point: Point) -> Option<Vec<Point>> {
        let interaction = self.interaction.as_mut()?;
        interaction.sketch.push(point);
        match interaction.max_points {
            Some(max) if interaction.sketch.len() >= max => {
                Some(std::mem::take(&mut interaction.sketch))
            }
            _ => None,
        }
    }

    /// Ends the sketch (double click); returns it if it has enough points
    pub fn finish_sketch(&mut self) -> Option<Vec<Point>> {
        let interaction = self.interaction.as_mut()?;
        if interaction.sketch.len() < interaction.kind.min_points() {
            return None;
        }
        Some(std::mem::take(&mut interaction.sketch))
    }

    pub fn set_marker_click_handler(&mut self, enabled: bool) {
        self.marker_click_handler = enabled;
    }

    pub fn marker_click_handler(&self) -> bool {
        self.marker_click_handler
    }

    pub fn set_info_click_handler(&mut self, enabled: bool) {
        self.info_click_handler = enabled;
    }

    pub fn info_click_handler(&self) -> bool {
        self.info_click_handler
    }

    // ---- events ------------------------------------------------------------

    /// Takes all queued events
    pub fn drain_events(&mut self) -> Vec<MapEvent> {
        self.events.drain()
    }

    pub fn pending_events(&self) -> usize {
        self.events.pending_events()
    }
}

//! The viewer: owns the state, routes map events, and keeps the permalink
//! in step with every user action.

use crate::{
    core::{
        config::ViewerConfig,
        events::MapEvent,
        geo::{LonLat, Point},
        map::Map,
        slot::MapSlot,
        viewport::ViewState,
    },
    draw::{drawables::DrawablesManager, tools},
    layers::{
        base::LayerTrait,
        factory::{LayerCatalog, LayerContext},
        overlay::GeoJsonOverlayLayer,
        vector::GeometryKind,
    },
    overlays::{
        catalog::{OverlayCatalog, WmsOverlayInfo},
        feature_info::{
            fetch_feature_info, format_osm_feature, render_popup, HttpClient, OsmFeature,
        },
        manager::{
            feature_info_requests, osm_legend, osm_summary, overlay_summary,
            update_all_overlays, LegendEntry,
        },
        selection::{OverlayKey, OverlaySource},
    },
    permalink::{
        codec::{decode_with, encode, DecodeWarning, LayerSelection, PermalinkState},
        sync::{HistorySink, PermalinkSync},
    },
    search::{self, PlaceResult},
    split::{controller::SplitController, sync::SyncOutcome},
    state::{
        drawing::DrawingMode,
        store::{AppState, SplitState},
    },
    tiles::capabilities::WmtsCapabilities,
    ErrorSeverity, MapError, Result,
};
use std::sync::{Arc, Mutex};

/// Upper bound on event pump rounds; two synced maps settle in three.
const MAX_PUMP_ROUNDS: usize = 16;

/// Shows blocking messages to the user, `alert()` in a page
pub trait Notifier {
    fn alert(&self, message: &str);
}

/// Notifier that only logs
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn alert(&self, message: &str) {
        log::warn!("Alert: {}", message);
    }
}

/// Notifier remembering every message, shared between clones
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    messages: Arc<Mutex<Vec<String>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .map(|m| m.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }
}

impl Notifier for RecordingNotifier {
    fn alert(&self, message: &str) {
        self.messages
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(message.to_string());
    }
}

pub struct Viewer {
    config: ViewerConfig,
    catalog: LayerCatalog,
    capabilities: Option<WmtsCapabilities>,
    overlay_catalog: OverlayCatalog,
    state: AppState,
    permalink: PermalinkSync,
    split: SplitController,
    notifier: Box<dyn Notifier>,
    /// Base layer the page opened with; its tile failures are reported once
    initial_base_layer: Option<String>,
    tile_error_reported: bool,
    info_clicks: Vec<(MapSlot, Point)>,
    /// Maps moved by view sync whose `MoveEnd` is still queued
    synced_moves: Vec<MapSlot>,
    popup: Option<String>,
}

impl Viewer {
    pub fn new(config: ViewerConfig, history: Box<dyn HistorySink>, notifier: Box<dyn Notifier>) -> Self {
        let catalog = config.catalog();
        let mut overlay_catalog = OverlayCatalog::default();
        overlay_catalog.set_generic(config.generic_overlays.clone());

        let split = SplitState::new(
            catalog.id_at(config.view.split_left_index),
            catalog.id_at(config.view.split_right_index),
        );
        let state = AppState::new(catalog.id_at(config.view.layer_index), split);

        Self {
            config,
            catalog,
            capabilities: None,
            overlay_catalog,
            state,
            permalink: PermalinkSync::new(history),
            split: SplitController::new(),
            notifier,
            initial_base_layer: None,
            tile_error_reported: false,
            info_clicks: Vec::new(),
            synced_moves: Vec::new(),
            popup: None,
        }
    }

    // ---- accessors ---------------------------------------------------------

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn catalog(&self) -> &LayerCatalog {
        &self.catalog
    }

    pub fn overlay_catalog(&self) -> &OverlayCatalog {
        &self.overlay_catalog
    }

    pub fn capabilities(&self) -> Option<&WmtsCapabilities> {
        self.capabilities.as_ref()
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut AppState {
        &mut self.state
    }

    pub fn map(&self, slot: MapSlot) -> Option<&Map> {
        self.state.map(slot)
    }

    /// Direct access to a map, for input the viewer does not model
    pub fn map_mut(&mut self, slot: MapSlot) -> Option<&mut Map> {
        self.state.map_mut(slot)
    }

    pub fn permalink(&self) -> &PermalinkSync {
        &self.permalink
    }

    pub fn split_controller(&self) -> &SplitController {
        &self.split
    }

    /// Query string the current state encodes to
    pub fn current_query(&self) -> Option<String> {
        self.state.to_permalink().map(|s| encode(&s))
    }

    /// Feature info popup of the last overlay click, if it found anything
    pub fn popup(&self) -> Option<&str> {
        self.popup.as_deref()
    }

    pub fn close_popup(&mut self) {
        self.popup = None;
    }

    // ---- startup -----------------------------------------------------------

    /// Builds the maps from the page's query string
    ///
    /// Nothing is written to the history while the state is being restored;
    /// once it is, the normalised permalink is written exactly once.
    pub fn bootstrap(&mut self, query: &str) -> Result<Vec<DecodeWarning>> {
        let (restored, warnings) = decode_with(query, &self.catalog, &self.config.view);
        self.permalink.begin_restore();

        if let Err(e) = self.restore(&restored) {
            self.permalink.finish_restore(None);
            return Err(e);
        }

        // view and layer events of the restore are not user input
        self.state.for_each_map(|map| {
            map.drain_events();
        });
        let snapshot = self.state.to_permalink();
        self.permalink.finish_restore(snapshot.as_ref());
        log::info!(
            "Viewer ready ({} fallback{})",
            warnings.len(),
            if warnings.len() == 1 { "" } else { "s" }
        );
        Ok(warnings)
    }

    fn restore(&mut self, restored: &PermalinkState) -> Result<()> {
        match &restored.layers {
            LayerSelection::Single(id) => self.state.single_layer_id = id.clone(),
            LayerSelection::Split { left, right } => {
                self.state.split.left_layer_id = left.clone();
                self.state.split.right_layer_id = right.clone();
            }
        }

        let ctx = LayerContext {
            catalog: &self.catalog,
            capabilities: self.capabilities.as_ref(),
            overlays: &self.overlay_catalog,
            config: &self.config,
        };
        let mut main = Map::new(
            MapSlot::Main,
            ViewState::from_lon_lat(restored.center, restored.zoom),
        );
        main.set_base_layer(Box::new(ctx.base_layer(&self.state.single_layer_id)));
        main.attach(&self.state.containers[MapSlot::Main])?;
        self.state.maps.main = Some(main);
        self.initial_base_layer = Some(self.state.single_layer_id.clone());

        if restored.layers.is_split() {
            self.split.activate(&mut self.state, &ctx)?;
        }

        self.state.mode = None;
        self.state.drawing = restored.drawing.clone();
        self.state
            .overlays
            .restore_ids(&restored.overlays, &self.overlay_catalog);
        self.state.overlays.restore_osm_ids(&restored.osm);
        update_all_overlays(&mut self.state, &self.overlay_catalog, &self.config.endpoints);
        DrawablesManager::new(&mut self.state).show_all_drawables();
        tools::enable_mode_handlers(&mut self.state);
        Ok(())
    }

    /// Fetches the WMTS capabilities, the WMS layer list and the OSM manifest
    ///
    /// Each document is optional: a failure is logged and the viewer keeps
    /// working with what it has.
    pub async fn load_remote(&mut self, client: &dyn HttpClient) {
        let endpoints = self.config.endpoints.clone();

        let wmts_url = endpoints.wmts_capabilities_request(&self.config.keys.wmts_api_key);
        match client.fetch_text(&wmts_url).await.and_then(|xml| WmtsCapabilities::parse(&xml)) {
            Ok(capabilities) => self.set_capabilities(capabilities),
            Err(e) => self.report(&e),
        }

        match self
            .overlay_catalog
            .load_wms(client, &endpoints.wms_capabilities_url)
            .await
        {
            Ok(_) => self.place_pending_overlays(),
            Err(e) => self.report(&e),
        }

        match self
            .overlay_catalog
            .load_osm_manifest(client, &endpoints.osm_manifest_url)
            .await
        {
            Ok(_) => {
                update_all_overlays(&mut self.state, &self.overlay_catalog, &self.config.endpoints);
            }
            Err(e) => self.report(&e),
        }
    }

    /// [`Self::load_remote`] bounded by `limit`; returns whether it finished
    ///
    /// Documents that arrived before the deadline stay installed.
    #[cfg(feature = "tokio-runtime")]
    pub async fn load_remote_within(
        &mut self,
        client: &dyn HttpClient,
        limit: std::time::Duration,
    ) -> bool {
        match tokio::time::timeout(limit, self.load_remote(client)).await {
            Ok(()) => true,
            Err(_) => {
                log::warn!(
                    "Remote catalogs still loading after {:?}; continuing without them",
                    limit
                );
                false
            }
        }
    }

    /// Installs a WMTS capabilities document and rebuilds the base layers with it
    pub fn set_capabilities(&mut self, capabilities: WmtsCapabilities) {
        log::info!("WMTS capabilities list {} layers", capabilities.layers.len());
        self.capabilities = Some(capabilities);
        let ctx = LayerContext {
            catalog: &self.catalog,
            capabilities: self.capabilities.as_ref(),
            overlays: &self.overlay_catalog,
            config: &self.config,
        };
        for slot in MapSlot::ALL {
            let layer_id = self.state.layer_id(slot).to_string();
            if let Some(map) = self.state.maps[slot].as_mut() {
                map.set_base_layer(Box::new(ctx.base_layer(&layer_id)));
            }
        }
    }

    /// Installs the WMS layer list and places overlay ids restored before it
    pub fn set_wms_overlays(&mut self, layers: Vec<WmsOverlayInfo>) {
        self.overlay_catalog.set_wms(layers);
        self.place_pending_overlays();
    }

    fn place_pending_overlays(&mut self) {
        if self.state.overlays.resolve_pending(&self.overlay_catalog) {
            update_all_overlays(&mut self.state, &self.overlay_catalog, &self.config.endpoints);
            self.write_permalink();
        }
    }

    // ---- event loop ----------------------------------------------------------

    /// Handles queued map events until every map is quiet
    ///
    /// Returns the number of events handled.
    pub fn pump(&mut self) -> usize {
        let mut handled = 0;
        for _ in 0..MAX_PUMP_ROUNDS {
            let mut batch = Vec::new();
            for slot in MapSlot::ALL {
                if let Some(map) = self.state.map_mut(slot) {
                    batch.extend(map.drain_events().into_iter().map(|e| (slot, e)));
                }
            }
            if batch.is_empty() {
                return handled;
            }
            for (slot, event) in batch {
                self.handle_event(slot, event);
                handled += 1;
            }
        }
        log::warn!("Event pump gave up after {} rounds", MAX_PUMP_ROUNDS);
        handled
    }

    fn handle_event(&mut self, slot: MapSlot, event: MapEvent) {
        if !self.state.is_active(slot) {
            return;
        }
        match event {
            MapEvent::ViewChanged { .. } => {
                if self.split.on_view_changed(&mut self.state, slot) == SyncOutcome::Propagated {
                    self.synced_moves.extend(slot.partner());
                }
            }
            MapEvent::MoveEnd { .. } => {
                // the partner's move settles on the view just written
                match self.synced_moves.iter().position(|s| *s == slot) {
                    Some(i) => {
                        self.synced_moves.swap_remove(i);
                    }
                    None => {
                        self.write_permalink();
                    }
                }
            }
            MapEvent::Click { coordinate, .. } => self.on_click(slot, coordinate),
            MapEvent::TileLoadError { layer_id } => self.on_tile_error(slot, &layer_id),
            other => log::debug!("{} map: {}", slot, other.event_type()),
        }
    }

    fn on_click(&mut self, slot: MapSlot, coordinate: Point) {
        let Some((marker, info)) = self
            .state
            .map(slot)
            .map(|m| (m.marker_click_handler(), m.info_click_handler()))
        else {
            return;
        };
        if marker {
            if tools::handle_marker_click(&mut self.state, coordinate) {
                self.write_permalink();
            }
        } else if info && !self.state.overlays.selected_keys().is_empty() {
            self.info_clicks.push((slot, coordinate));
        }
    }

    fn on_tile_error(&mut self, slot: MapSlot, layer_id: &str) {
        let initial = slot == MapSlot::Main && self.initial_base_layer.as_deref() == Some(layer_id);
        if initial && !self.tile_error_reported {
            self.tile_error_reported = true;
            let name = self.catalog.display_name(layer_id).to_string();
            self.report(&MapError::TileLoad(name));
        } else {
            log::warn!("Tile load failed for '{}' on {} map", layer_id, slot);
        }
    }

    fn report(&self, error: &MapError) {
        match error.severity() {
            ErrorSeverity::UserVisible => self.notifier.alert(&error.to_string()),
            ErrorSeverity::Recoverable => log::warn!("{}", error),
        }
    }

    /// Writes the permalink unless a restore is running
    pub fn write_permalink(&mut self) -> bool {
        match self.state.to_permalink() {
            Some(snapshot) => self.permalink.write(&snapshot),
            None => false,
        }
    }

    // ---- base layers and split mode -------------------------------------------

    /// Shows catalog layer `layer_id` on the map in `slot`
    pub fn switch_base_layer(&mut self, slot: MapSlot, layer_id: &str) -> Result<()> {
        if !self.catalog.contains(layer_id) {
            return Err(MapError::Layer(format!("unknown base layer '{}'", layer_id)));
        }
        if !self.state.is_active(slot) {
            return Err(MapError::MissingMap(slot));
        }
        let ctx = LayerContext {
            catalog: &self.catalog,
            capabilities: self.capabilities.as_ref(),
            overlays: &self.overlay_catalog,
            config: &self.config,
        };
        let layer = ctx.base_layer(layer_id);
        self.state.require_map_mut(slot)?.set_base_layer(Box::new(layer));
        self.state.set_layer_id(slot, layer_id);
        log::debug!("{} map base layer -> {}", slot, layer_id);
        self.write_permalink();
        Ok(())
    }

    pub fn toggle_split(&mut self) -> Result<()> {
        let ctx = LayerContext {
            catalog: &self.catalog,
            capabilities: self.capabilities.as_ref(),
            overlays: &self.overlay_catalog,
            config: &self.config,
        };
        self.split.toggle(&mut self.state, &ctx)?;
        self.synced_moves.clear();
        self.write_permalink();
        Ok(())
    }

    // ---- drawing -------------------------------------------------------------

    pub fn enter_drawing_mode(&mut self, mode: DrawingMode) {
        tools::enter_mode(&mut self.state, mode);
    }

    pub fn cancel_drawing_mode(&mut self) {
        tools::cancel_mode(&mut self.state);
    }

    /// Adds a sketch point on the map in `slot`; returns whether the
    /// drawing completed with it
    pub fn sketch_point(&mut self, slot: MapSlot, point: Point) -> bool {
        let Some(kind) = self.sketch_kind(slot) else {
            return false;
        };
        match tools::add_sketch_point(&mut self.state, slot, point) {
            Some(points) => self.complete_drawing(kind, &points),
            None => false,
        }
    }

    /// Finishes the sketch on `slot` (double click)
    pub fn finish_sketch(&mut self, slot: MapSlot) -> bool {
        let Some(kind) = self.sketch_kind(slot) else {
            return false;
        };
        match tools::finish_sketch(&mut self.state, slot) {
            Some(points) => self.complete_drawing(kind, &points),
            None => false,
        }
    }

    fn sketch_kind(&self, slot: MapSlot) -> Option<GeometryKind> {
        self.state.map(slot)?.interaction().map(|i| i.kind)
    }

    fn complete_drawing(&mut self, kind: GeometryKind, points: &[Point]) -> bool {
        let kept = tools::complete_drawing(&mut self.state, kind, points);
        self.write_permalink();
        kept
    }

    pub fn remove_all_features(&mut self) {
        tools::remove_all_features(&mut self.state);
        self.write_permalink();
    }

    // ---- overlays ------------------------------------------------------------

    /// Selects or deselects one WMS overlay
    pub fn set_overlay(&mut self, key: &OverlayKey, selected: bool) -> bool {
        let changed = self.state.overlays.toggle(key, selected);
        if changed {
            self.refresh_overlays();
        }
        changed
    }

    /// Replaces the selection of one WMS list
    pub fn set_overlay_names(&mut self, source: OverlaySource, names: Vec<String>) {
        self.state.overlays.set_names(source, names);
        self.refresh_overlays();
    }

    /// Selects or deselects one OSM dataset
    pub fn set_osm(&mut self, id: &str, selected: bool) -> bool {
        let changed = self.state.overlays.toggle_osm(id, selected);
        if changed {
            self.refresh_overlays();
        }
        changed
    }

    fn refresh_overlays(&mut self) {
        update_all_overlays(&mut self.state, &self.overlay_catalog, &self.config.endpoints);
        self.write_permalink();
    }

    pub fn overlay_summary(&self, source: OverlaySource) -> String {
        overlay_summary(&self.state.overlays, &self.overlay_catalog, source)
    }

    pub fn osm_summary(&self) -> String {
        osm_summary(&self.state.overlays, &self.overlay_catalog)
    }

    pub fn osm_legend(&self) -> Vec<LegendEntry> {
        osm_legend(&self.state.overlays, &self.overlay_catalog)
    }

    /// Shows the popup for an OSM feature the host hit on the map in `slot`
    ///
    /// Ignored while a drawing tool is active or when the dataset is not
    /// shown on that map.
    pub fn osm_feature_click(
        &mut self,
        slot: MapSlot,
        osm_id: &str,
        feature: &OsmFeature,
    ) -> Option<String> {
        if self.state.mode.is_some() {
            return None;
        }
        let map = self.state.map(slot)?;
        let layer = map.layer_as::<GeoJsonOverlayLayer>(&format!("osm:{}", osm_id))?;
        let html = format_osm_feature(feature, layer.name(), layer.color());
        self.popup = Some(html);
        self.popup.clone()
    }

    /// Clicks the pump queued for overlay feature info
    pub fn take_info_clicks(&mut self) -> Vec<(MapSlot, Point)> {
        std::mem::take(&mut self.info_clicks)
    }

    /// Asks every selected overlay about `coordinate` and shows what came back
    pub async fn overlay_info_click(
        &mut self,
        client: &dyn HttpClient,
        slot: MapSlot,
        coordinate: Point,
    ) -> Option<String> {
        let requests = feature_info_requests(&self.state, &self.overlay_catalog, slot, coordinate);
        if requests.is_empty() {
            return None;
        }
        self.popup = None;
        let results = fetch_feature_info(client, requests).await;
        self.popup = render_popup(&results);
        self.popup.clone()
    }

    /// Resolves the queued overlay clicks in order; returns the last popup
    pub async fn process_info_clicks(&mut self, client: &dyn HttpClient) -> Option<String> {
        let mut popup = None;
        for (slot, coordinate) in self.take_info_clicks() {
            popup = self.overlay_info_click(client, slot, coordinate).await;
        }
        popup
    }

    // ---- search ----------------------------------------------------------------

    /// Moves to a place picked from the search box
    pub fn select_place(&mut self, place: &PlaceResult) -> Result<LonLat> {
        let zoom = self.config.view.search_zoom;
        search::select_place(&mut self.state, place, zoom).map_err(|e| {
            self.report(&e);
            e
        })
    }
}

//! Switching between one map and two side-by-side maps.

use crate::{
    core::{map::Map, slot::MapSlot},
    draw::{drawables::DrawablesManager, tools::enable_mode_handlers},
    layers::factory::LayerContext,
    overlays::manager::update_all_overlays,
    split::sync::{SyncOutcome, ViewSync},
    state::store::AppState,
    Result,
};

/// Single / split state machine and the view sync of the split pair
#[derive(Debug, Default)]
pub struct SplitController {
    sync: ViewSync,
}

impl SplitController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sync(&self) -> &ViewSync {
        &self.sync
    }

    /// Single -> split
    ///
    /// The split containers are shown before either map is built, since a
    /// map cannot attach to a hidden container. Both maps start from the
    /// single map's view; its drawables move over and leave the single map.
    pub fn activate(&mut self, state: &mut AppState, ctx: &LayerContext<'_>) -> Result<()> {
        if state.split.is_split {
            return Ok(());
        }
        let view = *state.require_map_mut(MapSlot::Main)?.view();

        state.containers[MapSlot::Main].hide();
        state.containers[MapSlot::Left].show();
        state.containers[MapSlot::Right].show();

        for slot in [MapSlot::Left, MapSlot::Right] {
            let mut map = Map::new(slot, view);
            map.set_base_layer(Box::new(ctx.base_layer(state.layer_id(slot))));
            if let Err(e) = map.attach(&state.containers[slot]) {
                self.restore_single(state);
                return Err(e);
            }
            state.maps[slot] = Some(map);
        }
        state.split.is_split = true;
        self.sync.reset();

        let mut drawables = DrawablesManager::new(state);
        drawables.copy_drawn_features(MapSlot::Main, MapSlot::Left);
        drawables.copy_drawn_features(MapSlot::Main, MapSlot::Right);
        drawables.clear_drawn_features(MapSlot::Main);
        drawables.show_all_drawables();

        update_all_overlays(state, ctx.overlays, &ctx.config.endpoints);
        enable_mode_handlers(state);
        drain_setup_events(state);

        log::info!(
            "Split screen on: {} | {}",
            state.split.left_layer_id,
            state.split.right_layer_id
        );
        Ok(())
    }

    /// Split -> single
    ///
    /// Drawables shown on the left map move back to the single map and both
    /// split maps are torn down.
    pub fn deactivate(&mut self, state: &mut AppState, ctx: &LayerContext<'_>) -> Result<()> {
        if !state.split.is_split {
            return Ok(());
        }
        // the single map picks up where the left map was left
        let left_view = state.map(MapSlot::Left).map(|m| *m.view());
        let main = state.require_map_mut(MapSlot::Main)?;
        if let Some(view) = left_view {
            main.set_view(view);
        }

        state.split.is_split = false;
        state.containers[MapSlot::Main].show();
        state.containers[MapSlot::Left].hide();
        state.containers[MapSlot::Right].hide();

        let mut drawables = DrawablesManager::new(state);
        drawables.copy_drawn_features(MapSlot::Left, MapSlot::Main);
        drawables.clear_drawn_features(MapSlot::Left);
        drawables.clear_drawn_features(MapSlot::Right);
        self.restore_single(state);

        DrawablesManager::new(state).show_all_drawables();
        update_all_overlays(state, ctx.overlays, &ctx.config.endpoints);
        enable_mode_handlers(state);
        drain_setup_events(state);

        log::info!("Split screen off: {}", state.single_layer_id);
        Ok(())
    }

    pub fn toggle(&mut self, state: &mut AppState, ctx: &LayerContext<'_>) -> Result<()> {
        if state.split.is_split {
            self.deactivate(state, ctx)
        } else {
            self.activate(state, ctx)
        }
    }

    /// Forwards a view change of one split map to the sync latch
    pub fn on_view_changed(&mut self, state: &mut AppState, source: MapSlot) -> SyncOutcome {
        if !state.split.is_split {
            return SyncOutcome::Skipped;
        }
        self.sync.on_view_changed(source, &mut state.maps)
    }

    /// Drops the split maps and shows the single container again
    fn restore_single(&mut self, state: &mut AppState) {
        for slot in [MapSlot::Left, MapSlot::Right] {
            if let Some(mut map) = state.maps[slot].take() {
                map.detach();
            }
            state.containers[slot].hide();
        }
        state.containers[MapSlot::Main].show();
        state.split.is_split = false;
        self.sync.reset();
    }
}

/// Layer bookkeeping during a transition is not a user action
fn drain_setup_events(state: &mut AppState) {
    state.for_each_map(|map| {
        map.drain_events();
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        core::{config::ViewerConfig, geo::LonLat, viewport::ViewState},
        layers::{factory::LayerCatalog, vector::VectorLayer},
        overlays::catalog::OverlayCatalog,
        state::store::SplitState,
    };

    fn state() -> AppState {
        let mut state = AppState::new("maastokartta", SplitState::new("ortokuva", "osm"));
        let mut main = Map::new(
            MapSlot::Main,
            ViewState::from_lon_lat(LonLat::new(24.94, 60.19), 9.0),
        );
        main.attach(&state.containers[MapSlot::Main]).unwrap();
        state.maps.main = Some(main);
        state
    }

    #[test]
    fn test_activate_builds_both_maps_from_main_view() {
        let config = ViewerConfig::default();
        let overlays = OverlayCatalog::default();
        let ctx = LayerContext {
            catalog: LayerCatalog::builtin(),
            capabilities: None,
            overlays: &overlays,
            config: &config,
        };
        let mut state = state();
        let mut controller = SplitController::new();
        controller.activate(&mut state, &ctx).unwrap();

        assert!(state.is_split());
        assert!(!state.containers[MapSlot::Main].is_visible());
        let main_view = *state.map(MapSlot::Main).unwrap().view();
        for (slot, layer) in [(MapSlot::Left, "ortokuva"), (MapSlot::Right, "osm")] {
            let map = state.map(slot).unwrap();
            assert_eq!(map.target(), Some(slot.container_id()));
            assert_eq!(map.base_layer_id(), Some(layer));
            assert!(map.view().matches(&main_view));
            assert!(map.info_click_handler());
            assert_eq!(map.pending_events(), 0);
        }

        controller.deactivate(&mut state, &ctx).unwrap();
        assert!(!state.is_split());
        assert!(state.map(MapSlot::Left).is_none());
        assert!(state.containers[MapSlot::Main].is_visible());
    }

    #[test]
    fn test_polygon_moves_to_split_maps_and_back() {
        let config = ViewerConfig::default();
        let overlays = OverlayCatalog::default();
        let ctx = LayerContext {
            catalog: LayerCatalog::builtin(),
            capabilities: None,
            overlays: &overlays,
            config: &config,
        };
        let mut state = state();
        DrawablesManager::new(&mut state).show_polygon(Some(vec![
            LonLat::new(24.0, 60.0),
            LonLat::new(24.2, 60.0),
            LonLat::new(24.1, 60.2),
        ]));

        let mut controller = SplitController::new();
        controller.activate(&mut state, &ctx).unwrap();
        assert!(!state.map(MapSlot::Main).unwrap().has_layer("drawn-polygon"));
        for slot in [MapSlot::Left, MapSlot::Right] {
            let layer = state
                .map(slot)
                .and_then(|m| m.layer_as::<VectorLayer>("drawn-polygon"))
                .unwrap();
            assert_eq!(layer.geometry().vertices().len(), 3);
        }

        controller.deactivate(&mut state, &ctx).unwrap();
        assert!(state.map(MapSlot::Main).unwrap().has_layer("drawn-polygon"));
    }

    #[test]
    fn test_activate_needs_main_map() {
        let config = ViewerConfig::default();
        let overlays = OverlayCatalog::default();
        let ctx = LayerContext {
            catalog: LayerCatalog::builtin(),
            capabilities: None,
            overlays: &overlays,
            config: &config,
        };
        let mut state = AppState::new("maastokartta", SplitState::new("ortokuva", "osm"));
        assert!(SplitController::new().activate(&mut state, &ctx).is_err());
        assert!(!state.is_split());
    }
}

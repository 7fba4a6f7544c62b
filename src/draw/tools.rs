//! Drawing tools: entering a mode, sketching, and finishing a drawing.

use crate::{
    core::{
        geo::{unproject_path, Point},
        map::Interaction,
        slot::MapSlot,
    },
    draw::{
        drawables::{DrawablesManager, MEASURE_LABEL_ID},
        measure::format_projected_length,
    },
    layers::{overlay::LabelOverlay, vector::GeometryKind},
    state::{drawing::DrawingMode, store::AppState},
};

/// Switches to `mode`
///
/// The click marker goes away, as does any geometry of the kind about to be
/// drawn; other drawables stay.
pub fn enter_mode(state: &mut AppState, mode: DrawingMode) {
    state.mode = Some(mode);
    state.for_each_map(|map| {
        map.remove_interaction();
    });

    let mut drawables = DrawablesManager::new(state);
    drawables.clear_all_markers();
    if let Some(kind) = mode.geometry_kind() {
        drawables.show_geometry(kind, None);
    }

    enable_mode_handlers(state);
    log::debug!("Drawing mode {:?}", mode);
}

/// Leaves the current mode without drawing anything
pub fn cancel_mode(state: &mut AppState) {
    state.mode = None;
    enable_mode_handlers(state);
}

/// Wires the active maps for the current mode
///
/// Without a mode, clicks ask the overlays for feature info; the marker tool
/// takes clicks instead, and the sketch tools start a draw interaction.
pub fn enable_mode_handlers(state: &mut AppState) {
    let mode = state.mode;
    state.for_each_map(|map| {
        map.remove_interaction();
        map.set_marker_click_handler(false);
        map.set_info_click_handler(false);
    });
    state.for_each_active_map(|map| {
        map.set_info_click_handler(mode.is_none());
        map.set_marker_click_handler(mode == Some(DrawingMode::Marker));
        if let Some(kind) = mode.and_then(DrawingMode::geometry_kind) {
            map.add_interaction(Interaction::draw(kind));
        }
    });
}

/// Adds a sketch point on the map in `slot`
///
/// Measure sketches get a running length label on every active map.
/// Returns the finished sketch once the interaction ends by itself.
pub fn add_sketch_point(state: &mut AppState, slot: MapSlot, point: Point) -> Option<Vec<Point>> {
    let map = state.map_mut(slot)?;
    let kind = map.interaction()?.kind;
    let finished = map.add_sketch_point(point);

    if kind == GeometryKind::Measure {
        let sketch = state
            .map(slot)
            .and_then(|m| m.interaction())
            .map(|i| i.sketch().to_vec())
            .unwrap_or_default();
        if let Some(last) = sketch.last().copied().filter(|_| sketch.len() > 1) {
            let text = format_projected_length(&sketch);
            state.for_each_active_map(|map| {
                map.add_label(LabelOverlay::new(MEASURE_LABEL_ID, last, text.clone()));
            });
        }
    }
    finished
}

/// Ends the sketch on the map in `slot`, if it has enough points
pub fn finish_sketch(state: &mut AppState, slot: MapSlot) -> Option<Vec<Point>> {
    state.map_mut(slot)?.finish_sketch()
}

/// Stores a finished sketch, shows it on the active maps and leaves the mode
///
/// Returns whether the geometry was kept.
pub fn complete_drawing(state: &mut AppState, kind: GeometryKind, points: &[Point]) -> bool {
    let mut coords = unproject_path(points);
    kind.open_ring(&mut coords);
    let kept = DrawablesManager::new(state).show_geometry(kind, Some(coords));
    state.mode = None;
    enable_mode_handlers(state);
    kept
}

/// A click while the marker tool is active places the marker and ends the mode
///
/// Returns whether the click was taken.
pub fn handle_marker_click(state: &mut AppState, coordinate: Point) -> bool {
    if state.mode != Some(DrawingMode::Marker) {
        return false;
    }
    DrawablesManager::new(state).show_marker(Some(coordinate.to_lon_lat()));
    state.mode = None;
    enable_mode_handlers(state);
    true
}

/// Removes every drawable from every map and forgets the coordinates
pub fn remove_all_features(state: &mut AppState) {
    let mut drawables = DrawablesManager::new(state);
    for slot in MapSlot::ALL {
        drawables.clear_drawn_features(slot);
    }
    drawables.clear_all_markers();
    drawables.clear_search_marker();
    state.drawing.clear();
}

//! Realises the drawing state as layers on the maps on screen.
//!
//! Coordinates in [`DrawingState`] are what persists; the layers built here
//! are per-map and get rebuilt whenever the set of maps changes.

use crate::{
    core::{
        geo::{project_path, unproject_path, LonLat},
        map::Map,
        slot::MapSlot,
    },
    draw::measure::format_length,
    layers::{
        marker::{Marker, MarkerKind},
        overlay::LabelOverlay,
        vector::{GeometryKind, VectorLayer},
    },
    state::{drawing::DrawingState, store::AppState},
};

pub const CLICK_MARKER_ID: &str = "click-marker";
pub const SEARCH_MARKER_ID: &str = "search-marker";
pub const MEASURE_LABEL_ID: &str = "measure-label";

/// Layer id of the drawn feature of `kind`
pub fn geometry_layer_id(kind: GeometryKind) -> &'static str {
    match kind {
        GeometryKind::Line => "drawn-line",
        GeometryKind::Polygon => "drawn-polygon",
        GeometryKind::Measure => "measure-line",
    }
}

fn geometry_layer(kind: GeometryKind, coords: &[LonLat]) -> VectorLayer {
    let id = geometry_layer_id(kind).to_string();
    let points = project_path(coords);
    match kind {
        GeometryKind::Line => VectorLayer::line(id, points),
        GeometryKind::Polygon => VectorLayer::polygon(id, points),
        GeometryKind::Measure => VectorLayer::measure_line(id, points),
    }
}

fn measure_label(coords: &[LonLat]) -> Option<LabelOverlay> {
    let last = coords.last()?;
    Some(LabelOverlay::new(
        MEASURE_LABEL_ID,
        last.to_projected(),
        format_length(coords),
    ))
}

fn put_geometry(map: &mut Map, kind: GeometryKind, coords: &[LonLat]) {
    map.remove_layer(geometry_layer_id(kind));
    if let Err(e) = map.add_layer(Box::new(geometry_layer(kind, coords))) {
        log::warn!("Could not show {} on {} map: {}", kind, map.slot(), e);
        return;
    }
    if kind == GeometryKind::Measure {
        if let Some(label) = measure_label(coords) {
            map.add_label(label);
        }
    }
}

fn take_geometry(map: &mut Map, kind: GeometryKind) {
    map.remove_layer(geometry_layer_id(kind));
    if kind == GeometryKind::Measure {
        map.remove_label(MEASURE_LABEL_ID);
    }
}

fn put_marker(map: &mut Map, id: &str, position: LonLat, kind: MarkerKind) {
    map.remove_layer(id);
    if let Err(e) = map.add_layer(Box::new(Marker::new(id.to_string(), position, kind))) {
        log::warn!("Could not place marker on {} map: {}", map.slot(), e);
    }
}

/// Show / copy / clear operations over the maps of an [`AppState`]
pub struct DrawablesManager<'a> {
    state: &'a mut AppState,
}

impl<'a> DrawablesManager<'a> {
    pub fn new(state: &'a mut AppState) -> Self {
        Self { state }
    }

    /// Places the click marker, or removes it for `None`
    pub fn show_marker(&mut self, position: Option<LonLat>) {
        self.state.drawing.marker = position;
        self.state.for_each_map(|map| {
            map.remove_layer(CLICK_MARKER_ID);
        });
        if let Some(position) = position {
            self.state.for_each_active_map(|map| {
                put_marker(map, CLICK_MARKER_ID, position, MarkerKind::Click);
            });
        }
    }

    /// Places the search result marker
    pub fn show_search_marker(&mut self, position: LonLat) {
        self.state.last_search = Some(position);
        self.state.for_each_map(|map| {
            map.remove_layer(SEARCH_MARKER_ID);
        });
        self.state.for_each_active_map(|map| {
            put_marker(map, SEARCH_MARKER_ID, position, MarkerKind::Search);
        });
    }

    pub fn show_line(&mut self, coords: Option<Vec<LonLat>>) -> bool {
        self.show_geometry(GeometryKind::Line, coords)
    }

    pub fn show_polygon(&mut self, coords: Option<Vec<LonLat>>) -> bool {
        self.show_geometry(GeometryKind::Polygon, coords)
    }

    /// Shows the measure line together with its length label
    pub fn show_measure_line(&mut self, coords: Option<Vec<LonLat>>) -> bool {
        self.show_geometry(GeometryKind::Measure, coords)
    }

    /// Replaces the geometry of `kind` on the active maps
    ///
    /// Too few points clear the geometry instead. Returns whether a
    /// geometry is shown afterwards.
    pub fn show_geometry(&mut self, kind: GeometryKind, coords: Option<Vec<LonLat>>) -> bool {
        let shown = self.state.drawing.set_geometry(kind, coords);
        let coords = self.state.drawing.geometry(kind).map(<[LonLat]>::to_vec);
        self.state.for_each_active_map(|map| match &coords {
            Some(coords) => put_geometry(map, kind, coords),
            None => take_geometry(map, kind),
        });
        shown
    }

    /// Rebuilds on `to` the drawn features `from` currently shows
    ///
    /// Geometry is read from the layers of `from`, not from the drawing
    /// state. Kinds `from` does not show are removed from `to`.
    pub fn copy_drawn_features(&mut self, from: MapSlot, to: MapSlot) {
        if from == to {
            return;
        }
        let (source, target) = self.state.maps.pair_mut(from, to);
        let (Some(source), Some(target)) = (source.as_ref(), target.as_mut()) else {
            log::debug!("Skipping feature copy {} -> {}: map missing", from, to);
            return;
        };

        for kind in GeometryKind::ALL {
            let drawn = source
                .layer_as::<VectorLayer>(geometry_layer_id(kind))
                .map(|layer| unproject_path(layer.geometry().vertices()));
            match drawn {
                Some(coords) => put_geometry(target, kind, &coords),
                None => take_geometry(target, kind),
            }
        }
    }

    /// Removes the drawn line, polygon and measure line from one map
    pub fn clear_drawn_features(&mut self, slot: MapSlot) {
        if let Some(map) = self.state.map_mut(slot) {
            for kind in GeometryKind::ALL {
                take_geometry(map, kind);
            }
        }
    }

    /// Removes the measure line and its label from one map
    pub fn clear_measure_line(&mut self, slot: MapSlot) {
        if let Some(map) = self.state.map_mut(slot) {
            take_geometry(map, GeometryKind::Measure);
        }
    }

    /// Removes the click marker from every map and forgets its position
    pub fn clear_all_markers(&mut self) {
        self.show_marker(None);
    }

    /// Removes the search marker from every map
    pub fn clear_search_marker(&mut self) {
        self.state.for_each_map(|map| {
            map.remove_layer(SEARCH_MARKER_ID);
        });
    }

    /// Rebuilds every drawable on the active maps from the drawing state
    pub fn show_all_drawables(&mut self) {
        let DrawingState {
            marker,
            line,
            polygon,
            measure,
        } = self.state.drawing.clone();
        self.show_marker(marker);
        self.show_line(line);
        self.show_polygon(polygon);
        self.show_measure_line(measure);
    }
}

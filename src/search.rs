//! Jumping to a place picked from the search box.

use crate::{
    core::{geo::LonLat, viewport::ViewState},
    draw::drawables::DrawablesManager,
    state::store::AppState,
    MapError, Result,
};
use serde::{Deserialize, Serialize};

/// A place as the autocomplete widget reports it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceResult {
    pub name: String,
    /// Missing when the widget only had the typed text
    pub location: Option<LonLat>,
}

impl PlaceResult {
    pub fn new(name: impl Into<String>, location: Option<LonLat>) -> Self {
        Self {
            name: name.into(),
            location,
        }
    }
}

/// Centers every map on `place` at `zoom` and marks it
///
/// Fails with [`MapError::PlaceWithoutGeometry`] when the place has no
/// location; nothing moves in that case.
pub fn select_place(state: &mut AppState, place: &PlaceResult, zoom: f64) -> Result<LonLat> {
    let location = place
        .location
        .filter(LonLat::is_valid)
        .ok_or_else(|| MapError::PlaceWithoutGeometry(place.name.clone()))?;

    state.for_each_map(|map| {
        let view = ViewState {
            center: location.to_projected(),
            zoom,
            ..*map.view()
        };
        map.set_view(view);
    });
    DrawablesManager::new(state).show_search_marker(location);
    log::info!("Moved to '{}' ({:.5}, {:.5})", place.name, location.lon, location.lat);
    Ok(location)
}

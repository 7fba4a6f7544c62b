//! The one state record every component reads and writes.

use crate::{
    core::{
        geo::LonLat,
        map::{Container, Map},
        slot::{MapSlot, SlotMap},
        viewport::ViewState,
    },
    overlays::selection::OverlaySelection,
    permalink::codec::{LayerSelection, PermalinkState},
    state::drawing::{DrawingMode, DrawingState},
    MapError, Result,
};

/// Base layer ids of the two halves of split mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitState {
    pub is_split: bool,
    pub left_layer_id: String,
    pub right_layer_id: String,
}

impl SplitState {
    pub fn new(left_layer_id: impl Into<String>, right_layer_id: impl Into<String>) -> Self {
        Self {
            is_split: false,
            left_layer_id: left_layer_id.into(),
            right_layer_id: right_layer_id.into(),
        }
    }
}

/// Application state, passed explicitly to whoever needs it
pub struct AppState {
    /// Live map instances; split maps exist only while split
    pub maps: SlotMap<Option<Map>>,
    pub containers: SlotMap<Container>,
    pub split: SplitState,
    /// Base layer of the single map
    pub single_layer_id: String,
    pub drawing: DrawingState,
    pub mode: Option<DrawingMode>,
    pub overlays: OverlaySelection,
    /// Where the last place search pointed; not part of the permalink
    pub last_search: Option<LonLat>,
}

impl AppState {
    pub fn new(single_layer_id: impl Into<String>, split: SplitState) -> Self {
        Self {
            maps: SlotMap::default(),
            containers: SlotMap::new(
                Container::new(MapSlot::Main.container_id(), true),
                Container::new(MapSlot::Left.container_id(), false),
                Container::new(MapSlot::Right.container_id(), false),
            ),
            split,
            single_layer_id: single_layer_id.into(),
            drawing: DrawingState::default(),
            mode: None,
            overlays: OverlaySelection::new(),
            last_search: None,
        }
    }

    pub fn is_split(&self) -> bool {
        self.split.is_split
    }

    /// Slots on screen right now
    pub fn active_slots(&self) -> &'static [MapSlot] {
        MapSlot::active(self.split.is_split)
    }

    pub fn is_active(&self, slot: MapSlot) -> bool {
        self.active_slots().contains(&slot)
    }

    pub fn map(&self, slot: MapSlot) -> Option<&Map> {
        self.maps[slot].as_ref()
    }

    pub fn map_mut(&mut self, slot: MapSlot) -> Option<&mut Map> {
        self.maps[slot].as_mut()
    }

    pub fn require_map_mut(&mut self, slot: MapSlot) -> Result<&mut Map> {
        self.maps[slot].as_mut().ok_or(MapError::MissingMap(slot))
    }

    /// Runs `f` on every active map that exists
    pub fn for_each_active_map<F>(&mut self, mut f: F)
    where
        F: FnMut(&mut Map),
    {
        for &slot in self.active_slots() {
            if let Some(map) = self.maps[slot].as_mut() {
                f(map);
            }
        }
    }

    /// Runs `f` on every map that exists, on screen or not
    pub fn for_each_map<F>(&mut self, mut f: F)
    where
        F: FnMut(&mut Map),
    {
        for slot in MapSlot::ALL {
            if let Some(map) = self.maps[slot].as_mut() {
                f(map);
            }
        }
    }

    /// Base layer id tracked for a slot
    pub fn layer_id(&self, slot: MapSlot) -> &str {
        match slot {
            MapSlot::Main => &self.single_layer_id,
            MapSlot::Left => &self.split.left_layer_id,
            MapSlot::Right => &self.split.right_layer_id,
        }
    }

    pub fn set_layer_id(&mut self, slot: MapSlot, layer_id: impl Into<String>) {
        let layer_id = layer_id.into();
        match slot {
            MapSlot::Main => self.single_layer_id = layer_id,
            MapSlot::Left => self.split.left_layer_id = layer_id,
            MapSlot::Right => self.split.right_layer_id = layer_id,
        }
    }

    /// The view the permalink reports: the left map's when split
    pub fn primary_view(&self) -> Option<ViewState> {
        let slot = if self.split.is_split {
            MapSlot::Left
        } else {
            MapSlot::Main
        };
        self.map(slot).map(|m| *m.view())
    }

    pub fn layer_selection(&self) -> LayerSelection {
        if self.split.is_split {
            LayerSelection::Split {
                left: self.split.left_layer_id.clone(),
                right: self.split.right_layer_id.clone(),
            }
        } else {
            LayerSelection::Single(self.single_layer_id.clone())
        }
    }

    /// Snapshot of everything the permalink carries; `None` before the
    /// primary map exists
    pub fn to_permalink(&self) -> Option<PermalinkState> {
        let view = self.primary_view()?;
        Some(PermalinkState {
            center: view.center_lon_lat(),
            zoom: view.zoom,
            layers: self.layer_selection(),
            drawing: self.drawing.clone(),
            overlays: self.overlays.overlay_ids(),
            osm: self.overlays.osm_ids().to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> AppState {
        AppState::new("maastokartta", SplitState::new("maastokartta", "taustakartta"))
    }

    #[test]
    fn test_containers_start_single() {
        let state = state();
        assert!(state.containers[MapSlot::Main].is_visible());
        assert!(!state.containers[MapSlot::Left].is_visible());
        assert_eq!(state.active_slots(), &[MapSlot::Main]);
        assert!(state.to_permalink().is_none());
    }

    #[test]
    fn test_permalink_uses_left_view_when_split() {
        let mut state = state();
        state.maps.main = Some(Map::new(
            MapSlot::Main,
            ViewState::from_lon_lat(LonLat::new(10.0, 50.0), 4.0),
        ));
        state.maps.left = Some(Map::new(
            MapSlot::Left,
            ViewState::from_lon_lat(LonLat::new(24.0, 60.0), 7.0),
        ));
        state.split.is_split = true;

        let snapshot = state.to_permalink().unwrap();
        assert!(snapshot.center.approx_eq(&LonLat::new(24.0, 60.0), 1e-9));
        assert_eq!(snapshot.zoom, 7.0);
        assert_eq!(
            snapshot.layers,
            LayerSelection::Split {
                left: "maastokartta".into(),
                right: "taustakartta".into()
            }
        );
    }

    #[test]
    fn test_layer_id_per_slot() {
        let mut state = state();
        state.set_layer_id(MapSlot::Right, "ortokuva");
        assert_eq!(state.layer_id(MapSlot::Right), "ortokuva");
        assert_eq!(state.layer_id(MapSlot::Main), "maastokartta");
        assert!(matches!(
            state.require_map_mut(MapSlot::Left),
            Err(MapError::MissingMap(MapSlot::Left))
        ));
    }
}

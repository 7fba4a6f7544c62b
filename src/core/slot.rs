//! Typed addressing of the map instances the viewer can show at once.

use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

/// One of the map instances: the single-screen map, or either half of split mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MapSlot {
    Main,
    Left,
    Right,
}

impl MapSlot {
    pub const ALL: [MapSlot; 3] = [MapSlot::Main, MapSlot::Left, MapSlot::Right];

    /// Slots that are on screen for the given mode.
    pub fn active(is_split: bool) -> &'static [MapSlot] {
        if is_split {
            &[MapSlot::Left, MapSlot::Right]
        } else {
            &[MapSlot::Main]
        }
    }

    /// The other half of a split pair.
    pub fn partner(self) -> Option<MapSlot> {
        match self {
            MapSlot::Left => Some(MapSlot::Right),
            MapSlot::Right => Some(MapSlot::Left),
            MapSlot::Main => None,
        }
    }

    /// DOM container id the slot renders into.
    pub fn container_id(self) -> &'static str {
        match self {
            MapSlot::Main => "map",
            MapSlot::Left => "map-left",
            MapSlot::Right => "map-right",
        }
    }
}

impl std::fmt::Display for MapSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MapSlot::Main => write!(f, "main"),
            MapSlot::Left => write!(f, "left"),
            MapSlot::Right => write!(f, "right"),
        }
    }
}

/// A value held per [`MapSlot`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SlotMap<T> {
    pub main: T,
    pub left: T,
    pub right: T,
}

impl<T> SlotMap<T> {
    pub fn new(main: T, left: T, right: T) -> Self {
        Self { main, left, right }
    }

    pub fn get(&self, slot: MapSlot) -> &T {
        match slot {
            MapSlot::Main => &self.main,
            MapSlot::Left => &self.left,
            MapSlot::Right => &self.right,
        }
    }

    pub fn get_mut(&mut self, slot: MapSlot) -> &mut T {
        match slot {
            MapSlot::Main => &mut self.main,
            MapSlot::Left => &mut self.left,
            MapSlot::Right => &mut self.right,
        }
    }

    /// Mutable access to two different slots at once.
    ///
    /// Panics if `a == b`.
    pub fn pair_mut(&mut self, a: MapSlot, b: MapSlot) -> (&mut T, &mut T) {
        assert_ne!(a, b, "pair_mut needs two distinct slots");
        let SlotMap { main, left, right } = self;
        match (a, b) {
            (MapSlot::Main, MapSlot::Left) => (main, left),
            (MapSlot::Main, MapSlot::Right) => (main, right),
            (MapSlot::Left, MapSlot::Main) => (left, main),
            (MapSlot::Left, MapSlot::Right) => (left, right),
            (MapSlot::Right, MapSlot::Main) => (right, main),
            (MapSlot::Right, MapSlot::Left) => (right, left),
            _ => unreachable!(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (MapSlot, &T)> {
        MapSlot::ALL.into_iter().map(move |slot| (slot, self.get(slot)))
    }
}

impl<T> Index<MapSlot> for SlotMap<T> {
    type Output = T;

    fn index(&self, slot: MapSlot) -> &T {
        self.get(slot)
    }
}

impl<T> IndexMut<MapSlot> for SlotMap<T> {
    fn index_mut(&mut self, slot: MapSlot) -> &mut T {
        self.get_mut(slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_active_slots() {
        assert_eq!(MapSlot::active(false), &[MapSlot::Main]);
        assert_eq!(MapSlot::active(true), &[MapSlot::Left, MapSlot::Right]);
    }

    #[test]
    fn test_partner() {
        assert_eq!(MapSlot::Left.partner(), Some(MapSlot::Right));
        assert_eq!(MapSlot::Right.partner(), Some(MapSlot::Left));
        assert_eq!(MapSlot::Main.partner(), None);
    }

    #[test]
    fn test_slot_map_indexing() {
        let mut slots = SlotMap::new(1, 2, 3);
        slots[MapSlot::Left] += 10;
        assert_eq!(slots[MapSlot::Main], 1);
        assert_eq!(slots[MapSlot::Left], 12);

        let (a, b) = slots.pair_mut(MapSlot::Right, MapSlot::Main);
        std::mem::swap(a, b);
        assert_eq!(slots.main, 3);
        assert_eq!(slots.right, 1);
    }

    #[test]
    fn test_display() {
        assert_eq!(MapSlot::Main.to_string(), "main");
        assert_eq!(MapSlot::Right.container_id(), "map-right");
    }
}

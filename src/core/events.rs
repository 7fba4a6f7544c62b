use crate::core::geo::Point;
use std::collections::VecDeque;

/// Events a map instance emits; the viewer drains them on every turn of its event loop.
#[derive(Debug, Clone, PartialEq)]
pub enum MapEvent {
    /// Center, resolution or rotation of the view changed
    ViewChanged {
        center: Point,
        zoom: f64,
        rotation: f64,
    },
    /// A pan / zoom gesture settled
    MoveEnd { center: Point, zoom: f64 },
    /// Single click on the map, in map coordinates and container pixels
    Click { coordinate: Point, pixel: Point },
    /// Layer was added to the map
    LayerAdd { layer_id: String },
    /// Layer was removed from the map
    LayerRemove { layer_id: String },
    /// Base layer was changed
    BaseLayerChange { layer_id: String },
    /// A tile of the given layer failed to load
    TileLoadError { layer_id: String },
}

impl MapEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            MapEvent::ViewChanged { .. } => "viewchanged",
            MapEvent::MoveEnd { .. } => "moveend",
            MapEvent::Click { .. } => "singleclick",
            MapEvent::LayerAdd { .. } => "layeradd",
            MapEvent::LayerRemove { .. } => "layerremove",
            MapEvent::BaseLayerChange { .. } => "baselayerchange",
            MapEvent::TileLoadError { .. } => "tileloaderror",
        }
    }
}

/// Event queue of one map
#[derive(Debug, Default)]
pub struct EventManager {
    event_queue: VecDeque<MapEvent>,
}

impl EventManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit an event to the queue
    pub fn emit(&mut self, event: MapEvent) {
        self.event_queue.push_back(event);
    }

    /// Take all queued events in emission order
    pub fn drain(&mut self) -> Vec<MapEvent> {
        self.event_queue.drain(..).collect()
    }

    /// Drop queued events the predicate rejects
    pub fn retain<F>(&mut self, f: F)
    where
        F: FnMut(&MapEvent) -> bool,
    {
        self.event_queue.retain(f);
    }

    /// Clear all events from the queue
    pub fn clear_events(&mut self) {
        self.event_queue.clear();
    }

    /// Get number of pending events
    pub fn pending_events(&self) -> usize {
        self.event_queue.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_order_and_retain() {
        let mut events = EventManager::new();
        events.emit(MapEvent::LayerAdd {
            layer_id: "a".into(),
        });
        events.emit(MapEvent::MoveEnd {
            center: Point::default(),
            zoom: 3.0,
        });
        events.emit(MapEvent::LayerRemove {
            layer_id: "a".into(),
        });
        assert_eq!(events.pending_events(), 3);

        events.retain(|e| !matches!(e, MapEvent::MoveEnd { .. }));
        let drained = events.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].event_type(), "layeradd");
        assert_eq!(drained[1].event_type(), "layerremove");
        assert_eq!(events.pending_events(), 0);
    }
}

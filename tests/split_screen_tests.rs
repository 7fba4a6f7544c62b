//! Split mode transitions and view synchronisation through the viewer.

use maplink::{
    core::events::MapEvent, layers::vector::VectorLayer, DrawingMode, LonLat, MapSlot,
    MemoryHistory, RecordingNotifier, SyncOutcome, ViewSync, Viewer, ViewerConfig,
};

fn viewer(query: &str) -> (Viewer, MemoryHistory) {
    let history = MemoryHistory::new();
    let mut viewer = Viewer::new(
        ViewerConfig::default(),
        Box::new(history.clone()),
        Box::new(RecordingNotifier::new()),
    );
    viewer.bootstrap(query).unwrap();
    (viewer, history)
}

fn polygon_vertices(viewer: &Viewer, slot: MapSlot) -> Option<Vec<LonLat>> {
    let layer = viewer.map(slot)?.layer_as::<VectorLayer>("drawn-polygon")?;
    Some(
        layer
            .geometry()
            .vertices()
            .iter()
            .map(|p| p.to_lon_lat())
            .collect(),
    )
}

#[test]
fn test_split_keeps_polygon_on_both_maps() {
    let (mut viewer, history) = viewer("lat=60.19&lon=24.94&z=9&polygon=24,60;24.2,60;24.1,60.2");
    let drawn = polygon_vertices(&viewer, MapSlot::Main).unwrap();
    assert_eq!(drawn.len(), 3);

    viewer.toggle_split().unwrap();

    assert!(viewer.map(MapSlot::Main).unwrap().layer_as::<VectorLayer>("drawn-polygon").is_none());
    for slot in [MapSlot::Left, MapSlot::Right] {
        let shown = polygon_vertices(&viewer, slot).unwrap();
        assert_eq!(shown.len(), drawn.len());
        for (a, b) in shown.iter().zip(&drawn) {
            assert!(a.approx_eq(b, 1e-9), "{:?} != {:?} on {}", a, b, slot);
        }
    }
    assert!(history.current().unwrap().contains("split=1"));
    assert!(history.current().unwrap().contains("polygon="));
}

#[test]
fn test_left_move_updates_right_once() {
    let (mut viewer, history) = viewer("lat=60.19&lon=24.94&z=9&split=1&leftLayer=ortokuva&rightLayer=osm");
    assert_eq!(history.write_count(), 1);
    assert_eq!(viewer.pump(), 0);

    let target = LonLat::new(25.5, 61.0);
    let left_view_before;
    {
        let left = viewer.map_mut(MapSlot::Left).unwrap();
        left_view_before = *left.view();
        assert!(left.set_center(target.to_projected()));
    }
    viewer.pump();

    let left = *viewer.map(MapSlot::Left).unwrap().view();
    let right = *viewer.map(MapSlot::Right).unwrap().view();
    assert!(!left.matches(&left_view_before));
    assert!(right.matches(&left));
    assert!(right.center_lon_lat().approx_eq(&target, 1e-9));
    assert_eq!(viewer.split_controller().sync().propagations(), 1);
    assert_eq!(viewer.map(MapSlot::Left).unwrap().pending_events(), 0);
    assert!(history.current().unwrap().starts_with("?lat=61.0000000&lon=25.5000000"));
    // one pan, one write; the synced map settling does not write again
    assert_eq!(history.write_count(), 2);

    viewer
        .map_mut(MapSlot::Right)
        .unwrap()
        .set_center(LonLat::new(26.0, 61.5).to_projected());
    viewer.pump();
    assert_eq!(history.write_count(), 3);
    assert_eq!(viewer.split_controller().sync().propagations(), 2);
}

#[test]
fn test_matching_views_are_not_rewritten() {
    let (mut viewer, _) = viewer("split=1");
    let target = LonLat::new(22.0, 63.0).to_projected();
    viewer.map_mut(MapSlot::Left).unwrap().set_center(target);
    viewer.map_mut(MapSlot::Right).unwrap().set_center(target);

    viewer.pump();
    assert_eq!(viewer.split_controller().sync().propagations(), 0);
    assert_eq!(viewer.map(MapSlot::Left).unwrap().pending_events(), 0);
    assert_eq!(viewer.map(MapSlot::Right).unwrap().pending_events(), 0);
}

#[test]
fn test_sync_latch_swallows_echo() {
    let (mut viewer, _) = viewer("split=1");
    viewer
        .map_mut(MapSlot::Left)
        .unwrap()
        .set_center(LonLat::new(26.0, 62.5).to_projected());
    viewer.map_mut(MapSlot::Left).unwrap().drain_events();

    let state = viewer.state_mut();
    let mut sync = ViewSync::new();
    assert_eq!(sync.on_view_changed(MapSlot::Left, &mut state.maps), SyncOutcome::Propagated);
    let echoes: Vec<MapEvent> = state.maps[MapSlot::Right].as_mut().unwrap().drain_events();
    assert!(echoes.iter().any(|e| matches!(e, MapEvent::ViewChanged { .. })));

    assert_eq!(sync.on_view_changed(MapSlot::Right, &mut state.maps), SyncOutcome::Echo);
    assert_eq!(state.maps[MapSlot::Left].as_ref().unwrap().pending_events(), 0);
    assert_eq!(sync.propagations(), 1);
}

#[test]
fn test_unsplit_returns_to_left_view() {
    let (mut viewer, _) = viewer("split=1&leftLayer=ortokuva&rightLayer=osm&z=6");
    let target = LonLat::new(27.0, 62.0);
    viewer
        .map_mut(MapSlot::Left)
        .unwrap()
        .set_center(target.to_projected());
    viewer.pump();

    viewer.toggle_split().unwrap();
    assert!(!viewer.state().is_split());
    assert!(viewer.map(MapSlot::Left).is_none());
    assert!(viewer.map(MapSlot::Right).is_none());
    let main = viewer.map(MapSlot::Main).unwrap();
    assert!(main.view().center_lon_lat().approx_eq(&target, 1e-9));
}

#[test]
fn test_marker_mode_survives_split() {
    let (mut viewer, _) = viewer("");
    viewer.enter_drawing_mode(DrawingMode::Marker);
    viewer.toggle_split().unwrap();

    for slot in [MapSlot::Left, MapSlot::Right] {
        let map = viewer.map(slot).unwrap();
        assert!(map.marker_click_handler());
        assert!(!map.info_click_handler());
    }
}

//! Round trips and restore behaviour of the permalink query string.

use maplink::{
    constants::MAX_ZOOM, decode, encode, HistorySink, LayerSelection, LonLat, MapSlot,
    MemoryHistory, PermalinkState, PermalinkSync, RecordingNotifier, Viewer, ViewerConfig,
};

#[test]
fn test_simple_view_round_trip() {
    let state = PermalinkState {
        center: LonLat::new(24.94, 60.19),
        zoom: 5.0,
        layers: LayerSelection::Single("maastokartta".to_string()),
        ..PermalinkState::default()
    };
    let (decoded, warnings) = decode(&encode(&state));

    assert!(warnings.is_empty());
    assert!((decoded.center.lon - 24.94).abs() < 1e-7);
    assert!((decoded.center.lat - 60.19).abs() < 1e-7);
    assert!((decoded.zoom - 5.0).abs() < 1e-3);
    assert_eq!(decoded.layers, LayerSelection::Single("maastokartta".to_string()));
}

#[test]
fn test_split_wins_over_single_layer() {
    let (state, warnings) = decode("?layer=osm&split=1&leftLayer=ortokuva&rightLayer=taustakartta");

    assert_eq!(
        state.layers,
        LayerSelection::Split {
            left: "ortokuva".to_string(),
            right: "taustakartta".to_string(),
        }
    );
    assert_eq!(warnings.len(), 1);
    assert!(!encode(&state).contains("layer=osm"));
}

#[test]
fn test_single_point_line_is_dropped() {
    let (one, _) = decode("line=10,60");
    let (absent, _) = decode("");
    assert_eq!(one.drawing.line, None);
    assert_eq!(one, absent);

    let (two, warnings) = decode("line=10,60;11,61");
    assert!(warnings.is_empty());
    assert_eq!(
        two.drawing.line,
        Some(vec![LonLat::new(10.0, 60.0), LonLat::new(11.0, 61.0)])
    );
}

#[test]
fn test_reencoding_does_not_drift() {
    let queries = [
        "",
        "?lat=60.123456789&lon=24.987654321&z=7.12345&layer=osm",
        "lat=61&lon=23.5&z=12&split=1&leftLayer=ortokuva&rightLayer=selkokartta",
        "markerLat=60.5&markerLon=25.25&z=3.3333",
        "polygon=24,60;24.5,60;24.25,60.4;24,60&measure=24,60;25,61;26,60.5",
        "line=24.1,60.1;24.2,60.2&overlays=roads;rail%20lines;roads&osm=a_masts;b_towers",
        "lat=abc&lon=999&z=-4&layer=nope&line=1,2;oops",
        "split=1&leftLayer=unknown&rightLayer=osm&layer=ortokuva",
    ];
    for query in queries {
        let (first, _) = decode(query);
        let encoded = encode(&first);
        let (second, warnings) = decode(&encoded);
        assert_eq!(second, first, "state drifted for {:?}", query);
        assert!(warnings.is_empty(), "re-encoded {:?} warns: {:?}", encoded, warnings);
        assert_eq!(encode(&second), encoded);
    }
}

#[test]
fn test_no_write_while_restoring() {
    let history = MemoryHistory::new();
    let mut sync = PermalinkSync::new(Box::new(history.clone()));
    let (mut state, _) = decode("lat=60&lon=25&z=6");

    sync.begin_restore();
    for zoom in [7.0, 8.0, 9.0] {
        state.zoom = zoom;
        assert!(!sync.write(&state));
    }
    assert_eq!(history.write_count(), 0);

    sync.finish_restore(Some(&state));
    assert_eq!(history.write_count(), 1);
    assert_eq!(history.current().unwrap(), format!("?{}", encode(&state)));

    assert!(sync.write(&state));
    assert_eq!(history.write_count(), 2);
}

#[test]
fn test_history_sink_is_object_safe() {
    let mut sink: Box<dyn HistorySink> = Box::new(MemoryHistory::new());
    sink.replace_state("?z=4");
}

#[test]
fn test_zoomed_in_view_survives_round_trip() {
    let history = MemoryHistory::new();
    let mut viewer = Viewer::new(
        ViewerConfig::default(),
        Box::new(history.clone()),
        Box::new(RecordingNotifier::new()),
    );
    viewer.bootstrap("z=27.5").unwrap();
    viewer.map_mut(MapSlot::Main).unwrap().set_zoom(30.0);
    viewer.pump();

    let written = history.current().unwrap();
    let (state, warnings) = decode(&written);
    assert!(warnings.is_empty(), "{:?}", warnings);
    assert_eq!(state.zoom, MAX_ZOOM);

    let (clamped, warnings) = decode(&encode(&PermalinkState {
        zoom: 30.0,
        ..PermalinkState::default()
    }));
    assert!(warnings.is_empty());
    assert_eq!(clamped.zoom, MAX_ZOOM);
}

//! Keeps the overlay layers of every map in line with the selection.

use crate::{
    core::{config::Endpoints, geo::Point, slot::MapSlot},
    layers::{
        base::LayerType,
        overlay::{GeoJsonOverlayLayer, WmsOverlayLayer},
    },
    overlays::{
        catalog::OverlayCatalog,
        feature_info::FeatureInfoRequest,
        selection::{OverlaySelection, OverlaySource},
    },
    state::store::AppState,
};

/// Rebuilds the WMS and OSM overlay layers on every live map
///
/// All overlay layers are removed first, then one layer per selected overlay
/// is added to each map. Returns the number of layers added.
pub fn update_all_overlays(
    state: &mut AppState,
    catalog: &OverlayCatalog,
    endpoints: &Endpoints,
) -> usize {
    let keys = state.overlays.selected_keys();
    let osm: Vec<(String, String, String, String)> = state
        .overlays
        .osm_ids()
        .iter()
        .filter_map(|id| {
            let item = catalog.osm_item(id)?;
            let color = state.overlays.osm_color(id)?.to_string();
            Some((
                item.id.clone(),
                item.title.clone(),
                endpoints.osm_dataset_url(&item.file),
                color,
            ))
        })
        .collect();

    let mut added = 0;
    state.for_each_map(|map| {
        let stale: Vec<String> = map
            .layers()
            .layers()
            .into_iter()
            .filter(|l| matches!(l.layer_type(), LayerType::WmsOverlay | LayerType::GeoJson))
            .map(|l| l.id().to_string())
            .collect();
        for id in stale {
            map.remove_layer(&id);
        }

        for key in &keys {
            let layer = WmsOverlayLayer::new(key.clone(), endpoints.wms_url.clone());
            match map.add_layer(Box::new(layer)) {
                Ok(()) => added += 1,
                Err(e) => log::warn!("Overlay {} not added to {} map: {}", key.name, map.slot(), e),
            }
        }
        for (id, title, url, color) in &osm {
            let layer = GeoJsonOverlayLayer::new(id, title, url.clone(), color.clone());
            match map.add_layer(Box::new(layer)) {
                Ok(()) => added += 1,
                Err(e) => log::warn!("OSM dataset {} not added to {} map: {}", id, map.slot(), e),
            }
        }
    });
    added
}

/// Label for a selection widget: "No overlays", the titles of one or two
/// selections, or a count
pub fn summarize(titles: &[&str]) -> String {
    match titles {
        [] => "No overlays".to_string(),
        [one] => one.to_string(),
        [a, b] => format!("{}, {}", a, b),
        many => format!("{} selected", many.len()),
    }
}

/// Summary of one WMS overlay list
pub fn overlay_summary(
    selection: &OverlaySelection,
    catalog: &OverlayCatalog,
    source: OverlaySource,
) -> String {
    let keys: Vec<_> = selection
        .selected_keys()
        .into_iter()
        .filter(|k| k.source == source)
        .collect();
    let titles: Vec<&str> = keys.iter().map(|k| catalog.title(k)).collect();
    summarize(&titles)
}

/// Summary of the OSM dataset list
pub fn osm_summary(selection: &OverlaySelection, catalog: &OverlayCatalog) -> String {
    let titles: Vec<&str> = selection
        .osm_ids()
        .iter()
        .map(|id| {
            catalog
                .osm_item(id)
                .map(|item| item.title.as_str())
                .unwrap_or(id.as_str())
        })
        .collect();
    summarize(&titles)
}

/// Colour shown for a dataset that has no colour assigned
const LEGEND_FALLBACK_COLOR: &str = "#666666";

/// One row of the OSM legend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegendEntry {
    pub id: String,
    pub title: String,
    pub color: String,
}

/// Legend rows for the selected OSM datasets, in selection order
///
/// Datasets missing from the manifest are left out. An empty list means the
/// legend is hidden.
pub fn osm_legend(selection: &OverlaySelection, catalog: &OverlayCatalog) -> Vec<LegendEntry> {
    selection
        .osm_ids()
        .iter()
        .filter_map(|id| {
            let item = catalog.osm_item(id)?;
            Some(LegendEntry {
                id: item.id.clone(),
                title: item.title.clone(),
                color: selection
                    .osm_color(id)
                    .unwrap_or(LEGEND_FALLBACK_COLOR)
                    .to_string(),
            })
        })
        .collect()
}

/// GetFeatureInfo requests for a click at `coordinate` on the map in `slot`
///
/// Nothing is asked while a drawing tool is active or when no WMS overlay
/// is selected. Overlays are found on the map by their selection key.
pub fn feature_info_requests(
    state: &AppState,
    catalog: &OverlayCatalog,
    slot: MapSlot,
    coordinate: Point,
) -> Vec<FeatureInfoRequest> {
    if state.mode.is_some() {
        return Vec::new();
    }
    let Some(map) = state.map(slot) else {
        return Vec::new();
    };

    state
        .overlays
        .selected_keys()
        .into_iter()
        .filter_map(|key| {
            let layer = map.layer_as::<WmsOverlayLayer>(&key.layer_id())?;
            match layer.get_feature_info_url(coordinate, map.resolution()) {
                Ok(url) => Some(FeatureInfoRequest {
                    title: catalog.title(&key).to_string(),
                    key,
                    url,
                }),
                Err(e) => {
                    log::debug!("No GetFeatureInfo for {}: {}", key.name, e);
                    None
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        core::{geo::LonLat, map::Map, viewport::ViewState},
        overlays::{
            catalog::{OsmItem, WmsOverlayInfo},
            selection::OverlayKey,
        },
        state::{drawing::DrawingMode, store::SplitState},
    };

    fn catalog() -> OverlayCatalog {
        let mut catalog = OverlayCatalog::default();
        catalog.set_wms(vec![
            WmsOverlayInfo::new("DR_TIELINKKI", "Tielinkit"),
            WmsOverlayInfo::new("DR_NOPEUSRAJOITUS", "Nopeusrajoitukset"),
            WmsOverlayInfo::new("DR_LIIKENNEMERKIT", "Liikennemerkit"),
        ]);
        catalog.set_generic(vec![WmsOverlayInfo::new("DR_TIELINKKI", "Tielinkit (generic)")]);
        catalog
    }

    fn state() -> AppState {
        let mut state = AppState::new("maastokartta", SplitState::new("maastokartta", "taustakartta"));
        state.maps.main = Some(Map::new(
            MapSlot::Main,
            ViewState::from_lon_lat(LonLat::new(24.94, 60.19), 12.0),
        ));
        state
    }

    #[test]
    fn test_update_replaces_overlay_layers() {
        let catalog = catalog();
        let endpoints = Endpoints::default();
        let mut state = state();
        state
            .overlays
            .toggle(&OverlayKey::new(OverlaySource::Wms, "DR_TIELINKKI"), true);
        state
            .overlays
            .toggle(&OverlayKey::new(OverlaySource::Generic, "DR_TIELINKKI"), true);
        state.overlays.toggle_osm("man_made_mast", true);

        assert_eq!(update_all_overlays(&mut state, &catalog, &endpoints), 3);
        let map = state.map(MapSlot::Main).unwrap();
        assert!(map.has_layer("overlay:wms:DR_TIELINKKI"));
        assert!(map.has_layer("overlay:generic:DR_TIELINKKI"));
        let osm = map.layer_as::<GeoJsonOverlayLayer>("osm:man_made_mast").unwrap();
        assert_eq!(osm.url(), "/osm/filtered_man_made_mast.geojson");
        assert_eq!(osm.color(), "#e74c3c");

        state
            .overlays
            .toggle(&OverlayKey::new(OverlaySource::Wms, "DR_TIELINKKI"), false);
        assert_eq!(update_all_overlays(&mut state, &catalog, &endpoints), 2);
        assert!(!state.map(MapSlot::Main).unwrap().has_layer("overlay:wms:DR_TIELINKKI"));
    }

    #[test]
    fn test_summaries() {
        let catalog = catalog();
        let mut selection = OverlaySelection::new();
        assert_eq!(overlay_summary(&selection, &catalog, OverlaySource::Wms), "No overlays");

        selection.set_names(OverlaySource::Wms, vec!["DR_TIELINKKI".into()]);
        assert_eq!(overlay_summary(&selection, &catalog, OverlaySource::Wms), "Tielinkit");

        selection.set_names(
            OverlaySource::Wms,
            vec!["DR_TIELINKKI".into(), "DR_NOPEUSRAJOITUS".into()],
        );
        assert_eq!(
            overlay_summary(&selection, &catalog, OverlaySource::Wms),
            "Tielinkit, Nopeusrajoitukset"
        );

        selection.set_names(
            OverlaySource::Wms,
            vec![
                "DR_TIELINKKI".into(),
                "DR_NOPEUSRAJOITUS".into(),
                "DR_LIIKENNEMERKIT".into(),
            ],
        );
        assert_eq!(overlay_summary(&selection, &catalog, OverlaySource::Wms), "3 selected");
        assert_eq!(overlay_summary(&selection, &catalog, OverlaySource::Generic), "No overlays");

        selection.toggle_osm("man_made_mast", true);
        assert_eq!(osm_summary(&selection, &catalog), "Man Made: Mast");
    }

    #[test]
    fn test_osm_legend_rows() {
        let mut catalog = catalog();
        let mut selection = OverlaySelection::new();
        assert!(osm_legend(&selection, &catalog).is_empty());

        catalog.set_osm_items(vec![
            OsmItem {
                id: "man_made_mast".to_string(),
                title: "Man Made: Mast".to_string(),
                file: "filtered_man_made_mast.geojson".to_string(),
            },
            OsmItem {
                id: "power_tower".to_string(),
                title: "Power: Tower".to_string(),
                file: "filtered_power_tower.geojson".to_string(),
            },
        ]);
        selection.toggle_osm("power_tower", true);
        selection.toggle_osm("amenity_bench", true);
        selection.toggle_osm("man_made_mast", true);

        let legend = osm_legend(&selection, &catalog);
        let titles: Vec<&str> = legend.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, ["Power: Tower", "Man Made: Mast"]);
        assert_eq!(legend[0].color, selection.osm_color("power_tower").unwrap());
        assert_ne!(legend[0].color, legend[1].color);

        selection.toggle_osm("power_tower", false);
        selection.toggle_osm("man_made_mast", false);
        assert!(osm_legend(&selection, &catalog).is_empty());
    }

    #[test]
    fn test_requests_follow_selection_keys() {
        let catalog = catalog();
        let mut state = state();
        state.overlays.set_names(
            OverlaySource::Wms,
            vec!["DR_TIELINKKI".into(), "DR_NOPEUSRAJOITUS".into()],
        );
        update_all_overlays(&mut state, &catalog, &Endpoints::default());

        let at = LonLat::new(24.94, 60.19).to_projected();
        let requests = feature_info_requests(&state, &catalog, MapSlot::Main, at);
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].title, "Tielinkit");
        assert!(requests[1].url.contains("QUERY_LAYERS=DR_NOPEUSRAJOITUS"));

        state.mode = Some(DrawingMode::Line);
        assert!(feature_info_requests(&state, &catalog, MapSlot::Main, at).is_empty());
    }
}

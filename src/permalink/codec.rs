//! Query-string encoding of the shareable viewer state.
//!
//! Decoding is best effort: every field that is missing or malformed falls
//! back to a default, and each rejected value is reported as a
//! [`DecodeWarning`] instead of an error.

use crate::{
    core::{
        config::ViewDefaults,
        constants::{MAX_ZOOM, MIN_ZOOM},
        geo::{fixed7, format_zoom, round_zoom, LonLat},
    },
    layers::factory::LayerCatalog,
    state::drawing::DrawingState,
};
use serde::{Deserialize, Serialize};

pub use crate::layers::vector::GeometryKind;

/// Which base layers the permalink selects
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerSelection {
    Single(String),
    Split { left: String, right: String },
}

impl LayerSelection {
    pub fn is_split(&self) -> bool {
        matches!(self, LayerSelection::Split { .. })
    }
}

/// Everything a permalink carries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PermalinkState {
    pub center: LonLat,
    pub zoom: f64,
    pub layers: LayerSelection,
    #[serde(default)]
    pub drawing: DrawingState,
    /// WMS overlay ids, capabilities list first
    #[serde(default)]
    pub overlays: Vec<String>,
    #[serde(default)]
    pub osm: Vec<String>,
}

impl PermalinkState {
    /// The state an empty query decodes to
    pub fn defaults(catalog: &LayerCatalog, defaults: &ViewDefaults) -> Self {
        Self {
            center: defaults.center().quantized(),
            zoom: round_zoom(defaults.zoom),
            layers: LayerSelection::Single(catalog.id_at(defaults.layer_index)),
            drawing: DrawingState::default(),
            overlays: Vec::new(),
            osm: Vec::new(),
        }
    }
}

impl Default for PermalinkState {
    fn default() -> Self {
        Self::defaults(LayerCatalog::builtin(), &ViewDefaults::default())
    }
}

/// Why a geometry parameter was dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryRejection {
    /// A vertex is not a `lon,lat` pair of numbers
    Malformed,
    /// Fewer vertices than the kind needs
    TooFewPoints(usize),
}

/// A permalink value that was ignored in favour of a default
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DecodeWarning {
    #[error("view center lat={lat:?} lon={lon:?} is not a valid coordinate")]
    InvalidCenter {
        lat: Option<String>,
        lon: Option<String>,
    },
    #[error("zoom '{0}' is not a usable zoom level")]
    InvalidZoom(String),
    #[error("{param}='{id}' is not a known base layer")]
    UnknownLayer { param: &'static str, id: String },
    #[error("layer='{0}' ignored because split=1 is set")]
    LayerIgnoredInSplit(String),
    #[error("marker position is not a valid coordinate")]
    InvalidMarker,
    #[error("{kind} dropped: {reason:?}")]
    InvalidGeometry {
        kind: GeometryKind,
        reason: GeometryRejection,
    },
}

/// Encodes `state` as a query string without the leading `?`
///
/// Parameter order is fixed, so the same state always yields the same string.
pub fn encode(state: &PermalinkState) -> String {
    let mut params: Vec<(&str, String)> = vec![
        ("lat", fixed7(state.center.lat)),
        ("lon", fixed7(state.center.lon)),
        ("z", format_zoom(state.zoom.clamp(MIN_ZOOM, MAX_ZOOM))),
    ];

    match &state.layers {
        LayerSelection::Single(id) => params.push(("layer", escape(id))),
        LayerSelection::Split { left, right } => {
            params.push(("split", "1".to_string()));
            params.push(("leftLayer", escape(left)));
            params.push(("rightLayer", escape(right)));
        }
    }

    if let Some(marker) = state.drawing.marker {
        params.push(("markerLat", fixed7(marker.lat)));
        params.push(("markerLon", fixed7(marker.lon)));
    }

    for kind in GeometryKind::ALL {
        if let Some(coords) = state.drawing.geometry(kind) {
            if coords.len() >= kind.min_points() {
                params.push((kind.param(), encode_path(coords)));
            }
        }
    }

    if !state.overlays.is_empty() {
        params.push(("overlays", encode_ids(&state.overlays)));
    }
    if !state.osm.is_empty() {
        params.push(("osm", encode_ids(&state.osm)));
    }

    params
        .iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect::<Vec<_>>()
        .join("&")
}

/// Decodes a query string against the built-in layer catalog and defaults
pub fn decode(query: &str) -> (PermalinkState, Vec<DecodeWarning>) {
    decode_with(query, LayerCatalog::builtin(), &ViewDefaults::default())
}

/// Decodes a query string, with or without the leading `?`
///
/// When a key repeats the last value wins. Empty values count as absent.
pub fn decode_with(
    query: &str,
    catalog: &LayerCatalog,
    defaults: &ViewDefaults,
) -> (PermalinkState, Vec<DecodeWarning>) {
    let params = QueryParams::parse(query);
    let mut warnings = Vec::new();
    let mut state = PermalinkState::defaults(catalog, defaults);

    let lat = params.get("lat");
    let lon = params.get("lon");
    if lat.is_some() || lon.is_some() {
        match (lat.and_then(parse_number), lon.and_then(parse_number)) {
            (Some(lat), Some(lon)) if LonLat::new(lon, lat).is_valid() => {
                state.center = LonLat::new(lon, lat).quantized();
            }
            _ => warnings.push(DecodeWarning::InvalidCenter {
                lat: lat.map(str::to_string),
                lon: lon.map(str::to_string),
            }),
        }
    }

    if let Some(z) = params.get("z") {
        match parse_number(z).filter(|z| (MIN_ZOOM..=MAX_ZOOM).contains(z)) {
            Some(zoom) => state.zoom = round_zoom(zoom),
            None => warnings.push(DecodeWarning::InvalidZoom(z.to_string())),
        }
    }

    let layer = params.get("layer");
    if params.get("split") == Some("1") {
        if let Some(ignored) = layer {
            warnings.push(DecodeWarning::LayerIgnoredInSplit(ignored.to_string()));
        }
        let left = known_layer(&params, "leftLayer", catalog, &mut warnings)
            .unwrap_or_else(|| catalog.id_at(defaults.split_left_index));
        let right = known_layer(&params, "rightLayer", catalog, &mut warnings)
            .unwrap_or_else(|| catalog.id_at(defaults.split_right_index));
        state.layers = LayerSelection::Split { left, right };
    } else if let Some(id) = known_layer(&params, "layer", catalog, &mut warnings) {
        state.layers = LayerSelection::Single(id);
    }

    let marker_lat = params.get("markerLat");
    let marker_lon = params.get("markerLon");
    if marker_lat.is_some() || marker_lon.is_some() {
        match (marker_lat.and_then(parse_number), marker_lon.and_then(parse_number)) {
            (Some(lat), Some(lon)) => state.drawing.marker = Some(LonLat::new(lon, lat).quantized()),
            _ => warnings.push(DecodeWarning::InvalidMarker),
        }
    }

    for kind in GeometryKind::ALL {
        let Some(value) = params.get(kind.param()) else {
            continue;
        };
        match decode_path(value, kind) {
            Ok(coords) => {
                state.drawing.set_geometry(kind, Some(coords));
            }
            Err(reason) => warnings.push(DecodeWarning::InvalidGeometry { kind, reason }),
        }
    }

    if let Some(value) = params.get("overlays") {
        state.overlays = decode_ids(value);
    }
    if let Some(value) = params.get("osm") {
        state.osm = decode_ids(value);
    }

    for warning in &warnings {
        log::debug!("Permalink fallback: {}", warning);
    }
    (state, warnings)
}

/// Flat key/value view of a query string
struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    fn parse(query: &str) -> Self {
        let query = query.trim_start_matches('?');
        let pairs = url::form_urlencoded::parse(query.as_bytes())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        Self { pairs }
    }

    fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.trim())
            .filter(|v| !v.is_empty())
    }
}

fn known_layer(
    params: &QueryParams,
    key: &'static str,
    catalog: &LayerCatalog,
    warnings: &mut Vec<DecodeWarning>,
) -> Option<String> {
    let id = params.get(key)?;
    if catalog.contains(id) {
        Some(id.to_string())
    } else {
        warnings.push(DecodeWarning::UnknownLayer {
            param: key,
            id: id.to_string(),
        });
        None
    }
}

fn parse_number(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn decode_path(value: &str, kind: GeometryKind) -> Result<Vec<LonLat>, GeometryRejection> {
    let mut coords = value
        .split(';')
        .map(|pair| {
            let mut parts = pair.split(',');
            let lon = parts.next().and_then(parse_number)?;
            let lat = parts.next().and_then(parse_number)?;
            if parts.next().is_some() {
                return None;
            }
            Some(LonLat::new(lon, lat).quantized())
        })
        .collect::<Option<Vec<_>>>()
        .ok_or(GeometryRejection::Malformed)?;

    // rings may arrive closed
    kind.open_ring(&mut coords);

    if coords.len() < kind.min_points() {
        return Err(GeometryRejection::TooFewPoints(coords.len()));
    }
    Ok(coords)
}

fn encode_path(coords: &[LonLat]) -> String {
    coords
        .iter()
        .map(LonLat::to_pair_string)
        .collect::<Vec<_>>()
        .join(";")
}

fn decode_ids(value: &str) -> Vec<String> {
    let mut ids: Vec<String> = Vec::new();
    for id in value.split(';').map(str::trim).filter(|id| !id.is_empty()) {
        if !ids.iter().any(|known| known == id) {
            ids.push(id.to_string());
        }
    }
    ids
}

fn encode_ids(ids: &[String]) -> String {
    ids.iter().map(|id| escape(id)).collect::<Vec<_>>().join(";")
}

fn escape(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_query_decodes_to_defaults() {
        let (state, warnings) = decode("");
        assert!(warnings.is_empty());
        assert_eq!(state, PermalinkState::default());
        assert_eq!(state.layers, LayerSelection::Single("maastokartta".into()));
        assert_eq!(state.zoom, 5.0);
    }

    #[test]
    fn test_encode_field_order() {
        let mut state = PermalinkState::default();
        state.drawing.marker = Some(LonLat::new(25.0, 61.0));
        state.drawing.line = Some(vec![LonLat::new(10.0, 60.0), LonLat::new(11.0, 61.0)]);
        state.overlays = vec!["DR_TIELINKKI".into()];
        state.osm = vec!["man_made_mast".into()];

        assert_eq!(
            encode(&state),
            "lat=60.1900000&lon=24.9400000&z=5&layer=maastokartta\
             &markerLat=61.0000000&markerLon=25.0000000\
             &line=10.0000000,60.0000000;11.0000000,61.0000000\
             &overlays=DR_TIELINKKI&osm=man_made_mast"
        );
    }

    #[test]
    fn test_split_encoding_omits_layer() {
        let state = PermalinkState {
            layers: LayerSelection::Split {
                left: "ortokuva".into(),
                right: "osm".into(),
            },
            ..PermalinkState::default()
        };
        let query = encode(&state);
        assert!(query.contains("split=1&leftLayer=ortokuva&rightLayer=osm"));
        assert!(!query.contains("layer="));
    }

    #[test]
    fn test_invalid_center_keeps_valid_zoom() {
        let (state, warnings) = decode("?lat=abc&lon=24&z=9");
        assert_eq!(state.center, PermalinkState::default().center);
        assert_eq!(state.zoom, 9.0);
        assert!(matches!(warnings[0], DecodeWarning::InvalidCenter { .. }));
    }

    #[test]
    fn test_out_of_range_values_fall_back() {
        let (state, warnings) = decode("lat=95&lon=24&z=99");
        assert_eq!(state, PermalinkState::default());
        assert_eq!(warnings.len(), 2);
        assert_eq!(warnings[1], DecodeWarning::InvalidZoom("99".into()));
    }

    #[test]
    fn test_unknown_layer_is_reported() {
        let (state, warnings) = decode("layer=nope");
        assert_eq!(state.layers, LayerSelection::Single("maastokartta".into()));
        assert_eq!(
            warnings,
            vec![DecodeWarning::UnknownLayer {
                param: "layer",
                id: "nope".into()
            }]
        );
    }

    #[test]
    fn test_split_fills_missing_sides_from_defaults() {
        let (state, _) = decode("split=1&rightLayer=osm");
        assert_eq!(
            state.layers,
            LayerSelection::Split {
                left: "maastokartta".into(),
                right: "osm".into()
            }
        );
    }

    #[test]
    fn test_split_other_than_one_is_single() {
        let (state, _) = decode("split=0&layer=osm");
        assert_eq!(state.layers, LayerSelection::Single("osm".into()));
    }

    #[test]
    fn test_malformed_geometry_is_dropped() {
        let (state, warnings) = decode("polygon=10,60;11,x;12,62&measure=1,2;3");
        assert!(state.drawing.polygon.is_none());
        assert!(state.drawing.measure.is_none());
        assert_eq!(
            warnings,
            vec![
                DecodeWarning::InvalidGeometry {
                    kind: GeometryKind::Polygon,
                    reason: GeometryRejection::Malformed
                },
                DecodeWarning::InvalidGeometry {
                    kind: GeometryKind::Measure,
                    reason: GeometryRejection::Malformed
                },
            ]
        );
    }

    #[test]
    fn test_closed_polygon_ring_is_opened() {
        let (state, warnings) = decode("polygon=10,60;11,60;11,61;10,60");
        assert!(warnings.is_empty());
        assert_eq!(state.drawing.polygon.as_ref().map(Vec::len), Some(3));
    }

    #[test]
    fn test_closed_three_vertex_ring_is_kept() {
        let (state, warnings) = decode("polygon=10,60;11,61;10,60");
        assert!(warnings.is_empty());
        assert_eq!(
            state.drawing.polygon,
            Some(vec![
                LonLat::new(10.0, 60.0),
                LonLat::new(11.0, 61.0),
                LonLat::new(10.0, 60.0),
            ])
        );

        let (again, _) = decode(&encode(&state));
        assert_eq!(again, state);
    }

    #[test]
    fn test_last_value_wins_and_ids_dedupe() {
        let (state, _) = decode("z=3&z=4&overlays=A;B;A;;&osm=x");
        assert_eq!(state.zoom, 4.0);
        assert_eq!(state.overlays, vec!["A", "B"]);
        assert_eq!(state.osm, vec!["x"]);
    }

    #[test]
    fn test_marker_needs_both_components() {
        let (state, warnings) = decode("markerLat=60.5");
        assert!(state.drawing.marker.is_none());
        assert_eq!(warnings, vec![DecodeWarning::InvalidMarker]);
    }

    #[test]
    fn test_ids_with_reserved_characters_survive() {
        let state = PermalinkState {
            overlays: vec!["a&b".into(), "c d".into()],
            ..PermalinkState::default()
        };
        let (decoded, warnings) = decode(&encode(&state));
        assert!(warnings.is_empty());
        assert_eq!(decoded.overlays, state.overlays);
    }
}

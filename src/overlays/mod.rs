//! WMS and GeoJSON overlays: what can be selected, what is selected, and
//! the layers realising the selection on each map.

pub mod catalog;
pub mod feature_info;
pub mod manager;
pub mod selection;

pub use catalog::{OsmItem, OverlayCatalog, WmsOverlayInfo};
pub use feature_info::{
    fetch_feature_info, format_osm_feature, render_popup, FeatureGeometry, FeatureInfoRequest,
    FeatureInfoResult, HttpClient, OsmFeature, ReqwestClient,
};
pub use manager::{
    feature_info_requests, osm_legend, osm_summary, overlay_summary, summarize,
    update_all_overlays, LegendEntry,
};
pub use selection::{OverlayKey, OverlaySelection, OverlaySource};

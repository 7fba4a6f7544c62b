//! Prelude module for common maplink types and traits
//!
//! This module re-exports the most commonly used types, traits, and functions
//! for easy importing with `use maplink::prelude::*;`

pub use crate::core::{
    config::{ApiKeys, Endpoints, ViewDefaults, ViewerConfig},
    events::{EventManager, MapEvent},
    geo::{LonLat, Point},
    map::{Container, Interaction, Map},
    slot::{MapSlot, SlotMap},
    viewport::ViewState,
};

pub use crate::layers::{
    base::{LayerProperties, LayerTrait, LayerType},
    factory::{create_base_layer, BaseLayerKind, LayerCatalog, LayerDescriptor},
    manager::LayerManager,
    marker::{Marker, MarkerKind},
    overlay::{GeoJsonOverlayLayer, LabelOverlay, WmsOverlayLayer},
    tile::TileLayer,
    vector::{DrawnGeometry, VectorLayer},
};

pub use crate::permalink::{
    codec::{decode, encode, DecodeWarning, GeometryKind, LayerSelection, PermalinkState},
    sync::{HistorySink, MemoryHistory, PermalinkSync},
};

pub use crate::state::{
    drawing::{DrawingMode, DrawingState},
    store::{AppState, SplitState},
};

pub use crate::overlays::{
    catalog::{OsmItem, OverlayCatalog, WmsOverlayInfo},
    feature_info::{FeatureInfoResult, HttpClient, ReqwestClient},
    selection::{OverlayKey, OverlaySelection, OverlaySource},
};

pub use crate::draw::{drawables::DrawablesManager, measure::format_length};
pub use crate::split::{
    controller::SplitController,
    sync::{SyncOutcome, ViewSync},
};
pub use crate::tiles::{capabilities::WmtsCapabilities, source::TileSource};
pub use crate::search::PlaceResult;
pub use crate::viewer::{LogNotifier, Notifier, RecordingNotifier, Viewer};

pub use crate::{Error as MapError, ErrorSeverity, Result};

pub use std::sync::Arc;

pub use fxhash::FxHashMap as HashMap;

//! # maplink
//!
//! Headless core of a permalink-driven web map viewer.
//!
//! The crate composes a base layer, optional WMS / GeoJSON overlays and
//! user-drawn geometry on one map or on two synchronized maps side by side,
//! and keeps all of it mirrored into a compact URL query string so a view
//! can be shared and restored without any server-side storage.

pub mod core;
pub mod draw;
pub mod layers;
pub mod manifest;
pub mod overlays;
pub mod permalink;
pub mod search;
pub mod split;
pub mod state;
pub mod tiles;
pub mod viewer;

pub mod prelude;

pub use crate::core::constants;

// Re-export public API
pub use core::{
    config::ViewerConfig,
    geo::{LonLat, Point},
    map::Map,
    slot::{MapSlot, SlotMap},
    viewport::ViewState,
};

pub use layers::{
    base::LayerTrait,
    factory::{BaseLayerKind, LayerCatalog, LayerDescriptor},
    manager::LayerManager,
};

pub use permalink::{
    codec::{decode, encode, DecodeWarning, LayerSelection, PermalinkState},
    sync::{HistorySink, MemoryHistory, PermalinkSync},
};

pub use draw::drawables::DrawablesManager;
pub use overlays::{
    catalog::OverlayCatalog,
    feature_info::{HttpClient, ReqwestClient},
    selection::{OverlayKey, OverlaySource},
};
pub use search::PlaceResult;
pub use split::{
    controller::SplitController,
    sync::{SyncOutcome, ViewSync},
};
pub use state::{drawing::DrawingMode, store::AppState};
pub use viewer::{LogNotifier, Notifier, RecordingNotifier, Viewer};

/// Installs `env_logger`, honouring `RUST_LOG`; repeated calls are ignored
#[cfg(feature = "debug")]
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();
}

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, MapError>;

/// How an error should surface to the person using the viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Logged and dropped; the viewer carries on with a fallback.
    Recoverable,
    /// Shown once through the [`Notifier`].
    UserVisible,
}

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("HTTP {status} from {url}")]
    HttpStatus { status: u16, url: String },

    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),

    #[error("Layer error: {0}")]
    Layer(String),

    #[error("Unknown map slot: {0}")]
    MissingMap(MapSlot),

    #[error("Map container '{0}' is hidden; a map cannot be sized inside it")]
    HiddenContainer(String),

    #[error("Failed to load tiles for layer: {0}")]
    TileLoad(String),

    #[error("No details available for input: {0}")]
    PlaceWithoutGeometry(String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

impl MapError {
    /// Classifies the error per the viewer's error taxonomy.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            MapError::TileLoad(_) | MapError::PlaceWithoutGeometry(_) => ErrorSeverity::UserVisible,
            _ => ErrorSeverity::Recoverable,
        }
    }

    pub fn is_user_visible(&self) -> bool {
        self.severity() == ErrorSeverity::UserVisible
    }
}

/// Error type alias for convenience
pub type Error = MapError;

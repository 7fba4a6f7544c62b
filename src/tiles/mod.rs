pub mod capabilities;
pub mod source;

// Re-exports for convenience
pub use capabilities::{WmtsCapabilities, WmtsLayerInfo};
pub use source::{MapboxStyleSource, OsmSource, TileCoord, TileSource, WmtsSource, XyzSource};

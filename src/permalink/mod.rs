//! The permalink: the query string mirroring what the viewer shows.

pub mod codec;
pub mod sync;

pub use codec::{
    decode, decode_with, encode, DecodeWarning, GeometryKind, GeometryRejection, LayerSelection,
    PermalinkState,
};
pub use sync::{HistorySink, MemoryHistory, PermalinkSync};

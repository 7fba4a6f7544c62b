pub mod drawing;
pub mod store;

pub use drawing::{DrawingMode, DrawingState};
pub use store::{AppState, SplitState};

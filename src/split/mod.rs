pub mod controller;
pub mod sync;

pub use controller::SplitController;
pub use sync::{SyncOutcome, SyncState, ViewSync};

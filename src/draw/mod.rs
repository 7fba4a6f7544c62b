pub mod drawables;
pub mod measure;
pub mod tools;

pub use drawables::DrawablesManager;
pub use measure::{format_length, path_length};

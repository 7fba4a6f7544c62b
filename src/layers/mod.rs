pub mod base;
pub mod factory;
pub mod macros;
pub mod manager;
pub mod marker;
pub mod overlay;
pub mod tile;
pub mod vector;

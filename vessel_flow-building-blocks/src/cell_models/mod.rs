/// The six kinds of cells which are found in the vessel
pub mod cell_kind;
/// Complete cell model composed of building blocks
pub mod vessel_cell;

pub use cell_kind::*;
pub use vessel_cell::*;

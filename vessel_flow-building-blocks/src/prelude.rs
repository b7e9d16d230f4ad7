pub use crate::cell_building_blocks::*;
pub use crate::cell_models::*;
pub use crate::domains::*;

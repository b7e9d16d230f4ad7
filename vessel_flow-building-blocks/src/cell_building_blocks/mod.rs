/// Fitness bookkeeping and the reproduction/death cycle
pub mod cycle;

/// Soft overlap repulsion between cells
pub mod interaction;

/// Physical representation of the cell
pub mod mechanics;

/// Steering policies for policy-driven cells
pub mod policy;

pub use cycle::*;
pub use interaction::*;
pub use mechanics::*;
pub use policy::*;

/// Parabolic flow profile and the forces it exerts on cells
pub mod flow_field;
/// Two interchangeable strategies for finding overlapping pairs and neighbors
pub mod pair_index;
/// The tube in which cells flow
pub mod vessel;

pub use flow_field::*;
pub use pair_index::*;
pub use vessel::*;

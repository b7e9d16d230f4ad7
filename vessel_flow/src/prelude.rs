pub use vessel_flow_building_blocks::*;
pub use vessel_flow_concepts::*;

pub use vessel_flow_core::backend::serial::*;
pub use vessel_flow_core::time::*;

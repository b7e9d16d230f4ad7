#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]
//! # vessel_flow - Building Blocks
//!
//! Building blocks are the concrete pieces from which the blood-flow model is assembled.
//! Cells are composed of a [mechanics](cell_building_blocks::mechanics) model,
//! a soft [repulsion](cell_building_blocks::interaction) and a fitness driven
//! [cycle](cell_building_blocks::cycle).
//! The [Vessel] confines them while the [FlowField] drives them along the tube.
//!
//! ```rust
//! # use vessel_flow_building_blocks::prelude::*;
//! # use vessel_flow_concepts::Mechanics;
//! # use nalgebra::Vector2;
//! let mut cell = VesselCell::new(
//!     CellKind::Erythrocyte,
//!     Vector2::from([100.0, 360.0]),
//!     Vector2::from([1.0, 0.0]),
//! );
//! cell.apply_force(&Vector2::from([0.5, 0.0]));
//! cell.integrate();
//! assert!(cell.pos().x > 100.0);
//! ```

/// Construct cells from individual components
pub mod cell_building_blocks;

/// Catalogue of cell kinds and the complete cell model
pub mod cell_models;

/// The vessel which contains cells, the flow inside of it and spatial indices
pub mod domains;

/// Handy re-exports of every building block.
pub mod prelude;

pub use cell_building_blocks::*;
pub use cell_models::*;
pub use domains::*;

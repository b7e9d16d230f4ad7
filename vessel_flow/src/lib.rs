#![deny(missing_docs)]
#![deny(clippy::missing_docs_in_private_items)]
#![cfg_attr(docsrs, feature(doc_cfg))]
//! [vessel_flow](crate) simulates blood cells which are carried through a two-dimensional
//! vessel by a parabolic flow.
//!
//! Erythrocytes, platelets and leukocytes are passive particles which are dragged by the
//! flow, drift towards the walls and repel each other when overlapping.
//! Circulating tumor cells are additionally steered by a small fixed
//! [decision policy](building_blocks::FeedForwardPolicy), gain or lose fitness depending on
//! their surroundings and reproduce or die accordingly.
//! Their growth is bounded by an overflow guard which resets the simulation once too many of
//! them exist.
//!
//! ```
//! use vessel_flow::prelude::*;
//!
//! let settings = Settings {
//!     targets: PopulationTargets::empty()
//!         .with(CellKind::Erythrocyte, 50)
//!         .with(CellKind::TumorCell, 2),
//!     ..Default::default()
//! };
//! let mut simulation = Simulation::new(settings)?;
//! simulation.set_parameters(TickParameters {
//!     pulsatile: true,
//!     bpm: 90.0,
//!     ..Default::default()
//! });
//! for _ in 0..60 {
//!     simulation.step()?;
//! }
//! assert_eq!(simulation.population_counts()[&CellKind::Erythrocyte], 50);
//! # Ok::<(), SimulationError>(())
//! ```

pub use vessel_flow_building_blocks as building_blocks;

pub use vessel_flow_concepts as concepts;

pub use vessel_flow_core as core;

/// Re-exports the default simulation types and traits.
pub mod prelude;

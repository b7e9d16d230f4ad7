//! Single-threaded backend which advances one [Simulation] tick by tick.
//!
//! Every tick is split into clearly ordered phases (see [Simulation::step]).
//! External collaborators only interact with the simulation between two ticks: they supply
//! [TickParameters] via [Simulation::set_parameters], reseed the population with
//! [Simulation::reseed] or [Simulation::reset], disturb cells with
//! [Simulation::apply_disturbance] and read [Frame]s.
//!
//! ```
//! # use vessel_flow_core::backend::serial::*;
//! let mut simulation = Simulation::new(Settings::default())?;
//! for _ in 0..10 {
//!     simulation.step()?;
//! }
//! let frame = simulation.frame();
//! assert_eq!(frame.tick, 10);
//! # Ok::<(), SimulationError>(())
//! ```

mod datastructures;
mod errors;
mod result;
mod run_sim;
mod setup;
mod update_cycle;
mod update_forces;
mod update_mechanics;

pub use datastructures::*;
pub use errors::*;
pub use result::*;
pub use run_sim::*;
pub use setup::*;
pub use update_cycle::*;

//! Backends which advance the simulation.

/// Run the simulation on a single thread
///
/// All phases of a tick are executed sequentially on one collection of cells which is owned
/// by the [Simulation](serial::Simulation).
pub mod serial;

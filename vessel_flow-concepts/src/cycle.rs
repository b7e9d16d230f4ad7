use crate::errors::{DeathError, DivisionError};

use serde::{Deserialize, Serialize};

/// Contains all events which can arise during the life of a cell and need to be communicated
/// to the simulation engine (see also [Cycle]).
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum CycleEvent {
    /// A cell-event which calls the [Cycle::divide] method which will spawn an additional cell
    /// and modify the existing one.
    Division,
    /// Flags the cell as dead.
    /// It is excluded from all further physics and removed from the simulation at the next
    /// compaction pass.
    Remove,
}

/// This trait represents the life cycle of a cell and works in tandem with the [CycleEvent]
/// enum.
///
/// The `update_cycle` function is designed to be called once per tick and return only
/// something if a specific cycle event is supposed to be occurring.
pub trait Cycle<Cell> {
    /// Inspects the current state of the cell and may return a [CycleEvent] which is then
    /// carried out by the backend.
    #[must_use]
    fn update_cycle(rng: &mut rand_chacha::ChaCha8Rng, cell: &mut Cell) -> Option<CycleEvent>;

    /// Performs reproduction of the cell by modifying the existing one and spawning an
    /// additional cell.
    /// Corresponds to [CycleEvent::Division].
    fn divide(rng: &mut rand_chacha::ChaCha8Rng, cell: &mut Cell) -> Result<Cell, DivisionError>;

    /// Called once when the [CycleEvent::Remove] event is carried out.
    /// By default this method does nothing.
    #[allow(unused)]
    fn on_death(rng: &mut rand_chacha::ChaCha8Rng, cell: &mut Cell) -> Result<(), DeathError> {
        Ok(())
    }
}

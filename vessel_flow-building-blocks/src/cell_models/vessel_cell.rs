use crate::cell_building_blocks::*;
use crate::cell_models::CellKind;

use vessel_flow_concepts::{
    CalcError, Cycle, CycleEvent, DivisionError, Interaction, InteractionInformation, Mechanics,
};

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

/// A single cell flowing through the vessel.
///
/// The cell is composed of a [DampedPointMass], a [SoftRepulsion] and a [FitnessCycle].
/// Radius and mass are taken from the [CellKind] catalogue at construction.
/// Dead cells stay in the collection until the next compaction but are excluded from all
/// physics.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct VesselCell {
    /// Kind of the cell
    pub kind: CellKind,
    /// Position, velocity and accumulated force
    pub mechanics: DampedPointMass,
    /// Overlap resolution with other cells
    pub interaction: SoftRepulsion,
    /// Fitness and reproduction cooldown
    pub cycle: FitnessCycle,
    /// Cells which are not alive are removed at the next compaction
    pub alive: bool,
}

impl VesselCell {
    /// Constructs a living cell with zero fitness from the catalogue values of its kind.
    pub fn new(kind: CellKind, pos: Vector2<f64>, vel: Vector2<f64>) -> Self {
        Self::with_fitness_parameters(kind, pos, vel, FitnessParameters::default())
    }

    /// Like [VesselCell::new] but with custom lifecycle constants.
    pub fn with_fitness_parameters(
        kind: CellKind,
        pos: Vector2<f64>,
        vel: Vector2<f64>,
        parameters: FitnessParameters,
    ) -> Self {
        Self {
            kind,
            mechanics: DampedPointMass::new(pos, vel, kind.mass()),
            interaction: SoftRepulsion::new(kind.radius()),
            cycle: FitnessCycle::new(parameters),
            alive: true,
        }
    }

    /// Radius of the cell
    pub fn radius(&self) -> f64 {
        self.interaction.radius
    }

    /// Current fitness
    pub fn fitness(&self) -> f64 {
        self.cycle.fitness
    }

    /// Remaining reproduction cooldown in ticks
    pub fn reproduction_cooldown(&self) -> u32 {
        self.cycle.reproduction_cooldown
    }
}

impl Mechanics<Vector2<f64>, Vector2<f64>, Vector2<f64>> for VesselCell {
    fn pos(&self) -> Vector2<f64> {
        self.mechanics.pos()
    }

    fn velocity(&self) -> Vector2<f64> {
        self.mechanics.velocity()
    }

    fn set_pos(&mut self, pos: &Vector2<f64>) {
        self.mechanics.set_pos(pos);
    }

    fn set_velocity(&mut self, velocity: &Vector2<f64>) {
        self.mechanics.set_velocity(velocity);
    }

    fn mass(&self) -> f64 {
        self.mechanics.mass()
    }

    fn apply_force(&mut self, force: &Vector2<f64>) {
        self.mechanics.apply_force(force);
    }

    fn integrate(&mut self) {
        self.mechanics.integrate();
    }
}

impl InteractionInformation<f64> for VesselCell {
    fn get_interaction_information(&self) -> f64 {
        self.interaction.get_interaction_information()
    }
}

impl Interaction<Vector2<f64>, f64> for VesselCell {
    fn calculate_push_between(
        &self,
        own_pos: &Vector2<f64>,
        ext_pos: &Vector2<f64>,
        ext_info: &f64,
        strength: f64,
    ) -> Result<Option<Vector2<f64>>, CalcError> {
        self.interaction
            .calculate_push_between(own_pos, ext_pos, ext_info, strength)
    }
}

/// Separates two overlapping cells.
///
/// Both cells are displaced along the line connecting their centers, each by the push
/// divided by its own mass, such that lighter cells move further.
/// A fraction of the push is also transferred into their velocities.
/// Returns `true` if the cells overlapped.
pub fn resolve_overlap(
    cell: &mut VesselCell,
    ext: &mut VesselCell,
    strength: f64,
) -> Result<bool, CalcError> {
    let own_pos = cell.pos();
    let ext_pos = ext.pos();
    let push = match cell.calculate_push_between(
        &own_pos,
        &ext_pos,
        &ext.get_interaction_information(),
        strength,
    )? {
        Some(push) => push,
        None => return Ok(false),
    };
    let deflection = push * cell.interaction.velocity_deflection;
    let own_mass = cell.mass();
    let ext_mass = ext.mass();
    cell.set_pos(&(own_pos + push / own_mass));
    ext.set_pos(&(ext_pos - push / ext_mass));
    cell.set_velocity(&(cell.velocity() + deflection / own_mass));
    ext.set_velocity(&(ext.velocity() - deflection / ext_mass));
    Ok(true)
}

impl Cycle<VesselCell> for FitnessCycle {
    fn update_cycle(
        _rng: &mut rand_chacha::ChaCha8Rng,
        cell: &mut VesselCell,
    ) -> Option<CycleEvent> {
        if !cell.alive || !cell.kind.is_policy_driven() {
            return None;
        }
        if cell.cycle.can_reproduce() {
            Some(CycleEvent::Division)
        } else if cell.cycle.is_exhausted() {
            Some(CycleEvent::Remove)
        } else {
            None
        }
    }

    fn divide(
        rng: &mut rand_chacha::ChaCha8Rng,
        cell: &mut VesselCell,
    ) -> Result<VesselCell, DivisionError> {
        if !cell.kind.is_policy_driven() {
            return Err(DivisionError(format!(
                "cells of kind {} do not reproduce",
                cell.kind
            )));
        }
        cell.cycle.restart();
        let parameters = &cell.cycle.parameters;
        let mut child = cell.clone();
        child.mechanics.clear_acceleration();
        child.set_pos(&(cell.pos() + random_direction(rng) * parameters.offspring_offset));
        child.set_velocity(&(cell.velocity() * parameters.offspring_velocity_fraction));
        Ok(child)
    }
}

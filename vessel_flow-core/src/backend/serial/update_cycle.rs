use super::{Simulation, SimulationError};

use vessel_flow_building_blocks::{CellKind, FitnessCycle, PairIndex};
use vessel_flow_concepts::{Cycle, CycleEvent};

#[cfg(feature = "tracing")]
use tracing::{instrument, trace, warn};

/// Births and deaths which occurred during one reproduction phase
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CycleOutcome {
    /// Number of newly spawned cells
    pub births: usize,
    /// Number of cells which were marked as dead
    pub deaths: usize,
}

impl Simulation {
    /// Penalizes every policy-driven cell once for every immune cell touching it.
    ///
    /// Uses the positions of the last rebuild of the index.
    #[cfg_attr(feature = "tracing", instrument(skip_all))]
    pub(crate) fn apply_immune_contacts(&mut self, active: &[usize]) {
        let Self { cells, index, .. } = self;
        let kinds: Vec<CellKind> = active.iter().map(|&n| cells[n].kind).collect();
        let positions = index.positions();
        let max_radius = CellKind::largest_radius();

        for (i, &n) in active.iter().enumerate() {
            if !kinds[i].is_policy_driven() {
                continue;
            }
            let cell = &mut cells[n];
            let own_radius = cell.radius();
            let search_radius = own_radius + max_radius + cell.cycle.parameters.immune_contact_margin;
            let own_pos = positions[i];
            let mut contacts = 0;
            index.for_each_within(&own_pos, search_radius, &mut |j| {
                let kind = kinds[j];
                if kind.is_immune() {
                    let dist = (positions[j] - own_pos).norm();
                    if cell.cycle.is_immune_contact(own_radius, kind.radius(), dist) {
                        contacts += 1;
                    }
                }
            });
            for _ in 0..contacts {
                cell.cycle.penalize_immune_contact();
            }
        }
    }

    /// Resolves reproduction and death of policy-driven cells and afterwards decrements every
    /// cooldown which was already running before this phase.
    ///
    /// Newborn cells are appended to the end of the collection.
    #[cfg_attr(feature = "tracing", instrument(skip_all))]
    pub(crate) fn update_cycles(&mut self, active: &[usize]) -> Result<CycleOutcome, SimulationError> {
        let mut outcome = CycleOutcome::default();
        let mut reproduced = vec![false; self.cells.len()];
        let mut newborn = Vec::new();

        for &n in active {
            let cell = &mut self.cells[n];
            match FitnessCycle::update_cycle(&mut self.rng, cell) {
                Some(CycleEvent::Division) => {
                    newborn.push(FitnessCycle::divide(&mut self.rng, cell)?);
                    reproduced[n] = true;
                    outcome.births += 1;
                }
                Some(CycleEvent::Remove) => {
                    FitnessCycle::on_death(&mut self.rng, cell)?;
                    cell.alive = false;
                    outcome.deaths += 1;
                }
                None => (),
            }
        }

        for (cell, reproduced) in self.cells.iter_mut().zip(reproduced) {
            if !reproduced {
                cell.cycle.tick_cooldown();
            }
        }
        self.cells.extend(newborn);
        Ok(outcome)
    }

    /// Resets the simulation if the number of alive policy-driven cells reached the ceiling.
    ///
    /// Returns `true` if the simulation was reset.
    #[cfg_attr(feature = "tracing", instrument(skip_all))]
    pub(crate) fn guard_overflow(&mut self) -> bool {
        let count = self.policy_driven_count();
        let ceiling = self.settings.population_ceiling;
        if count < ceiling {
            return false;
        }
        #[cfg(feature = "tracing")]
        warn!(count, ceiling, "population ceiling reached, simulation is lost and reseeded");
        self.reset();
        self.lost_notice = self.settings.lost_notice_ticks;
        true
    }

    /// Removes all dead cells from the collection and returns how many were removed.
    pub fn compact(&mut self) -> usize {
        let before = self.cells.len();
        self.cells.retain(|cell| cell.alive);
        let removed = before - self.cells.len();
        #[cfg(feature = "tracing")]
        trace!(removed, "compacted cells");
        removed
    }
}

#[cfg(test)]
mod test {
    use super::super::{PopulationTargets, Settings};
    use super::*;
    use vessel_flow_building_blocks::VesselCell;
    use vessel_flow_concepts::Mechanics;

    use nalgebra::Vector2;

    fn tumor_cell(x: f64, fitness: f64) -> VesselCell {
        let mut cell = VesselCell::new(
            CellKind::TumorCell,
            Vector2::from([x, 360.0]),
            Vector2::from([1.0, 0.0]),
        );
        cell.cycle.fitness = fitness;
        cell
    }

    fn simulation_with(cells: Vec<VesselCell>) -> Result<Simulation, SimulationError> {
        let mut simulation = Simulation::empty(Settings::default())?;
        simulation.insert_cells(cells);
        Ok(simulation)
    }

    #[test]
    fn immune_contact_is_penalized_per_contact() -> Result<(), SimulationError> {
        let mut simulation = simulation_with(vec![
            tumor_cell(400.0, 0.0),
            VesselCell::new(CellKind::Neutrophil, Vector2::from([415.0, 360.0]), Vector2::zeros()),
            VesselCell::new(CellKind::Monocyte, Vector2::from([385.0, 360.0]), Vector2::zeros()),
            // Not an immune cell
            VesselCell::new(CellKind::Lymphocyte, Vector2::from([405.0, 360.0]), Vector2::zeros()),
            // Too far away
            VesselCell::new(CellKind::Neutrophil, Vector2::from([440.0, 360.0]), Vector2::zeros()),
        ])?;
        let active = simulation.rebuild_index()?;
        simulation.apply_immune_contacts(&active);
        approx::assert_abs_diff_eq!(simulation.cells()[0].fitness(), -0.04, epsilon = 1e-15);
        for cell in &simulation.cells()[1..] {
            assert_eq!(cell.fitness(), 0.0);
        }
        Ok(())
    }

    #[test]
    fn reproduction_sets_cooldown_of_parent_and_child() -> Result<(), SimulationError> {
        let mut simulation = simulation_with(vec![tumor_cell(400.0, 1.01), tumor_cell(600.0, 0.5)])?;
        simulation.cells_mut()[1].cycle.reproduction_cooldown = 10;
        let active = simulation.rebuild_index()?;
        let outcome = simulation.update_cycles(&active)?;
        assert_eq!(outcome, CycleOutcome { births: 1, deaths: 0 });

        let cells = simulation.cells();
        assert_eq!(cells.len(), 3);
        assert_eq!(cells[0].fitness(), 0.0);
        assert_eq!(cells[0].reproduction_cooldown(), 200);
        assert_eq!(cells[1].reproduction_cooldown(), 9);
        assert_eq!(cells[2].reproduction_cooldown(), 200);
        assert!((cells[2].pos() - cells[0].pos()).norm() <= 5.0 + 1e-9);
        Ok(())
    }

    #[test]
    fn exhausted_cells_die_and_are_compacted() -> Result<(), SimulationError> {
        let mut simulation = simulation_with(vec![tumor_cell(400.0, -0.51), tumor_cell(600.0, -0.49)])?;
        let active = simulation.rebuild_index()?;
        let outcome = simulation.update_cycles(&active)?;
        assert_eq!(outcome, CycleOutcome { births: 0, deaths: 1 });
        assert!(!simulation.cells()[0].alive);
        assert!(simulation.cells()[1].alive);
        assert_eq!(simulation.compact(), 1);
        assert_eq!(simulation.cells().len(), 1);
        assert_eq!(simulation.cells()[0].fitness(), -0.49);
        Ok(())
    }

    #[test]
    fn overflow_reseeds_from_targets() -> Result<(), SimulationError> {
        let mut simulation = Simulation::empty(Settings {
            targets: PopulationTargets::empty()
                .with(CellKind::Erythrocyte, 4)
                .with(CellKind::TumorCell, 1),
            population_ceiling: 3,
            ..Default::default()
        })?;
        simulation.insert_cells((0..2).map(|n| tumor_cell(100.0 + 20.0 * n as f64, 0.0)));
        assert!(!simulation.guard_overflow());

        simulation.insert_cells([tumor_cell(500.0, 0.0)]);
        assert!(simulation.guard_overflow());
        assert_eq!(simulation.cells().len(), 5);
        assert_eq!(simulation.policy_driven_count(), 1);
        assert_eq!(simulation.lost_notice().map(|n| n.remaining_ticks), Some(240));
        Ok(())
    }

    #[test]
    fn dead_cells_do_not_count_towards_ceiling() -> Result<(), SimulationError> {
        let mut simulation = Simulation::empty(Settings {
            population_ceiling: 2,
            ..Default::default()
        })?;
        let mut dead = tumor_cell(100.0, 0.0);
        dead.alive = false;
        simulation.insert_cells([dead, tumor_cell(200.0, 0.0)]);
        assert!(!simulation.guard_overflow());
        Ok(())
    }
}

use super::{Simulation, SimulationError};

use vessel_flow_building_blocks::{resolve_overlap, PairIndex, VesselCell};
use vessel_flow_concepts::{Boundary, IndexError, Mechanics};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Borrows two distinct cells mutably at once. Requires `i < j`.
fn pair_mut(
    cells: &mut [VesselCell],
    i: usize,
    j: usize,
) -> Result<(&mut VesselCell, &mut VesselCell), IndexError> {
    if i >= j || j >= cells.len() {
        return Err(IndexError(format!(
            "can not borrow cells {i} and {j} out of {} as a pair",
            cells.len()
        )));
    }
    let (left, right) = cells.split_at_mut(j);
    Ok((&mut left[i], &mut right[0]))
}

impl Simulation {
    /// Pushes overlapping cells apart and returns the number of resolved overlaps.
    ///
    /// Skipped entirely if the collide strength does not exceed
    /// [Settings::collision_threshold](super::Settings::collision_threshold).
    /// Pairs are visited in the order reported by the index and see the positions which
    /// were updated by earlier pairs.
    #[cfg_attr(feature = "tracing", instrument(skip_all))]
    pub(crate) fn resolve_collisions(&mut self) -> Result<usize, SimulationError> {
        let strength = self.parameters.collide_strength;
        if strength <= self.settings.collision_threshold {
            return Ok(0);
        }
        let active = self.rebuild_index()?;
        let mut resolved = 0;
        for [i, j] in self.index.candidate_pairs() {
            let (cell, ext) = pair_mut(&mut self.cells, active[i], active[j])?;
            if resolve_overlap(cell, ext, strength)? {
                resolved += 1;
            }
        }
        Ok(resolved)
    }

    /// Integrates every alive cell and reconciles it with the walls and ends of the vessel.
    #[cfg_attr(feature = "tracing", instrument(skip_all))]
    pub(crate) fn integrate_cells(&mut self) -> Result<(), SimulationError> {
        let Self {
            vessel, cells, rng, ..
        } = self;
        for cell in cells.iter_mut().filter(|cell| cell.alive) {
            cell.integrate();
            let mut pos = cell.pos();
            let mut vel = cell.velocity();
            vessel.apply_boundary(rng, cell.radius(), &mut pos, &mut vel)?;
            cell.set_pos(&pos);
            cell.set_velocity(&vel);
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::super::{Settings, TickParameters};
    use super::*;
    use vessel_flow_building_blocks::CellKind;

    use nalgebra::Vector2;

    fn cell_at(kind: CellKind, x: f64, y: f64) -> VesselCell {
        VesselCell::new(kind, Vector2::from([x, y]), Vector2::zeros())
    }

    #[test]
    fn pairs_are_borrowed_in_order() {
        let mut cells = vec![
            cell_at(CellKind::Erythrocyte, 0.0, 0.0),
            cell_at(CellKind::Platelet, 1.0, 0.0),
            cell_at(CellKind::Monocyte, 2.0, 0.0),
        ];
        let (a, b) = pair_mut(&mut cells, 0, 2).unwrap();
        assert_eq!(a.kind, CellKind::Erythrocyte);
        assert_eq!(b.kind, CellKind::Monocyte);
        assert!(pair_mut(&mut cells, 1, 1).is_err());
        assert!(pair_mut(&mut cells, 2, 1).is_err());
        assert!(pair_mut(&mut cells, 1, 3).is_err());
    }

    #[test]
    fn collisions_are_skipped_below_threshold() -> Result<(), SimulationError> {
        let mut simulation = Simulation::empty(Settings {
            parameters: TickParameters {
                collide_strength: 0.0005,
                ..Default::default()
            },
            ..Default::default()
        })?;
        simulation.insert_cells([
            cell_at(CellKind::Erythrocyte, 400.0, 360.0),
            cell_at(CellKind::Erythrocyte, 405.0, 360.0),
        ]);
        assert_eq!(simulation.resolve_collisions()?, 0);
        assert_eq!(simulation.cells()[0].pos(), Vector2::from([400.0, 360.0]));
        Ok(())
    }

    #[test]
    fn dead_cells_do_not_collide() -> Result<(), SimulationError> {
        let mut simulation = Simulation::empty(Settings::default())?;
        let mut dead = cell_at(CellKind::Erythrocyte, 405.0, 360.0);
        dead.alive = false;
        simulation.insert_cells([cell_at(CellKind::Erythrocyte, 400.0, 360.0), dead]);
        assert_eq!(simulation.resolve_collisions()?, 0);
        Ok(())
    }

    #[test]
    fn overlapping_cells_are_separated() -> Result<(), SimulationError> {
        let mut simulation = Simulation::empty(Settings::default())?;
        simulation.insert_cells([
            cell_at(CellKind::Erythrocyte, 400.0, 360.0),
            cell_at(CellKind::Erythrocyte, 406.0, 360.0),
        ]);
        assert_eq!(simulation.resolve_collisions()?, 1);
        let cells = simulation.cells();
        assert!(cells[0].pos().x < 400.0);
        assert!(cells[1].pos().x > 406.0);
        approx::assert_abs_diff_eq!(
            cells[0].pos().x + cells[1].pos().x,
            806.0,
            epsilon = 1e-12
        );
        Ok(())
    }

    #[test]
    fn integration_keeps_cells_inside() -> Result<(), SimulationError> {
        let mut simulation = Simulation::empty(Settings::default())?;
        let vessel = *simulation.vessel();
        let mut cell = cell_at(CellKind::Monocyte, 400.0, vessel.y0() + vessel.radius() - 10.0);
        cell.set_velocity(&Vector2::from([0.0, 5.0]));
        simulation.insert_cells([cell]);
        simulation.integrate_cells()?;
        let cell = &simulation.cells()[0];
        assert!((cell.pos().y - vessel.y0()).abs() <= vessel.radius() - cell.radius() + 1e-9);
        assert!(cell.velocity().y < 0.0);
        Ok(())
    }
}

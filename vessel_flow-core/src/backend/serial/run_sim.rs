use super::{Frame, Simulation, SimulationError, TickParameters};
use crate::time::{TimeEvent, TimeStepper};

use vessel_flow_concepts::Mechanics;

use nalgebra::Vector2;

#[cfg(feature = "tracing")]
use tracing::{instrument, warn};

/// Summary of what happened during a single [Simulation::step].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StepOutcome {
    /// The population ceiling was reached and the simulation was reset
    pub overflowed: bool,
    /// Number of newly spawned cells
    pub births: usize,
    /// Number of cells which died
    pub deaths: usize,
    /// Number of dead cells which were removed at the beginning of the tick
    pub removed: usize,
    /// Number of resolved overlaps
    pub collisions: usize,
}

impl Simulation {
    /// Advances the simulation by one tick.
    ///
    /// The phases are executed strictly in this order:
    /// 1. compaction of cells which died in an earlier tick (every
    ///    [compaction_interval](super::Settings::compaction_interval) ticks)
    /// 2. accumulation of flow forces, steering and fitness scoring
    /// 3. immune contact penalties
    /// 4. reproduction and death followed by the cooldown decrement
    /// 5. overflow guard
    /// 6. collision resolution over the possibly reset collection
    /// 7. integration and boundary handling
    #[cfg_attr(feature = "tracing", instrument(skip_all, fields(tick = self.tick)))]
    pub fn step(&mut self) -> Result<StepOutcome, SimulationError> {
        let mut outcome = StepOutcome::default();
        self.lost_notice = self.lost_notice.saturating_sub(1);

        if self.tick % self.settings.compaction_interval == 0 {
            outcome.removed = self.compact();
        }

        let active = self.rebuild_index()?;
        self.update_forces(&active);
        self.apply_immune_contacts(&active);
        let cycle = self.update_cycles(&active)?;
        outcome.births = cycle.births;
        outcome.deaths = cycle.deaths;

        // Indices into the collection are invalid from here on
        outcome.overflowed = self.guard_overflow();
        outcome.collisions = self.resolve_collisions()?;
        self.integrate_cells()?;

        self.tick += 1;
        self.time += self.parameters.frame_seconds;
        Ok(outcome)
    }

    /// Supplies the parameters for the next ticks.
    ///
    /// Invalid values are replaced by the ones currently in use.
    /// Returns the names of all replaced fields.
    pub fn set_parameters(&mut self, parameters: TickParameters) -> Vec<&'static str> {
        let mut parameters = parameters;
        let replaced = parameters.sanitize(&self.parameters);
        self.parameters = parameters;
        replaced
    }

    /// Adds a swirl around `center` to the velocity of every alive cell within `radius`.
    ///
    /// The swirl is perpendicular to the offset from the center and grows linearly towards
    /// the center.
    /// Cells exactly at the center are left untouched.
    /// Returns the number of disturbed cells.
    pub fn apply_disturbance(&mut self, center: Vector2<f64>, radius: f64) -> usize {
        if !(center.x.is_finite() && center.y.is_finite() && radius.is_finite() && radius > 0.0) {
            #[cfg(feature = "tracing")]
            warn!(?center, radius, "ignoring invalid disturbance");
            return 0;
        }
        let gain = self.settings.disturbance_gain;
        let mut disturbed = 0;
        for cell in self.cells.iter_mut().filter(|cell| cell.alive) {
            let offset = cell.pos() - center;
            let dist = offset.norm();
            if dist > 0.0 && dist < radius {
                let swirl = Vector2::from([-offset.y, offset.x]) / dist * (radius - dist) * gain;
                cell.set_velocity(&(cell.velocity() + swirl));
                disturbed += 1;
            }
        }
        disturbed
    }

    /// Advances the simulation until the time stepper is exhausted.
    ///
    /// The increment of every time point is used as
    /// [frame_seconds](TickParameters::frame_seconds).
    /// A [Frame] is recorded at every [TimeEvent::Snapshot].
    pub fn run(
        &mut self,
        time_stepper: &mut impl TimeStepper<f64>,
        show_progressbar: bool,
    ) -> Result<Vec<Frame>, SimulationError> {
        let mut pb = match show_progressbar {
            true => Some(time_stepper.initialize_bar()?),
            false => None,
        };
        let mut frames = Vec::new();
        while let Some(next_time_point) = time_stepper.advance()? {
            self.parameters.frame_seconds = next_time_point.increment;
            self.step()?;
            if let Some(TimeEvent::Snapshot) = next_time_point.event {
                frames.push(self.frame());
            }
            match &mut pb {
                Some(bar) => time_stepper.update_bar(bar)?,
                None => (),
            };
        }
        Ok(frames)
    }
}

#[cfg(test)]
mod test {
    use super::super::{PopulationTargets, Settings};
    use super::*;
    use crate::time::FixedStepsize;
    use vessel_flow_building_blocks::{CellKind, VesselCell};

    fn small_settings() -> Settings {
        Settings {
            targets: PopulationTargets::empty()
                .with(CellKind::Erythrocyte, 30)
                .with(CellKind::Platelet, 10)
                .with(CellKind::Neutrophil, 3)
                .with(CellKind::TumorCell, 3),
            ..Default::default()
        }
    }

    #[test]
    fn step_advances_tick_and_time() -> Result<(), SimulationError> {
        let mut simulation = Simulation::new(small_settings())?;
        simulation.step()?;
        simulation.step()?;
        assert_eq!(simulation.tick(), 2);
        approx::assert_relative_eq!(simulation.time(), 2.0 / 60.0);
        Ok(())
    }

    #[test]
    fn same_seed_same_trajectory() -> Result<(), SimulationError> {
        let mut s1 = Simulation::new(small_settings())?;
        let mut s2 = Simulation::new(small_settings())?;
        for _ in 0..50 {
            s1.step()?;
            s2.step()?;
        }
        assert_eq!(s1.frame(), s2.frame());
        Ok(())
    }

    #[test]
    fn invalid_parameters_keep_previous_values() -> Result<(), SimulationError> {
        let mut simulation = Simulation::new(small_settings())?;
        let replaced = simulation.set_parameters(TickParameters {
            speed_scale: 2.0,
            margin_strength: f64::NAN,
            ..Default::default()
        });
        assert_eq!(replaced, vec!["margin_strength"]);
        assert_eq!(simulation.parameters().speed_scale, 2.0);
        assert_eq!(simulation.parameters().margin_strength, 1.0);
        simulation.step()?;
        Ok(())
    }

    #[test]
    fn disturbance_swirls_nearby_cells() -> Result<(), SimulationError> {
        let mut simulation = Simulation::empty(Settings::default())?;
        simulation.insert_cells([
            VesselCell::new(CellKind::Erythrocyte, Vector2::from([410.0, 360.0]), Vector2::zeros()),
            VesselCell::new(CellKind::Erythrocyte, Vector2::from([400.0, 360.0]), Vector2::zeros()),
            VesselCell::new(CellKind::Erythrocyte, Vector2::from([600.0, 360.0]), Vector2::zeros()),
        ]);
        let disturbed = simulation.apply_disturbance(Vector2::from([400.0, 360.0]), 120.0);
        assert_eq!(disturbed, 1);
        let cells = simulation.cells();
        approx::assert_abs_diff_eq!(
            cells[0].velocity(),
            Vector2::from([0.0, 110.0 * 0.002]),
            epsilon = 1e-12
        );
        assert_eq!(cells[1].velocity(), Vector2::zeros());
        assert_eq!(cells[2].velocity(), Vector2::zeros());
        assert_eq!(simulation.apply_disturbance(Vector2::from([400.0, 360.0]), f64::NAN), 0);
        Ok(())
    }

    #[test]
    fn lost_notice_counts_down() -> Result<(), SimulationError> {
        let mut simulation = Simulation::new(Settings {
            targets: PopulationTargets::empty().with(CellKind::TumorCell, 2),
            population_ceiling: 3,
            lost_notice_ticks: 2,
            ..Default::default()
        })?;
        simulation.insert_cells(
            (0..3).map(|n| {
                VesselCell::new(
                    CellKind::TumorCell,
                    Vector2::from([200.0 + 40.0 * n as f64, 360.0]),
                    Vector2::zeros(),
                )
            }),
        );
        assert!(simulation.step()?.overflowed);
        assert_eq!(simulation.policy_driven_count(), 2);
        assert_eq!(simulation.lost_notice().map(|n| n.remaining_ticks), Some(2));
        assert!(!simulation.step()?.overflowed);
        assert_eq!(simulation.lost_notice().map(|n| n.remaining_ticks), Some(1));
        simulation.step()?;
        assert_eq!(simulation.lost_notice(), None);
        Ok(())
    }

    #[test]
    fn run_records_snapshots() -> Result<(), SimulationError> {
        let mut simulation = Simulation::new(small_settings())?;
        let mut time_stepper = FixedStepsize::from_snapshot_interval(0.0, 1.0 / 30.0, 20, 5)?;
        let frames = simulation.run(&mut time_stepper, false)?;
        assert_eq!(frames.len(), 4);
        assert_eq!(frames.last().map(|frame| frame.tick), Some(20));
        assert_eq!(simulation.parameters().frame_seconds, 1.0 / 30.0);
        Ok(())
    }
}

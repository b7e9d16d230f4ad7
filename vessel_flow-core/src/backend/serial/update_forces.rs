use super::Simulation;

use vessel_flow_building_blocks::{CellKind, FitnessSignals, FlowField, PairIndex, PolicyInputs};
use vessel_flow_concepts::Mechanics;

#[cfg(feature = "tracing")]
use tracing::instrument;

impl Simulation {
    /// Accumulates advection, drag, margination and jitter for every alive cell.
    /// Policy-driven cells additionally receive their steering force and are scored.
    ///
    /// Expects the index to be rebuilt over the cells given by `active`.
    #[cfg_attr(feature = "tracing", instrument(skip_all))]
    pub(crate) fn update_forces(&mut self, active: &[usize]) {
        let conditions = self.parameters.flow_conditions();
        let peak_speed = self.settings.flow.peak_speed(&conditions, self.time);
        let Self {
            settings,
            vessel,
            cells,
            rng,
            index,
            ..
        } = self;
        let flow = &settings.flow;
        let policy = &settings.policy;
        let kinds: Vec<CellKind> = active.iter().map(|&n| cells[n].kind).collect();

        for &n in active {
            let cell = &mut cells[n];
            let pos = cell.pos();
            let vel = cell.velocity();
            let flow_velocity = flow.flow_velocity(vessel, &pos, peak_speed);
            cell.apply_force(&flow.drag(&flow_velocity, &vel));
            cell.apply_force(&flow.margination(
                vessel,
                &pos,
                cell.kind.spec().margin_bias,
                &conditions,
            ));
            cell.apply_force(&flow.jitter(rng, cell.mass(), &conditions));

            if !cell.kind.is_policy_driven() {
                continue;
            }
            let inputs = PolicyInputs {
                shear: FlowField::shear(&flow_velocity, &vel),
                wall_distance: vessel.wall_distance(pos.y),
                density: index.count_within(&pos, policy.density_radius) as f64
                    / policy.density_normalizer,
            };
            cell.apply_force(&policy.steering_force(&inputs));

            let kind = cell.kind;
            let mut companions = 0;
            index.for_each_within(
                &pos,
                cell.cycle.parameters.companion_radius,
                &mut |j| {
                    if kinds[j] == kind {
                        companions += 1;
                    }
                },
            );
            cell.cycle.score(&FitnessSignals {
                companions,
                wall_distance: inputs.wall_distance,
                shear: inputs.shear,
            });
        }
    }
}

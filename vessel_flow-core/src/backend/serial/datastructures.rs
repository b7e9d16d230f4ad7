use super::{AgentView, Frame, LostNotice, PopulationTargets, Settings, SimulationError, TickParameters};

use vessel_flow_building_blocks::{
    CellKind, CollisionIndex, CollisionStrategy, PairIndex, Vessel, VesselCell,
};
use vessel_flow_concepts::{Mechanics, SamplePosition};

use nalgebra::Vector2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::BTreeMap;

#[cfg(feature = "tracing")]
use tracing::{debug, warn};

/// Authoritative state of a running simulation.
///
/// The simulation owns the collection of cells.
/// External collaborators only hand in [TickParameters], [PopulationTargets] and
/// disturbances and receive [Frame]s in return.
#[derive(Clone, Debug)]
pub struct Simulation {
    pub(crate) settings: Settings,
    pub(crate) vessel: Vessel,
    pub(crate) cells: Vec<VesselCell>,
    pub(crate) parameters: TickParameters,
    pub(crate) targets: PopulationTargets,
    pub(crate) rng: ChaCha8Rng,
    pub(crate) index: CollisionIndex,
    pub(crate) tick: u64,
    pub(crate) time: f64,
    pub(crate) lost_notice: u32,
}

impl Simulation {
    /// Creates a new simulation and seeds the initial population from
    /// [Settings::targets].
    pub fn new(settings: Settings) -> Result<Self, SimulationError> {
        let mut simulation = Self::empty(settings)?;
        simulation.reset();
        Ok(simulation)
    }

    /// Creates a new simulation without any cells.
    pub fn empty(settings: Settings) -> Result<Self, SimulationError> {
        settings.validate()?;
        let vessel = Vessel::from_viewport(&settings.viewport)?;
        let mut parameters = settings.parameters.clone();
        parameters.sanitize(&TickParameters::default());
        let targets = settings.targets.clone();
        let index = CollisionIndex::new(
            strategy_of(&parameters),
            settings.effective_grid_cell_size(),
        )?;
        Ok(Self {
            rng: ChaCha8Rng::seed_from_u64(settings.rng_seed),
            vessel,
            cells: Vec::new(),
            parameters,
            targets,
            index,
            tick: 0,
            time: 0.0,
            lost_notice: 0,
            settings,
        })
    }

    /// Replaces all cells by a fresh population drawn from the last configured targets.
    pub fn reset(&mut self) {
        self.cells.clear();
        let targets = self.targets.0.clone();
        for (kind, count) in targets {
            for _ in 0..count {
                let cell = self.seed_cell(kind);
                self.cells.push(cell);
            }
        }
        #[cfg(feature = "tracing")]
        debug!(cells = self.cells.len(), "seeded population");
    }

    /// Stores new population targets and replaces all cells by a fresh population drawn
    /// from them.
    ///
    /// Targets are used as given. If they already reach the
    /// [population ceiling](Settings::population_ceiling), the next tick resets the simulation
    /// again.
    pub fn reseed(&mut self, targets: PopulationTargets) {
        #[cfg(feature = "tracing")]
        if targets.policy_driven() >= self.settings.population_ceiling {
            warn!(
                policy_driven = targets.policy_driven(),
                ceiling = self.settings.population_ceiling,
                "population targets reach the ceiling"
            );
        }
        self.targets = targets;
        self.reset();
    }

    /// Appends externally constructed cells.
    pub fn insert_cells(&mut self, cells: impl IntoIterator<Item = VesselCell>) {
        self.cells.extend(cells);
    }

    fn seed_cell(&mut self, kind: CellKind) -> VesselCell {
        let pos = self.vessel.sample_position(&mut self.rng, kind.radius());
        let vel = Vector2::from([
            self.rng.gen_range(0.6..2.0),
            self.rng.gen_range(-0.4..0.4),
        ]);
        VesselCell::with_fitness_parameters(kind, pos, vel, self.settings.lifecycle.clone())
    }

    /// Number of alive cells per kind
    pub fn population_counts(&self) -> BTreeMap<CellKind, usize> {
        let mut counts: BTreeMap<CellKind, usize> =
            CellKind::ALL.into_iter().map(|kind| (kind, 0)).collect();
        for cell in self.cells.iter().filter(|cell| cell.alive) {
            *counts.entry(cell.kind).or_default() += 1;
        }
        counts
    }

    /// Number of alive policy-driven cells which is monitored by the overflow guard
    pub fn policy_driven_count(&self) -> usize {
        self.cells
            .iter()
            .filter(|cell| cell.alive && cell.kind.is_policy_driven())
            .count()
    }

    /// Snapshot of the current state for rendering.
    pub fn frame(&self) -> Frame {
        Frame {
            tick: self.tick,
            time: self.time,
            agents: self.cells.iter().map(AgentView::from).collect(),
            counts: self.population_counts(),
            lost_notice: self.lost_notice(),
        }
    }

    /// Present while the simulation is displayed as lost after an overflow.
    pub fn lost_notice(&self) -> Option<LostNotice> {
        (self.lost_notice > 0).then_some(LostNotice {
            remaining_ticks: self.lost_notice,
        })
    }

    /// All cells of the simulation including dead ones which were not yet compacted
    pub fn cells(&self) -> &[VesselCell] {
        &self.cells
    }

    /// Mutable access to the cells, for example to prepare scripted scenarios
    pub fn cells_mut(&mut self) -> &mut [VesselCell] {
        &mut self.cells
    }

    /// The vessel in which cells flow
    pub fn vessel(&self) -> &Vessel {
        &self.vessel
    }

    /// Settings from which the simulation was constructed
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The tick parameters which are currently in use
    pub fn parameters(&self) -> &TickParameters {
        &self.parameters
    }

    /// The targets from which the population is reseeded
    pub fn targets(&self) -> &PopulationTargets {
        &self.targets
    }

    /// Number of completed ticks
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Elapsed simulated time in seconds
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Indices of alive cells and the index rebuilt over their current positions.
    ///
    /// The strategy of the index follows [TickParameters::use_spatial_hash].
    pub(crate) fn rebuild_index(&mut self) -> Result<Vec<usize>, SimulationError> {
        let strategy = strategy_of(&self.parameters);
        if self.index.strategy() != strategy {
            self.index = CollisionIndex::new(strategy, self.settings.effective_grid_cell_size())?;
        }
        let active: Vec<usize> = self
            .cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| cell.alive)
            .map(|(n, _)| n)
            .collect();
        let positions: Vec<_> = active.iter().map(|&n| self.cells[n].pos()).collect();
        self.index.rebuild(&positions)?;
        Ok(active)
    }
}

fn strategy_of(parameters: &TickParameters) -> CollisionStrategy {
    if parameters.use_spatial_hash {
        CollisionStrategy::UniformGrid
    } else {
        CollisionStrategy::QuadraticScan
    }
}

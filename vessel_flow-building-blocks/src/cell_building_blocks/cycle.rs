use serde::{Deserialize, Serialize};

/// Constants which govern how fitness is gained and lost and when cells reproduce or die.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FitnessParameters {
    /// Radius in which cells of the same kind are counted as companions
    pub companion_radius: f64,
    /// Reward per companion and tick
    pub companion_reward: f64,
    /// Normalized wall distance above which cells are rewarded
    pub wall_distance_threshold: f64,
    /// Reward per tick for being close to the wall
    pub wall_reward: f64,
    /// Shear above which cells are penalized
    pub shear_threshold: f64,
    /// Penalty per tick for experiencing too much shear
    pub shear_penalty: f64,
    /// Penalty per tick and touching immune cell
    pub immune_contact_penalty: f64,
    /// Additional slack added to the sum of both radii when checking immune contact
    pub immune_contact_margin: f64,
    /// Fitness which has to be exceeded for reproduction
    pub reproduction_threshold: f64,
    /// Fitness below which the cell dies
    pub death_threshold: f64,
    /// Number of ticks after reproduction in which no further reproduction is possible
    pub reproduction_cooldown: u32,
    /// Maximal distance between parent and newly spawned cell
    pub offspring_offset: f64,
    /// Fraction of the parents velocity which is inherited by the offspring
    pub offspring_velocity_fraction: f64,
}

impl Default for FitnessParameters {
    fn default() -> Self {
        Self {
            companion_radius: 30.0,
            companion_reward: 0.0004,
            wall_distance_threshold: 0.75,
            wall_reward: 0.0006,
            shear_threshold: 1.2,
            shear_penalty: 0.003,
            immune_contact_penalty: 0.02,
            immune_contact_margin: 2.0,
            reproduction_threshold: 1.0,
            death_threshold: -0.5,
            reproduction_cooldown: 200,
            offspring_offset: 5.0,
            offspring_velocity_fraction: 0.8,
        }
    }
}

/// Local conditions sensed by a cell which feed into its fitness.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FitnessSignals {
    /// Number of other cells of the same kind inside of [FitnessParameters::companion_radius]
    pub companions: usize,
    /// Normalized distance to the centerline in `[0, 1]`
    pub wall_distance: f64,
    /// Shear experienced by the cell
    pub shear: f64,
}

/// Scalar fitness together with a reproduction cooldown.
///
/// Fitness starts at zero and accumulates rewards and penalties every tick.
/// Once it exceeds [FitnessParameters::reproduction_threshold] and no cooldown is active,
/// the cell reproduces.
/// If it drops below [FitnessParameters::death_threshold] the cell dies.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct FitnessCycle {
    /// Current fitness
    pub fitness: f64,
    /// Remaining ticks until reproduction becomes possible again
    pub reproduction_cooldown: u32,
    /// Constants used to update the fitness
    pub parameters: FitnessParameters,
}

impl FitnessCycle {
    /// A fresh cycle with zero fitness and no active cooldown.
    pub fn new(parameters: FitnessParameters) -> Self {
        Self {
            fitness: 0.0,
            reproduction_cooldown: 0,
            parameters,
        }
    }

    /// Applies the rewards and penalties of one tick.
    pub fn score(&mut self, signals: &FitnessSignals) {
        let p = &self.parameters;
        self.fitness += p.companion_reward * signals.companions as f64;
        if signals.wall_distance > p.wall_distance_threshold {
            self.fitness += p.wall_reward;
        }
        if signals.shear > p.shear_threshold {
            self.fitness -= p.shear_penalty;
        }
    }

    /// Penalizes contact with one immune cell.
    pub fn penalize_immune_contact(&mut self) {
        self.fitness -= self.parameters.immune_contact_penalty;
    }

    /// Checks if an immune cell with radius `ext_radius` at distance `dist` touches a cell
    /// with radius `own_radius`.
    pub fn is_immune_contact(&self, own_radius: f64, ext_radius: f64, dist: f64) -> bool {
        dist < own_radius + ext_radius + self.parameters.immune_contact_margin
    }

    /// Reproduction is possible if the fitness exceeds its threshold and no cooldown is
    /// active.
    pub fn can_reproduce(&self) -> bool {
        self.fitness > self.parameters.reproduction_threshold && self.reproduction_cooldown == 0
    }

    /// The fitness has dropped below the death threshold.
    pub fn is_exhausted(&self) -> bool {
        self.fitness < self.parameters.death_threshold
    }

    /// Resets fitness and starts the cooldown after a successful reproduction.
    pub fn restart(&mut self) {
        self.fitness = 0.0;
        self.reproduction_cooldown = self.parameters.reproduction_cooldown;
    }

    /// Decrements an active cooldown by one tick.
    pub fn tick_cooldown(&mut self) {
        self.reproduction_cooldown = self.reproduction_cooldown.saturating_sub(1);
    }
}

impl Default for FitnessCycle {
    fn default() -> Self {
        Self::new(FitnessParameters::default())
    }
}

use super::SimulationError;

use vessel_flow_building_blocks::{
    CellKind, FitnessParameters, FlowConditions, FlowField, PolicyParameters, Viewport,
};
use vessel_flow_concepts::ConfigError;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[cfg(feature = "tracing")]
use tracing::warn;

/// Lowest heart rate accepted by [TickParameters::sanitize]
pub const MIN_BPM: f64 = 20.0;
/// Highest heart rate accepted by [TickParameters::sanitize]
pub const MAX_BPM: f64 = 220.0;
/// Largest speed multiplier accepted by [TickParameters::sanitize]
pub const MAX_SPEED_SCALE: f64 = 10.0;

/// Control parameters which are supplied anew before every tick.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TickParameters {
    /// Multiplier of the centerline flow speed
    pub speed_scale: f64,
    /// Modulate the flow speed with the heart rate
    pub pulsatile: bool,
    /// Heart rate in beats per minute
    pub bpm: f64,
    /// Strength of the overlap repulsion
    pub collide_strength: f64,
    /// Strength of the outward margination drift
    pub margin_strength: f64,
    /// Strength of the random jitter
    pub brown_strength: f64,
    /// Use the [UniformGrid](vessel_flow_building_blocks::UniformGrid) instead of the
    /// [QuadraticScan](vessel_flow_building_blocks::QuadraticScan)
    pub use_spatial_hash: bool,
    /// Elapsed time per tick in seconds. Drives the pulsatile phase.
    pub frame_seconds: f64,
}

impl Default for TickParameters {
    fn default() -> Self {
        Self {
            speed_scale: 1.0,
            pulsatile: false,
            bpm: 72.0,
            collide_strength: 1.0,
            margin_strength: 1.0,
            brown_strength: 1.0,
            use_spatial_hash: true,
            frame_seconds: 1.0 / 60.0,
        }
    }
}

impl TickParameters {
    /// Replaces every non-finite or out-of-domain value by the value of `previous` and
    /// clamps the heart rate and speed multiplier into their admissible ranges.
    ///
    /// Returns the names of all fields which were replaced.
    pub fn sanitize(&mut self, previous: &TickParameters) -> Vec<&'static str> {
        let mut replaced = Vec::new();
        let mut keep_valid =
            |name: &'static str, value: &mut f64, previous: f64, is_admissible: fn(f64) -> bool| {
                if !value.is_finite() || !is_admissible(*value) {
                    *value = previous;
                    replaced.push(name);
                }
            };
        let any: fn(f64) -> bool = |_| true;
        let positive: fn(f64) -> bool = |x| x > 0.0;
        let non_negative: fn(f64) -> bool = |x| x >= 0.0;
        keep_valid("speed_scale", &mut self.speed_scale, previous.speed_scale, positive);
        keep_valid("bpm", &mut self.bpm, previous.bpm, any);
        keep_valid("collide_strength", &mut self.collide_strength, previous.collide_strength, non_negative);
        keep_valid("margin_strength", &mut self.margin_strength, previous.margin_strength, non_negative);
        keep_valid("brown_strength", &mut self.brown_strength, previous.brown_strength, non_negative);
        keep_valid("frame_seconds", &mut self.frame_seconds, previous.frame_seconds, non_negative);
        self.bpm = self.bpm.clamp(MIN_BPM, MAX_BPM);
        self.speed_scale = self.speed_scale.min(MAX_SPEED_SCALE);
        #[cfg(feature = "tracing")]
        if !replaced.is_empty() {
            warn!(fields = ?replaced, "replaced invalid tick parameters by previous values");
        }
        replaced
    }

    /// Quantities consumed by the [FlowField]
    pub fn flow_conditions(&self) -> FlowConditions {
        FlowConditions {
            speed_scale: self.speed_scale,
            pulsatile: self.pulsatile,
            bpm: self.bpm,
            margin_strength: self.margin_strength,
            brown_strength: self.brown_strength,
        }
    }
}

/// Number of cells per kind which are seeded when the simulation is (re-)started.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct PopulationTargets(pub BTreeMap<CellKind, usize>);

impl Default for PopulationTargets {
    fn default() -> Self {
        Self(BTreeMap::from([
            (CellKind::Erythrocyte, 240),
            (CellKind::Platelet, 60),
            (CellKind::Neutrophil, 8),
            (CellKind::Lymphocyte, 6),
            (CellKind::Monocyte, 4),
            (CellKind::TumorCell, 6),
        ]))
    }
}

impl PopulationTargets {
    /// Targets with zero cells of every kind.
    pub fn empty() -> Self {
        Self(BTreeMap::new())
    }

    /// Builder-style setter for the target of a single kind.
    pub fn with(mut self, kind: CellKind, count: usize) -> Self {
        self.0.insert(kind, count);
        self
    }

    /// Target count of the given kind
    pub fn get(&self, kind: CellKind) -> usize {
        self.0.get(&kind).copied().unwrap_or(0)
    }

    /// Total number of cells which will be seeded
    pub fn total(&self) -> usize {
        self.0.values().sum()
    }

    /// Number of policy-driven cells which will be seeded
    pub fn policy_driven(&self) -> usize {
        self.0
            .iter()
            .filter(|(kind, _)| kind.is_policy_driven())
            .map(|(_, count)| count)
            .sum()
    }
}

/// All constants needed to construct a [Simulation](super::Simulation).
///
/// Missing fields are filled with their defaults when deserializing.
/// ```
/// # use vessel_flow_core::backend::serial::Settings;
/// let settings = Settings::from_json_str(r#"{"population_ceiling": 80, "rng_seed": 3}"#).unwrap();
/// assert_eq!(settings.population_ceiling, 80);
/// assert_eq!(settings.lost_notice_ticks, 240);
/// ```
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Drawing area from which the vessel is derived
    pub viewport: Viewport,
    /// Initial number of cells per kind
    pub targets: PopulationTargets,
    /// Tick parameters used before any others are supplied
    pub parameters: TickParameters,
    /// Constants of the flow
    pub flow: FlowField,
    /// Inputs, weights and gain of the steering policy
    pub policy: PolicyParameters,
    /// Fitness rewards, penalties and thresholds
    pub lifecycle: FitnessParameters,
    /// Number of alive policy-driven cells at which the simulation is lost and reset
    pub population_ceiling: usize,
    /// Number of ticks for which the lost notice is displayed
    pub lost_notice_ticks: u32,
    /// Dead cells are removed every this many ticks
    pub compaction_interval: u64,
    /// Edge length of one bucket of the uniform grid
    pub grid_cell_size: f64,
    /// Collisions are only resolved if the collide strength exceeds this value
    pub collision_threshold: f64,
    /// Gain of the swirl created by a disturbance
    pub disturbance_gain: f64,
    /// Seed of the random number generator
    pub rng_seed: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            viewport: Viewport::default(),
            targets: PopulationTargets::default(),
            parameters: TickParameters::default(),
            flow: FlowField::default(),
            policy: PolicyParameters::default(),
            lifecycle: FitnessParameters::default(),
            population_ceiling: 150,
            lost_notice_ticks: 240,
            compaction_interval: 1,
            grid_cell_size: 18.0,
            collision_threshold: 0.001,
            disturbance_gain: 0.002,
            rng_seed: 0,
        }
    }
}

impl Settings {
    /// Parses settings from a json string.
    pub fn from_json_str(input: &str) -> Result<Self, SimulationError> {
        let settings: Self = serde_json::from_str(input)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Parses settings from a ron string.
    pub fn from_ron_str(input: &str) -> Result<Self, SimulationError> {
        let settings: Self = ron::from_str(input)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reads settings from a `.json` or `.ron` file.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, SimulationError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&contents),
            Some("ron") => Self::from_ron_str(&contents),
            _ => Err(ConfigError(format!(
                "could not determine format of settings file {}; expected .json or .ron",
                path.display()
            ))
            .into()),
        }
    }

    /// Checks values which can not be sanitized at runtime.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.population_ceiling == 0 {
            return Err(ConfigError("population ceiling must be at least 1".to_owned()));
        }
        if self.compaction_interval == 0 {
            return Err(ConfigError(
                "compaction interval must be at least one tick".to_owned(),
            ));
        }
        if !(self.grid_cell_size.is_finite() && self.grid_cell_size > 0.0) {
            return Err(ConfigError(format!(
                "grid cell size must be positive but is {}",
                self.grid_cell_size
            )));
        }
        let policy = &self.policy;
        if !(policy.density_normalizer.is_finite() && policy.density_normalizer > 0.0) {
            return Err(ConfigError(format!(
                "density normalizer must be positive but is {}",
                policy.density_normalizer
            )));
        }
        Ok(())
    }

    /// Edge length of the grid buckets which is never smaller than the largest contact
    /// distance of two cells.
    pub fn effective_grid_cell_size(&self) -> f64 {
        self.grid_cell_size.max(2.0 * CellKind::largest_radius())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn sanitize_replaces_invalid_values() {
        let previous = TickParameters::default();
        let mut parameters = TickParameters {
            speed_scale: f64::NAN,
            bpm: 500.0,
            collide_strength: -1.0,
            brown_strength: f64::INFINITY,
            ..Default::default()
        };
        let replaced = parameters.sanitize(&previous);
        assert_eq!(
            replaced,
            vec!["speed_scale", "collide_strength", "brown_strength"]
        );
        assert_eq!(parameters.speed_scale, 1.0);
        assert_eq!(parameters.bpm, MAX_BPM);
        assert_eq!(parameters.collide_strength, 1.0);
        assert_eq!(parameters.brown_strength, 1.0);
    }

    #[test]
    fn sanitize_clamps_ranges() {
        let previous = TickParameters::default();
        let mut parameters = TickParameters {
            bpm: 3.0,
            speed_scale: 40.0,
            ..Default::default()
        };
        assert!(parameters.sanitize(&previous).is_empty());
        assert_eq!(parameters.bpm, MIN_BPM);
        assert_eq!(parameters.speed_scale, MAX_SPEED_SCALE);
    }

    #[test]
    fn speed_scale_has_to_be_positive() {
        let previous = TickParameters {
            speed_scale: 1.5,
            ..Default::default()
        };
        for speed_scale in [0.0, -2.0] {
            let mut parameters = TickParameters {
                speed_scale,
                ..Default::default()
            };
            assert_eq!(parameters.sanitize(&previous), vec!["speed_scale"]);
            assert_eq!(parameters.speed_scale, 1.5);
        }
    }

    #[test]
    fn non_finite_bpm_falls_back() {
        let previous = TickParameters {
            bpm: 90.0,
            ..Default::default()
        };
        let mut parameters = TickParameters {
            bpm: f64::NAN,
            ..Default::default()
        };
        assert_eq!(parameters.sanitize(&previous), vec!["bpm"]);
        assert_eq!(parameters.bpm, 90.0);
    }

    #[test]
    fn targets_are_kept_as_configured() {
        let targets = PopulationTargets::empty()
            .with(CellKind::Erythrocyte, 500)
            .with(CellKind::TumorCell, 400);
        assert_eq!(targets.get(CellKind::TumorCell), 400);
        assert_eq!(targets.get(CellKind::Erythrocyte), 500);
        assert_eq!(targets.get(CellKind::Monocyte), 0);
        assert_eq!(targets.total(), 900);
        assert_eq!(targets.policy_driven(), 400);
    }

    #[test]
    fn targets_are_keyed_by_symbol() -> Result<(), serde_json::Error> {
        let targets: PopulationTargets = serde_json::from_str(r#"{"RBC": 10, "CTC": 2}"#)?;
        assert_eq!(
            targets,
            PopulationTargets::empty()
                .with(CellKind::Erythrocyte, 10)
                .with(CellKind::TumorCell, 2)
        );
        Ok(())
    }

    #[test]
    fn settings_from_ron() -> Result<(), SimulationError> {
        let settings = Settings::from_ron_str("(population_ceiling: 20, grid_cell_size: 30.0)")?;
        assert_eq!(settings.population_ceiling, 20);
        assert_eq!(settings.grid_cell_size, 30.0);
        assert_eq!(settings.parameters, TickParameters::default());
        Ok(())
    }

    #[test]
    fn settings_from_file() -> Result<(), SimulationError> {
        let dir = tempfile::tempdir()?;
        let settings = Settings {
            rng_seed: 42,
            ..Default::default()
        };
        let json = dir.path().join("settings.json");
        std::fs::write(&json, serde_json::to_string_pretty(&settings)?)?;
        assert_eq!(Settings::from_file(&json)?, settings);

        let unknown = dir.path().join("settings.toml");
        std::fs::write(&unknown, "")?;
        assert!(matches!(
            Settings::from_file(&unknown),
            Err(SimulationError::ConfigError(_))
        ));
        Ok(())
    }

    #[test]
    fn reject_invalid_settings() {
        assert!(Settings::from_json_str(r#"{"population_ceiling": 0}"#).is_err());
        assert!(Settings::from_json_str(r#"{"grid_cell_size": -1.0}"#).is_err());
        assert!(Settings::from_json_str(r#"{"compaction_interval": 0}"#).is_err());
    }

    #[test]
    fn grid_cell_size_covers_contact_distance() {
        let settings = Settings::default();
        assert_eq!(settings.effective_grid_cell_size(), 19.0);
    }
}

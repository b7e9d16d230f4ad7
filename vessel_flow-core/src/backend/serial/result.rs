use vessel_flow_building_blocks::{CellKind, VesselCell};
use vessel_flow_concepts::Mechanics;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Everything a renderer needs to know about a single cell.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AgentView {
    /// Kind of the cell
    pub kind: CellKind,
    /// Position `[x, y]`
    pub pos: [f64; 2],
    /// Velocity `[vx, vy]`
    pub vel: [f64; 2],
    /// Radius of the cell
    pub radius: f64,
    /// Current fitness
    pub fitness: f64,
    /// Whether the cell is alive
    pub alive: bool,
    /// Suggested RGB color
    pub color: [u8; 3],
}

impl From<&VesselCell> for AgentView {
    fn from(cell: &VesselCell) -> Self {
        let pos = cell.pos();
        let vel = cell.velocity();
        Self {
            kind: cell.kind,
            pos: [pos.x, pos.y],
            vel: [vel.x, vel.y],
            radius: cell.radius(),
            fitness: cell.fitness(),
            alive: cell.alive,
            color: cell.kind.spec().color,
        }
    }
}

/// Transient notice that the population ceiling was exceeded and the simulation was reset.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct LostNotice {
    /// Number of remaining ticks for which the notice should be shown
    pub remaining_ticks: u32,
}

/// Snapshot of the simulation after one tick.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Frame {
    /// Number of completed ticks
    pub tick: u64,
    /// Elapsed simulated time in seconds
    pub time: f64,
    /// All cells which are currently part of the simulation
    pub agents: Vec<AgentView>,
    /// Number of alive cells per kind
    pub counts: BTreeMap<CellKind, usize>,
    /// Present while the lost notice should be displayed
    pub lost_notice: Option<LostNotice>,
}

use crate::domains::Vessel;

use nalgebra::Vector2;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Externally controlled quantities which modulate the flow during one tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FlowConditions {
    /// Multiplier of the centerline speed
    pub speed_scale: f64,
    /// Whether the centerline speed pulses with the heart rate
    pub pulsatile: bool,
    /// Heart rate in beats per minute
    pub bpm: f64,
    /// Multiplier of the margination drift
    pub margin_strength: f64,
    /// Multiplier of the random jitter
    pub brown_strength: f64,
}

/// Parabolic (Poiseuille-like) flow profile inside the [Vessel] and the forces it exerts.
///
/// The horizontal flow velocity at normalized offset $\eta = (y - y_0)/R$ is
/// \\begin{equation}
///     u(\eta) = u_\text{max}\left(1 - \eta^2\right)
/// \\end{equation}
/// and vanishes at and outside of the wall.
/// When pulsatile, the centerline speed is modulated by
/// $o + a\sin\left(2\pi\frac{\text{bpm}}{60}t\right)$.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FlowField {
    /// Centerline speed before scaling
    pub base_speed: f64,
    /// Relaxation rate of the cell velocity towards the local flow velocity
    pub drag_gain: f64,
    /// Strength of the outward drift
    pub margin_gain: f64,
    /// Strength of the random jitter
    pub jitter_gain: f64,
    /// Lower limit of the mass which divides the jitter
    pub min_mass_floor: f64,
    /// Offset $o$ of the pulse modulation
    pub pulse_offset: f64,
    /// Amplitude $a$ of the pulse modulation
    pub pulse_amplitude: f64,
}

impl Default for FlowField {
    fn default() -> Self {
        Self {
            base_speed: 3.2,
            drag_gain: 0.08,
            margin_gain: 0.08,
            jitter_gain: 0.04,
            min_mass_floor: 0.4,
            pulse_offset: 0.55,
            pulse_amplitude: 0.45,
        }
    }
}

impl FlowField {
    /// Centerline speed at the given elapsed time in seconds.
    pub fn peak_speed(&self, conditions: &FlowConditions, time: f64) -> f64 {
        let umax = self.base_speed * conditions.speed_scale;
        if conditions.pulsatile {
            let phase = core::f64::consts::TAU * conditions.bpm / 60.0 * time;
            umax * (self.pulse_offset + self.pulse_amplitude * phase.sin())
        } else {
            umax
        }
    }

    /// Flow velocity at the given position.
    pub fn flow_velocity(&self, vessel: &Vessel, pos: &Vector2<f64>, peak_speed: f64) -> Vector2<f64> {
        let eta = vessel.normalized_offset(pos.y);
        let profile = (1.0 - eta * eta).max(0.0);
        Vector2::from([peak_speed * profile, 0.0])
    }

    /// Force relaxing the velocity of a cell towards the local flow.
    pub fn drag(&self, flow_velocity: &Vector2<f64>, velocity: &Vector2<f64>) -> Vector2<f64> {
        (flow_velocity - velocity) * self.drag_gain
    }

    /// Vertical drift pushing cells away from the centerline.
    /// Cells exactly on the centerline experience no drift.
    pub fn margination(
        &self,
        vessel: &Vessel,
        pos: &Vector2<f64>,
        margin_bias: f64,
        conditions: &FlowConditions,
    ) -> Vector2<f64> {
        let dy = pos.y - vessel.y0();
        let side = if dy > 0.0 {
            1.0
        } else if dy < 0.0 {
            -1.0
        } else {
            0.0
        };
        Vector2::from([
            0.0,
            side * conditions.margin_strength * margin_bias * self.margin_gain,
        ])
    }

    /// Random force in a uniformly drawn direction.
    /// Heavier cells experience less jitter.
    pub fn jitter<R: Rng>(&self, rng: &mut R, mass: f64, conditions: &FlowConditions) -> Vector2<f64> {
        crate::random_direction(rng) * conditions.brown_strength * self.jitter_gain
            / mass.max(self.min_mass_floor)
    }

    /// Shear input of the steering policy.
    pub fn shear(flow_velocity: &Vector2<f64>, velocity: &Vector2<f64>) -> f64 {
        (velocity.x - flow_velocity.x).abs() * 0.5
    }
}

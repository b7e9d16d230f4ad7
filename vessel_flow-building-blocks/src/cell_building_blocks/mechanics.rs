use vessel_flow_concepts::Mechanics;

use nalgebra::Vector2;
use rand::Rng;

use serde::{Deserialize, Serialize};

/// Velocity retained after each integration step.
pub const DEFAULT_DAMPING: f64 = 0.995;
/// Upper limit on the magnitude of the velocity after integration.
pub const DEFAULT_MAX_SPEED: f64 = 8.0;

/// Point mass moving in the plane with per-tick damping and a speed limit.
///
/// Forces are collected over the course of one tick and turned into an acceleration by
/// dividing through the mass.
/// One call to [Mechanics::integrate] then performs
/// \\begin{align}
///     \vec{v} &\leftarrow \text{limit}\left(\gamma\left(\vec{v} + \vec{a}\right), v_\text{max}\right)\\\\
///     \vec{x} &\leftarrow \vec{x} + \vec{v}
/// \\end{align}
/// and resets the acceleration $\vec{a}$ to zero.
///
/// # Parameters
/// | Symbol | Parameter | Description |
/// | --- | --- | --- |
/// | $\vec{x}$ | `pos` | Position of the point mass. |
/// | $\vec{v}$ | `vel` | Velocity in units of distance per tick. |
/// | $m$ | `mass` | Mass used to scale incoming forces. |
/// | $\gamma$ | `damping` | Fraction of the velocity which is retained every tick. |
/// | $v_\text{max}$ | `max_speed` | Largest allowed speed. |
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct DampedPointMass {
    /// Current position $\vec{x}$
    pub pos: Vector2<f64>,
    /// Current velocity $\vec{v}$
    pub vel: Vector2<f64>,
    /// Mass $m$ of the object. Must be strictly positive.
    pub mass: f64,
    /// Damping $\gamma$
    pub damping: f64,
    /// Speed limit $v_\text{max}$
    pub max_speed: f64,
    #[serde(skip, default = "Vector2::zeros")]
    acceleration: Vector2<f64>,
}

impl DampedPointMass {
    /// Constructs a new point mass with [DEFAULT_DAMPING] and [DEFAULT_MAX_SPEED].
    pub fn new(pos: Vector2<f64>, vel: Vector2<f64>, mass: f64) -> Self {
        Self {
            pos,
            vel,
            mass,
            damping: DEFAULT_DAMPING,
            max_speed: DEFAULT_MAX_SPEED,
            acceleration: Vector2::zeros(),
        }
    }

    /// Acceleration accumulated since the last integration step.
    pub fn acceleration(&self) -> Vector2<f64> {
        self.acceleration
    }

    /// Discards all forces applied since the last integration step.
    pub fn clear_acceleration(&mut self) {
        self.acceleration = Vector2::zeros();
    }
}

impl Mechanics<Vector2<f64>, Vector2<f64>, Vector2<f64>> for DampedPointMass {
    fn pos(&self) -> Vector2<f64> {
        self.pos
    }

    fn velocity(&self) -> Vector2<f64> {
        self.vel
    }

    fn set_pos(&mut self, pos: &Vector2<f64>) {
        self.pos = *pos;
    }

    fn set_velocity(&mut self, velocity: &Vector2<f64>) {
        self.vel = *velocity;
    }

    fn mass(&self) -> f64 {
        self.mass
    }

    fn apply_force(&mut self, force: &Vector2<f64>) {
        self.acceleration += force / self.mass;
    }

    fn integrate(&mut self) {
        self.vel += self.acceleration;
        self.vel *= self.damping;
        let speed = self.vel.norm();
        if speed > self.max_speed {
            self.vel *= self.max_speed / speed;
        }
        self.pos += self.vel;
        self.acceleration = Vector2::zeros();
    }
}

/// Draws a direction uniformly distributed on the unit circle.
pub fn random_direction<R: Rng>(rng: &mut R) -> Vector2<f64> {
    let angle = rng.gen_range(0.0..core::f64::consts::TAU);
    Vector2::from([angle.cos(), angle.sin()])
}

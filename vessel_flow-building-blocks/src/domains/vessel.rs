use vessel_flow_concepts::{Boundary, BoundaryError, SamplePosition};

use nalgebra::Vector2;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Fraction of the vertical velocity which is kept when a cell is reflected at the wall.
pub const WALL_RESTITUTION: f64 = 0.65;

/// Dimensions of the drawing area from which the [Vessel] is derived.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Viewport {
    /// Total width
    pub width: f64,
    /// Total height
    pub height: f64,
    /// Horizontal space left free on both sides of the vessel
    pub padding: f64,
    /// Radius of the vessel in units of the height
    pub max_radius_fraction: f64,
    /// Absolute upper limit on the radius
    pub max_radius: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
            padding: 80.0,
            max_radius_fraction: 0.32,
            max_radius: 220.0,
        }
    }
}

/// Horizontal tube spanning from `x0` to `x1` around the centerline `y0`.
///
/// Cells are confined vertically by the walls at `y0 ± radius` and wrap around horizontally.
/// Once constructed, a vessel can not be changed.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct Vessel {
    x0: f64,
    x1: f64,
    y0: f64,
    radius: f64,
}

impl Vessel {
    /// Constructs a new vessel and checks that `radius > 0` and `x1 > x0`.
    pub fn new(x0: f64, x1: f64, y0: f64, radius: f64) -> Result<Self, BoundaryError> {
        if !(x0.is_finite() && x1.is_finite() && y0.is_finite() && radius.is_finite()) {
            return Err(BoundaryError(format!(
                "vessel bounds must be finite but got x0={x0} x1={x1} y0={y0} radius={radius}"
            )));
        }
        if radius <= 0.0 {
            return Err(BoundaryError(format!(
                "vessel radius must be positive but is {radius}"
            )));
        }
        if x1 <= x0 {
            return Err(BoundaryError(format!(
                "vessel end x1={x1} must be larger than its start x0={x0}"
            )));
        }
        Ok(Self { x0, x1, y0, radius })
    }

    /// Fits the vessel into the given [Viewport].
    pub fn from_viewport(viewport: &Viewport) -> Result<Self, BoundaryError> {
        let Viewport {
            width,
            height,
            padding,
            max_radius_fraction,
            max_radius,
        } = viewport.clone();
        if !(width > 0.0 && height > 0.0 && padding >= 0.0) {
            return Err(BoundaryError(format!(
                "viewport of size {width}x{height} with padding {padding} is not usable"
            )));
        }
        let radius = (height * max_radius_fraction).min(max_radius);
        Self::new(padding, width - padding, height / 2.0, radius)
    }

    /// Left end of the vessel
    pub fn x0(&self) -> f64 {
        self.x0
    }

    /// Right end of the vessel
    pub fn x1(&self) -> f64 {
        self.x1
    }

    /// Vertical position of the centerline
    pub fn y0(&self) -> f64 {
        self.y0
    }

    /// Radius of the vessel
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Signed vertical offset of `y` from the centerline in units of the radius.
    pub fn normalized_offset(&self, y: f64) -> f64 {
        (y - self.y0) / self.radius
    }

    /// Distance from the centerline in units of the radius.
    /// Zero on the centerline and one at the wall.
    pub fn wall_distance(&self, y: f64) -> f64 {
        self.normalized_offset(y).abs()
    }

    /// Largest vertical offset at which a cell with the given radius still fits.
    fn clearance(&self, radius: f64) -> f64 {
        (self.radius - radius).max(0.0)
    }

    /// Draws a vertical position at which a cell with the given radius fits.
    pub fn sample_height<R: Rng>(&self, rng: &mut R, radius: f64) -> f64 {
        let clearance = self.clearance(radius);
        self.y0 + rng.gen_range(-clearance..=clearance)
    }

    /// Clamps the cell to the wall and reverses and damps its vertical velocity.
    pub fn reflect_at_wall(&self, radius: f64, pos: &mut Vector2<f64>, vel: &mut Vector2<f64>) {
        let clearance = self.clearance(radius);
        let dy = pos.y - self.y0;
        if dy.abs() > clearance {
            pos.y = self.y0 + dy.signum() * clearance;
            vel.y *= -WALL_RESTITUTION;
        }
    }

    /// Cells leaving the vessel on one side re-enter on the other side at a random height.
    pub fn wrap_around<R: Rng>(&self, rng: &mut R, radius: f64, pos: &mut Vector2<f64>) {
        if pos.x > self.x1 + radius {
            pos.x = self.x0 - radius;
            pos.y = self.sample_height(rng, radius);
        } else if pos.x < self.x0 - radius {
            pos.x = self.x1 + radius;
            pos.y = self.sample_height(rng, radius);
        }
    }
}

impl Boundary<Vector2<f64>, Vector2<f64>> for Vessel {
    fn apply_boundary(
        &self,
        rng: &mut rand_chacha::ChaCha8Rng,
        radius: f64,
        pos: &mut Vector2<f64>,
        vel: &mut Vector2<f64>,
    ) -> Result<(), BoundaryError> {
        if !(pos.x.is_finite() && pos.y.is_finite()) {
            return Err(BoundaryError(format!(
                "position {pos:?} is not finite and can not be reconciled with the vessel"
            )));
        }
        self.reflect_at_wall(radius, pos, vel);
        self.wrap_around(rng, radius, pos);
        Ok(())
    }
}

impl SamplePosition<Vector2<f64>> for Vessel {
    fn sample_position(&self, rng: &mut rand_chacha::ChaCha8Rng, radius: f64) -> Vector2<f64> {
        let x = rng.gen_range(self.x0..self.x1);
        Vector2::from([x, self.sample_height(rng, radius)])
    }
}

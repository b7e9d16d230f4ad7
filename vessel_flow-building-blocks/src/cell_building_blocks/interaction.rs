use vessel_flow_concepts::{CalcError, Interaction, InteractionInformation};

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

/// Fraction of the relative overlap which is converted into a positional push.
pub const DEFAULT_PUSH_GAIN: f64 = 0.9;
/// Fraction of the push which is additionally transferred into the velocity.
pub const DEFAULT_VELOCITY_DEFLECTION: f64 = 0.2;

/// Soft disk repulsion which separates overlapping cells.
///
/// Two disks with radii $r_1$ and $r_2$ overlap if their distance $d$ satisfies
/// $0 < d < r_1 + r_2$.
/// The push acting on the first disk is then
/// \\begin{equation}
///     \vec{p} = \hat{z}\ \frac{r_1 + r_2 - d}{r_1 + r_2}\ s\ g
/// \\end{equation}
/// where $\hat{z}$ points from the second to the first disk, $s$ is the global collision
/// strength and $g$ the `push_gain`.
/// Coincident centers produce no push since no direction can be determined.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SoftRepulsion {
    /// Radius of the disk
    pub radius: f64,
    /// Gain $g$ of the positional push
    pub push_gain: f64,
    /// Fraction of the push which also changes the velocity
    pub velocity_deflection: f64,
}

impl SoftRepulsion {
    /// Construct the repulsion of a disk with the given radius and default gains.
    pub fn new(radius: f64) -> Self {
        Self {
            radius,
            push_gain: DEFAULT_PUSH_GAIN,
            velocity_deflection: DEFAULT_VELOCITY_DEFLECTION,
        }
    }
}

impl InteractionInformation<f64> for SoftRepulsion {
    fn get_interaction_information(&self) -> f64 {
        self.radius
    }
}

impl Interaction<Vector2<f64>, f64> for SoftRepulsion {
    fn calculate_push_between(
        &self,
        own_pos: &Vector2<f64>,
        ext_pos: &Vector2<f64>,
        ext_radius: &f64,
        strength: f64,
    ) -> Result<Option<Vector2<f64>>, CalcError> {
        let z = own_pos - ext_pos;
        let dist = z.norm();
        let min_dist = self.radius + ext_radius;
        if !dist.is_finite() {
            return Err(CalcError(format!(
                "distance between {own_pos:?} and {ext_pos:?} is not finite"
            )));
        }
        if dist <= 0.0 || dist >= min_dist {
            return Ok(None);
        }
        let overlap = (min_dist - dist) / min_dist;
        Ok(Some(z / dist * overlap * strength * self.push_gain))
    }
}

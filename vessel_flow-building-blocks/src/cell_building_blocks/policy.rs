use vessel_flow_concepts::DecisionPolicy;

use nalgebra::{Matrix2, Matrix2x3, Vector2, Vector3};
use serde::{Deserialize, Serialize};

/// Sensed quantities which are fed into a steering policy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PolicyInputs {
    /// Halved difference between the horizontal velocity of the cell and the local flow
    pub shear: f64,
    /// Normalized distance to the centerline
    pub wall_distance: f64,
    /// Number of nearby cells divided by a normalization constant
    pub density: f64,
}

impl PolicyInputs {
    /// Inputs as column vector in the order `[shear, wall_distance, density]`.
    pub fn as_vector(&self) -> Vector3<f64> {
        Vector3::from([self.shear, self.wall_distance, self.density])
    }
}

/// Fixed two-layer feed-forward network with three inputs, two hidden units and two outputs.
///
/// \\begin{equation}
///     \vec{f} = W_2 \tanh\left(W_1 \vec{u} + \vec{b}_1\right) + \vec{b}_2
/// \\end{equation}
///
/// The weights are not trained at runtime.
/// Since the hidden layer is bounded by $\pm 1$, so is the output (see
/// [FeedForwardPolicy::output_bound]).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedForwardPolicy {
    /// Weights $W_1$ of the hidden layer
    pub hidden_weights: Matrix2x3<f64>,
    /// Bias $\vec{b}_1$ of the hidden layer
    pub hidden_bias: Vector2<f64>,
    /// Weights $W_2$ of the output layer
    pub output_weights: Matrix2<f64>,
    /// Bias $\vec{b}_2$ of the output layer
    pub output_bias: Vector2<f64>,
}

impl Default for FeedForwardPolicy {
    fn default() -> Self {
        Self {
            hidden_weights: Matrix2x3::new(0.8, -0.6, 0.3, -0.4, 0.9, 0.2),
            hidden_bias: Vector2::from([0.1, -0.1]),
            output_weights: Matrix2::new(0.6, -0.7, 0.3, 0.4),
            output_bias: Vector2::zeros(),
        }
    }
}

impl FeedForwardPolicy {
    /// Largest possible magnitude of any output of this policy.
    pub fn output_bound(&self) -> f64 {
        (0..2)
            .map(|i| {
                let row: f64 = self.output_weights.row(i).iter().map(|w| w.abs()).sum();
                (row + self.output_bias[i].abs()).powi(2)
            })
            .sum::<f64>()
            .sqrt()
    }
}

impl DecisionPolicy<PolicyInputs, Vector2<f64>> for FeedForwardPolicy {
    fn decide(&self, inputs: &PolicyInputs) -> Vector2<f64> {
        let hidden = (self.hidden_weights * inputs.as_vector() + self.hidden_bias).map(f64::tanh);
        self.output_weights * hidden + self.output_bias
    }
}

/// Determines how the inputs of the steering policy are gathered and how strongly its
/// output acts on the cell.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyParameters {
    /// Radius in which neighbors are counted for the density input
    pub density_radius: f64,
    /// Neighbor count which corresponds to a density of one
    pub density_normalizer: f64,
    /// Factor by which the policy output is multiplied before being applied as force
    pub gain: f64,
    /// The network which maps inputs to a steering force
    pub network: FeedForwardPolicy,
}

impl Default for PolicyParameters {
    fn default() -> Self {
        Self {
            density_radius: 35.0,
            density_normalizer: 10.0,
            gain: 0.12,
            network: FeedForwardPolicy::default(),
        }
    }
}

impl PolicyParameters {
    /// Evaluates the network and scales its output by the gain.
    pub fn steering_force(&self, inputs: &PolicyInputs) -> Vector2<f64> {
        self.network.decide(inputs) * self.gain
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::{Rng, SeedableRng};

    #[test]
    fn zero_inputs() {
        let policy = FeedForwardPolicy::default();
        let out = policy.decide(&PolicyInputs::default());
        let h = [0.1f64.tanh(), (-0.1f64).tanh()];
        approx::assert_abs_diff_eq!(out.x, 0.6 * h[0] - 0.7 * h[1], epsilon = 1e-12);
        approx::assert_abs_diff_eq!(out.y, 0.3 * h[0] + 0.4 * h[1], epsilon = 1e-12);
    }

    #[test]
    fn evaluation_is_deterministic() {
        let policy = FeedForwardPolicy::default();
        let inputs = PolicyInputs {
            shear: 0.7,
            wall_distance: 0.4,
            density: 1.3,
        };
        assert_eq!(policy.decide(&inputs), policy.decide(&inputs));
    }

    #[test]
    fn output_is_bounded() {
        let policy = FeedForwardPolicy::default();
        let bound = policy.output_bound();
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(12);
        for _ in 0..1_000 {
            let inputs = PolicyInputs {
                shear: rng.gen_range(-1e3..1e3),
                wall_distance: rng.gen_range(0.0..1.0),
                density: rng.gen_range(0.0..50.0),
            };
            assert!(policy.decide(&inputs).norm() <= bound);
        }
    }

    #[test]
    fn output_is_continuous() {
        let policy = FeedForwardPolicy::default();
        // Every input moves every output by at most |W2| |W1| per unit
        let lipschitz = policy.output_weights.norm() * policy.hidden_weights.norm();
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(5);
        for _ in 0..200 {
            let a = PolicyInputs {
                shear: rng.gen_range(0.0..3.0),
                wall_distance: rng.gen_range(0.0..1.0),
                density: rng.gen_range(0.0..3.0),
            };
            let mut b = a;
            b.density += 1e-6;
            let diff = (policy.decide(&a) - policy.decide(&b)).norm();
            assert!(diff <= lipschitz * 1e-6 + 1e-15);
        }
    }

    #[test]
    fn weights_can_be_injected() {
        let policy = FeedForwardPolicy {
            hidden_weights: Matrix2x3::zeros(),
            hidden_bias: Vector2::zeros(),
            output_weights: Matrix2::zeros(),
            output_bias: Vector2::from([1.0, -2.0]),
        };
        let inputs = PolicyInputs {
            shear: 3.0,
            wall_distance: 0.5,
            density: 0.1,
        };
        assert_eq!(policy.decide(&inputs), Vector2::from([1.0, -2.0]));
        let parameters = PolicyParameters {
            network: policy,
            ..Default::default()
        };
        approx::assert_abs_diff_eq!(
            parameters.steering_force(&inputs),
            Vector2::from([0.12, -0.24])
        );
    }
}

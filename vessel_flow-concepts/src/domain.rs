use crate::errors::BoundaryError;

/// Confines agents to the physical simulation domain.
///
/// Boundary conditions are applied after every integration step.
/// Implementors may reflect, clamp or re-insert agents at a different location.
pub trait Boundary<Pos, Vel> {
    /// Reconcile position and velocity of an agent with the given radius against the domain.
    fn apply_boundary(
        &self,
        rng: &mut rand_chacha::ChaCha8Rng,
        radius: f64,
        pos: &mut Pos,
        vel: &mut Vel,
    ) -> Result<(), BoundaryError>;
}

/// Draws new positions inside the domain.
pub trait SamplePosition<Pos> {
    /// Returns a position at which an agent of the given radius fits into the domain.
    fn sample_position(&self, rng: &mut rand_chacha::ChaCha8Rng, radius: f64) -> Pos;
}

/// A pure mapping from sensed inputs to a steering output.
///
/// Policies do not hold mutable state and must return the same output for identical inputs.
/// This allows to exchange them freely and to test them independently of the physics loop.
pub trait DecisionPolicy<Inp, Out> {
    /// Evaluates the policy for the given inputs.
    fn decide(&self, inputs: &Inp) -> Out;
}

use crate::errors::CalcError;

/// Exposes information to other cells for calculating interactions.
pub trait InteractionInformation<Inf> {
    /// Get additional information of cellular properties (ie. radius and mass of the agent).
    fn get_interaction_information(&self) -> Inf;
}

/// Overlap resolution between two cellular agents.
///
/// Unlike force-based interactions, the return value is applied directly as a displacement.
/// Implementors return `None` if the two agents do not overlap.
pub trait Interaction<Pos, Inf>: InteractionInformation<Inf> {
    /// Calculates the push which separates the current agent from the external one.
    /// The push acts in the direction of the current agent and has to be applied with
    /// opposite sign on the external agent.
    fn calculate_push_between(
        &self,
        own_pos: &Pos,
        ext_pos: &Pos,
        ext_info: &Inf,
        strength: f64,
    ) -> Result<Option<Pos>, CalcError>;
}

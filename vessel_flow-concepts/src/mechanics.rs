/// Describes the position of a cell-agent and how forces acting on it are turned into motion.
///
/// Forces of one tick are collected by repeated calls to [Mechanics::apply_force].
/// Afterwards [Mechanics::integrate] has to be called exactly once which consumes the
/// accumulated force.
pub trait Mechanics<Pos, Vel, For> {
    /// Gets the cells current position.
    fn pos(&self) -> Pos;
    /// Gets the cells current velocity.
    fn velocity(&self) -> Vel;
    /// Sets the cells current position.
    fn set_pos(&mut self, pos: &Pos);
    /// Sets the cells current velocity.
    fn set_velocity(&mut self, velocity: &Vel);
    /// Mass of the object. Must be strictly positive.
    fn mass(&self) -> f64;

    /// Adds the force scaled by the inverse mass to the accumulated force.
    fn apply_force(&mut self, force: &For);

    /// Advances velocity and position by one tick and resets the accumulated force.
    fn integrate(&mut self);
}

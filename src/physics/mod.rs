//! Rigid-body simulation seam
//!
//! The frame driver only talks to [`RigidBodySim`]: step the world, read the
//! ordered body list, add/remove bodies. Collisions come back from `step` as
//! a list instead of callbacks so they are handled synchronously, in order.

pub mod body;
pub mod world;

pub use body::RigidBody;
pub use world::BoxWorld;

/// A contact reported by a physics step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionEvent {
    /// Index of the body in [`RigidBodySim::bodies`] at the time of the step
    pub body: usize,
    /// Second body of a body-body contact; `None` when `body` hit the floor
    pub other: Option<usize>,
    /// Approach speed along the contact normal (units/s)
    pub impact_speed: f32,
}

pub trait RigidBodySim {
    /// Advance by `frame_dt` seconds in fixed `fixed_dt` increments, at most
    /// `max_substeps` of them.
    fn step(&mut self, fixed_dt: f32, frame_dt: f32, max_substeps: u32) -> Vec<CollisionEvent>;

    /// Bodies in insertion order
    fn bodies(&self) -> &[RigidBody];

    fn body_mut(&mut self, index: usize) -> Option<&mut RigidBody>;

    /// Append a body and return its index
    fn add_body(&mut self, body: RigidBody) -> usize;

    /// Remove a body; later bodies shift down by one
    fn remove_body(&mut self, index: usize) -> Option<RigidBody>;
}

//! Rigid body state as seen by the rest of the crate
//!
//! A plain mirror of one engine body. Shape, mass and material are read once
//! when the body is added; pose, velocities and the sleep flag are written
//! back to the engine before the next step whenever they are changed through
//! [`RigidBodySim::body_mut`](super::RigidBodySim::body_mut).

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RigidBody {
    pub position: Vec3,
    /// Unit quaternion
    pub orientation: Quat,
    pub velocity: Vec3,
    pub angular_velocity: Vec3,
    /// Half size of the box collider
    pub half_extents: Vec3,
    pub mass: f32,
    /// Bounciness (0 = none, 1 = perfectly elastic)
    pub restitution: f32,
    /// Coulomb friction coefficient
    pub friction: f32,
    /// Set once the body has come to rest; cleared by any push
    pub sleeping: bool,
}

impl RigidBody {
    pub fn new_box(half_extents: Vec3, mass: f32) -> Self {
        Self {
            position: Vec3::ZERO,
            orientation: Quat::IDENTITY,
            velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            half_extents,
            mass,
            restitution: 0.3,
            friction: 0.4,
            sleeping: false,
        }
    }

    pub fn at(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    /// Wake the body and give it a new motion state
    pub fn launch(&mut self, position: Vec3, velocity: Vec3, angular_velocity: Vec3) {
        self.position = position;
        self.velocity = velocity;
        self.angular_velocity = angular_velocity;
        self.sleeping = false;
    }
}

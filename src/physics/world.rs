//! Box world backed by rapier3d
//!
//! Oriented boxes over a static floor half-space. Frame time is fed through
//! an accumulator and stepped in fixed increments. After each substep the
//! active contact pairs are scanned and any pair closing faster than
//! [`IMPACT_EPSILON`] is reported.

use glam::{Quat, Vec3};
use rapier3d::na::{Quaternion, UnitQuaternion};
use rapier3d::prelude::{
    CCDSolver, ColliderBuilder, ColliderHandle, ColliderSet, DefaultBroadPhase, ImpulseJointSet,
    IntegrationParameters, IslandManager, MultibodyJointSet, NarrowPhase, PhysicsPipeline, Point,
    Real, RigidBodyBuilder, nalgebra, RigidBodyHandle, RigidBodySet, Vector, vector,
};

use super::{CollisionEvent, RigidBody, RigidBodySim};
use crate::consts::GRAVITY;

/// Approach speeds below this are resting contact, not impacts
const IMPACT_EPSILON: f32 = 0.5;
const FLOOR_RESTITUTION: f32 = 0.3;
const FLOOR_FRICTION: f32 = 0.4;

fn to_na(v: Vec3) -> Vector<Real> {
    vector![v.x, v.y, v.z]
}

fn from_na(v: &Vector<Real>) -> Vec3 {
    Vec3::new(v.x, v.y, v.z)
}

fn rotation_to_na(q: Quat) -> UnitQuaternion<Real> {
    UnitQuaternion::new_normalize(Quaternion::new(q.w, q.x, q.y, q.z))
}

fn rotation_from_na(q: &UnitQuaternion<Real>) -> Quat {
    let c = q.coords;
    Quat::from_xyzw(c.x, c.y, c.z, c.w)
}

/// Velocity of a body at a world point, taken before a substep
#[derive(Clone, Copy)]
struct Motion {
    linvel: Vector<Real>,
    angvel: Vector<Real>,
    center: Point<Real>,
}

impl Motion {
    fn at(&self, point: &Point<Real>) -> Vector<Real> {
        self.linvel + self.angvel.cross(&(point - self.center))
    }
}

pub struct BoxWorld {
    pub gravity: Vec3,
    /// Height of the static floor plane
    pub floor_y: f32,
    /// Fraction of linear velocity lost per second
    pub linear_damping: f32,
    /// Fraction of angular velocity lost per second
    pub angular_damping: f32,
    /// Engine handle of body `i`
    handles: Vec<RigidBodyHandle>,
    /// Mirror of body `i`, refreshed after every step
    bodies: Vec<RigidBody>,
    /// Mirrors changed through `body_mut` since the last step
    dirty: Vec<bool>,
    accumulator: f32,
    floor: ColliderHandle,

    pipeline: PhysicsPipeline,
    islands: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    rigid_bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
}

impl Default for BoxWorld {
    fn default() -> Self {
        Self::new(Vec3::new(0.0, GRAVITY, 0.0))
    }
}

impl BoxWorld {
    pub fn new(gravity: Vec3) -> Self {
        let floor_y = 0.0;
        let mut colliders = ColliderSet::new();
        let floor = colliders.insert(
            ColliderBuilder::halfspace(Vector::y_axis())
                .translation(vector![0.0, floor_y, 0.0])
                .restitution(FLOOR_RESTITUTION)
                .friction(FLOOR_FRICTION)
                .build(),
        );

        Self {
            gravity,
            floor_y,
            linear_damping: 0.01,
            angular_damping: 0.3,
            handles: Vec::new(),
            bodies: Vec::new(),
            dirty: Vec::new(),
            accumulator: 0.0,
            floor,
            pipeline: PhysicsPipeline::new(),
            islands: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            rigid_bodies: RigidBodySet::new(),
            colliders,
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
        }
    }

    fn index_of(&self, handle: RigidBodyHandle) -> Option<usize> {
        self.handles.iter().position(|&h| h == handle)
    }

    /// Body index behind a collider; `None` for the floor
    fn body_of(&self, collider: ColliderHandle) -> Option<usize> {
        if collider == self.floor {
            return None;
        }
        let parent = self.colliders.get(collider)?.parent()?;
        self.index_of(parent)
    }

    /// Write mirrors changed through `body_mut` into the engine
    fn push_dirty(&mut self) {
        for (i, dirty) in self.dirty.iter_mut().enumerate() {
            if !std::mem::take(dirty) {
                continue;
            }
            let mirror = &self.bodies[i];
            let Some(rb) = self.rigid_bodies.get_mut(self.handles[i]) else {
                continue;
            };
            rb.set_translation(to_na(mirror.position), false);
            rb.set_rotation(rotation_to_na(mirror.orientation), false);
            rb.set_linvel(to_na(mirror.velocity), false);
            rb.set_angvel(to_na(mirror.angular_velocity), false);
            if mirror.sleeping {
                rb.sleep();
            } else {
                rb.wake_up(true);
            }
        }
    }

    /// Refresh every mirror from the engine
    fn pull_all(&mut self) {
        for (mirror, handle) in self.bodies.iter_mut().zip(&self.handles) {
            let Some(rb) = self.rigid_bodies.get(*handle) else {
                continue;
            };
            mirror.position = from_na(rb.translation());
            mirror.orientation = rotation_from_na(rb.rotation());
            mirror.velocity = from_na(rb.linvel());
            mirror.angular_velocity = from_na(rb.angvel());
            mirror.sleeping = rb.is_sleeping();
        }
    }

    fn motions(&self) -> Vec<Option<Motion>> {
        self.handles
            .iter()
            .map(|&h| {
                self.rigid_bodies.get(h).map(|rb| Motion {
                    linvel: *rb.linvel(),
                    angvel: *rb.angvel(),
                    center: *rb.center_of_mass(),
                })
            })
            .collect()
    }

    /// One fixed substep, then report contacts closing faster than the epsilon
    fn substep(&mut self, dt: f32, events: &mut Vec<CollisionEvent>) {
        let before = self.motions();
        let params = IntegrationParameters {
            dt,
            ..Default::default()
        };
        self.pipeline.step(
            &to_na(self.gravity),
            &params,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            None,
            &(),
            &(),
        );

        // Contacts were found from pre-step poses, so pre-step velocities
        // give the closing speed
        for pair in self.narrow_phase.contact_pairs() {
            if !pair.has_any_active_contact {
                continue;
            }
            let first = self.body_of(pair.collider1);
            let second = self.body_of(pair.collider2);
            let motion = |index: Option<usize>, point: &Point<Real>| {
                index
                    .and_then(|i| before[i])
                    .map_or(Vector::<Real>::zeros(), |m| m.at(point))
            };

            let mut impact = 0.0f32;
            for manifold in &pair.manifolds {
                let normal = manifold.data.normal;
                for contact in &manifold.data.solver_contacts {
                    let relative = motion(second, &contact.point) - motion(first, &contact.point);
                    impact = impact.max(-relative.dot(&normal));
                }
            }
            if impact <= IMPACT_EPSILON {
                continue;
            }
            let (body, other) = match (first, second) {
                (Some(a), b) => (a, b),
                (None, Some(b)) => (b, None),
                (None, None) => continue,
            };
            events.push(CollisionEvent {
                body,
                other,
                impact_speed: impact,
            });
        }
    }
}

impl RigidBodySim for BoxWorld {
    fn step(&mut self, fixed_dt: f32, frame_dt: f32, max_substeps: u32) -> Vec<CollisionEvent> {
        let mut events = Vec::new();
        if fixed_dt <= 0.0 {
            return events;
        }
        self.push_dirty();

        self.accumulator += frame_dt.max(0.0);
        let mut substeps = 0;
        // Tolerance keeps a frame of exactly `fixed_dt` from slipping a step
        while self.accumulator + 1e-6 >= fixed_dt && substeps < max_substeps {
            self.substep(fixed_dt, &mut events);
            self.accumulator -= fixed_dt;
            substeps += 1;
        }
        if self.accumulator >= fixed_dt {
            // Out of substeps: drop the backlog rather than spiral
            self.accumulator = 0.0;
        }
        self.accumulator = self.accumulator.max(0.0);

        if substeps > 0 {
            self.pull_all();
        }
        events
    }

    fn bodies(&self) -> &[RigidBody] {
        &self.bodies
    }

    fn body_mut(&mut self, index: usize) -> Option<&mut RigidBody> {
        let body = self.bodies.get_mut(index)?;
        self.dirty[index] = true;
        Some(body)
    }

    fn add_body(&mut self, body: RigidBody) -> usize {
        let mut builder = RigidBodyBuilder::dynamic()
            .translation(to_na(body.position))
            .linvel(to_na(body.velocity))
            .angvel(to_na(body.angular_velocity))
            .linear_damping(self.linear_damping)
            .angular_damping(self.angular_damping)
            .ccd_enabled(true);
        if body.sleeping {
            builder = builder.sleeping(true);
        }
        let mut rb = builder.build();
        rb.set_rotation(rotation_to_na(body.orientation), false);
        let handle = self.rigid_bodies.insert(rb);

        let h = body.half_extents;
        let collider = ColliderBuilder::cuboid(h.x, h.y, h.z)
            .mass(body.mass)
            .restitution(body.restitution)
            .friction(body.friction)
            .build();
        self.colliders
            .insert_with_parent(collider, handle, &mut self.rigid_bodies);

        self.handles.push(handle);
        self.bodies.push(body);
        self.dirty.push(false);
        self.bodies.len() - 1
    }

    fn remove_body(&mut self, index: usize) -> Option<RigidBody> {
        if index >= self.bodies.len() {
            return None;
        }
        let handle = self.handles.remove(index);
        self.rigid_bodies.remove(
            handle,
            &mut self.islands,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            true,
        );
        self.dirty.remove(index);
        Some(self.bodies.remove(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{PHYSICS_DT, PHYSICS_MAX_SUBSTEPS};

    fn stick() -> RigidBody {
        RigidBody::new_box(Vec3::new(0.4, 0.15, 2.0), 1.0)
    }

    fn run(world: &mut BoxWorld, frames: u32) -> Vec<CollisionEvent> {
        let mut events = Vec::new();
        for _ in 0..frames {
            events.extend(world.step(PHYSICS_DT, PHYSICS_DT, PHYSICS_MAX_SUBSTEPS));
        }
        events
    }

    #[test]
    fn test_step_runs_one_substep_per_fixed_frame() {
        let mut world = BoxWorld::default();
        world.add_body(stick().at(Vec3::new(0.0, 100.0, 0.0)));

        world.step(PHYSICS_DT, PHYSICS_DT, PHYSICS_MAX_SUBSTEPS);
        let after_one = world.bodies()[0].velocity.y;
        assert!((after_one - GRAVITY * PHYSICS_DT).abs() < 0.01);
    }

    #[test]
    fn test_step_caps_substeps() {
        let mut world = BoxWorld::default();
        world.add_body(stick().at(Vec3::new(0.0, 1000.0, 0.0)));

        // One second of backlog only advances three substeps
        world.step(PHYSICS_DT, 1.0, PHYSICS_MAX_SUBSTEPS);
        let v = world.bodies()[0].velocity.y;
        assert!((v - GRAVITY * PHYSICS_DT * 3.0).abs() < 0.05);

        // The backlog was dropped, not carried into the next frame
        world.step(PHYSICS_DT, 0.0, PHYSICS_MAX_SUBSTEPS);
        let v2 = world.bodies()[0].velocity.y;
        assert!((v2 - v).abs() < 1e-6);
    }

    #[test]
    fn test_dropped_piece_lands_and_rests() {
        let mut world = BoxWorld::default();
        let mut body = stick().at(Vec3::new(0.0, 12.0, 0.0));
        body.angular_velocity = Vec3::new(1.0, 0.5, 2.0);
        world.add_body(body);

        let impacts = run(&mut world, 900);

        let body = &world.bodies()[0];
        assert!(body.position.y > 0.1 && body.position.y < 0.5, "rests at {}", body.position.y);
        assert!(body.velocity.length() < 0.5);

        // Falling 12 units hits the floor well above the sound threshold
        assert!(impacts.iter().any(|e| e.impact_speed > 3.0));
        assert!(impacts.iter().all(|e| e.body == 0 && e.other.is_none()));
    }

    #[test]
    fn test_stacked_pieces_do_not_interpenetrate() {
        let mut world = BoxWorld::default();
        world.add_body(stick().at(Vec3::new(0.0, 2.0, 0.0)));
        world.add_body(stick().at(Vec3::new(0.0, 6.0, 0.0)));

        let events = run(&mut world, 600);

        let (a, b) = (world.bodies()[0].position, world.bodies()[1].position);
        assert!(a.distance(b) > 0.25, "a={a} b={b}");

        // The upper stick landing on the lower one is a piece-piece impact
        assert!(
            events
                .iter()
                .any(|e| e.other.is_some() && e.impact_speed > 3.0),
            "{events:?}"
        );
    }

    #[test]
    fn test_remove_body_shifts_indices() {
        let mut world = BoxWorld::default();
        world.add_body(stick().at(Vec3::new(1.0, 5.0, 0.0)));
        world.add_body(stick().at(Vec3::new(5.0, 5.0, 0.0)));
        world.add_body(stick().at(Vec3::new(9.0, 5.0, 0.0)));

        let removed = world.remove_body(1).unwrap();
        assert_eq!(removed.position.x, 5.0);
        assert_eq!(world.bodies().len(), 2);
        assert_eq!(world.bodies()[1].position.x, 9.0);
        assert!(world.remove_body(5).is_none());

        // The remaining engine bodies still map to their mirrors
        world.step(PHYSICS_DT, PHYSICS_DT, PHYSICS_MAX_SUBSTEPS);
        assert!((world.bodies()[0].position.x - 1.0).abs() < 1e-4);
        assert!((world.bodies()[1].position.x - 9.0).abs() < 1e-4);
    }

    #[test]
    fn test_body_mut_changes_reach_the_engine() {
        let mut world = BoxWorld::default();
        world.add_body(stick().at(Vec3::new(0.0, 3.0, 0.0)));

        if let Some(body) = world.body_mut(0) {
            body.launch(Vec3::new(4.0, 20.0, -2.0), Vec3::ZERO, Vec3::ZERO);
        }
        world.step(PHYSICS_DT, PHYSICS_DT, PHYSICS_MAX_SUBSTEPS);

        let body = &world.bodies()[0];
        assert!((body.position.x - 4.0).abs() < 1e-3);
        assert!((body.position.y - 20.0).abs() < 0.05);
    }

    #[test]
    fn test_sleeping_body_does_not_move() {
        let mut world = BoxWorld::default();
        let mut body = stick().at(Vec3::new(0.0, 3.0, 0.0));
        body.sleeping = true;
        world.add_body(body);

        run(&mut world, 10);
        assert_eq!(world.bodies()[0].position.y, 3.0);
    }
}

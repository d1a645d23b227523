//! Transient background objects: spaceships and shooting stars
//!
//! Spawned at random per frame, drift along a fixed direction, and expire
//! once their travel budget runs out or they come too close to the camera.

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::vector::{random_direction, random_point_outside};
use crate::settings::{SpawnConfig, TransientConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransientKind {
    Spaceship,
    ShootingStar,
}

/// A decorative object with finite lifetime and no gameplay effect
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransientObject {
    pub kind: TransientKind,
    pub position: Vec3,
    /// Unit length at creation; never renormalized
    pub direction: Vec3,
    /// Elapsed scene time at spawn (seconds)
    pub spawn_time: f32,
}

impl TransientObject {
    pub fn new(kind: TransientKind, position: Vec3, direction: Vec3, spawn_time: f32) -> Self {
        Self {
            kind,
            position,
            direction,
            spawn_time,
        }
    }

    pub fn age(&self, elapsed: f32) -> f32 {
        elapsed - self.spawn_time
    }

    pub fn advance(&mut self, speed: f32) {
        self.position += self.direction * speed;
    }
}

/// Why a transient object left its collection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpiryReason {
    TravelBudget,
    NearCamera,
}

/// Check whether an object must go this frame
pub fn expiry_reason(
    object: &TransientObject,
    params: &TransientConfig,
    elapsed: f32,
    camera_position: Vec3,
    camera_proximity: f32,
) -> Option<ExpiryReason> {
    if object.age(elapsed) > params.travel_budget {
        Some(ExpiryReason::TravelBudget)
    } else if object.position.distance(camera_position) < camera_proximity {
        Some(ExpiryReason::NearCamera)
    } else {
        None
    }
}

/// Roll the per-frame spawn. Returns the new object, if any.
///
/// Draws one sample for the spawn chance and, on success, one for the kind.
pub fn roll_spawn<R: Rng + ?Sized>(
    rng: &mut R,
    config: &SpawnConfig,
    elapsed: f32,
) -> Option<TransientObject> {
    if rng.random::<f32>() >= config.probability {
        return None;
    }
    let kind = if rng.random::<f32>() < config.shooting_star_threshold {
        TransientKind::ShootingStar
    } else {
        TransientKind::Spaceship
    };
    let position = random_point_outside(rng, config.min_radius, config.max_radius);
    let direction = random_direction(rng);
    Some(TransientObject::new(kind, position, direction, elapsed))
}

/// Sweep one collection: remove expired objects, advance the rest.
///
/// Walks from the back so a removal never shifts an element that has not
/// been visited yet. Survivors keep their relative order.
pub fn sweep(
    collection: &mut Vec<TransientObject>,
    params: &TransientConfig,
    elapsed: f32,
    camera_position: Vec3,
    camera_proximity: f32,
) -> Vec<(TransientObject, ExpiryReason)> {
    let mut expired = Vec::new();
    for i in (0..collection.len()).rev() {
        match expiry_reason(&collection[i], params, elapsed, camera_position, camera_proximity) {
            Some(reason) => expired.push((collection.remove(i), reason)),
            None => collection[i].advance(params.speed),
        }
    }
    expired
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn far_camera() -> Vec3 {
        Vec3::new(0.0, 0.0, 10_000.0)
    }

    fn shooting_star_params() -> TransientConfig {
        TransientConfig {
            travel_budget: SHOOTING_STAR_TRAVEL_BUDGET,
            speed: SHOOTING_STAR_SPEED,
        }
    }

    #[test]
    fn test_present_until_budget_exceeded() {
        let params = shooting_star_params();
        let mut stars = vec![TransientObject::new(
            TransientKind::ShootingStar,
            Vec3::new(50.0, 0.0, 0.0),
            Vec3::X,
            1.0,
        )];

        // Age 0.0 ..= 3.0 in half-second frames: still present
        let mut t = 1.0;
        while t <= 4.0 {
            let expired = sweep(&mut stars, &params, t, far_camera(), CAMERA_PROXIMITY);
            assert!(expired.is_empty(), "expired early at t={t}");
            assert_eq!(stars.len(), 1);
            t += 0.5;
        }

        // Age 3.5: first frame past the budget
        let expired = sweep(&mut stars, &params, 4.5, far_camera(), CAMERA_PROXIMITY);
        assert!(stars.is_empty());
        assert_eq!(expired.len(), 1);
        assert_eq!(expired[0].1, ExpiryReason::TravelBudget);
    }

    #[test]
    fn test_advances_by_speed_each_frame() {
        let params = TransientConfig {
            travel_budget: SPACESHIP_TRAVEL_BUDGET,
            speed: SPACESHIP_SPEED,
        };
        let mut ships = vec![TransientObject::new(
            TransientKind::Spaceship,
            Vec3::new(40.0, 0.0, 0.0),
            Vec3::Y,
            0.0,
        )];
        for frame in 0..5 {
            sweep(&mut ships, &params, frame as f32 * 0.1, far_camera(), CAMERA_PROXIMITY);
        }
        assert!((ships[0].position.y - 5.0 * SPACESHIP_SPEED).abs() < 1e-5);
        // Direction is left as spawned
        assert_eq!(ships[0].direction, Vec3::Y);
    }

    #[test]
    fn test_removed_when_reaching_camera() {
        let params = shooting_star_params();
        let camera = Vec3::new(0.0, 0.0, 0.0);
        let mut stars = vec![TransientObject::new(
            TransientKind::ShootingStar,
            Vec3::new(12.5, 0.0, 0.0),
            Vec3::NEG_X,
            0.0,
        )];

        // 12.5 -> 11.5 -> 10.5 -> 9.5 (removed on the next frame)
        for _ in 0..3 {
            assert!(sweep(&mut stars, &params, 0.0, camera, CAMERA_PROXIMITY).is_empty());
        }
        assert!((stars[0].position.x - 9.5).abs() < 1e-5);
        let expired = sweep(&mut stars, &params, 0.0, camera, CAMERA_PROXIMITY);
        assert_eq!(expired[0].1, ExpiryReason::NearCamera);
        assert!(stars.is_empty());
    }

    #[test]
    fn test_spawned_next_to_camera_goes_immediately() {
        let params = shooting_star_params();
        let camera = Vec3::new(30.0, 0.0, 0.0);
        let mut stars = vec![TransientObject::new(
            TransientKind::ShootingStar,
            Vec3::new(31.0, 0.0, 0.0),
            Vec3::X,
            5.0,
        )];
        let expired = sweep(&mut stars, &params, 5.0, camera, CAMERA_PROXIMITY);
        assert_eq!(expired.len(), 1);
    }

    proptest! {
        #[test]
        fn sweep_keeps_exactly_the_survivors(mask in proptest::collection::vec(any::<bool>(), 0..64)) {
            let params = TransientConfig { travel_budget: 10.0, speed: 1.0 };
            let mut collection: Vec<TransientObject> = mask
                .iter()
                .enumerate()
                .map(|(i, &expire)| {
                    let spawn_time = if expire { 0.0 } else { 45.0 };
                    TransientObject::new(
                        TransientKind::Spaceship,
                        Vec3::new(100.0 + i as f32, 0.0, 0.0),
                        Vec3::Y,
                        spawn_time,
                    )
                })
                .collect();

            let expired = sweep(&mut collection, &params, 50.0, far_camera(), CAMERA_PROXIMITY);

            let expected: Vec<f32> = mask
                .iter()
                .enumerate()
                .filter(|(_, expire)| !**expire)
                .map(|(i, _)| 100.0 + i as f32)
                .collect();
            let survivors: Vec<f32> = collection.iter().map(|o| o.position.x).collect();
            prop_assert_eq!(survivors, expected);
            prop_assert_eq!(expired.len(), mask.iter().filter(|e| **e).count());
            // Every survivor was visited exactly once
            prop_assert!(collection.iter().all(|o| o.position.y == 1.0));
        }
    }

    #[test]
    fn test_spawn_rate_within_expected_band() {
        let config = SpawnConfig::default();
        let mut rng = Pcg32::seed_from_u64(2024);
        let mut spawned = 0;
        let mut shooting_stars = 0;
        for frame in 0..100_000 {
            if let Some(object) = roll_spawn(&mut rng, &config, frame as f32 / 60.0) {
                spawned += 1;
                if object.kind == TransientKind::ShootingStar {
                    shooting_stars += 1;
                }
            }
        }
        assert!((1300..=1700).contains(&spawned), "spawned {spawned}");
        // Roughly a fifth are shooting stars
        let share = shooting_stars as f32 / spawned as f32;
        assert!((0.12..0.28).contains(&share), "shooting star share {share}");
    }

    #[test]
    fn test_spawned_object_is_well_formed() {
        let config = SpawnConfig {
            probability: 1.0,
            ..SpawnConfig::default()
        };
        let mut rng = Pcg32::seed_from_u64(9);
        for _ in 0..100 {
            let object = roll_spawn(&mut rng, &config, 3.25).unwrap();
            assert_eq!(object.spawn_time, 3.25);
            assert!((object.direction.length() - 1.0).abs() < 1e-5);
            let r = object.position.length();
            assert!(r >= config.min_radius - 1e-3 && r <= config.max_radius + 1e-3);
        }
    }

    #[test]
    fn test_zero_probability_never_spawns() {
        let config = SpawnConfig {
            probability: 0.0,
            ..SpawnConfig::default()
        };
        let mut rng = Pcg32::seed_from_u64(1);
        assert!((0..10_000).all(|_| roll_spawn(&mut rng, &config, 0.0).is_none()));
    }
}

//! Randomized points and directions

use glam::Vec3;
use rand::Rng;

/// Uniformly distributed unit vector.
///
/// Rejection-samples the unit ball so directions are not biased toward the
/// cube's corners.
pub fn random_direction<R: Rng + ?Sized>(rng: &mut R) -> Vec3 {
    loop {
        let v = Vec3::new(
            rng.random_range(-1.0..=1.0),
            rng.random_range(-1.0..=1.0),
            rng.random_range(-1.0..=1.0),
        );
        let len_sq = v.length_squared();
        if len_sq > 1e-4 && len_sq <= 1.0 {
            return v / len_sq.sqrt();
        }
    }
}

/// Random point whose distance from the origin lies in `[min_radius, max_radius]`.
///
/// A `max_radius` below `min_radius` pins the distance to `min_radius`.
pub fn random_point_outside<R: Rng + ?Sized>(rng: &mut R, min_radius: f32, max_radius: f32) -> Vec3 {
    let min_radius = min_radius.max(0.0);
    let max_radius = max_radius.max(min_radius);
    let distance = rng.random_range(min_radius..=max_radius);
    random_direction(rng) * distance
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    proptest! {
        #[test]
        fn direction_is_unit_length(seed in any::<u64>()) {
            let mut rng = Pcg32::seed_from_u64(seed);
            for _ in 0..64 {
                let d = random_direction(&mut rng);
                prop_assert!((d.length() - 1.0).abs() < 1e-5, "length {}", d.length());
            }
        }

        #[test]
        fn point_respects_radius_band(
            seed in any::<u64>(),
            min_radius in 0.0f32..200.0,
            extra in 0.0f32..200.0,
        ) {
            let mut rng = Pcg32::seed_from_u64(seed);
            let max_radius = min_radius + extra;
            for _ in 0..32 {
                let p = random_point_outside(&mut rng, min_radius, max_radius);
                // f32 scaling of a unit vector loses a few ulps
                let tolerance = 1e-4 * max_radius.max(1.0);
                prop_assert!(p.length() >= min_radius - tolerance);
                prop_assert!(p.length() <= max_radius + tolerance);
            }
        }
    }

    #[test]
    fn test_inverted_band_pins_to_min() {
        let mut rng = Pcg32::seed_from_u64(7);
        let p = random_point_outside(&mut rng, 30.0, 10.0);
        assert!((p.length() - 30.0).abs() < 1e-3);
    }

    #[test]
    fn test_directions_cover_both_hemispheres() {
        let mut rng = Pcg32::seed_from_u64(42);
        let dirs: Vec<Vec3> = (0..500).map(|_| random_direction(&mut rng)).collect();
        assert!(dirs.iter().any(|d| d.y > 0.5));
        assert!(dirs.iter().any(|d| d.y < -0.5));
        let mean = dirs.iter().copied().sum::<Vec3>() / dirs.len() as f32;
        assert!(mean.length() < 0.15);
    }
}

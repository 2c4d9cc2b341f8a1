//! Stateless scalar and 2D helpers used by the simulation loop.

use glam::Vec2;
use rand::Rng;

/// Uniform draw in `[low, high)`. `low == high` returns `low`.
#[inline]
pub fn random_between<R: Rng + ?Sized>(rng: &mut R, low: f32, high: f32) -> f32 {
    low + (high - low) * rng.gen::<f32>()
}

/// Clamp `v` into `[left, right]`. Unlike `f32::clamp` this never panics.
#[inline]
pub fn clamp(v: f32, left: f32, right: f32) -> f32 {
    if v > right {
        right
    } else if v < left {
        left
    } else {
        v
    }
}

/// Rotate `point` about `center` by `angle` radians (counter-clockwise)
#[inline]
pub fn rotate_about(point: Vec2, center: Vec2, angle: f32) -> Vec2 {
    center + Vec2::from_angle(angle).rotate(point - center)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_random_between_stays_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            let v = random_between(&mut rng, -3.0, 5.0);
            assert!((-3.0..=5.0).contains(&v));
        }
        assert_eq!(random_between(&mut rng, 2.0, 2.0), 2.0);
    }

    #[test]
    fn test_clamp() {
        assert_eq!(clamp(1.5, 0.0, 1.0), 1.0);
        assert_eq!(clamp(-0.5, 0.0, 1.0), 0.0);
        assert_eq!(clamp(0.25, 0.0, 1.0), 0.25);
    }

    #[test]
    fn test_rotate_about() {
        let center = Vec2::new(10.0, 10.0);

        let same = rotate_about(Vec2::new(12.0, 8.0), center, 0.0);
        assert_eq!(same, Vec2::new(12.0, 8.0));

        // Quarter turn maps +x onto +y.
        let turned = rotate_about(Vec2::new(12.0, 10.0), center, FRAC_PI_2);
        assert!((turned - Vec2::new(10.0, 12.0)).length() < 1e-5);
    }
}

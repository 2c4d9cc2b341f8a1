//! Randomized configuration values.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::math::random_between;

/// A base value plus a spread.
///
/// Draws are uniform in `[base, base + var]`, so `var` is the width of the
/// interval above `base` and `base + var` is the largest value a draw can
/// approach.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Var {
    pub base: f32,
    pub var: f32,
}

impl Var {
    pub const fn new(base: f32, var: f32) -> Self {
        Self { base, var }
    }

    /// Upper bound of the draw interval
    pub fn max(&self) -> f32 {
        self.base + self.var
    }

    pub fn random<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        random_between(rng, self.base, self.base + self.var)
    }
}

/// A start and an end value, both randomized.
///
/// Used for attributes that move linearly from one value to another over a
/// particle's life.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Range {
    pub start: Var,
    pub end: Var,
}

impl Range {
    pub const fn new(start: Var, end: Var) -> Self {
        Self { start, end }
    }

    /// Draw a start value and the per-second delta reaching the drawn end
    /// after `1 / inv_life` seconds.
    pub fn range_init<R: Rng + ?Sized>(&self, rng: &mut R, inv_life: f32) -> (f32, f32) {
        let start = self.start.random(rng);
        let end = self.end.random(rng);
        (start, (end - start) * inv_life)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_var_draws_above_base() {
        let mut rng = StdRng::seed_from_u64(1);
        let var = Var::new(6.0, 6.0);
        for _ in 0..500 {
            let v = var.random(&mut rng);
            assert!(v >= 6.0 && v <= 12.0, "draw {} outside [6, 12]", v);
        }
        assert_eq!(var.max(), 12.0);
    }

    #[test]
    fn test_zero_spread_is_exact() {
        let mut rng = StdRng::seed_from_u64(2);
        assert_eq!(Var::new(480.0, 0.0).random(&mut rng), 480.0);
    }

    #[test]
    fn test_range_init_reaches_end_over_life() {
        let mut rng = StdRng::seed_from_u64(3);
        let range = Range::new(Var::new(0.0, 0.0), Var::new(2.0, 0.0));

        let life = 4.0;
        let (start, delta) = range.range_init(&mut rng, 1.0 / life);

        assert_eq!(start, 0.0);
        assert!((delta - 0.5).abs() < 1e-6);
        assert!((start + delta * life - 2.0).abs() < 1e-5);
    }
}

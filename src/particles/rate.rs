//! Emission rate control.

/// Turns elapsed frame time into a whole number of particles to spawn.
///
/// The fractional part of the spawn budget carries over between frames, so
/// the long-run average matches `rate` regardless of frame-time jitter.
/// Emission stops for good once `duration` seconds have been consumed.
#[derive(Debug, Clone, Default)]
pub struct RateController {
    /// Unspent time, in seconds
    accumulated: f64,
    /// Seconds left before emission stops
    remaining: f64,
    /// Particles per second
    rate: f64,
}

impl RateController {
    pub fn new(duration: f32, rate: f32) -> Self {
        let mut controller = Self::default();
        controller.initialize(duration, rate);
        controller
    }

    /// Reset the controller for a fresh emission run
    pub fn initialize(&mut self, duration: f32, rate: f32) {
        self.accumulated = 0.0;
        self.remaining = f64::from(duration);
        self.rate = f64::from(rate);
    }

    /// Whether the emitter still has duration left
    pub fn is_active(&self) -> bool {
        self.remaining > 0.0
    }

    /// Seconds of emission left
    pub fn remaining(&self) -> f32 {
        self.remaining.max(0.0) as f32
    }

    pub fn rate(&self) -> f32 {
        self.rate as f32
    }

    /// Number of particles to spawn for a frame of `dt` seconds.
    ///
    /// Saturates at `usize::MAX` for absurd rates.
    pub fn compute_spawn_count(&mut self, dt: f32) -> usize {
        if !self.is_active() {
            return 0;
        }
        let dt = f64::from(dt.max(0.0));
        self.remaining -= dt;

        if self.rate <= 0.0 {
            return 0;
        }

        self.accumulated += dt;
        let count = (self.accumulated * self.rate).floor();
        if count > 0.0 {
            self.accumulated -= count / self.rate;
        }
        count as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_converges_with_constant_dt() {
        let mut rate = RateController::new(f32::MAX, 60.0);
        let dt = 1.0 / 144.0;
        let frames = 144 * 30;

        let total: usize = (0..frames).map(|_| rate.compute_spawn_count(dt)).sum();
        let expected = 60.0 * (dt as f64) * frames as f64;

        assert!(
            (total as f64 - expected).abs() <= 1.0,
            "spawned {}, expected about {}",
            total,
            expected
        );
    }

    #[test]
    fn test_rate_converges_with_jittery_dt() {
        let mut rate = RateController::new(f32::MAX, 37.5);
        let steps = [0.004_f32, 0.031, 0.016, 0.0, 0.052, 0.009];

        let mut elapsed = 0.0_f64;
        let mut total = 0;
        for i in 0..6000 {
            let dt = steps[i % steps.len()];
            elapsed += dt as f64;
            total += rate.compute_spawn_count(dt);
        }

        assert!((total as f64 - 37.5 * elapsed).abs() <= 1.0);
    }

    #[test]
    fn test_duration_cutoff_is_permanent() {
        let mut rate = RateController::new(1.0, 60.0);
        let dt = 1.0 / 60.0;

        let total: usize = (0..60).map(|_| rate.compute_spawn_count(dt)).sum();
        assert_eq!(total, 60);
        assert!(!rate.is_active());

        assert_eq!(rate.compute_spawn_count(dt), 0);
        assert_eq!(rate.compute_spawn_count(100.0), 0);
    }

    #[test]
    fn test_zero_dt_spawns_nothing() {
        let mut rate = RateController::new(5.0, 60.0);
        assert_eq!(rate.compute_spawn_count(0.0), 0);
        assert_eq!(rate.remaining(), 5.0);

        // Fraction carries over: two half-particle frames make one particle.
        let mut rate = RateController::new(5.0, 2.0);
        assert_eq!(rate.compute_spawn_count(0.25), 0);
        assert_eq!(rate.compute_spawn_count(0.25), 1);
    }

    #[test]
    fn test_large_dt_spawns_in_bulk() {
        let mut rate = RateController::new(f32::MAX, 10.0);
        assert_eq!(rate.compute_spawn_count(2.5), 25);
    }

    #[test]
    fn test_huge_rate_saturates_count() {
        let mut rate = RateController::new(f32::MAX, 1e30);
        assert_eq!(rate.compute_spawn_count(1.0), usize::MAX);
        assert_eq!(rate.compute_spawn_count(1.0), usize::MAX);
    }

    #[test]
    fn test_non_positive_rate_never_spawns() {
        let mut rate = RateController::new(f32::MAX, 0.0);
        assert_eq!(rate.compute_spawn_count(10.0), 0);
    }
}

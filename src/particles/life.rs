//! Particle aging.

use crate::particles::channel::{ChannelHandle, ChannelKey};
use crate::particles::pool::Pool;

/// A particle whose life has reached zero is dead, even at exactly zero.
#[inline]
pub fn is_dead(life: f32) -> bool {
    life <= 0.0
}

/// Ages particles by draining their life channel.
///
/// Removal is left to [`Pool::garbage_collect`].
#[derive(Debug, Clone, Copy)]
pub struct LifeController {
    life: ChannelHandle<f32>,
}

impl LifeController {
    /// # Panics
    ///
    /// Panics if the pool has no [`ChannelKey::Life`] channel.
    pub fn bind(pool: &Pool) -> Self {
        Self {
            life: pool.field(ChannelKey::Life),
        }
    }

    pub fn handle(&self) -> ChannelHandle<f32> {
        self.life
    }

    /// Subtract `dt` from the life of the first `n` live particles
    pub fn decay(&self, pool: &mut Pool, n: usize, dt: f32) {
        pool.subtract_in_place(n, self.life, dt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_life_is_dead() {
        assert!(is_dead(0.0));
        assert!(is_dead(-0.0));
        assert!(is_dead(-1.0));
        assert!(!is_dead(f32::EPSILON));
    }

    #[test]
    fn test_decay_then_collect() {
        let mut pool = Pool::new(4);
        pool.add_channel(&[ChannelKey::Life]);
        pool.initialize();
        let slots = pool.claim(3).unwrap();

        let life = LifeController::bind(&pool);
        pool.slice_mut(life.handle())[slots].copy_from_slice(&[0.5, 1.0, 2.0]);

        let live = pool.live();
        life.decay(&mut pool, live, 1.0);
        assert_eq!(pool.live_slice(life.handle()), &[-0.5, 0.0, 1.0]);
        // Decay alone never removes anything.
        assert_eq!(pool.live(), 3);

        pool.garbage_collect();
        assert_eq!(pool.live_slice(life.handle()), &[1.0]);
    }
}

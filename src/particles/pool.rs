//! Fixed-capacity particle pool.
//!
//! The pool owns the channel store and the live range `[0, live)`. New
//! particles are claimed at the end of the live range and dead particles are
//! removed by swapping the last live slot into their place, so the live range
//! stays contiguous without ever reallocating.

use std::ops::Range;

use crate::particles::channel::{ChannelElement, ChannelHandle, ChannelKey, ChannelStore};
use crate::particles::error::{ParticleError, ParticleResult};
use crate::particles::life::is_dead;

/// Struct-of-arrays particle storage with a live count
#[derive(Debug)]
pub struct Pool {
    store: ChannelStore,
    capacity: usize,
    live: usize,
    initialized: bool,
}

impl Pool {
    /// Create an empty pool. Channels must be added before [`Pool::initialize`].
    pub fn new(capacity: usize) -> Self {
        Self {
            store: ChannelStore::new(),
            capacity,
            live: 0,
            initialized: false,
        }
    }

    /// Register channels.
    ///
    /// # Panics
    ///
    /// Panics if the pool has already been initialized.
    pub fn add_channel(&mut self, keys: &[ChannelKey]) {
        if self.initialized {
            panic!("add_channel({:?}): {}", keys, ParticleError::AlreadyInitialized);
        }
        for key in keys {
            self.store.register(*key);
        }
    }

    /// Allocate storage for every registered channel and reset the live count
    pub fn try_initialize(&mut self) -> ParticleResult<()> {
        if self.initialized {
            return Err(ParticleError::AlreadyInitialized);
        }

        self.store.allocate(self.capacity);
        self.live = 0;
        self.initialized = true;

        log::debug!(
            "Particle pool initialized: capacity {}, channels {:?}",
            self.capacity,
            self.store.keys().collect::<Vec<_>>()
        );
        Ok(())
    }

    /// # Panics
    ///
    /// Panics if called twice.
    pub fn initialize(&mut self) {
        if let Err(e) = self.try_initialize() {
            panic!("{}", e);
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn live(&self) -> usize {
        self.live
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_registered(&self, key: ChannelKey) -> bool {
        self.store.is_registered(key)
    }

    /// Typed handle for a registered channel
    pub fn try_field<T: ChannelElement>(&self, key: ChannelKey) -> ParticleResult<ChannelHandle<T>> {
        self.store.handle(key)
    }

    /// # Panics
    ///
    /// Panics if `key` was never registered or holds a different element type.
    pub fn field<T: ChannelElement>(&self, key: ChannelKey) -> ChannelHandle<T> {
        match self.try_field(key) {
            Ok(handle) => handle,
            Err(e) => panic!("{}", e),
        }
    }

    /// Whole backing array of a channel, `capacity` long
    pub fn slice<T: ChannelElement>(&self, handle: ChannelHandle<T>) -> &[T] {
        self.assert_initialized();
        self.store.slice(handle)
    }

    pub fn slice_mut<T: ChannelElement>(&mut self, handle: ChannelHandle<T>) -> &mut [T] {
        self.assert_initialized();
        self.store.slice_mut(handle)
    }

    /// The `[0, live)` part of a channel
    pub fn live_slice<T: ChannelElement>(&self, handle: ChannelHandle<T>) -> &[T] {
        &self.slice(handle)[..self.live]
    }

    /// `value[i] -= delta` for the first `n` live slots
    pub fn subtract_in_place(&mut self, n: usize, handle: ChannelHandle<f32>, delta: f32) {
        self.assert_live_prefix(n);
        self.store.subtract_in_place(n, handle, delta);
    }

    /// `value[i] += rate[i] * dt` for the first `n` live slots
    pub fn integrate_in_place<T>(
        &mut self,
        n: usize,
        value: ChannelHandle<T>,
        rate: ChannelHandle<T>,
        dt: f32,
    ) where
        T: ChannelElement + std::ops::AddAssign + std::ops::Mul<f32, Output = T>,
    {
        self.assert_live_prefix(n);
        self.store.integrate_in_place(n, value, rate, dt);
    }

    /// Extend the live range by `count` slots.
    ///
    /// Returns the newly claimed slots, or `None` (leaving `live` untouched)
    /// when the pool cannot hold all of them.
    pub fn claim(&mut self, count: usize) -> Option<Range<usize>> {
        self.assert_initialized();
        let start = self.live;
        let end = start.checked_add(count)?;
        if end > self.capacity {
            return None;
        }
        self.live = end;
        Some(start..end)
    }

    /// Remove every live particle whose life is `<= 0`.
    ///
    /// A dead slot receives the last live slot's data and is tested again
    /// before the scan moves on. Afterwards every slot in `[0, live)` has
    /// positive life; the order of survivors is not preserved.
    ///
    /// Returns the number of particles removed.
    ///
    /// # Panics
    ///
    /// Panics if the pool has no [`ChannelKey::Life`] channel.
    pub fn garbage_collect(&mut self) -> usize {
        self.assert_initialized();
        let life = self.field::<f32>(ChannelKey::Life);

        let mut removed = 0;
        let mut i = 0;
        while i < self.live {
            if is_dead(self.store.slice(life)[i]) {
                self.live -= 1;
                self.store.swap_slots(i, self.live);
                removed += 1;
            } else {
                i += 1;
            }
        }
        removed
    }

    fn assert_initialized(&self) {
        if !self.initialized {
            panic!("{}", ParticleError::NotInitialized);
        }
    }

    fn assert_live_prefix(&self, n: usize) {
        self.assert_initialized();
        assert!(n <= self.live, "bulk operation over {} slots, only {} live", n, self.live);
    }
}

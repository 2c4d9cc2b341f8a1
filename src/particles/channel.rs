//! Struct-of-arrays channel storage.
//!
//! Every particle attribute lives in its own array and all arrays share the
//! same slot index. Channels are addressed by a closed set of [`ChannelKey`]s,
//! each with a fixed element type, and accessed through typed
//! [`ChannelHandle`]s that are checked once at lookup time.

use glam::{Vec2, Vec4};
use std::marker::PhantomData;
use std::ops::{AddAssign, Mul};

use crate::particles::error::{ParticleError, ParticleResult};

/// Per-particle attributes a pool can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelKey {
    /// Remaining life in seconds
    Life,
    /// Edge length of the particle quad
    Size,
    /// Centre of the particle
    Position,
    /// Units per second
    Velocity,
    /// RGBA, nominally in [0, 1]
    Color,
    /// Radians
    Rotation,
    /// Radians per second
    RotationDelta,
}

impl ChannelKey {
    pub const COUNT: usize = 7;

    pub const ALL: [ChannelKey; ChannelKey::COUNT] = [
        ChannelKey::Life,
        ChannelKey::Size,
        ChannelKey::Position,
        ChannelKey::Velocity,
        ChannelKey::Color,
        ChannelKey::Rotation,
        ChannelKey::RotationDelta,
    ];

    /// Element type stored under this key
    pub fn kind(self) -> ChannelKind {
        match self {
            ChannelKey::Life
            | ChannelKey::Size
            | ChannelKey::Rotation
            | ChannelKey::RotationDelta => ChannelKind::Scalar,
            ChannelKey::Position | ChannelKey::Velocity => ChannelKind::Vec2,
            ChannelKey::Color => ChannelKind::Vec4,
        }
    }

    #[inline]
    fn index(self) -> usize {
        self as usize
    }
}

/// Element type of a channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelKind {
    Scalar,
    Vec2,
    Vec4,
}

/// Backing array of one channel
#[derive(Debug, Clone)]
pub enum Channel {
    Scalar(Vec<f32>),
    Vec2(Vec<Vec2>),
    Vec4(Vec<Vec4>),
}

impl Channel {
    fn empty(kind: ChannelKind) -> Self {
        match kind {
            ChannelKind::Scalar => Channel::Scalar(Vec::new()),
            ChannelKind::Vec2 => Channel::Vec2(Vec::new()),
            ChannelKind::Vec4 => Channel::Vec4(Vec::new()),
        }
    }

    pub fn kind(&self) -> ChannelKind {
        match self {
            Channel::Scalar(_) => ChannelKind::Scalar,
            Channel::Vec2(_) => ChannelKind::Vec2,
            Channel::Vec4(_) => ChannelKind::Vec4,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Channel::Scalar(v) => v.len(),
            Channel::Vec2(v) => v.len(),
            Channel::Vec4(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn resize(&mut self, len: usize) {
        match self {
            Channel::Scalar(v) => v.resize(len, 0.0),
            Channel::Vec2(v) => v.resize(len, Vec2::ZERO),
            Channel::Vec4(v) => v.resize(len, Vec4::ZERO),
        }
    }

    fn swap(&mut self, a: usize, b: usize) {
        match self {
            Channel::Scalar(v) => v.swap(a, b),
            Channel::Vec2(v) => v.swap(a, b),
            Channel::Vec4(v) => v.swap(a, b),
        }
    }
}

/// Element types that can back a channel.
///
/// Implemented for `f32`, [`Vec2`] and [`Vec4`] only.
pub trait ChannelElement: Copy + Default + Send + Sync + 'static {
    const KIND: ChannelKind;

    fn view(channel: &Channel) -> Option<&[Self]>;
    fn view_mut(channel: &mut Channel) -> Option<&mut [Self]>;
}

macro_rules! impl_channel_element {
    ($ty:ty, $variant:ident) => {
        impl ChannelElement for $ty {
            const KIND: ChannelKind = ChannelKind::$variant;

            fn view(channel: &Channel) -> Option<&[Self]> {
                match channel {
                    Channel::$variant(values) => Some(values.as_slice()),
                    _ => None,
                }
            }

            fn view_mut(channel: &mut Channel) -> Option<&mut [Self]> {
                match channel {
                    Channel::$variant(values) => Some(values.as_mut_slice()),
                    _ => None,
                }
            }
        }
    };
}

impl_channel_element!(f32, Scalar);
impl_channel_element!(Vec2, Vec2);
impl_channel_element!(Vec4, Vec4);

/// Typed capability for one registered channel.
///
/// Only [`ChannelStore::handle`] creates handles, so holding one means the key
/// was registered with a matching element type.
#[derive(Debug, PartialEq, Eq)]
pub struct ChannelHandle<T> {
    key: ChannelKey,
    _element: PhantomData<fn() -> T>,
}

impl<T> Clone for ChannelHandle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for ChannelHandle<T> {}

impl<T> ChannelHandle<T> {
    pub fn key(&self) -> ChannelKey {
        self.key
    }
}

/// Registered channels, indexed by key
#[derive(Debug, Default)]
pub struct ChannelStore {
    channels: [Option<Channel>; ChannelKey::COUNT],
}

impl ChannelStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a channel. Registering the same key twice is a no-op.
    pub fn register(&mut self, key: ChannelKey) {
        let slot = &mut self.channels[key.index()];
        if slot.is_none() {
            *slot = Some(Channel::empty(key.kind()));
        }
    }

    pub fn is_registered(&self, key: ChannelKey) -> bool {
        self.channels[key.index()].is_some()
    }

    /// Keys currently registered, in key order
    pub fn keys(&self) -> impl Iterator<Item = ChannelKey> + '_ {
        ChannelKey::ALL
            .into_iter()
            .filter(move |key| self.is_registered(*key))
    }

    /// Size every registered channel to `capacity` default elements
    pub fn allocate(&mut self, capacity: usize) {
        for channel in self.channels.iter_mut().flatten() {
            channel.resize(capacity);
        }
    }

    /// Look up a typed handle for `key`
    pub fn handle<T: ChannelElement>(&self, key: ChannelKey) -> ParticleResult<ChannelHandle<T>> {
        let channel = self.channels[key.index()]
            .as_ref()
            .ok_or(ParticleError::UnregisteredChannel { key })?;

        if channel.kind() != T::KIND {
            return Err(ParticleError::ChannelKindMismatch {
                key,
                expected: T::KIND,
                found: channel.kind(),
            });
        }

        Ok(ChannelHandle {
            key,
            _element: PhantomData,
        })
    }

    /// Length of the backing array for `key`, zero if unregistered
    pub fn len_of(&self, key: ChannelKey) -> usize {
        self.channels[key.index()].as_ref().map_or(0, Channel::len)
    }

    pub fn slice<T: ChannelElement>(&self, handle: ChannelHandle<T>) -> &[T] {
        match self.channels[handle.key.index()].as_ref().and_then(T::view) {
            Some(values) => values,
            None => panic!("{}", ParticleError::UnregisteredChannel { key: handle.key }),
        }
    }

    pub fn slice_mut<T: ChannelElement>(&mut self, handle: ChannelHandle<T>) -> &mut [T] {
        match self.channels[handle.key.index()].as_mut().and_then(T::view_mut) {
            Some(values) => values,
            None => panic!("{}", ParticleError::UnregisteredChannel { key: handle.key }),
        }
    }

    /// `value[i] -= delta` for the first `n` slots
    pub fn subtract_in_place(&mut self, n: usize, handle: ChannelHandle<f32>, delta: f32) {
        for value in &mut self.slice_mut(handle)[..n] {
            *value -= delta;
        }
    }

    /// `value[i] += rate[i] * dt` for the first `n` slots
    pub fn integrate_in_place<T>(
        &mut self,
        n: usize,
        value: ChannelHandle<T>,
        rate: ChannelHandle<T>,
        dt: f32,
    ) where
        T: ChannelElement + AddAssign + Mul<f32, Output = T>,
    {
        let (value_channel, rate_channel) = self.pair_mut(value.key, rate.key);
        let (Some(values), Some(rates)) = (
            value_channel.as_mut().and_then(T::view_mut),
            rate_channel.as_ref().and_then(T::view),
        ) else {
            panic!(
                "integrate_in_place: channels {:?} and {:?} are not registered",
                value.key, rate.key
            );
        };

        for (v, r) in values[..n].iter_mut().zip(&rates[..n]) {
            *v += *r * dt;
        }
    }

    /// Swap slot `a` and slot `b` in every registered channel
    pub fn swap_slots(&mut self, a: usize, b: usize) {
        for channel in self.channels.iter_mut().flatten() {
            channel.swap(a, b);
        }
    }

    fn pair_mut(
        &mut self,
        write: ChannelKey,
        read: ChannelKey,
    ) -> (&mut Option<Channel>, &Option<Channel>) {
        let (w, r) = (write.index(), read.index());
        assert_ne!(w, r, "channel {:?} cannot integrate itself", write);

        if w < r {
            let (lo, hi) = self.channels.split_at_mut(r);
            (&mut lo[w], &hi[0])
        } else {
            let (lo, hi) = self.channels.split_at_mut(w);
            (&mut hi[0], &lo[r])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(keys: &[ChannelKey], capacity: usize) -> ChannelStore {
        let mut store = ChannelStore::new();
        for key in keys {
            store.register(*key);
        }
        store.allocate(capacity);
        store
    }

    #[test]
    fn test_handle_checks_registration_and_kind() {
        let store = store_with(&[ChannelKey::Life, ChannelKey::Position], 4);

        assert!(store.handle::<f32>(ChannelKey::Life).is_ok());
        assert!(store.handle::<Vec2>(ChannelKey::Position).is_ok());
        assert_eq!(
            store.handle::<f32>(ChannelKey::Size),
            Err(ParticleError::UnregisteredChannel { key: ChannelKey::Size })
        );
        assert_eq!(
            store.handle::<Vec4>(ChannelKey::Position),
            Err(ParticleError::ChannelKindMismatch {
                key: ChannelKey::Position,
                expected: ChannelKind::Vec4,
                found: ChannelKind::Vec2,
            })
        );
    }

    #[test]
    fn test_allocate_sizes_every_channel() {
        let store = store_with(&ChannelKey::ALL, 16);
        for key in ChannelKey::ALL {
            assert_eq!(store.len_of(key), 16);
        }
        assert_eq!(store.keys().count(), ChannelKey::COUNT);
    }

    #[test]
    fn test_subtract_touches_only_first_n() {
        let mut store = store_with(&[ChannelKey::Life], 4);
        let life = store.handle::<f32>(ChannelKey::Life).unwrap();
        store.slice_mut(life).copy_from_slice(&[1.0, 2.0, 3.0, 4.0]);

        store.subtract_in_place(2, life, 0.5);

        assert_eq!(store.slice(life), &[0.5, 1.5, 3.0, 4.0]);
    }

    #[test]
    fn test_integrate_vectors_and_scalars() {
        let mut store = store_with(
            &[
                ChannelKey::Position,
                ChannelKey::Velocity,
                ChannelKey::Rotation,
                ChannelKey::RotationDelta,
            ],
            3,
        );
        let pos = store.handle::<Vec2>(ChannelKey::Position).unwrap();
        let vel = store.handle::<Vec2>(ChannelKey::Velocity).unwrap();
        let rot = store.handle::<f32>(ChannelKey::Rotation).unwrap();
        let rot_delta = store.handle::<f32>(ChannelKey::RotationDelta).unwrap();

        store.slice_mut(vel).fill(Vec2::new(2.0, -4.0));
        store.slice_mut(rot_delta).fill(1.0);

        store.integrate_in_place(2, pos, vel, 0.5);
        store.integrate_in_place(2, rot, rot_delta, 0.25);

        assert_eq!(store.slice(pos)[0], Vec2::new(1.0, -2.0));
        assert_eq!(store.slice(pos)[1], Vec2::new(1.0, -2.0));
        assert_eq!(store.slice(pos)[2], Vec2::ZERO);
        assert_eq!(store.slice(rot), &[0.25, 0.25, 0.0]);
    }

    #[test]
    fn test_integrate_reads_lower_key_into_higher_key() {
        // RotationDelta sorts after Rotation; exercise the reversed split too.
        let mut store = store_with(&[ChannelKey::Rotation, ChannelKey::RotationDelta], 2);
        let rot = store.handle::<f32>(ChannelKey::Rotation).unwrap();
        let rot_delta = store.handle::<f32>(ChannelKey::RotationDelta).unwrap();
        store.slice_mut(rot).fill(3.0);

        store.integrate_in_place(2, rot_delta, rot, 1.0);

        assert_eq!(store.slice(rot_delta), &[3.0, 3.0]);
    }

    #[test]
    fn test_swap_slots_moves_all_channels_together() {
        let mut store = store_with(&[ChannelKey::Life, ChannelKey::Color], 3);
        let life = store.handle::<f32>(ChannelKey::Life).unwrap();
        let color = store.handle::<Vec4>(ChannelKey::Color).unwrap();
        store.slice_mut(life).copy_from_slice(&[1.0, 2.0, 3.0]);
        store.slice_mut(color)[2] = Vec4::ONE;

        store.swap_slots(0, 2);

        assert_eq!(store.slice(life), &[3.0, 2.0, 1.0]);
        assert_eq!(store.slice(color)[0], Vec4::ONE);
        assert_eq!(store.slice(color)[2], Vec4::ZERO);
    }

    #[test]
    #[should_panic(expected = "cannot integrate itself")]
    fn test_integrate_same_channel_panics() {
        let mut store = store_with(&[ChannelKey::Position], 1);
        let pos = store.handle::<Vec2>(ChannelKey::Position).unwrap();
        store.integrate_in_place(1, pos, pos, 1.0);
    }
}

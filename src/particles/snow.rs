//! Falling snow effect.
//!
//! Flakes are emitted along the top edge of the viewport at a fixed rate,
//! drift down with a random velocity, spin through a random angle over their
//! life and are collected once their life runs out. Larger flakes are drawn
//! more opaque.

use glam::{Vec2, Vec4};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::particles::channel::{ChannelHandle, ChannelKey};
use crate::particles::error::{invalid_config, ParticleError, ParticleResult};
use crate::particles::life::LifeController;
use crate::particles::pool::Pool;
use crate::particles::rate::RateController;
use crate::particles::simulator::ParticleSimulator;
use crate::particles::var::{Range, Var};
use crate::particles::visual::{ColorOrder, ParticleTexture, PosTexColorVertex, VisualController};

/// Snow effect configuration.
///
/// May be edited freely until the first [`SnowSimulator::simulate`], which
/// validates it again and restarts the emitter from `duration` and `rate`.
/// Edits after that are not re-validated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnowConfig {
    /// Seconds the emitter stays active
    pub duration: f32,
    /// Flakes per second
    pub rate: f32,
    /// Seconds
    pub life: Var,
    pub size: Var,
    /// Base colour. Alpha is replaced per flake by its size ratio.
    pub color: Vec4,
    /// Per axis
    pub position: [Var; 2],
    /// Per axis, units per second
    pub velocity: [Var; 2],
    /// Radians at birth and at death
    pub rotation: Range,
}

impl SnowConfig {
    /// Defaults for a `width` x `height` viewport: flakes appear along the
    /// top edge and fall downwards (towards smaller y).
    pub fn for_viewport(width: f32, height: f32) -> Self {
        Self {
            duration: f32::MAX,
            rate: 60.0,
            life: Var::new(10.0, 4.0),
            size: Var::new(6.0, 6.0),
            color: Vec4::new(1.0, 0.0, 0.0, 1.0),
            position: [Var::new(0.0, width), Var::new(height, 0.0)],
            velocity: [Var::new(-10.0, 20.0), Var::new(-50.0, 20.0)],
            rotation: Range::new(Var::new(0.0, 10.0), Var::new(1.0, 10.0)),
        }
    }

    pub fn validate(&self) -> ParticleResult<()> {
        if self.duration.is_nan() || self.duration < 0.0 {
            return Err(invalid_config("duration", format!("must be >= 0, got {}", self.duration)));
        }
        if !self.rate.is_finite() || self.rate < 0.0 {
            return Err(invalid_config("rate", format!("must be finite and >= 0, got {}", self.rate)));
        }
        let life = self.life;
        if life.base.is_nan()
            || life.base <= 0.0
            || life.var.is_nan()
            || life.var < 0.0
            || !life.max().is_finite()
        {
            return Err(invalid_config(
                "life",
                format!("needs base > 0 and var >= 0, got {:?}", life),
            ));
        }
        let size = self.size;
        if size.base.is_nan()
            || size.base < 0.0
            || size.var.is_nan()
            || size.var < 0.0
            || size.max() <= 0.0
            || !size.max().is_finite()
        {
            return Err(invalid_config(
                "size",
                format!("needs base >= 0, var >= 0 and base + var > 0, got {:?}", size),
            ));
        }

        let finite = |v: &Var| v.base.is_finite() && v.var.is_finite();
        if !self.position.iter().all(finite) {
            return Err(invalid_config("position", "non-finite range"));
        }
        if !self.velocity.iter().all(finite) {
            return Err(invalid_config("velocity", "non-finite range"));
        }
        if !finite(&self.rotation.start) || !finite(&self.rotation.end) {
            return Err(invalid_config("rotation", "non-finite range"));
        }
        Ok(())
    }
}

/// Per-frame bookkeeping
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SnowStats {
    pub frames: u64,
    pub spawned_last_frame: usize,
    pub removed_last_frame: usize,
    /// Flakes requested by the rate controller but dropped for lack of room
    pub dropped_spawns: usize,
    pub total_spawned: usize,
}

/// Snapshot of one flake
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnowParticle {
    pub life: f32,
    pub size: f32,
    pub position: Vec2,
    pub velocity: Vec2,
    pub color: Vec4,
    pub rotation: f32,
    pub rotation_delta: f32,
}

/// Handles bound at initialize time
#[derive(Debug, Clone, Copy)]
struct SnowChannels {
    life: LifeController,
    visual: VisualController,
    size: ChannelHandle<f32>,
    position: ChannelHandle<Vec2>,
    velocity: ChannelHandle<Vec2>,
    color: ChannelHandle<Vec4>,
    rotation: ChannelHandle<f32>,
    rotation_delta: ChannelHandle<f32>,
}

impl SnowChannels {
    fn bind(pool: &Pool) -> Self {
        Self {
            life: LifeController::bind(pool),
            visual: VisualController::bind(pool),
            size: pool.field(ChannelKey::Size),
            position: pool.field(ChannelKey::Position),
            velocity: pool.field(ChannelKey::Velocity),
            color: pool.field(ChannelKey::Color),
            rotation: pool.field(ChannelKey::Rotation),
            rotation_delta: pool.field(ChannelKey::RotationDelta),
        }
    }
}

/// Snow particle simulator
#[derive(Debug)]
pub struct SnowSimulator<R = StdRng> {
    pub config: SnowConfig,
    /// Packing of vertex colours written by `visualize`
    pub color_order: ColorOrder,
    pool: Pool,
    rate: RateController,
    channels: Option<SnowChannels>,
    rng: R,
    stats: SnowStats,
}

impl SnowSimulator<StdRng> {
    /// Simulator seeded from OS entropy
    pub fn new(capacity: usize, width: f32, height: f32) -> Self {
        Self::with_rng(capacity, width, height, StdRng::from_entropy())
    }

    /// Simulator with reproducible spawns
    pub fn with_seed(capacity: usize, width: f32, height: f32, seed: u64) -> Self {
        Self::with_rng(capacity, width, height, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> SnowSimulator<R> {
    pub fn with_rng(capacity: usize, width: f32, height: f32, rng: R) -> Self {
        let mut pool = Pool::new(capacity);
        pool.add_channel(&[ChannelKey::Life, ChannelKey::Size]);
        pool.add_channel(&[ChannelKey::Position, ChannelKey::Velocity]);
        pool.add_channel(&[ChannelKey::Color]);
        pool.add_channel(&[ChannelKey::Rotation, ChannelKey::RotationDelta]);

        Self {
            config: SnowConfig::for_viewport(width, height),
            color_order: ColorOrder::default(),
            pool,
            rate: RateController::default(),
            channels: None,
            rng,
            stats: SnowStats::default(),
        }
    }

    /// Validate the configuration, allocate the pool and start the emitter
    pub fn try_initialize(&mut self) -> ParticleResult<()> {
        if self.channels.is_some() {
            return Err(ParticleError::AlreadyInitialized);
        }
        self.config.validate()?;
        self.pool.try_initialize()?;

        self.channels = Some(SnowChannels::bind(&self.pool));
        self.rate.initialize(self.config.duration, self.config.rate);

        log::debug!(
            "Snow simulator initialized: capacity {}, rate {}/s, duration {}s",
            self.pool.capacity(),
            self.config.rate,
            self.config.duration
        );
        Ok(())
    }

    /// # Panics
    ///
    /// Panics if called twice or if the configuration is invalid.
    pub fn initialize(&mut self) {
        if let Err(e) = self.try_initialize() {
            panic!("{}", e);
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.channels.is_some()
    }

    /// Advance the effect by `dt` seconds.
    ///
    /// New flakes are spawned first and are neither aged nor moved in the
    /// frame they appear. Flakes whose life runs out this frame are collected
    /// before returning.
    ///
    /// # Panics
    ///
    /// Panics if the simulator has not been initialized, or if the config
    /// was edited into an invalid state before the first frame.
    pub fn simulate(&mut self, dt: f32) {
        if let Err(e) = self.try_simulate(dt) {
            panic!("snow simulator: {}", e);
        }
    }

    /// [`simulate`](Self::simulate), reporting misuse instead of panicking.
    ///
    /// The first frame re-validates the config and restarts the emitter, so
    /// edits made after `initialize` take effect.
    pub fn try_simulate(&mut self, dt: f32) -> ParticleResult<()> {
        let channels = self.channels.ok_or(ParticleError::NotInitialized)?;
        if self.stats.frames == 0 {
            self.config.validate()?;
            self.rate.initialize(self.config.duration, self.config.rate);
        }
        let settled = self.pool.live();

        let requested = self.rate.compute_spawn_count(dt);
        let spawned = if requested > 0 {
            self.spawn(&channels, requested)
        } else {
            0
        };

        channels.life.decay(&mut self.pool, settled, dt);

        // p' = p + v * t
        self.pool
            .integrate_in_place(settled, channels.position, channels.velocity, dt);
        self.pool
            .integrate_in_place(settled, channels.rotation, channels.rotation_delta, dt);

        let removed = self.pool.garbage_collect();

        self.stats.frames = self.stats.frames.saturating_add(1);
        self.stats.spawned_last_frame = spawned;
        self.stats.removed_last_frame = removed;
        self.stats.total_spawned = self.stats.total_spawned.saturating_add(spawned);

        log::trace!(
            "snow frame {}: +{} -{} live {}/{}",
            self.stats.frames,
            spawned,
            removed,
            self.pool.live(),
            self.pool.capacity()
        );
        Ok(())
    }

    /// Write four vertices per live flake to the start of `buffer`.
    ///
    /// # Panics
    ///
    /// Panics if the simulator has not been initialized or `buffer` is
    /// shorter than `4 * live`.
    pub fn visualize<T: ParticleTexture + ?Sized>(
        &self,
        buffer: &mut [PosTexColorVertex],
        texture: &T,
    ) -> usize {
        self.channels()
            .visual
            .visualize(&self.pool, buffer, texture, self.color_order)
    }

    /// `(live, capacity)`
    pub fn size(&self) -> (usize, usize) {
        (self.pool.live(), self.pool.capacity())
    }

    pub fn stats(&self) -> &SnowStats {
        &self.stats
    }

    pub fn pool(&self) -> &Pool {
        &self.pool
    }

    /// Whether the emitter will spawn any more flakes
    pub fn is_emitting(&self) -> bool {
        self.rate.is_active()
    }

    /// Snapshot of the live flake in slot `index`
    pub fn particle(&self, index: usize) -> Option<SnowParticle> {
        let channels = self.channels.as_ref()?;
        if index >= self.pool.live() {
            return None;
        }
        let pool = &self.pool;
        Some(SnowParticle {
            life: pool.slice(channels.life.handle())[index],
            size: pool.slice(channels.size)[index],
            position: pool.slice(channels.position)[index],
            velocity: pool.slice(channels.velocity)[index],
            color: pool.slice(channels.color)[index],
            rotation: pool.slice(channels.rotation)[index],
            rotation_delta: pool.slice(channels.rotation_delta)[index],
        })
    }

    /// Spawn `count` flakes, or none if the pool cannot hold them all
    fn spawn(&mut self, channels: &SnowChannels, count: usize) -> usize {
        let Some(slots) = self.pool.claim(count) else {
            self.stats.dropped_spawns = self.stats.dropped_spawns.saturating_add(count);
            log::debug!(
                "Dropping {} snow particles: {}/{} slots in use",
                count,
                self.pool.live(),
                self.pool.capacity()
            );
            return 0;
        };

        let config = &self.config;
        let rng = &mut self.rng;
        let max_size = config.size.max();

        for i in slots {
            let life = config.life.random(rng);
            let size = config.size.random(rng);
            let (rotation, rotation_delta) = config.rotation.range_init(rng, 1.0 / life);
            let position = Vec2::new(config.position[0].random(rng), config.position[1].random(rng));
            let velocity = Vec2::new(config.velocity[0].random(rng), config.velocity[1].random(rng));

            let mut color = config.color;
            color.w = size / max_size;

            self.pool.slice_mut(channels.life.handle())[i] = life;
            self.pool.slice_mut(channels.size)[i] = size;
            self.pool.slice_mut(channels.color)[i] = color;
            self.pool.slice_mut(channels.rotation)[i] = rotation;
            self.pool.slice_mut(channels.rotation_delta)[i] = rotation_delta;
            self.pool.slice_mut(channels.position)[i] = position;
            self.pool.slice_mut(channels.velocity)[i] = velocity;
        }
        count
    }

    fn channels(&self) -> SnowChannels {
        match self.channels {
            Some(channels) => channels,
            None => panic!("snow simulator: {}", ParticleError::NotInitialized),
        }
    }
}

impl<R: Rng> ParticleSimulator for SnowSimulator<R> {
    fn initialize(&mut self) {
        SnowSimulator::initialize(self);
    }

    fn simulate(&mut self, dt: f32) {
        SnowSimulator::simulate(self, dt);
    }

    fn visualize(&self, buffer: &mut [PosTexColorVertex], texture: &dyn ParticleTexture) -> usize {
        SnowSimulator::visualize(self, buffer, texture)
    }

    fn size(&self) -> (usize, usize) {
        SnowSimulator::size(self)
    }
}

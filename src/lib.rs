//! Fixed-capacity CPU particle effects.
//!
//! Particles live in a struct-of-arrays [`Pool`](particles::Pool). Effects such
//! as [`SnowSimulator`] spawn into it at a configured rate, age and move the
//! live range in bulk every frame, compact dead slots out, and write one
//! textured quad per particle into a caller-owned vertex buffer.

pub mod math;
pub mod particles;

pub use glam::{Vec2, Vec4};
pub use particles::{
    ColorOrder, ParticleError, ParticleResult, ParticleSimulator, ParticleTexture,
    PosTexColorVertex, SnowConfig, SnowSimulator, TextureRegion,
};

use crate::particles::visual::{ParticleTexture, PosTexColorVertex};

/// Frame-driven particle effect.
///
/// Call [`initialize`](ParticleSimulator::initialize) once, then
/// [`simulate`](ParticleSimulator::simulate) every frame. `visualize` only
/// reads state and can be called any number of times between frames.
pub trait ParticleSimulator {
    fn initialize(&mut self);

    /// Advance the effect by `dt` seconds
    fn simulate(&mut self, dt: f32);

    /// Write four vertices per live particle to the start of `buffer` and
    /// return how many vertices were written
    fn visualize(&self, buffer: &mut [PosTexColorVertex], texture: &dyn ParticleTexture) -> usize;

    /// `(live, capacity)`
    fn size(&self) -> (usize, usize);
}

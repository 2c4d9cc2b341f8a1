//! Quad generation for live particles.

use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec4};
use serde::{Deserialize, Serialize};

use crate::math::{clamp, rotate_about};
use crate::particles::channel::{ChannelHandle, ChannelKey};
use crate::particles::pool::Pool;

/// Vertices written per particle
pub const VERTICES_PER_PARTICLE: usize = 4;

/// Vertex record consumed by the sprite renderer
/// Total size: 20 bytes
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct PosTexColorVertex {
    /// Position in screen space
    pub position: [f32; 2],

    /// Texture coordinates
    pub tex_coords: [f32; 2],

    /// Packed 8-bit colour, see [`ColorOrder`]
    pub color: u32,
}

/// Rectangle of a texture, in normalized coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextureRegion {
    pub min: Vec2,
    pub max: Vec2,
}

impl TextureRegion {
    /// The whole texture
    pub const FULL: TextureRegion = TextureRegion {
        min: Vec2::ZERO,
        max: Vec2::ONE,
    };

    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self {
            min: Vec2::new(x1, y1),
            max: Vec2::new(x2, y2),
        }
    }
}

impl Default for TextureRegion {
    fn default() -> Self {
        Self::FULL
    }
}

/// A texture the simulator can draw particles with
pub trait ParticleTexture {
    fn region(&self) -> TextureRegion;
}

impl ParticleTexture for TextureRegion {
    fn region(&self) -> TextureRegion {
        *self
    }
}

/// Byte order of a packed colour in little-endian memory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ColorOrder {
    /// Bytes R, G, B, A (`0xAABBGGRR`), as read by `Unorm8x4` vertex formats
    #[default]
    Rgba,
    /// Bytes B, G, R, A (`0xAARRGGBB`)
    Bgra,
}

/// Clamp a colour to [0, 1] and pack it into 8 bits per channel
pub fn pack_color(color: Vec4, order: ColorOrder) -> u32 {
    let byte = |c: f32| (clamp(c, 0.0, 1.0) * 255.0) as u32;
    let (r, g, b, a) = (byte(color.x), byte(color.y), byte(color.z), byte(color.w));

    match order {
        ColorOrder::Rgba => (a << 24) | (b << 16) | (g << 8) | r,
        ColorOrder::Bgra => (a << 24) | (r << 16) | (g << 8) | b,
    }
}

/// Write one rotated quad into `out[0..4]`.
///
/// Corners are emitted counter-clockwise from the bottom-left.
pub fn write_quad(
    out: &mut [PosTexColorVertex],
    center: Vec2,
    half_size: f32,
    rotation: f32,
    region: TextureRegion,
    color: u32,
) {
    let corners = [
        (Vec2::new(-half_size, -half_size), [region.min.x, region.min.y]),
        (Vec2::new(half_size, -half_size), [region.max.x, region.min.y]),
        (Vec2::new(half_size, half_size), [region.max.x, region.max.y]),
        (Vec2::new(-half_size, half_size), [region.min.x, region.max.y]),
    ];

    for (vertex, (offset, tex_coords)) in out[..VERTICES_PER_PARTICLE].iter_mut().zip(corners) {
        let position = rotate_about(center + offset, center, rotation);
        *vertex = PosTexColorVertex {
            position: position.to_array(),
            tex_coords,
            color,
        };
    }
}

/// Reads size, position, colour and (optionally) rotation channels and turns
/// each live particle into a textured quad.
#[derive(Debug, Clone, Copy)]
pub struct VisualController {
    size: ChannelHandle<f32>,
    position: ChannelHandle<Vec2>,
    color: ChannelHandle<Vec4>,
    rotation: Option<ChannelHandle<f32>>,
}

impl VisualController {
    /// # Panics
    ///
    /// Panics if the pool lacks a size, position or colour channel. Rotation
    /// is optional.
    pub fn bind(pool: &Pool) -> Self {
        Self {
            size: pool.field(ChannelKey::Size),
            position: pool.field(ChannelKey::Position),
            color: pool.field(ChannelKey::Color),
            rotation: pool.try_field(ChannelKey::Rotation).ok(),
        }
    }

    /// Write `4 * live` vertices to the start of `buffer`, returning the count
    ///
    /// # Panics
    ///
    /// Panics if `buffer` cannot hold four vertices per live particle.
    pub fn visualize<T: ParticleTexture + ?Sized>(
        &self,
        pool: &Pool,
        buffer: &mut [PosTexColorVertex],
        texture: &T,
        order: ColorOrder,
    ) -> usize {
        let live = pool.live();
        let needed = live * VERTICES_PER_PARTICLE;
        assert!(
            buffer.len() >= needed,
            "vertex buffer holds {} vertices, {} live particles need {}",
            buffer.len(),
            live,
            needed
        );

        let region = texture.region();
        let size = pool.live_slice(self.size);
        let position = pool.live_slice(self.position);
        let color = pool.live_slice(self.color);
        let rotation = self.rotation.map_or(&[][..], |h| pool.live_slice(h));

        for (i, quad) in buffer[..needed]
            .chunks_exact_mut(VERTICES_PER_PARTICLE)
            .enumerate()
        {
            let rot = rotation.get(i).copied().unwrap_or(0.0);
            write_quad(
                quad,
                position[i],
                size[i] / 2.0,
                rot,
                region,
                pack_color(color[i], order),
            );
        }
        needed
    }
}

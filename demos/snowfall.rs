//! Headless snowfall run.
//!
//! Steps a snow effect at 60 Hz for a few seconds, filling a vertex buffer
//! every frame the way a renderer would, and logs pool statistics.
//!
//! ```text
//! RUST_LOG=debug cargo run --example snowfall -- [config.toml]
//! ```

use anyhow::{Context, Result};
use earth_particles::particles::VERTICES_PER_PARTICLE;
use earth_particles::{PosTexColorVertex, SnowConfig, SnowSimulator, TextureRegion};

const CAPACITY: usize = 2048;
const WIDTH: f32 = 1280.0;
const HEIGHT: f32 = 720.0;
const FRAMES: usize = 600;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .init();

    let mut sim = SnowSimulator::new(CAPACITY, WIDTH, HEIGHT);
    if let Some(path) = std::env::args().nth(1) {
        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read snow config {}", path))?;
        sim.config = toml::from_str::<SnowConfig>(&raw)
            .with_context(|| format!("Failed to parse snow config {}", path))?;
        log::info!("Loaded snow config from {}", path);
    }
    sim.try_initialize()?;

    let mut vertices = vec![PosTexColorVertex::default(); CAPACITY * VERTICES_PER_PARTICLE];
    let mut peak = 0;

    for frame in 0..FRAMES {
        sim.simulate(1.0 / 60.0);
        let written = sim.visualize(&mut vertices, &TextureRegion::FULL);
        peak = peak.max(written / VERTICES_PER_PARTICLE);

        if frame % 60 == 59 {
            let (live, capacity) = sim.size();
            let bytes: &[u8] = bytemuck::cast_slice(&vertices[..written]);
            log::info!(
                "t={:>2}s live {:>4}/{} vertex bytes {}",
                (frame + 1) / 60,
                live,
                capacity,
                bytes.len()
            );
        }
    }

    let stats = sim.stats();
    println!("Snowfall finished after {} frames", stats.frames);
    println!("  spawned: {}", stats.total_spawned);
    println!("  dropped: {}", stats.dropped_spawns);
    println!("  peak live: {}", peak);
    println!("  still emitting: {}", sim.is_emitting());
    Ok(())
}

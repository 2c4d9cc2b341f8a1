pub mod channel;
pub mod error;
pub mod life;
pub mod pool;
pub mod rate;
pub mod simulator;
pub mod snow;
pub mod var;
pub mod visual;

pub use channel::{ChannelHandle, ChannelKey, ChannelKind, ChannelStore};
pub use error::{ParticleError, ParticleResult};
pub use life::LifeController;
pub use pool::Pool;
pub use rate::RateController;
pub use simulator::ParticleSimulator;
pub use snow::{SnowConfig, SnowParticle, SnowSimulator, SnowStats};
pub use var::{Range, Var};
pub use visual::{
    ColorOrder, ParticleTexture, PosTexColorVertex, TextureRegion, VisualController,
    VERTICES_PER_PARTICLE,
};

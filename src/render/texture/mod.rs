//! GPU textures: decoded images and the depth target

pub mod cache;
pub mod depth;

pub use cache::{GpuTexture, TextureCache};
pub use depth::DepthTexture;

//! Noise-dissolve texture cross-fades on model materials

pub mod blend;
pub mod crossfade;
pub mod noise;
pub mod patch;

pub use blend::BlendState;
pub use noise::dissolve_noise;
pub use patch::{MaterialPatcher, OriginalTextures, PatchReport};

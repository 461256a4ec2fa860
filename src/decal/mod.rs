//! Sticker decals projected onto the model surface

pub mod clip;
pub mod projector;

pub use projector::{DecalMesh, DecalTarget, project};

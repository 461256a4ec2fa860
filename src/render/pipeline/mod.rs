//! Render pipelines

pub mod decal;
pub mod model;

pub use decal::DecalPipeline;
pub use model::{MaterialTextures, MaterialUniform, ModelPipeline};

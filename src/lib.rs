//! Facet - an interactive glTF model viewer with noise-dissolve texture
//! cross-fades and projected sticker decals

pub mod core;
pub mod math;
pub mod assets;
pub mod scene;
pub mod selection;
pub mod material;
pub mod decal;
pub mod boundary;
pub mod viewer;
pub mod render;

pub use viewer::{ViewStatus, Viewer};

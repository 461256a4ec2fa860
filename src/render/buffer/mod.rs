//! GPU buffer management

pub mod frame_buffer;
pub mod mesh_buffer;

pub use frame_buffer::{FrameBuffer, FrameUniform};
pub use mesh_buffer::{MeshBuffer, Vertex, bake_vertices};

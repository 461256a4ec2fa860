//! Scene graph of a loaded model

pub mod graph;
pub mod mesh;
pub mod node;
pub mod normalize;

pub use graph::{MeshInstance, SceneGraph};
pub use mesh::{Material, MaterialId, Mesh, MeshId, Primitive};
pub use node::{LocalTransform, NodeContent, SceneNode, SceneNodeId};
pub use normalize::{normalize, Normalization};

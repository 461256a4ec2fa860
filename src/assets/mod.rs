//! Asset sources: uploads, built-ins, decoding and the async load pipeline

pub mod builtin;
pub mod catalog;
pub mod gltf_import;
pub mod loader;
pub mod object_url;
pub mod texture;

pub use catalog::AssetRef;
pub use loader::{
    AssetSource, AsyncLoader, ImmediateLoader, LoadBackend, LoadCompletion, LoadRequest, LoadSlot,
    LoadTracker, LoadedAsset, RequestToken,
};
pub use object_url::{ObjectUrlRegistry, UploadKind};
pub use texture::{ColorSpace, TextureHandle, TextureImage};

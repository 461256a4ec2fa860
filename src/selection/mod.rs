//! User selection of model, texture and sticker

pub mod state;
pub mod sticker;

pub use state::SelectionState;
pub use sticker::StickerTransform;

//! What the user has picked: model, texture override, sticker and its placement.

use crate::assets::catalog::{self, AssetRef};
use crate::core::config::ViewerConfig;

use super::sticker::StickerTransform;

/// Selection state driven by the keyboard bindings and file drops.
///
/// Option lists start from the catalog and only ever grow.
#[derive(Clone, Debug)]
pub struct SelectionState {
    models: Vec<AssetRef>,
    textures: Vec<AssetRef>,
    stickers: Vec<AssetRef>,
    selected_model: Option<String>,
    /// `None` uses the model's authored materials
    selected_texture: Option<String>,
    sticker: Option<AssetRef>,
    sticker_transform: StickerTransform,
    upload_serial: u64,
}

impl SelectionState {
    pub fn new(config: &ViewerConfig) -> Self {
        let models = catalog::from_entries(&config.models);
        let selected_model = models.first().map(|m| m.id.clone());
        Self {
            models,
            textures: catalog::from_entries(&config.textures),
            stickers: catalog::from_entries(&config.stickers),
            selected_model,
            selected_texture: None,
            sticker: None,
            sticker_transform: StickerTransform::default(),
            upload_serial: 0,
        }
    }

    pub fn models(&self) -> &[AssetRef] {
        &self.models
    }

    pub fn textures(&self) -> &[AssetRef] {
        &self.textures
    }

    pub fn stickers(&self) -> &[AssetRef] {
        &self.stickers
    }

    /// The selected model, or the first one if the selection is missing.
    pub fn effective_model(&self) -> Option<&AssetRef> {
        self.selected_model
            .as_deref()
            .and_then(|id| self.models.iter().find(|m| m.id == id))
            .or_else(|| self.models.first())
    }

    /// Active texture override, `None` for the authored materials
    pub fn active_texture(&self) -> Option<&AssetRef> {
        let id = self.selected_texture.as_deref()?;
        self.textures.iter().find(|t| t.id == id)
    }

    pub fn active_texture_id(&self) -> Option<&str> {
        self.active_texture().map(|t| t.id.as_str())
    }

    pub fn sticker(&self) -> Option<&AssetRef> {
        self.sticker.as_ref()
    }

    pub fn sticker_transform(&self) -> &StickerTransform {
        &self.sticker_transform
    }

    pub fn sticker_transform_mut(&mut self) -> &mut StickerTransform {
        &mut self.sticker_transform
    }

    /// Select a model by id. Unknown ids are ignored.
    pub fn select_model(&mut self, id: &str) -> bool {
        if self.models.iter().any(|m| m.id == id) {
            self.selected_model = Some(id.to_string());
            true
        } else {
            false
        }
    }

    /// Select a texture by id, or `None` for the model's own materials.
    pub fn select_texture(&mut self, id: Option<&str>) -> bool {
        match id {
            None => {
                self.selected_texture = None;
                true
            }
            Some(id) if self.textures.iter().any(|t| t.id == id) => {
                self.selected_texture = Some(id.to_string());
                true
            }
            Some(_) => false,
        }
    }

    /// Advance to the next model, wrapping around.
    pub fn select_next_model(&mut self) -> Option<&AssetRef> {
        let current = self.effective_model().map(|m| m.id.clone());
        let index = current
            .and_then(|id| self.models.iter().position(|m| m.id == id))
            .map_or(0, |i| (i + 1) % self.models.len().max(1));
        let next = self.models.get(index)?.id.clone();
        self.selected_model = Some(next);
        self.effective_model()
    }

    /// Advance through "model materials" followed by every texture.
    pub fn select_next_texture(&mut self) -> Option<&AssetRef> {
        let next = match self.active_texture_id() {
            None => self.textures.first().map(|t| t.id.clone()),
            Some(id) => {
                let i = self.textures.iter().position(|t| t.id == id).unwrap_or(0);
                self.textures.get(i + 1).map(|t| t.id.clone())
            }
        };
        self.selected_texture = next;
        self.active_texture()
    }

    /// Register an uploaded model and select it.
    pub fn add_model_upload(&mut self, name: &str, url: String) -> &AssetRef {
        let asset = self.new_upload(name, url);
        self.selected_model = Some(asset.id.clone());
        log::info!("Added model {} as {}", name, asset.id);
        self.models.push(asset);
        &self.models[self.models.len() - 1]
    }

    /// Register an uploaded texture and make it the active override.
    pub fn add_texture_upload(&mut self, name: &str, url: String) -> &AssetRef {
        let asset = self.new_upload(name, url);
        self.selected_texture = Some(asset.id.clone());
        log::info!("Added texture {} as {}", name, asset.id);
        self.textures.push(asset);
        &self.textures[self.textures.len() - 1]
    }

    /// Register an uploaded sticker image and apply it.
    pub fn add_sticker_upload(&mut self, name: &str, url: String) -> &AssetRef {
        let asset = self.new_upload(name, url);
        self.stickers.push(asset.clone());
        self.sticker.insert(asset)
    }

    pub fn set_sticker(&mut self, sticker: Option<AssetRef>) {
        self.sticker = sticker;
    }

    /// Remove the sticker. The transform is kept for the next one.
    pub fn clear_sticker(&mut self) {
        self.sticker = None;
    }

    /// Clear the sticker if one is applied, otherwise apply the first one offered.
    pub fn toggle_sticker(&mut self) -> Option<&AssetRef> {
        if self.sticker.is_some() {
            self.sticker = None;
        } else {
            self.sticker = self.stickers.first().cloned();
        }
        self.sticker.as_ref()
    }

    fn new_upload(&mut self, name: &str, url: String) -> AssetRef {
        self.upload_serial += 1;
        AssetRef::upload(catalog::upload_id(name, self.upload_serial), name, url)
    }
}

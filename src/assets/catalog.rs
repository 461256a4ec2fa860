//! Asset references shown to the selection layer.

use crate::core::config::CatalogEntry;

/// A selectable model, texture or sticker.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssetRef {
    /// Unique for the session
    pub id: String,
    pub name: String,
    pub url: String,
    /// True for uploads backed by an object URL
    pub is_local: bool,
}

impl AssetRef {
    pub fn builtin(entry: &CatalogEntry) -> Self {
        Self {
            id: entry.id.clone(),
            name: entry.name.clone(),
            url: entry.url.clone(),
            is_local: false,
        }
    }

    pub fn upload(id: String, name: &str, url: String) -> Self {
        Self {
            id,
            name: name.to_string(),
            url,
            is_local: true,
        }
    }
}

/// Build catalog references from config entries.
pub fn from_entries(entries: &[CatalogEntry]) -> Vec<AssetRef> {
    entries.iter().map(AssetRef::builtin).collect()
}

/// Id for the `serial`-th upload of a file called `name`.
///
/// `chair.glb` → `upload-chair-glb-1`. The serial keeps repeated uploads of
/// the same file apart.
pub fn upload_id(name: &str, serial: u64) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let slug = slug.trim_matches('-');
    let slug = if slug.is_empty() { "file" } else { slug };
    format!("upload-{}-{}", slug, serial)
}

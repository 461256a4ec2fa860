//! Temporary in-process handles for uploaded files.
//!
//! An upload's bytes are parked in one of three append-only pools and
//! addressed by a `blob:facet/<kind>/<n>` URL. Handles stay valid for the
//! whole session, even after their asset is deselected, and are revoked
//! together exactly once at teardown.

use std::sync::Arc;

use crate::core::{Error, Result};

/// URL scheme prefix of object URLs
pub const OBJECT_URL_PREFIX: &str = "blob:facet/";

/// Which pool an upload belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UploadKind {
    Model,
    Texture,
    Sticker,
}

impl UploadKind {
    pub const ALL: [UploadKind; 3] = [UploadKind::Model, UploadKind::Texture, UploadKind::Sticker];

    fn index(self) -> usize {
        match self {
            UploadKind::Model => 0,
            UploadKind::Texture => 1,
            UploadKind::Sticker => 2,
        }
    }

    fn segment(self) -> &'static str {
        match self {
            UploadKind::Model => "model",
            UploadKind::Texture => "texture",
            UploadKind::Sticker => "sticker",
        }
    }
}

struct PooledBlob {
    url: String,
    name: String,
    bytes: Arc<[u8]>,
}

/// Owner of every object URL created during the session.
pub struct ObjectUrlRegistry {
    pools: [Vec<PooledBlob>; 3],
    next_serial: u64,
    revoked: bool,
}

impl ObjectUrlRegistry {
    pub fn new() -> Self {
        Self {
            pools: [Vec::new(), Vec::new(), Vec::new()],
            next_serial: 1,
            revoked: false,
        }
    }

    /// Park `bytes` and return a fresh URL for them.
    pub fn create(&mut self, kind: UploadKind, name: &str, bytes: Vec<u8>) -> Result<String> {
        if self.revoked {
            return Err(Error::Asset(format!("cannot create object URL for {} after teardown", name)));
        }
        let url = format!("{}{}/{}", OBJECT_URL_PREFIX, kind.segment(), self.next_serial);
        self.next_serial += 1;
        log::debug!("Created {} for {} ({} bytes)", url, name, bytes.len());
        self.pools[kind.index()].push(PooledBlob {
            url: url.clone(),
            name: name.to_string(),
            bytes: bytes.into(),
        });
        Ok(url)
    }

    /// Bytes behind an object URL, `None` if unknown or revoked.
    pub fn resolve(&self, url: &str) -> Option<Arc<[u8]>> {
        if self.revoked || !is_object_url(url) {
            return None;
        }
        self.pools
            .iter()
            .flatten()
            .find(|blob| blob.url == url)
            .map(|blob| blob.bytes.clone())
    }

    /// Original file name of an upload
    pub fn name_of(&self, url: &str) -> Option<&str> {
        self.pools
            .iter()
            .flatten()
            .find(|blob| blob.url == url)
            .map(|blob| blob.name.as_str())
    }

    /// Number of live handles in one pool
    pub fn len(&self, kind: UploadKind) -> usize {
        if self.revoked { 0 } else { self.pools[kind.index()].len() }
    }

    pub fn is_empty(&self) -> bool {
        UploadKind::ALL.iter().all(|&k| self.len(k) == 0)
    }

    pub fn is_revoked(&self) -> bool {
        self.revoked
    }

    /// Invalidate every handle. Returns how many were revoked; a second call
    /// is a no-op returning 0.
    pub fn revoke_all(&mut self) -> usize {
        if self.revoked {
            return 0;
        }
        self.revoked = true;
        let mut count = 0;
        for pool in &mut self.pools {
            count += pool.len();
            pool.clear();
        }
        if count > 0 {
            log::info!("Revoked {} object URL(s)", count);
        }
        count
    }
}

impl Default for ObjectUrlRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ObjectUrlRegistry {
    fn drop(&mut self) {
        self.revoke_all();
    }
}

/// Whether `url` names an in-process upload
pub fn is_object_url(url: &str) -> bool {
    url.starts_with(OBJECT_URL_PREFIX)
}

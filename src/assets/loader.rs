//! Async asset load pipeline.
//!
//! Requests are resolved to a byte source on the frame thread (object URLs
//! live there), then decoded on a tokio worker. Each request carries the
//! [`RequestToken`] issued for its slot; the caller keeps the latest token per
//! slot and drops completions whose token is no longer current.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::runtime::Runtime;
use tokio::sync::mpsc;

use crate::core::{Error, Result};
use crate::scene::SceneGraph;

use super::builtin::{self, builtin_name};
use super::gltf_import;
use super::object_url::{ObjectUrlRegistry, is_object_url};
use super::texture::{TextureHandle, TextureImage};

/// Which selection a load feeds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LoadSlot {
    Model,
    Texture,
    Sticker,
}

impl LoadSlot {
    const fn index(self) -> usize {
        match self {
            LoadSlot::Model => 0,
            LoadSlot::Texture => 1,
            LoadSlot::Sticker => 2,
        }
    }
}

/// Identifies one issued load. Tokens only ever increase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestToken(pub u64);

/// Where the bytes of a URL come from.
#[derive(Clone, Debug)]
pub enum AssetSource {
    Builtin(String),
    Bytes(Arc<[u8]>),
    File(PathBuf),
}

impl AssetSource {
    /// Resolve a URL. Object URLs must still be live in `registry`.
    pub fn resolve(url: &str, registry: &ObjectUrlRegistry) -> Result<Self> {
        if let Some(name) = builtin_name(url) {
            return Ok(AssetSource::Builtin(name.to_string()));
        }
        if is_object_url(url) {
            return registry
                .resolve(url)
                .map(AssetSource::Bytes)
                .ok_or_else(|| Error::Asset(format!("object url {} is not live", url)));
        }
        if url.starts_with("http://") || url.starts_with("https://") {
            return Err(Error::Asset(format!("unsupported url scheme: {}", url)));
        }
        let path = url.strip_prefix("file://").unwrap_or(url);
        Ok(AssetSource::File(PathBuf::from(path)))
    }
}

/// A load handed to a backend.
#[derive(Clone, Debug)]
pub struct LoadRequest {
    pub slot: LoadSlot,
    pub token: RequestToken,
    pub url: String,
    pub source: AssetSource,
}

/// Decoded result of a load.
pub enum LoadedAsset {
    Model(SceneGraph),
    Image(TextureHandle),
}

impl std::fmt::Debug for LoadedAsset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadedAsset::Model(graph) => write!(f, "Model({} nodes)", graph.node_count()),
            LoadedAsset::Image(image) => write!(f, "Image({})", image.key),
        }
    }
}

/// A finished load, successful or not.
#[derive(Debug)]
pub struct LoadCompletion {
    pub slot: LoadSlot,
    pub token: RequestToken,
    pub url: String,
    pub result: Result<LoadedAsset>,
}

/// Hands out tokens and remembers the latest one per slot.
#[derive(Debug, Default)]
pub struct LoadTracker {
    next: u64,
    current: [Option<RequestToken>; 3],
}

impl LoadTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a token for `slot`, superseding any load in flight there.
    pub fn issue(&mut self, slot: LoadSlot) -> RequestToken {
        self.next += 1;
        let token = RequestToken(self.next);
        self.current[slot.index()] = Some(token);
        token
    }

    /// Forget the in-flight load for `slot`; its completion will be stale.
    pub fn cancel(&mut self, slot: LoadSlot) {
        self.current[slot.index()] = None;
    }

    pub fn is_current(&self, slot: LoadSlot, token: RequestToken) -> bool {
        self.current[slot.index()] == Some(token)
    }

    /// Accept a completion: true when it is current, which also clears the
    /// slot so a duplicate delivery is rejected.
    pub fn finish(&mut self, slot: LoadSlot, token: RequestToken) -> bool {
        if self.is_current(slot, token) {
            self.current[slot.index()] = None;
            true
        } else {
            false
        }
    }

    pub fn is_loading(&self, slot: LoadSlot) -> bool {
        self.current[slot.index()].is_some()
    }
}

/// Something that turns requests into completions.
pub trait LoadBackend {
    fn submit(&mut self, request: LoadRequest);

    /// Completions ready since the last call (non-blocking)
    fn drain(&mut self) -> Vec<LoadCompletion>;
}

/// Decode a request's bytes into an asset. Blocking.
pub fn load_blocking(slot: LoadSlot, url: &str, source: &AssetSource) -> Result<LoadedAsset> {
    match (slot, source) {
        (LoadSlot::Model, AssetSource::Builtin(name)) => builtin::model(name)
            .map(LoadedAsset::Model)
            .ok_or_else(|| Error::Asset(format!("unknown built-in model {}", url))),
        (LoadSlot::Model, AssetSource::Bytes(bytes)) => {
            gltf_import::import_slice(bytes, url).map(LoadedAsset::Model)
        }
        (LoadSlot::Model, AssetSource::File(path)) => {
            gltf_import::import_file(path, url).map(LoadedAsset::Model)
        }
        (_, AssetSource::Builtin(name)) => builtin::image(name)
            .map(|image| LoadedAsset::Image(Arc::new(image)))
            .ok_or_else(|| Error::Asset(format!("unknown built-in image {}", url))),
        (_, AssetSource::Bytes(bytes)) => {
            TextureImage::decode(url, bytes).map(|image| LoadedAsset::Image(Arc::new(image)))
        }
        (_, AssetSource::File(path)) => {
            let bytes = std::fs::read(path)?;
            TextureImage::decode(url, &bytes).map(|image| LoadedAsset::Image(Arc::new(image)))
        }
    }
}

/// Loads on a dedicated tokio runtime. Completions are polled each frame.
pub struct AsyncLoader {
    result_tx: mpsc::UnboundedSender<LoadCompletion>,
    result_rx: mpsc::UnboundedReceiver<LoadCompletion>,
    runtime: Runtime,
    in_flight: usize,
}

impl AsyncLoader {
    pub fn new() -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("facet-loader")
            .enable_all()
            .build()?;
        let (result_tx, result_rx) = mpsc::unbounded_channel();
        Ok(Self {
            result_tx,
            result_rx,
            runtime,
            in_flight: 0,
        })
    }

    /// Number of submitted loads not yet drained
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    async fn run(request: LoadRequest) -> LoadCompletion {
        let LoadRequest { slot, token, url, source } = request;
        let source = match source {
            // Read on the async side so only decoding occupies a blocking thread
            AssetSource::File(path) if slot != LoadSlot::Model => match tokio::fs::read(&path).await {
                Ok(bytes) => Ok(AssetSource::Bytes(bytes.into())),
                Err(e) => Err(Error::Io(e)),
            },
            other => Ok(other),
        };
        let task_url = url.clone();
        let result = match source {
            Ok(source) => {
                tokio::task::spawn_blocking(move || load_blocking(slot, &task_url, &source))
                    .await
                    .unwrap_or_else(|e| Err(Error::Asset(format!("load task failed: {}", e))))
            }
            Err(e) => Err(e),
        };
        LoadCompletion { slot, token, url, result }
    }
}

impl LoadBackend for AsyncLoader {
    fn submit(&mut self, request: LoadRequest) {
        log::debug!("Loading {:?} {} ({:?})", request.slot, request.url, request.token);
        let tx = self.result_tx.clone();
        self.in_flight += 1;
        self.runtime.spawn(async move {
            let completion = Self::run(request).await;
            // Receiver gone means the viewer shut down
            let _ = tx.send(completion);
        });
    }

    fn drain(&mut self) -> Vec<LoadCompletion> {
        let mut out = Vec::new();
        while let Ok(completion) = self.result_rx.try_recv() {
            self.in_flight = self.in_flight.saturating_sub(1);
            out.push(completion);
        }
        out
    }
}

/// Loads synchronously at submit time. For tools and tests.
#[derive(Default)]
pub struct ImmediateLoader {
    ready: Vec<LoadCompletion>,
}

impl ImmediateLoader {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LoadBackend for ImmediateLoader {
    fn submit(&mut self, request: LoadRequest) {
        let result = load_blocking(request.slot, &request.url, &request.source);
        self.ready.push(LoadCompletion {
            slot: request.slot,
            token: request.token,
            url: request.url,
            result,
        });
    }

    fn drain(&mut self) -> Vec<LoadCompletion> {
        std::mem::take(&mut self.ready)
    }
}

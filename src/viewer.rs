//! Single-threaded viewer state machine.
//!
//! The frame loop owns a [`Viewer`] and calls [`Viewer::update`] once per
//! frame. Selection changes issue loads, completions are drained from the
//! backend, the current model is patched, faded, spun and decaled. Nothing
//! here touches the GPU; the renderer reads the results.

use glam::Mat4;

use crate::assets::loader::{
    AssetSource, LoadBackend, LoadCompletion, LoadRequest, LoadSlot, LoadTracker, LoadedAsset,
};
use crate::assets::object_url::{ObjectUrlRegistry, UploadKind};
use crate::assets::texture::{TextureHandle, TextureImage};
use crate::boundary::{BoundaryKey, BoundaryState, FailureBoundary};
use crate::core::config::ViewerConfig;
use crate::core::{Error, Result};
use crate::decal::{DecalMesh, DecalTarget, project};
use crate::material::{MaterialPatcher, OriginalTextures, crossfade, dissolve_noise};
use crate::scene::{Normalization, SceneGraph, normalize};
use crate::selection::{SelectionState, StickerTransform};

/// What the window shows for the model slot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ViewStatus {
    Loading,
    Ready,
    Failed(String),
}

/// State of the texture override.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TextureStatus {
    /// Using the model's authored materials
    None,
    Loading,
    Ready,
    /// Load failed; rendering as if there were no override
    Failed(String),
}

/// The current model and everything derived from it.
pub struct LoadedModel {
    pub url: String,
    pub graph: SceneGraph,
    pub normalization: Normalization,
    pub originals: OriginalTextures,
    pub patcher: MaterialPatcher,
    pub decal_target: Option<DecalTarget>,
}

pub struct Viewer<B: LoadBackend> {
    config: ViewerConfig,
    selection: SelectionState,
    registry: ObjectUrlRegistry,
    backend: B,
    tracker: LoadTracker,
    boundary: FailureBoundary,
    noise: TextureHandle,
    fallback: TextureHandle,

    model: Option<LoadedModel>,
    model_revision: u64,
    normalize_runs: usize,

    active_texture: Option<TextureHandle>,
    texture_status: TextureStatus,

    sticker_image: Option<TextureHandle>,
    decal: Option<DecalMesh>,
    decal_dirty: bool,
    decal_revision: u64,
    decal_transform: StickerTransform,

    // What the last sync issued, to detect identity changes
    issued_model: Option<String>,
    issued_texture: Option<(String, String)>,
    issued_sticker: Option<String>,

    spin_angle: f32,
    spin_paused: bool,
}

impl<B: LoadBackend> Viewer<B> {
    pub fn new(config: ViewerConfig, backend: B) -> Self {
        let selection = SelectionState::new(&config);
        let noise = dissolve_noise(config.noise_size, config.noise_seed);
        let key = BoundaryKey::new(
            selection.effective_model().map(|m| m.url.clone()).unwrap_or_default(),
            None,
        );
        Self {
            selection,
            registry: ObjectUrlRegistry::new(),
            backend,
            tracker: LoadTracker::new(),
            boundary: FailureBoundary::new(key),
            noise,
            fallback: TextureImage::fallback(),
            model: None,
            model_revision: 0,
            normalize_runs: 0,
            active_texture: None,
            texture_status: TextureStatus::None,
            sticker_image: None,
            decal: None,
            decal_dirty: false,
            decal_revision: 0,
            decal_transform: StickerTransform::default(),
            issued_model: None,
            issued_texture: None,
            issued_sticker: None,
            spin_angle: 0.0,
            spin_paused: false,
            config,
        }
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    /// Mutate the selection. Loads are issued on the next [`Viewer::sync`]
    /// or [`Viewer::update`].
    pub fn selection_mut(&mut self) -> &mut SelectionState {
        &mut self.selection
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn registry(&self) -> &ObjectUrlRegistry {
        &self.registry
    }

    /// Park an uploaded file behind an object URL and select it.
    /// Returns the id of the new option.
    pub fn upload(&mut self, kind: UploadKind, name: &str, bytes: Vec<u8>) -> Result<String> {
        let url = self.registry.create(kind, name, bytes)?;
        let id = match kind {
            UploadKind::Model => self.selection.add_model_upload(name, url).id.clone(),
            UploadKind::Texture => self.selection.add_texture_upload(name, url).id.clone(),
            UploadKind::Sticker => self.selection.add_sticker_upload(name, url).id.clone(),
        };
        self.sync();
        Ok(id)
    }

    /// One frame: commit finished loads, react to selection changes, advance
    /// fades and spin, rebuild the decal if needed.
    pub fn update(&mut self, dt: f32) {
        for completion in self.backend.drain() {
            self.handle_completion(completion);
        }
        self.sync();

        if let Some(model) = &mut self.model {
            let running = crossfade::advance(model.patcher.states_mut(), dt, self.config.fade_duration);
            if running > 0 {
                log::trace!("{} material fade(s) running", running);
            }
        }
        if !self.spin_paused {
            self.spin_angle = crossfade::advance_spin(self.spin_angle, dt, self.config.idle_spin);
        }

        if *self.selection.sticker_transform() != self.decal_transform {
            self.decal_transform = *self.selection.sticker_transform();
            self.decal_dirty = true;
        }
        if self.decal_dirty {
            self.rebuild_decal();
        }
    }

    /// Compare the selection with what was last issued and start loads for
    /// whatever changed.
    pub fn sync(&mut self) {
        let model_url = self.selection.effective_model().map(|m| m.url.clone());
        let texture = self
            .selection
            .active_texture()
            .map(|t| (t.id.clone(), t.url.clone()));
        let sticker_url = self.selection.sticker().map(|s| s.url.clone());

        let key = BoundaryKey::new(
            model_url.clone().unwrap_or_default(),
            texture.as_ref().map(|(id, _)| id.as_str()),
        );
        if self.boundary.observe(key) && self.model.is_none() {
            // Leaving the failed state is the user's retry
            self.issued_model = None;
        }

        if model_url != self.issued_model {
            self.issued_model = model_url.clone();
            self.start_model_load(model_url);
        }
        if texture != self.issued_texture {
            self.issued_texture = texture.clone();
            self.start_texture_load(texture.map(|(_, url)| url));
        }
        if sticker_url != self.issued_sticker {
            self.issued_sticker = sticker_url.clone();
            self.start_sticker_load(sticker_url);
        }
    }

    fn start_model_load(&mut self, url: Option<String>) {
        if self.model.take().is_some() {
            self.model_revision += 1;
            self.decal_dirty = true;
        }
        let Some(url) = url else {
            self.tracker.cancel(LoadSlot::Model);
            return;
        };
        log::info!("Loading model {}", url);
        self.submit(LoadSlot::Model, url);
    }

    fn start_texture_load(&mut self, url: Option<String>) {
        // Provisional clear: fall back to the authored maps until the new one lands
        self.active_texture = None;
        if let Some(model) = &mut self.model {
            model.patcher.apply_texture(&model.originals, None);
        }
        match url {
            Some(url) => {
                log::info!("Loading texture {}", url);
                self.texture_status = TextureStatus::Loading;
                self.submit(LoadSlot::Texture, url);
            }
            None => {
                self.tracker.cancel(LoadSlot::Texture);
                self.texture_status = TextureStatus::None;
            }
        }
    }

    fn start_sticker_load(&mut self, url: Option<String>) {
        self.sticker_image = None;
        self.decal_dirty = true;
        match url {
            Some(url) => {
                log::info!("Loading sticker {}", url);
                self.submit(LoadSlot::Sticker, url);
            }
            None => self.tracker.cancel(LoadSlot::Sticker),
        }
    }

    fn submit(&mut self, slot: LoadSlot, url: String) {
        let token = self.tracker.issue(slot);
        match AssetSource::resolve(&url, &self.registry) {
            Ok(source) => self.backend.submit(LoadRequest { slot, token, url, source }),
            // Unresolvable URLs fail the same way a load would
            Err(e) => {
                self.handle_completion(LoadCompletion { slot, token, url, result: Err(e) });
            }
        }
    }

    /// Commit a finished load. Completions for superseded requests are
    /// dropped; returns whether this one was committed.
    pub fn handle_completion(&mut self, completion: LoadCompletion) -> bool {
        let LoadCompletion { slot, token, url, result } = completion;
        if !self.tracker.finish(slot, token) {
            log::debug!("Discarding stale {:?} load of {} ({:?})", slot, url, token);
            return false;
        }
        match (slot, result) {
            (LoadSlot::Model, Ok(LoadedAsset::Model(graph))) => {
                if let Some(graph) = self.boundary.guard(|| check_renderable(&url, graph)) {
                    self.install_model(url, graph);
                }
            }
            (LoadSlot::Model, Ok(LoadedAsset::Image(_))) => {
                self.boundary.fail(format!("{} is an image, not a model", url));
            }
            (LoadSlot::Model, Err(e)) => self.boundary.fail(e.to_string()),

            (LoadSlot::Texture, Ok(LoadedAsset::Image(image))) => {
                log::info!("Texture {} ready ({}x{})", url, image.width, image.height);
                if let Some(model) = &mut self.model {
                    model.patcher.apply_texture(&model.originals, Some(&image));
                }
                self.active_texture = Some(image);
                self.texture_status = TextureStatus::Ready;
            }
            (LoadSlot::Texture, result) => {
                let reason = load_failure_reason(result);
                log::warn!("Texture {} failed, using model materials: {}", url, reason);
                self.texture_status = TextureStatus::Failed(reason);
            }

            (LoadSlot::Sticker, Ok(LoadedAsset::Image(image))) => {
                if !image.has_alpha() {
                    log::debug!("Sticker {} has no transparent texels", url);
                }
                self.sticker_image = Some(image);
                self.decal_dirty = true;
            }
            (LoadSlot::Sticker, result) => {
                let reason = load_failure_reason(result);
                log::warn!("Sticker {} failed, showing none: {}", url, reason);
                self.sticker_image = None;
                self.decal_dirty = true;
            }
        }
        true
    }

    fn install_model(&mut self, url: String, mut graph: SceneGraph) {
        let normalization = normalize(&mut graph, self.config.normalize_size);
        self.normalize_runs += 1;

        let originals = OriginalTextures::capture(&graph);
        let mut patcher = MaterialPatcher::new(self.noise.clone(), self.fallback.clone());
        let report = patcher.patch(&mut graph, &originals, self.active_texture.as_ref());
        let decal_target = DecalTarget::find(&graph);
        if decal_target.is_none() {
            log::debug!("{} has no decal target", url);
        }
        log::info!(
            "Model {} ready: {} node(s), {} material(s) patched, scale {:.3}",
            url,
            graph.node_count(),
            report.installed,
            normalization.scale
        );

        self.model = Some(LoadedModel {
            url,
            graph,
            normalization,
            originals,
            patcher,
            decal_target,
        });
        self.model_revision += 1;
        self.decal_dirty = true;
    }

    fn rebuild_decal(&mut self) {
        self.decal_dirty = false;
        let decal = match (&self.model, &self.sticker_image) {
            (Some(model), Some(_)) => model.decal_target.and_then(|target| {
                let primitive = target.primitive(&model.graph)?;
                project(primitive, target.instance.world, self.selection.sticker_transform())
            }),
            _ => None,
        };
        if decal.is_some() || self.decal.is_some() {
            self.decal_revision += 1;
        }
        self.decal = decal;
    }

    pub fn status(&self) -> ViewStatus {
        match self.boundary.state() {
            BoundaryState::Failed { reason } => ViewStatus::Failed(reason.clone()),
            BoundaryState::Healthy if self.model.is_some() => ViewStatus::Ready,
            BoundaryState::Healthy => ViewStatus::Loading,
        }
    }

    pub fn texture_status(&self) -> &TextureStatus {
        &self.texture_status
    }

    /// The current model, hidden while the boundary is failed.
    pub fn model(&self) -> Option<&LoadedModel> {
        if self.boundary.is_failed() { None } else { self.model.as_ref() }
    }

    pub fn active_texture(&self) -> Option<&TextureHandle> {
        self.active_texture.as_ref()
    }

    pub fn sticker_image(&self) -> Option<&TextureHandle> {
        self.sticker_image.as_ref()
    }

    pub fn decal(&self) -> Option<&DecalMesh> {
        if self.boundary.is_failed() { None } else { self.decal.as_ref() }
    }

    pub fn noise(&self) -> &TextureHandle {
        &self.noise
    }

    pub fn fallback(&self) -> &TextureHandle {
        &self.fallback
    }

    /// Bumped whenever the model is replaced or dropped
    pub fn model_revision(&self) -> u64 {
        self.model_revision
    }

    /// Bumped whenever the decal geometry changes
    pub fn decal_revision(&self) -> u64 {
        self.decal_revision
    }

    pub fn normalize_runs(&self) -> usize {
        self.normalize_runs
    }

    /// Idle rotation applied on top of the framed model
    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_rotation_y(self.spin_angle)
    }

    pub fn spin_angle(&self) -> f32 {
        self.spin_angle
    }

    pub fn toggle_spin(&mut self) -> bool {
        self.spin_paused = !self.spin_paused;
        !self.spin_paused
    }

    /// Release every object URL. Safe to call more than once.
    pub fn teardown(&mut self) -> usize {
        self.registry.revoke_all()
    }
}

/// A model needs at least one triangle to frame and draw.
fn check_renderable(url: &str, graph: SceneGraph) -> Result<SceneGraph> {
    let has_triangles = graph.mesh_instances().iter().any(|instance| {
        graph
            .mesh(instance.mesh)
            .is_some_and(|mesh| mesh.primitives.iter().any(|p| p.triangles().next().is_some()))
    });
    if has_triangles {
        Ok(graph)
    } else {
        Err(Error::Asset(format!("{} has nothing to draw", url)))
    }
}

fn load_failure_reason(result: Result<LoadedAsset>) -> String {
    match result {
        Ok(LoadedAsset::Model(_)) => "expected an image, got a model".to_string(),
        Ok(LoadedAsset::Image(_)) => "unexpected image".to_string(),
        Err(e) => e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::gltf_import::tests::triangle_glb;
    use crate::assets::loader::{ImmediateLoader, load_blocking};
    use crate::core::config::CatalogEntry;
    use glam::Vec3;

    /// Holds requests until a test completes them by hand.
    #[derive(Default)]
    struct ManualBackend {
        requests: Vec<LoadRequest>,
    }

    impl LoadBackend for ManualBackend {
        fn submit(&mut self, request: LoadRequest) {
            self.requests.push(request);
        }

        fn drain(&mut self) -> Vec<LoadCompletion> {
            Vec::new()
        }
    }

    fn complete(request: &LoadRequest) -> LoadCompletion {
        LoadCompletion {
            slot: request.slot,
            token: request.token,
            url: request.url.clone(),
            result: load_blocking(request.slot, &request.url, &request.source),
        }
    }

    fn immediate() -> Viewer<ImmediateLoader> {
        let mut viewer = Viewer::new(ViewerConfig::default(), ImmediateLoader::new());
        viewer.update(0.0);
        viewer
    }

    fn settle<B: LoadBackend>(viewer: &mut Viewer<B>) {
        for _ in 0..4 {
            viewer.update(0.5);
        }
    }

    #[test]
    fn test_initial_model_loads() {
        let mut viewer = immediate();
        viewer.update(0.0);
        assert_eq!(viewer.status(), ViewStatus::Ready);
        let model = viewer.model().unwrap();
        assert_eq!(model.url, "builtin:cube");
        let bounds = model.graph.bounds().unwrap();
        assert!((bounds.max_extent() - 2.4).abs() < 1e-4);
        assert!(bounds.center().length() < 1e-4);
        assert_eq!(viewer.texture_status(), &TextureStatus::None);
    }

    #[test]
    fn test_upload_chair_selects_and_normalizes_once() {
        let mut viewer = immediate();
        viewer.update(0.0);
        let runs_before = viewer.normalize_runs();

        let id = viewer.upload(UploadKind::Model, "chair.glb", triangle_glb(2, 3.0)).unwrap();
        assert_eq!(id, "upload-chair-glb-1");
        assert_eq!(viewer.selection().effective_model().unwrap().id, id);
        assert_eq!(viewer.selection().models().len(), 3);

        for _ in 0..3 {
            viewer.update(0.016);
        }
        assert_eq!(viewer.status(), ViewStatus::Ready);
        assert_eq!(viewer.normalize_runs(), runs_before + 1);
        let extent = viewer.model().unwrap().graph.bounds().unwrap().max_extent();
        assert!((extent - 2.4).abs() < 1e-4);

        let again = viewer.upload(UploadKind::Model, "chair.glb", triangle_glb(1, 0.0)).unwrap();
        assert_ne!(again, id);
    }

    #[test]
    fn test_stale_texture_discarded() {
        let mut viewer = Viewer::new(ViewerConfig::default(), ManualBackend::default());
        viewer.sync();
        let model_request = viewer.backend_mut().requests.remove(0);
        assert!(viewer.handle_completion(complete(&model_request)));

        viewer.selection_mut().select_texture(Some("brushed-metal"));
        viewer.sync();
        viewer.selection_mut().select_texture(Some("uv-grid"));
        viewer.sync();

        let requests = std::mem::take(&mut viewer.backend_mut().requests);
        assert_eq!(requests.len(), 2);
        let (metal, grid) = (&requests[0], &requests[1]);
        assert_eq!(metal.url, "builtin:brushed-metal");

        assert!(viewer.handle_completion(complete(grid)));
        // Brushed Metal resolves late and must not win
        assert!(!viewer.handle_completion(complete(metal)));
        assert_eq!(viewer.active_texture().unwrap().key, "builtin:uv-grid");
        let model = viewer.model().unwrap();
        for (_, state) in model.patcher.states() {
            assert_eq!(state.next_map.key, "builtin:uv-grid");
        }
    }

    #[test]
    fn test_stale_failure_also_discarded() {
        let mut viewer = Viewer::new(ViewerConfig::default(), ManualBackend::default());
        viewer.selection_mut().select_texture(Some("checker"));
        viewer.sync();
        let stale = viewer
            .backend_mut()
            .requests
            .iter()
            .find(|r| r.slot == LoadSlot::Texture)
            .cloned()
            .unwrap();
        viewer.selection_mut().select_texture(None);
        viewer.sync();
        let failed = LoadCompletion {
            slot: stale.slot,
            token: stale.token,
            url: stale.url.clone(),
            result: Err(Error::Asset("network".into())),
        };
        assert!(!viewer.handle_completion(failed));
        assert_eq!(viewer.texture_status(), &TextureStatus::None);
    }

    #[test]
    fn test_texture_change_fades_then_settles() {
        let mut viewer = immediate();
        viewer.update(0.0);
        viewer.selection_mut().select_texture(Some("checker"));
        viewer.update(0.0);
        viewer.update(0.0);
        assert_eq!(viewer.texture_status(), &TextureStatus::Ready);
        {
            let model = viewer.model().unwrap();
            let (_, state) = model.patcher.states().next().unwrap();
            assert_eq!(state.next_map.key, "builtin:checker");
            assert_eq!(state.transition_progress, 0.0);
        }
        viewer.update(0.4);
        viewer.update(0.4);
        let model = viewer.model().unwrap();
        let (_, state) = model.patcher.states().next().unwrap();
        assert_eq!(state.transition_progress, 1.0);
    }

    #[test]
    fn test_round_trip_a_b_a() {
        let mut viewer = immediate();
        for id in ["uv-grid", "checker", "uv-grid"] {
            viewer.selection_mut().select_texture(Some(id));
            viewer.update(0.0);
            viewer.update(0.1);
        }
        settle(&mut viewer);
        let model = viewer.model().unwrap();
        for (_, state) in model.patcher.states() {
            assert_eq!(state.next_map.key, "builtin:uv-grid");
            assert_eq!(state.transition_progress, 1.0);
            assert_eq!(state.blend_factor, 1.0);
        }
    }

    #[test]
    fn test_patch_installs_once_per_material() {
        let mut viewer = immediate();
        viewer.update(0.0);
        viewer.selection_mut().select_texture(Some("checker"));
        settle(&mut viewer);
        viewer.selection_mut().select_texture(None);
        settle(&mut viewer);
        let model = viewer.model().unwrap();
        assert_eq!(model.patcher.install_count(), model.graph.materials().len());
        // Untextured built-ins get the default PBR parameters
        assert_eq!(model.graph.materials()[0].roughness, Some(0.6));
    }

    #[test]
    fn test_texture_failure_degrades() {
        let mut viewer = immediate();
        viewer.update(0.0);
        viewer.upload(UploadKind::Texture, "broken.png", b"not a png".to_vec()).unwrap();
        viewer.update(0.0);
        assert!(matches!(viewer.texture_status(), TextureStatus::Failed(_)));
        assert!(viewer.active_texture().is_none());
        assert_eq!(viewer.status(), ViewStatus::Ready);
    }

    #[test]
    fn test_sticker_applied_and_cleared() {
        let mut viewer = immediate();
        viewer.update(0.0);
        viewer.selection_mut().toggle_sticker();
        viewer.update(0.0);
        viewer.update(0.0);
        assert!(viewer.sticker_image().is_some());
        let decal = viewer.decal().expect("decal on cube face");
        assert!(decal.triangle_count() > 0);

        let transform = *viewer.selection().sticker_transform();
        viewer.selection_mut().clear_sticker();
        viewer.update(0.0);
        assert!(viewer.decal().is_none());
        assert!(viewer.sticker_image().is_none());
        assert_eq!(*viewer.selection().sticker_transform(), transform);
        assert_eq!(viewer.status(), ViewStatus::Ready);
    }

    #[test]
    fn test_sticker_failure_shows_none() {
        let mut viewer = immediate();
        viewer.update(0.0);
        viewer.upload(UploadKind::Sticker, "broken.png", b"not a png".to_vec()).unwrap();
        viewer.update(0.0);
        assert!(viewer.selection().sticker().is_some());
        assert!(viewer.sticker_image().is_none());
        assert!(viewer.decal().is_none());
        assert_eq!(viewer.status(), ViewStatus::Ready);
    }

    #[test]
    fn test_stale_sticker_discarded() {
        let mut viewer = Viewer::new(ViewerConfig::default(), ManualBackend::default());
        viewer.sync();
        let model_request = viewer.backend_mut().requests.remove(0);
        assert!(viewer.handle_completion(complete(&model_request)));

        viewer.upload(UploadKind::Sticker, "broken.png", b"not a png".to_vec()).unwrap();
        let star = viewer.selection().stickers().first().cloned();
        viewer.selection_mut().set_sticker(star);
        viewer.sync();

        let requests = std::mem::take(&mut viewer.backend_mut().requests);
        assert_eq!(requests.len(), 2);
        let (broken, star) = (&requests[0], &requests[1]);
        assert_eq!(star.url, "builtin:sticker-star");

        assert!(viewer.handle_completion(complete(star)));
        // The broken upload fails late and must not clear the star
        assert!(!viewer.handle_completion(complete(broken)));
        viewer.update(0.0);
        assert_eq!(viewer.sticker_image().unwrap().key, "builtin:sticker-star");
        assert!(viewer.decal().is_some());
        assert_eq!(viewer.status(), ViewStatus::Ready);
    }

    #[test]
    fn test_decal_rebuilt_on_transform_change_only() {
        let mut viewer = immediate();
        viewer.selection_mut().toggle_sticker();
        settle(&mut viewer);
        let revision = viewer.decal_revision();
        viewer.update(0.016);
        assert_eq!(viewer.decal_revision(), revision);
        viewer.selection_mut().sticker_transform_mut().nudge(Vec3::X * 0.1);
        viewer.update(0.016);
        assert!(viewer.decal_revision() > revision);
    }

    #[test]
    fn test_bad_model_fails_then_recovers() {
        let mut config = ViewerConfig::default();
        config.models.insert(0, CatalogEntry::new("missing", "Missing", "/no/such/model.glb"));
        let mut viewer = Viewer::new(config, ImmediateLoader::new());
        viewer.update(0.0);
        viewer.update(0.0);
        assert!(matches!(viewer.status(), ViewStatus::Failed(_)));
        assert!(viewer.model().is_none());

        // Same key: stays failed, no retry
        viewer.update(0.0);
        assert!(matches!(viewer.status(), ViewStatus::Failed(_)));

        viewer.selection_mut().select_model("cube");
        viewer.update(0.0);
        viewer.update(0.0);
        assert_eq!(viewer.status(), ViewStatus::Ready);
    }

    #[test]
    fn test_empty_model_trips_boundary() {
        let mut viewer = Viewer::new(ViewerConfig::default(), ManualBackend::default());
        viewer.sync();
        let request = viewer.backend_mut().requests.remove(0);
        let completion = LoadCompletion {
            slot: request.slot,
            token: request.token,
            url: request.url,
            result: Ok(LoadedAsset::Model(SceneGraph::new())),
        };
        assert!(viewer.handle_completion(completion));
        assert!(matches!(viewer.status(), ViewStatus::Failed(_)));
    }

    #[test]
    fn test_remote_url_fails_model() {
        let mut config = ViewerConfig::default();
        config.models = vec![CatalogEntry::new("remote", "Remote", "https://example.com/a.glb")];
        let mut viewer = Viewer::new(config, ImmediateLoader::new());
        viewer.update(0.0);
        assert!(matches!(viewer.status(), ViewStatus::Failed(reason) if reason.contains("unsupported")));
    }

    #[test]
    fn test_model_change_replaces_handle() {
        let mut viewer = immediate();
        viewer.update(0.0);
        let revision = viewer.model_revision();
        viewer.selection_mut().select_next_model();
        viewer.sync();
        viewer.update(0.0);
        assert_eq!(viewer.model().unwrap().url, "builtin:sphere");
        assert!(viewer.model_revision() > revision);
    }

    #[test]
    fn test_spin_advances_and_pauses() {
        let mut viewer = immediate();
        viewer.update(1.0);
        assert!((viewer.spin_angle() - 0.15).abs() < 1e-5);
        viewer.toggle_spin();
        viewer.update(1.0);
        assert!((viewer.spin_angle() - 0.15).abs() < 1e-5);
    }

    #[test]
    fn test_teardown_revokes_uploads_once() {
        let mut viewer = immediate();
        viewer.upload(UploadKind::Texture, "a.png", vec![0; 4]).unwrap();
        viewer.upload(UploadKind::Sticker, "b.png", vec![0; 4]).unwrap();
        assert_eq!(viewer.teardown(), 2);
        assert_eq!(viewer.teardown(), 0);
        assert!(viewer.registry().is_revoked());
    }
}

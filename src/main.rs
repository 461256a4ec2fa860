//! Facet - interactive model viewer
//!
//! Usage:
//!   cargo run --release -- [--config <viewer.json>] [--model <file.glb>]
//!                          [--texture <image>] [--sticker <image>]
//!
//! Controls:
//!   Left drag / wheel - Orbit / zoom
//!   M - Next model
//!   T - Next texture (wraps through "none")
//!   S - Toggle sticker
//!   Arrows - Move sticker (Shift: depth)
//!   Q / E - Rotate sticker
//!   + / - - Resize sticker
//!   R - Reset sticker
//!   Space - Pause idle spin
//!   Drop a file - .glb/.gltf as model, images as texture (Shift: sticker)
//!   Escape - Exit

use std::path::{Path, PathBuf};
use std::sync::Arc;

use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::KeyCode,
    window::{Window, WindowId},
};

use facet::assets::catalog::AssetRef;
use facet::assets::loader::AsyncLoader;
use facet::assets::object_url::UploadKind;
use facet::core::{
    Error, Result, Vec3,
    camera::Camera,
    camera_controller::OrbitCameraController,
    config::{CatalogEntry, ViewerConfig},
    input::InputState,
    logging,
    time::FrameTimer,
};
use facet::render::{GpuContext, Renderer};
use facet::{ViewStatus, Viewer};

/// Sticker movement per key press, in model units
const NUDGE_STEP: f32 = 0.05;
/// Sticker rotation per key press, in degrees
const ROTATE_STEP: f32 = 5.0;
const GROW_STEP: f32 = 0.05;
/// Frames between window title refreshes
const TITLE_INTERVAL: u64 = 30;

struct Args {
    config: Option<PathBuf>,
    model: Option<PathBuf>,
    texture: Option<PathBuf>,
    sticker: Option<PathBuf>,
}

impl Args {
    fn parse() -> Self {
        let args: Vec<String> = std::env::args().collect();
        let value = |flag: &str| {
            args.iter()
                .position(|a| a == flag)
                .and_then(|i| args.get(i + 1))
                .map(PathBuf::from)
        };
        Self {
            config: value("--config"),
            model: value("--model"),
            texture: value("--texture"),
            sticker: value("--sticker"),
        }
    }

    fn load_config(&self) -> Result<ViewerConfig> {
        let mut config = match &self.config {
            Some(path) => ViewerConfig::load(path)?,
            None => ViewerConfig::default(),
        };
        if let Some(path) = &self.model {
            config.models.insert(0, path_entry("cli-model", path));
        }
        if let Some(path) = &self.texture {
            config.textures.insert(0, path_entry("cli-texture", path));
        }
        if let Some(path) = &self.sticker {
            config.stickers.insert(0, path_entry("cli-sticker", path));
        }
        Ok(config)
    }
}

fn path_entry(id: &str, path: &Path) -> CatalogEntry {
    let name = file_name(path);
    CatalogEntry::new(id, &name, &path.to_string_lossy())
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

/// Upload kind for a dropped file, by extension
fn dropped_kind(path: &Path, shift: bool) -> Option<UploadKind> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    match extension.as_str() {
        "glb" | "gltf" => Some(UploadKind::Model),
        "png" | "jpg" | "jpeg" if shift => Some(UploadKind::Sticker),
        "png" | "jpg" | "jpeg" => Some(UploadKind::Texture),
        _ => None,
    }
}

struct ViewerState {
    viewer: Viewer<AsyncLoader>,
    renderer: Renderer,
    camera: Camera,
    camera_controller: OrbitCameraController,
    input: InputState,
    timer: FrameTimer,
}

impl ViewerState {
    fn new(gpu: &GpuContext, viewer: Viewer<AsyncLoader>) -> Self {
        let (width, height) = gpu.size();
        let camera_controller = OrbitCameraController::new(5.0);
        let mut camera = Camera::new(camera_controller.eye(), 45.0, width as f32 / height.max(1) as f32);
        camera_controller.apply(&mut camera);
        Self {
            viewer,
            renderer: Renderer::new(gpu),
            camera,
            camera_controller,
            input: InputState::new(),
            timer: FrameTimer::new(),
        }
    }

    fn handle_keys(&mut self, event_loop: &ActiveEventLoop) {
        let input = &self.input;
        if input.is_key_just_pressed(KeyCode::Escape) {
            event_loop.exit();
            return;
        }

        let selection = self.viewer.selection_mut();
        if input.is_key_just_pressed(KeyCode::KeyM) {
            if let Some(model) = selection.select_next_model() {
                log::info!("Model: {}", model.name);
            }
        }
        if input.is_key_just_pressed(KeyCode::KeyT) {
            match selection.select_next_texture() {
                Some(texture) => log::info!("Texture: {}", texture.name),
                None => log::info!("Texture: none"),
            }
        }
        if input.is_key_just_pressed(KeyCode::KeyS) {
            match selection.toggle_sticker() {
                Some(sticker) => log::info!("Sticker: {}", sticker.name),
                None => log::info!("Sticker: none"),
            }
        }

        let transform = selection.sticker_transform_mut();
        let depth = input.shift_held();
        let mut nudge = Vec3::ZERO;
        if input.is_key_just_pressed(KeyCode::ArrowLeft) {
            nudge.x -= NUDGE_STEP;
        }
        if input.is_key_just_pressed(KeyCode::ArrowRight) {
            nudge.x += NUDGE_STEP;
        }
        if input.is_key_just_pressed(KeyCode::ArrowUp) {
            if depth { nudge.z -= NUDGE_STEP } else { nudge.y += NUDGE_STEP }
        }
        if input.is_key_just_pressed(KeyCode::ArrowDown) {
            if depth { nudge.z += NUDGE_STEP } else { nudge.y -= NUDGE_STEP }
        }
        if nudge != Vec3::ZERO {
            transform.nudge(nudge);
        }
        if input.is_key_just_pressed(KeyCode::KeyQ) {
            transform.rotate(Vec3::new(0.0, 0.0, ROTATE_STEP));
        }
        if input.is_key_just_pressed(KeyCode::KeyE) {
            transform.rotate(Vec3::new(0.0, 0.0, -ROTATE_STEP));
        }
        if input.is_key_just_pressed(KeyCode::Equal) || input.is_key_just_pressed(KeyCode::NumpadAdd) {
            transform.grow(GROW_STEP);
        }
        if input.is_key_just_pressed(KeyCode::Minus) || input.is_key_just_pressed(KeyCode::NumpadSubtract) {
            transform.grow(-GROW_STEP);
        }
        if input.is_key_just_pressed(KeyCode::KeyR) {
            transform.reset();
        }

        if input.is_key_just_pressed(KeyCode::Space) {
            let spinning = self.viewer.toggle_spin();
            log::info!("Idle spin {}", if spinning { "on" } else { "paused" });
        }
    }

    fn upload_dropped(&mut self, path: &Path) {
        let Some(kind) = dropped_kind(path, self.input.shift_held()) else {
            log::warn!("Ignoring dropped file {}: unrecognised type", path.display());
            return;
        };
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                log::error!("Failed to read {}: {}", path.display(), e);
                return;
            }
        };
        match self.viewer.upload(kind, &file_name(path), bytes) {
            Ok(id) => log::info!("Uploaded {} as {}", path.display(), id),
            Err(e) => log::error!("Upload of {} failed: {}", path.display(), e),
        }
    }

    fn title(&self) -> String {
        let model = self
            .viewer
            .selection()
            .effective_model()
            .map(|m| m.name.as_str())
            .unwrap_or("no model");
        match self.viewer.status() {
            ViewStatus::Loading => format!("Facet - {} (loading)", model),
            ViewStatus::Ready => format!("Facet - {} - {:.0} fps", model, self.timer.fps()),
            ViewStatus::Failed(reason) => format!("Facet - failed to display {}: {}", model, reason),
        }
    }
}

struct App {
    args: Args,
    window: Option<Arc<Window>>,
    gpu: Option<GpuContext>,
    state: Option<ViewerState>,
}

impl App {
    fn new(args: Args) -> Self {
        Self {
            args,
            window: None,
            gpu: None,
            state: None,
        }
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let config = self.args.load_config()?;
        let has_texture = self.args.texture.is_some();
        let has_sticker = self.args.sticker.is_some();

        let window = event_loop
            .create_window(
                Window::default_attributes()
                    .with_title(config.window.title.clone())
                    .with_inner_size(PhysicalSize::new(config.window.width, config.window.height)),
            )
            .map_err(|e| Error::Window(e.to_string()))?;
        let window = Arc::new(window);
        self.window = Some(window.clone());

        let gpu = pollster::block_on(GpuContext::new(window))?;
        let mut viewer = Viewer::new(config, AsyncLoader::new()?);
        if has_texture {
            viewer.selection_mut().select_texture(Some("cli-texture"));
        }
        if has_sticker {
            let sticker: Option<AssetRef> = viewer.selection().stickers().first().cloned();
            viewer.selection_mut().set_sticker(sticker);
        }
        viewer.sync();

        self.state = Some(ViewerState::new(&gpu, viewer));
        self.gpu = Some(gpu);
        Ok(())
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let (Some(gpu), Some(state)) = (&mut self.gpu, &mut self.state) else {
            return;
        };

        state.timer.tick();
        state.handle_keys(event_loop);
        state.camera_controller.update(&mut state.camera, &state.input);
        state.input.end_frame();

        state.viewer.update(state.timer.delta_secs());
        state.renderer.prepare(gpu, &state.viewer);

        let background = state.viewer.config().background;
        match state
            .renderer
            .render(gpu, &state.camera, state.viewer.model_matrix(), background)
        {
            Ok(()) => {}
            Err(e) => {
                log::warn!("Frame skipped: {}", e);
                gpu.reconfigure();
            }
        }

        if state.timer.frame_count() % TITLE_INTERVAL == 0 {
            if let Some(window) = &self.window {
                window.set_title(&state.title());
            }
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }
        if let Err(e) = self.init(event_loop) {
            log::error!("Failed to start viewer: {}", e);
            event_loop.exit();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        if let Some(state) = &mut self.state {
            state.input.process_event(&event);
        }

        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested");
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                if let (Some(gpu), Some(state)) = (&mut self.gpu, &mut self.state) {
                    gpu.resize(size.width, size.height);
                    state.renderer.resize(gpu);
                    state.camera.set_aspect(size.width as f32, size.height as f32);
                }
            }
            WindowEvent::DroppedFile(path) => {
                if let Some(state) = &mut self.state {
                    state.upload_dropped(&path);
                }
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(state) = &mut self.state {
            let revoked = state.viewer.teardown();
            log::info!("Released {} object URL(s)", revoked);
        }
    }
}

fn main() -> Result<()> {
    logging::init();
    log::info!("Facet starting...");

    let event_loop = EventLoop::new().map_err(|e| Error::Window(e.to_string()))?;
    let mut app = App::new(Args::parse());
    event_loop
        .run_app(&mut app)
        .map_err(|e| Error::Window(e.to_string()))
}

use std::path::PathBuf;
use std::sync::Arc;
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Fullscreen, Window, WindowAttributes, WindowId};

use crate::clock::FrameClock;
use crate::gpu::{GpuContext, GpuError};
use crate::input::{Action, Input};
use crate::mesh::{DEFAULT_CYLINDER_SEGMENTS, MeshError};
use crate::render::LitPass;
use crate::scene::SceneState;
use crate::shader_source::DEFAULT_MAX_SHADER_BYTES;
use crate::texture::{Texture, TextureKind};

/// Configuration for the demo window and its assets.
///
/// The defaults reproduce the stock demo; paths are relative to the working
/// directory.
#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// WGSL file holding the shading stage.
    pub shader_path: PathBuf,
    /// Color texture applied to the cylinder.
    pub texture_path: PathBuf,
    /// Tangent-space normal map applied to the cylinder.
    pub normalmap_path: PathBuf,
    /// Shader files larger than this are refused.
    pub max_shader_bytes: usize,
    pub cylinder_segments: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "normalmap".to_string(),
            width: 640,
            height: 480,
            shader_path: PathBuf::from("shaders/normalmap.wgsl"),
            texture_path: PathBuf::from("data/texture.png"),
            normalmap_path: PathBuf::from("data/normalmap.png"),
            max_shader_bytes: DEFAULT_MAX_SHADER_BYTES,
            cylinder_segments: DEFAULT_CYLINDER_SEGMENTS,
        }
    }
}

impl AppConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn shader_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.shader_path = path.into();
        self
    }

    /// Sets the color texture and normal map.
    pub fn textures(mut self, color: impl Into<PathBuf>, normal_map: impl Into<PathBuf>) -> Self {
        self.texture_path = color.into();
        self.normalmap_path = normal_map.into();
        self
    }

    pub fn max_shader_bytes(mut self, max: usize) -> Self {
        self.max_shader_bytes = max;
        self
    }

    pub fn cylinder_segments(mut self, segments: u32) -> Self {
        self.cylinder_segments = segments;
        self
    }
}

/// Failures that stop the demo.
#[derive(Debug)]
pub enum AppError {
    /// The event loop could not be created or failed while running.
    EventLoop(winit::error::EventLoopError),
    /// The window could not be created.
    Window(winit::error::OsError),
    /// GPU initialization failed.
    Gpu(GpuError),
    /// The mesh could not be built.
    Mesh(MeshError),
    /// The surface ran out of memory mid-run.
    Surface(wgpu::SurfaceError),
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::EventLoop(e) => write!(f, "event loop error: {}", e),
            AppError::Window(e) => write!(f, "couldn't create window: {}", e),
            AppError::Gpu(e) => write!(f, "GPU error: {}", e),
            AppError::Mesh(e) => write!(f, "mesh error: {}", e),
            AppError::Surface(e) => write!(f, "surface error: {}", e),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::EventLoop(e) => Some(e),
            AppError::Window(e) => Some(e),
            AppError::Gpu(e) => Some(e),
            AppError::Mesh(e) => Some(e),
            AppError::Surface(e) => Some(e),
        }
    }
}

impl From<winit::error::EventLoopError> for AppError {
    fn from(e: winit::error::EventLoopError) -> Self {
        AppError::EventLoop(e)
    }
}

impl From<winit::error::OsError> for AppError {
    fn from(e: winit::error::OsError) -> Self {
        AppError::Window(e)
    }
}

impl From<GpuError> for AppError {
    fn from(e: GpuError) -> Self {
        AppError::Gpu(e)
    }
}

impl From<MeshError> for AppError {
    fn from(e: MeshError) -> Self {
        AppError::Mesh(e)
    }
}

/// Run the demo until the window is closed or Escape is pressed.
///
/// The mesh is built before any window appears, so a bad segment count fails
/// fast.
///
/// # Example
/// ```no_run
/// normalmap::run(normalmap::AppConfig::new().cylinder_segments(60))
///     .expect("demo failed");
/// ```
pub fn run(config: AppConfig) -> Result<(), AppError> {
    let scene = SceneState::with_cylinder(config.cylinder_segments)?;
    log::info!(
        "built cylinder: {} faces, {} vertices",
        scene.object.face_count(),
        scene.object.len()
    );

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = NormalMapApp::Pending {
        config,
        scene: Some(scene),
    };
    event_loop.run_app(&mut app)?;

    match app {
        NormalMapApp::Failed(e) => Err(e),
        _ => Ok(()),
    }
}

/// Everything alive while the window is open.
struct Running {
    window: Arc<Window>,
    gpu: GpuContext,
    pass: LitPass,
    scene: SceneState,
    input: Input,
    clock: FrameClock,
}

impl Running {
    fn start(
        event_loop: &ActiveEventLoop,
        config: &AppConfig,
        scene: SceneState,
    ) -> Result<Self, AppError> {
        let window_attrs = WindowAttributes::default()
            .with_title(&config.title)
            .with_inner_size(winit::dpi::LogicalSize::new(config.width, config.height))
            .with_resizable(false);

        let window = Arc::new(event_loop.create_window(window_attrs)?);
        let gpu = GpuContext::new(window.clone())?;

        let color = Texture::load(&gpu, &config.texture_path, TextureKind::Color);
        let normal_map = Texture::load(&gpu, &config.normalmap_path, TextureKind::Data);
        let pass = LitPass::new(
            &gpu,
            &scene,
            color,
            normal_map,
            &config.shader_path,
            config.max_shader_bytes,
        );
        if !pass.has_shading_stage() {
            log::warn!("no shading stage; only the lights will be drawn");
        }

        window.request_redraw();

        Ok(Self {
            window,
            gpu,
            pass,
            scene,
            input: Input::new(),
            clock: FrameClock::new(),
        })
    }

    fn apply(&mut self, action: Action, event_loop: &ActiveEventLoop) {
        match action {
            Action::Quit => event_loop.exit(),
            Action::ToggleWireframe => {
                self.scene.toggle_wireframe();
            }
            Action::ToggleFullscreen => {
                let fullscreen = match self.window.fullscreen() {
                    Some(_) => None,
                    None => Some(Fullscreen::Borderless(None)),
                };
                log::info!(
                    "fullscreen {}",
                    if fullscreen.is_some() { "on" } else { "off" }
                );
                self.window.set_fullscreen(fullscreen);
            }
        }
    }

    /// Advances and draws one frame. Only an out-of-memory surface is fatal.
    fn redraw(&mut self) -> Result<(), AppError> {
        let dt = self.clock.tick();
        self.scene.animate(dt);
        self.pass.check_reload(&self.gpu);

        match self.pass.render(&self.gpu, &self.scene) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::debug!("surface lost, reconfiguring");
                self.gpu.reconfigure();
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                return Err(AppError::Surface(wgpu::SurfaceError::OutOfMemory));
            }
            Err(e) => log::warn!("skipping frame: {}", e),
        }

        self.window.request_redraw();
        Ok(())
    }
}

enum NormalMapApp {
    Pending {
        config: AppConfig,
        scene: Option<SceneState>,
    },
    Running(Running),
    Failed(AppError),
}

impl NormalMapApp {
    fn fail(&mut self, event_loop: &ActiveEventLoop, error: AppError) {
        *self = NormalMapApp::Failed(error);
        event_loop.exit();
    }
}

impl ApplicationHandler for NormalMapApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let NormalMapApp::Pending { config, scene } = self else {
            return;
        };
        let Some(scene) = scene.take() else {
            return;
        };

        match Running::start(event_loop, config, scene) {
            Ok(running) => *self = NormalMapApp::Running(running),
            Err(e) => self.fail(event_loop, e),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let NormalMapApp::Running(running) = self else {
            return;
        };

        if let Some(action) = running.input.handle_event(&event) {
            running.apply(action, event_loop);
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                running.gpu.resize(size.width, size.height);
            }
            WindowEvent::RedrawRequested => {
                if let Err(e) = running.redraw() {
                    self.fail(event_loop, e);
                }
            }
            _ => {}
        }
    }
}

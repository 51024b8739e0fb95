//! Core GPU context and device management.
//!
//! This module provides [`GpuContext`], the struct that holds the wgpu
//! resources every render pass needs: the surface, device, queue and surface
//! configuration, plus the [`Capabilities`] the adapter reported.
//!
//! # Initialization
//!
//! A `GpuContext` is created from a winit [`Window`]. Everything that can fail
//! here (no surface, no adapter, no device, a missing required capability) is
//! fatal for the demo and surfaces as a [`GpuError`].
//!
//! # Capabilities
//!
//! Optional features are queried from the adapter and requested only if
//! present. The renderer asks [`Capabilities`] before using them instead of
//! assuming they exist:
//!
//! ```ignore
//! if gpu.capabilities.polygon_mode_line {
//!     // build the wireframe pipeline
//! }
//! ```
//!
//! [`Window`]: winit::window::Window

use std::sync::Arc;
use winit::window::Window;

use crate::shading::LitVertex;

/// Errors that can occur while bringing up the GPU.
#[derive(Debug)]
pub enum GpuError {
    /// The window surface could not be created.
    Surface(wgpu::CreateSurfaceError),
    /// No adapter is compatible with the surface.
    Adapter(wgpu::RequestAdapterError),
    /// The logical device could not be created.
    Device(wgpu::RequestDeviceError),
    /// The adapter lacks something the renderer cannot work without.
    MissingCapability(String),
}

impl std::fmt::Display for GpuError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GpuError::Surface(e) => write!(f, "couldn't create surface: {}", e),
            GpuError::Adapter(e) => write!(f, "couldn't find a suitable GPU adapter: {}", e),
            GpuError::Device(e) => write!(f, "couldn't create device: {}", e),
            GpuError::MissingCapability(what) => write!(f, "missing GPU capability: {}", what),
        }
    }
}

impl std::error::Error for GpuError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GpuError::Surface(e) => Some(e),
            GpuError::Adapter(e) => Some(e),
            GpuError::Device(e) => Some(e),
            GpuError::MissingCapability(_) => None,
        }
    }
}

/// What the adapter can do, as far as the renderer cares.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Capabilities {
    /// Polygons can be rasterized as outlines (`PolygonMode::Line`).
    pub polygon_mode_line: bool,
    /// Vertex attributes available to a single pipeline.
    pub max_vertex_attributes: u32,
}

impl Capabilities {
    /// Reads the capabilities from adapter features and limits.
    pub fn from_adapter(features: wgpu::Features, limits: &wgpu::Limits) -> Self {
        Self {
            polygon_mode_line: features.contains(wgpu::Features::POLYGON_MODE_LINE),
            max_vertex_attributes: limits.max_vertex_attributes,
        }
    }

    /// Fails if the lit vertex layout does not fit.
    pub fn require(&self) -> Result<(), GpuError> {
        if self.max_vertex_attributes < LitVertex::ATTRIBUTE_COUNT {
            return Err(GpuError::MissingCapability(format!(
                "{} vertex attributes (adapter supports {})",
                LitVertex::ATTRIBUTE_COUNT,
                self.max_vertex_attributes
            )));
        }
        Ok(())
    }

    /// Optional features to request from the device.
    pub fn features(&self) -> wgpu::Features {
        if self.polygon_mode_line {
            wgpu::Features::POLYGON_MODE_LINE
        } else {
            wgpu::Features::empty()
        }
    }
}

/// Core GPU context holding wgpu resources.
///
/// All fields are public to allow direct access to wgpu APIs when needed.
/// The context is created once at startup and passed by reference to the
/// renderer.
pub struct GpuContext {
    /// The surface for presenting rendered frames to the window.
    pub surface: wgpu::Surface<'static>,
    /// The logical GPU device for creating resources and pipelines.
    pub device: wgpu::Device,
    /// The command queue for submitting work to the GPU.
    pub queue: wgpu::Queue,
    /// Current surface configuration (format, size, present mode).
    pub config: wgpu::SurfaceConfiguration,
    /// Optional features that were found and enabled.
    pub capabilities: Capabilities,
}

impl GpuContext {
    /// Create a new GPU context from a winit window.
    ///
    /// 1. Creates a wgpu instance with primary backends (Vulkan, Metal, DX12)
    /// 2. Creates a surface for the window
    /// 3. Requests a suitable GPU adapter and checks its capabilities
    /// 4. Creates the logical device and command queue
    /// 5. Configures the surface with an sRGB format and Fifo present mode
    pub fn new(window: Arc<Window>) -> Result<Self, GpuError> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(window).map_err(GpuError::Surface)?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::default(),
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .map_err(GpuError::Adapter)?;

        let info = adapter.get_info();
        log::info!("using adapter {} ({:?})", info.name, info.backend);

        let capabilities = Capabilities::from_adapter(adapter.features(), &adapter.limits());
        capabilities.require()?;
        if !capabilities.polygon_mode_line {
            log::warn!("adapter has no line polygon mode; wireframe will render solid");
        }

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("Normalmap Device"),
            required_features: capabilities.features(),
            required_limits: wgpu::Limits::default(),
            memory_hints: Default::default(),
            trace: Default::default(),
            experimental_features: Default::default(),
        }))
        .map_err(GpuError::Device)?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or_else(|| GpuError::MissingCapability("a presentable surface format".into()))?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            capabilities,
        })
    }

    /// Resize the surface to new dimensions.
    ///
    /// Ignores zero-sized dimensions (which can occur during window minimize).
    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.config.width = width;
            self.config.height = height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    /// Reapplies the current configuration after the surface was lost.
    pub fn reconfigure(&self) {
        self.surface.configure(&self.device, &self.config);
    }

    /// Returns the current surface width in pixels.
    pub fn width(&self) -> u32 {
        self.config.width
    }

    /// Returns the current surface height in pixels.
    pub fn height(&self) -> u32 {
        self.config.height
    }

    /// Returns the current aspect ratio (width / height).
    pub fn aspect(&self) -> f32 {
        self.config.width as f32 / self.config.height as f32
    }
}

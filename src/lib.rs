//! # normalmap
//!
//! **Per-pixel lighting of a textured cylinder through a tangent-space normal map.**
//!
//! Three colored point lights orbit a cylinder while the camera turns around
//! it. Every vertex carries a tangent-space basis, built once from the quad
//! mesh; every frame the light vectors are moved into that space and handed to
//! the shading stage as per-vertex attributes, where they are lit against the
//! normal map texel by texel.
//!
//! ## Quick Start
//!
//! ```no_run
//! use normalmap::*;
//!
//! fn main() -> Result<(), AppError> {
//!     run(AppConfig::new().title("bricks").textures("bricks.png", "bricks_n.png"))
//! }
//! ```
//!
//! ## Controls
//!
//! - **Escape**: quit
//! - **W**: toggle wireframe
//! - **F**: toggle borderless fullscreen
//!
//! The shading stage lives in `shaders/normalmap.wgsl` and is reloaded when the
//! file is saved.
//!
//! ## Layout
//!
//! The CPU side ([`math`], [`mesh`], [`tangent`], [`light`], [`shading`],
//! [`scene`]) has no GPU dependency and is what the unit tests exercise. The
//! GPU side ([`gpu`], [`texture`], [`render`]) and the window loop (`app`) sit
//! on top of it.

mod app;
pub mod camera;
pub mod clock;
pub mod gpu;
mod input;
pub mod light;
pub mod math;
pub mod mesh;
pub mod render;
pub mod scene;
pub mod shader_source;
pub mod shading;
pub mod tangent;
pub mod texture;

pub use app::{AppConfig, AppError, run};
pub use camera::{CameraAngles, Projection};
pub use clock::FrameClock;
pub use gpu::{Capabilities, GpuContext, GpuError};
pub use input::{Action, Input};
pub use light::{LIGHT_COUNT, Light, LightRig};
pub use math::{Basis, cross, dot, normalize, transform_by_basis};
pub use mesh::{MeshError, Object, Vertex};
pub use render::{LitPass, MarkerVertex, SceneUniforms};
pub use scene::{FillMode, SceneState};
pub use shader_source::{ShaderError, ShaderFile};
pub use shading::{AttributeSink, LitVertex, LitVertexBuffer, emit_object};
pub use tangent::compute_tangent_bases;
pub use texture::{Texture, TextureKind};

// Re-export glam math types for convenience
pub use glam::{Mat4, Vec2, Vec3, Vec4};

//! All mutable demo state in one place.
//!
//! [`SceneState`] is owned by the event loop and handed to the animation and
//! render steps each frame. Nothing here touches the GPU, so the whole frame
//! update can be driven from tests.

use crate::camera::CameraAngles;
use crate::light::LightRig;
use crate::mesh::{MeshError, Object};

/// How polygons are rasterized.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FillMode {
    #[default]
    Solid,
    Wireframe,
}

impl FillMode {
    pub fn toggled(self) -> Self {
        match self {
            FillMode::Solid => FillMode::Wireframe,
            FillMode::Wireframe => FillMode::Solid,
        }
    }
}

/// The mesh, lights, camera orientation and fill mode.
#[derive(Clone, Debug)]
pub struct SceneState {
    pub object: Object,
    pub lights: LightRig,
    pub camera: CameraAngles,
    pub fill_mode: FillMode,
}

impl SceneState {
    /// Builds a scene around `object`, whose tangent bases must already be computed.
    pub fn new(object: Object) -> Self {
        Self {
            object,
            lights: LightRig::new(),
            camera: CameraAngles::new(),
            fill_mode: FillMode::default(),
        }
    }

    /// The demo scene: a cylinder with `segments` faces.
    pub fn with_cylinder(segments: u32) -> Result<Self, MeshError> {
        Ok(Self::new(Object::cylinder(segments)?))
    }

    /// Advances the camera and every light by `dt` time units.
    pub fn animate(&mut self, dt: f32) {
        self.camera.advance(dt);
        self.lights.animate(dt);
    }

    /// Flips between solid and wireframe rendering, returning the new mode.
    pub fn toggle_wireframe(&mut self) -> FillMode {
        self.fill_mode = self.fill_mode.toggled();
        log::info!("fill mode: {:?}", self.fill_mode);
        self.fill_mode
    }
}

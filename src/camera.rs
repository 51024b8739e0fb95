use glam::{Mat4, Vec3};

/// Distance from the eye to the scene origin.
pub const EYE_DISTANCE: f32 = 5.0;

/// Yaw speed in degrees per time unit.
pub const YAW_SPEED: f32 = 1.0;

/// Orientation of the scene relative to a fixed eye, as Euler angles in degrees.
///
/// The eye sits [`EYE_DISTANCE`] units in front of the origin looking down -Z;
/// the angles rotate the scene around the X, Y and Z axes in that order. Only
/// the yaw is animated.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CameraAngles {
    pub pitch: f32,
    pub yaw: f32,
    pub roll: f32,
}

impl CameraAngles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spins the scene around the vertical axis.
    pub fn advance(&mut self, dt: f32) {
        self.yaw += YAW_SPEED * dt;
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_translation(Vec3::new(0.0, 0.0, -EYE_DISTANCE))
            * Mat4::from_rotation_x(self.pitch.to_radians())
            * Mat4::from_rotation_y(self.yaw.to_radians())
            * Mat4::from_rotation_z(self.roll.to_radians())
    }
}

/// Perspective projection parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projection {
    /// Vertical field of view in radians.
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Projection {
    fn default() -> Self {
        Self {
            fov_y: std::f32::consts::FRAC_PI_4,
            near: 0.1,
            far: 200.0,
        }
    }
}

impl Projection {
    /// Right-handed perspective matrix with a `0..1` depth range.
    pub fn matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, aspect, self.near, self.far)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_yaw_advances() {
        let mut angles = CameraAngles::new();
        angles.advance(3.0);
        angles.advance(1.5);
        assert_eq!(angles.yaw, 4.5);
        assert_eq!(angles.pitch, 0.0);
        assert_eq!(angles.roll, 0.0);
    }

    #[test]
    fn rest_view_is_a_pull_back() {
        let view = CameraAngles::new().view_matrix();
        let p = view.transform_point3(Vec3::new(0.0, 0.0, 0.0));
        assert_eq!(p, Vec3::new(0.0, 0.0, -5.0));
    }

    #[test]
    fn yaw_rotates_about_the_vertical_axis() {
        let angles = CameraAngles {
            yaw: 90.0,
            ..Default::default()
        };
        let p = angles.view_matrix().transform_point3(Vec3::X);
        // +X swings to -Z before the pull-back is applied.
        assert!((p - Vec3::new(0.0, 0.0, -6.0)).length() < 1e-5);
    }

    #[test]
    fn projection_maps_near_and_far_planes() {
        let proj = Projection::default().matrix(640.0 / 480.0);
        let near = proj.project_point3(Vec3::new(0.0, 0.0, -0.1));
        let far = proj.project_point3(Vec3::new(0.0, 0.0, -200.0));
        assert!(near.z.abs() < 1e-4);
        assert!((far.z - 1.0).abs() < 1e-4);
    }
}

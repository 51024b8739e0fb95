//! The three animated point lights.
//!
//! Each [`Light`] orbits the cylinder on a circle of radius 1.5 while bobbing
//! up and down. Its position is never integrated: it is recomputed every step
//! from two phase angles, `rotation` (around the Y axis) and `height`
//! (vertical oscillation).
//!
//! Time steps are measured in 100 ms units, see [`crate::clock`].

use std::f32::consts::PI;

use glam::{Vec3, Vec4};

/// Number of lights; one tangent-space attribute slot per light.
pub const LIGHT_COUNT: usize = 3;

/// Radius of the orbit in the XZ plane.
pub const ORBIT_RADIUS: f32 = 1.5;

/// Orbital speed in radians per time unit (5° per 100 ms).
pub const ROTATION_SPEED: f32 = PI / 180.0 * 5.0;

/// Vertical oscillation speed in radians per time unit.
pub const HEIGHT_SPEED: f32 = 0.2;

/// Half the edge length of the cube drawn at each light.
pub const MARKER_HALF_SIZE: f32 = 0.025;

/// A colored point light.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Light {
    /// RGBA color.
    pub color: Vec4,
    position: Vec3,
    /// Orbital phase in radians.
    pub rotation: f32,
    /// Vertical phase in radians.
    pub height: f32,
}

impl Light {
    fn new(color: Vec4, position: Vec3, rotation: f32, height: f32) -> Self {
        Self {
            color,
            position,
            rotation,
            height,
        }
    }

    /// World-space position as of the last animation step.
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// The position of a light with the given phases.
    pub fn position_for(rotation: f32, height: f32) -> Vec3 {
        Vec3::new(
            rotation.cos() * ORBIT_RADIUS,
            height.sin(),
            rotation.sin() * ORBIT_RADIUS,
        )
    }

    /// Advances both phases by `dt` and rederives the position.
    pub fn animate(&mut self, dt: f32) {
        self.rotation += ROTATION_SPEED * dt;
        self.height += HEIGHT_SPEED * dt;
        self.position = Self::position_for(self.rotation, self.height);
    }

    /// Corners of the small marker cube at the light, as six quads.
    #[rustfmt::skip]
    pub fn marker_quads(&self) -> [Vec3; 24] {
        let p = self.position;
        let s = MARKER_HALF_SIZE;
        let v = |x: f32, y: f32, z: f32| p + Vec3::new(x, y, z);
        [
            // front (+Z)
            v(-s,  s,  s), v(-s, -s,  s), v( s, -s,  s), v( s,  s,  s),
            // back (-Z)
            v(-s,  s, -s), v(-s, -s, -s), v( s, -s, -s), v( s,  s, -s),
            // left (-X)
            v(-s,  s, -s), v(-s, -s, -s), v(-s, -s,  s), v(-s,  s,  s),
            // right (+X)
            v( s,  s,  s), v( s, -s,  s), v( s, -s, -s), v( s,  s, -s),
            // bottom (-Y)
            v(-s, -s,  s), v(-s, -s, -s), v( s, -s, -s), v( s, -s,  s),
            // top (+Y)
            v( s,  s,  s), v( s,  s, -s), v(-s,  s, -s), v(-s,  s,  s),
        ]
    }
}

/// The fixed red, green and blue lights of the scene.
#[derive(Clone, Debug, PartialEq)]
pub struct LightRig {
    lights: [Light; LIGHT_COUNT],
}

impl Default for LightRig {
    fn default() -> Self {
        Self::new()
    }
}

impl LightRig {
    /// Lights at their starting phases: red at 0, green at 0.75π, blue at 1.5π.
    ///
    /// Until the first animation step the green and blue lights sit at
    /// `(-1.5, 0, 0)`.
    pub fn new() -> Self {
        Self {
            lights: [
                Light::new(
                    Vec4::new(1.0, 0.0, 0.0, 1.0),
                    Vec3::new(ORBIT_RADIUS, 0.0, 0.0),
                    0.0,
                    0.0,
                ),
                Light::new(
                    Vec4::new(0.0, 1.0, 0.0, 1.0),
                    Vec3::new(-ORBIT_RADIUS, 0.0, 0.0),
                    PI * 0.75,
                    PI * 0.75,
                ),
                Light::new(
                    Vec4::new(0.0, 0.0, 1.0, 1.0),
                    Vec3::new(-ORBIT_RADIUS, 0.0, 0.0),
                    PI * 1.5,
                    PI * 1.5,
                ),
            ],
        }
    }

    /// Advances every light by `dt`.
    pub fn animate(&mut self, dt: f32) {
        for light in &mut self.lights {
            light.animate(dt);
        }
    }

    pub fn lights(&self) -> &[Light; LIGHT_COUNT] {
        &self.lights
    }

    pub fn iter(&self) -> impl Iterator<Item = &Light> {
        self.lights.iter()
    }

    /// Light colors in slot order, laid out for a uniform buffer.
    pub fn colors(&self) -> [[f32; 4]; LIGHT_COUNT] {
        self.lights.map(|l| l.color.to_array())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    fn close(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < EPS
    }

    #[test]
    fn initial_rig() {
        let rig = LightRig::new();
        let [red, green, blue] = rig.lights();

        assert_eq!(red.color, Vec4::new(1.0, 0.0, 0.0, 1.0));
        assert_eq!(green.color, Vec4::new(0.0, 1.0, 0.0, 1.0));
        assert_eq!(blue.color, Vec4::new(0.0, 0.0, 1.0, 1.0));

        assert_eq!(red.position(), Vec3::new(1.5, 0.0, 0.0));
        assert_eq!(green.position(), Vec3::new(-1.5, 0.0, 0.0));
        assert_eq!(blue.position(), Vec3::new(-1.5, 0.0, 0.0));

        assert_eq!((red.rotation, red.height), (0.0, 0.0));
        assert_eq!(green.rotation, PI * 0.75);
        assert_eq!(green.height, PI * 0.75);
        assert_eq!(blue.rotation, PI * 1.5);
        assert_eq!(blue.height, PI * 1.5);
    }

    #[test]
    fn position_is_a_function_of_phases() {
        assert!(close(Light::position_for(0.0, 0.0), Vec3::new(1.5, 0.0, 0.0)));
        assert!(close(
            Light::position_for(PI / 2.0, PI / 2.0),
            Vec3::new(0.0, 1.0, 1.5)
        ));
    }

    #[test]
    fn unit_step_from_rest() {
        let mut rig = LightRig::new();
        rig.animate(1.0);

        let red = rig.lights()[0];
        let rotation = PI / 180.0 * 5.0;
        assert!((red.rotation - rotation).abs() < EPS);
        assert!((red.height - 0.2).abs() < EPS);
        assert!(close(
            red.position(),
            Vec3::new(rotation.cos() * 1.5, 0.2f32.sin(), rotation.sin() * 1.5)
        ));
    }

    #[test]
    fn lights_advance_independently() {
        let mut rig = LightRig::new();
        rig.animate(2.5);

        for (light, start) in rig.iter().zip([0.0, PI * 0.75, PI * 1.5]) {
            assert!((light.rotation - (start + ROTATION_SPEED * 2.5)).abs() < EPS);
            assert!((light.height - (start + HEIGHT_SPEED * 2.5)).abs() < EPS);
            assert!(close(
                light.position(),
                Light::position_for(light.rotation, light.height)
            ));
        }
    }

    #[test]
    fn animation_is_linear_in_dt() {
        for dt in [0.0, 0.37, 1.0, 16.0] {
            let mut twice = LightRig::new();
            twice.animate(dt);
            twice.animate(dt);

            let mut once = LightRig::new();
            once.animate(2.0 * dt);

            for (a, b) in twice.iter().zip(once.iter()) {
                assert!((a.rotation - b.rotation).abs() < 1e-4);
                assert!((a.height - b.height).abs() < 1e-4);
                assert!((a.position() - b.position()).length() < 1e-4);
            }
        }
    }

    #[test]
    fn zero_step_snaps_position_to_phases() {
        let mut rig = LightRig::new();
        rig.animate(0.0);
        let green = rig.lights()[1];
        assert!(close(green.position(), Light::position_for(PI * 0.75, PI * 0.75)));
    }

    #[test]
    fn marker_is_a_cube_around_the_light() {
        let light = LightRig::new().lights()[0];
        let corners = light.marker_quads();
        for c in corners {
            let d = c - light.position();
            assert!((d.abs() - Vec3::splat(MARKER_HALF_SIZE)).length() < EPS);
        }
        // Every face keeps one axis constant.
        for face in corners.chunks_exact(4) {
            let constant_axes = (0..3)
                .filter(|&axis| face.iter().all(|p| p[axis] == face[0][axis]))
                .count();
            assert_eq!(constant_axes, 1);
        }
    }

    #[test]
    fn colors_in_slot_order() {
        assert_eq!(
            LightRig::new().colors(),
            [
                [1.0, 0.0, 0.0, 1.0],
                [0.0, 1.0, 0.0, 1.0],
                [0.0, 0.0, 1.0, 1.0]
            ]
        );
    }
}

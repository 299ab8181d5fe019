use std::f32::consts::PI;

use serde::{Deserialize, Serialize};

use crate::math::Matrix4;

/// Polled rotation angles of one input source, in radians.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rotation {
    pub phi: f32,
    pub theta: f32,
}

impl Rotation {
    pub const fn new(phi: f32, theta: f32) -> Self {
        Self { phi, theta }
    }
}

/// Projection constants, recomputed into a matrix every frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionParams {
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
    /// When set, used instead of the framebuffer aspect ratio.
    pub fixed_aspect: Option<f32>,
}

impl Default for ProjectionParams {
    fn default() -> Self {
        Self {
            fov_y: PI / 3.0,
            near: 0.1,
            far: 100.0,
            fixed_aspect: None,
        }
    }
}

impl ProjectionParams {
    /// Aspect ratio for a framebuffer of the given size.
    ///
    /// A minimised window reports a zero height; 1.0 is used then.
    pub fn aspect_for(&self, width: u32, height: u32) -> f32 {
        match self.fixed_aspect {
            Some(aspect) => aspect,
            None if height == 0 => 1.0,
            None => width as f32 / height as f32,
        }
    }

    pub fn matrix(&self, aspect: f32) -> Matrix4 {
        Matrix4::perspective(self.fov_y, aspect, self.near, self.far)
    }
}

/// Placement constants for the three drawables.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneParams {
    /// Distance from the camera to the scene centre along -Z.
    pub camera_distance: f32,
    pub model_yaw: f32,
    pub model_tilt: f32,
    pub orbit_tilt: f32,
    pub orbit_radius: f32,
    /// Radians per second for orbit and spin.
    pub angular_rate: f32,
    pub box_orbit_radius: f32,
    pub box_scale: f32,
}

impl Default for SceneParams {
    fn default() -> Self {
        Self {
            camera_distance: 3.0,
            model_yaw: 1.0,
            model_tilt: 10.0 * PI / 100.0,
            orbit_tilt: 5.0 * PI / 100.0,
            orbit_radius: 0.8,
            angular_rate: PI / 4.0,
            box_orbit_radius: 1.3,
            box_scale: 0.3,
        }
    }
}

/// Everything the renderer pushes as uniforms for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTransforms {
    pub mesh_model_view: Matrix4,
    pub sphere_model_view: Matrix4,
    pub box_model_view: Matrix4,
    pub illumination: Matrix4,
    pub projection: Matrix4,
}

/// Object rotation driven by the keyboard. Angles are negated because the
/// rotator describes a camera move and the object turns the opposite way.
pub fn key_matrix(key: Rotation) -> Matrix4 {
    Matrix4::rotate_z(-key.phi) * Matrix4::rotate_x(-key.theta)
}

/// Light orientation driven by the pointer.
pub fn pointer_matrix(pointer: Rotation) -> Matrix4 {
    Matrix4::rotate_z(pointer.phi) * Matrix4::rotate_x(-pointer.theta)
}

/// Rotate by `angle` about Y after pushing out to `radius` and tilting.
pub fn orbit(angle: f32, radius: f32, tilt: f32) -> Matrix4 {
    Matrix4::compose(&[
        Matrix4::rotate_y(angle),
        Matrix4::translate(0.0, 0.0, radius),
        Matrix4::rotate_x(tilt),
    ])
}

pub fn compose_frame(
    scene: &SceneParams,
    projection: &ProjectionParams,
    elapsed: f32,
    key: Rotation,
    pointer: Rotation,
    aspect: f32,
) -> FrameTransforms {
    let camera = Matrix4::translate(0.0, 0.0, -scene.camera_distance);
    let angle = elapsed * scene.angular_rate;

    let mesh_model_view = Matrix4::compose(&[
        camera,
        Matrix4::rotate_y(scene.model_yaw),
        Matrix4::rotate_x(scene.model_tilt),
        key_matrix(key),
    ]);

    let sphere_model_view = Matrix4::compose(&[
        camera,
        Matrix4::rotate_y(angle),
        Matrix4::rotate_x(scene.orbit_tilt),
        orbit(angle, scene.orbit_radius, scene.orbit_tilt),
    ]);

    let box_model_view = Matrix4::compose(&[
        camera,
        orbit(-angle, scene.box_orbit_radius, 0.0),
        Matrix4::rotate_y(2.0 * angle),
        Matrix4::scale_uniform(scene.box_scale),
    ]);

    FrameTransforms {
        mesh_model_view,
        sphere_model_view,
        box_model_view,
        illumination: pointer_matrix(pointer) * Matrix4::identity(),
        projection: projection.matrix(aspect),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    #[test]
    fn test_aspect_follows_framebuffer() {
        let params = ProjectionParams::default();
        assert!((params.aspect_for(1600, 800) - 2.0).abs() < EPS);
        assert!((params.aspect_for(800, 800) - 1.0).abs() < EPS);
    }

    #[test]
    fn test_fixed_aspect_overrides_framebuffer() {
        let params = ProjectionParams {
            fixed_aspect: Some(1.0),
            ..Default::default()
        };
        assert_eq!(params.aspect_for(1600, 800), 1.0);
    }

    #[test]
    fn test_startup_projection_prints_depth_row() {
        let text = ProjectionParams::default().matrix(1.0).to_string();
        let depth_row: Vec<_> = text.lines().nth(2).unwrap_or_default().split_whitespace().collect();
        assert_eq!(depth_row, ["0.00", "0.00", "-1.00", "-0.20"]);
    }

    #[test]
    fn test_zero_height_aspect() {
        assert_eq!(ProjectionParams::default().aspect_for(640, 0), 1.0);
    }

    #[test]
    fn test_zero_input_key_matrix_is_identity() {
        assert!(key_matrix(Rotation::default()).approx_eq(&Matrix4::identity(), EPS));
        assert!(pointer_matrix(Rotation::default()).approx_eq(&Matrix4::identity(), EPS));
    }

    #[test]
    fn test_orbit_radius() {
        let m = orbit(1.234, 0.8, 0.2);
        let p = m.transform_point([0.0, 0.0, 0.0, 1.0]);
        let r = (p[0] * p[0] + p[1] * p[1] + p[2] * p[2]).sqrt();
        assert!((r - 0.8).abs() < EPS);
        assert!(p[1].abs() < EPS, "orbit stays in the XZ plane");
    }
}

//! Fixed perspective camera and the field's pose.

use glam::{Mat4, Vec3};

use crate::config::EngineConfig;

const NEAR: f32 = 0.1;
const FAR: f32 = 100.0;

/// Camera on the +Z axis looking at the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    /// Vertical field of view in radians.
    pub fov: f32,
    /// Distance from the origin.
    pub distance: f32,
}

impl Camera {
    pub fn new(fov_degrees: f32, distance: f32) -> Self {
        Self {
            fov: fov_degrees.to_radians(),
            distance,
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.fov_degrees, config.camera_distance)
    }

    #[inline]
    pub fn position(&self) -> Vec3 {
        Vec3::new(0.0, 0.0, self.distance)
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position(), Vec3::ZERO, Vec3::Y)
    }

    pub fn projection(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov, aspect, NEAR, FAR)
    }

    pub fn view_proj(&self, aspect: f32) -> Mat4 {
        self.projection(aspect) * self.view_matrix()
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(60.0, 4.0)
    }
}

/// Orientation of the particle field: a fixed tilt toward the camera and a
/// slow constant spin about the field's own vertical axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldPose {
    /// Rotation about X, radians.
    pub tilt: f32,
    /// Radians per second about the field's Y axis.
    pub spin_rate: f32,
}

impl FieldPose {
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            tilt: config.tilt,
            spin_rate: config.spin_rate,
        }
    }

    /// Spin angle at `elapsed` seconds.
    #[inline]
    pub fn spin(&self, elapsed: f32) -> f32 {
        elapsed * self.spin_rate
    }

    /// Model matrix: spin first, then tilt.
    pub fn model_matrix(&self, elapsed: f32) -> Mat4 {
        Mat4::from_rotation_x(self.tilt) * Mat4::from_rotation_y(self.spin(elapsed))
    }
}

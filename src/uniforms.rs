//! Per-frame shader parameters.
//!
//! [`UniformPipeline`] is the one place where host-side state (clock,
//! smoothed activity, viewport, pointer) becomes the uniform block the vertex
//! and fragment stages read. It does no branching: every frame rewrites every
//! field and the backend uploads the whole block.

use bytemuck::{Pod, Zeroable};
use glam::Vec2;

use crate::activity::ActivityState;
use crate::config::EngineConfig;
use crate::gpu::camera::{Camera, FieldPose};
use crate::viewport::ViewportState;

/// Uniform block shared by both field shaders.
///
/// Layout matches `struct Uniforms` in the WGSL sources: two matrices, then a
/// `vec2` and six scalars, 160 bytes.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct FrameUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub model: [[f32; 4]; 4],
    /// Pointer in `[-1, 1]`, y up.
    pub pointer: [f32; 2],
    /// Seconds since the engine started.
    pub time: f32,
    /// Smoothed activity level.
    pub activity: f32,
    pub base_size: f32,
    pub pixel_ratio: f32,
    pub aspect: f32,
    pub _padding: f32,
}

impl FrameUniforms {
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}

/// Builds [`FrameUniforms`] each frame.
#[derive(Debug, Clone)]
pub struct UniformPipeline {
    camera: Camera,
    pose: FieldPose,
    base_size: f32,
    values: FrameUniforms,
}

impl UniformPipeline {
    pub fn new(config: &EngineConfig, viewport: &ViewportState) -> Self {
        let mut pipeline = Self {
            camera: Camera::from_config(config),
            pose: FieldPose::from_config(config),
            base_size: config.base_size,
            values: FrameUniforms::zeroed(),
        };
        pipeline.update(0.0, &ActivityState::default(), viewport, Vec2::ZERO);
        pipeline
    }

    /// Write this frame's values and return the block to upload.
    pub fn update(
        &mut self,
        time: f32,
        activity: &ActivityState,
        viewport: &ViewportState,
        pointer: Vec2,
    ) -> &FrameUniforms {
        self.values = FrameUniforms {
            view_proj: self.camera.view_proj(viewport.aspect).to_cols_array_2d(),
            model: self.pose.model_matrix(time).to_cols_array_2d(),
            pointer: pointer.to_array(),
            time,
            activity: activity.current,
            base_size: self.base_size,
            pixel_ratio: viewport.pixel_ratio,
            aspect: viewport.aspect,
            _padding: 0.0,
        };
        &self.values
    }

    /// Values written by the last update.
    #[inline]
    pub fn current(&self) -> &FrameUniforms {
        &self.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mount::SurfaceMetrics;

    fn viewport(w: u32, h: u32) -> ViewportState {
        ViewportState::from_metrics(SurfaceMetrics::new(w, h, 1.0), 2.0).unwrap()
    }

    #[test]
    fn test_layout_size() {
        assert_eq!(std::mem::size_of::<FrameUniforms>(), 160);
        assert_eq!(std::mem::size_of::<FrameUniforms>() % 16, 0);
    }

    #[test]
    fn test_update_writes_through() {
        let config = EngineConfig::default();
        let vp = viewport(1600, 900);
        let mut pipeline = UniformPipeline::new(&config, &vp);
        let activity = ActivityState {
            current: 0.42,
            target: 0.8,
        };

        let u = *pipeline.update(12.5, &activity, &vp, Vec2::new(0.25, -0.5));
        assert_eq!(u.time, 12.5);
        assert_eq!(u.activity, 0.42);
        assert_eq!(u.pointer, [0.25, -0.5]);
        assert_eq!(u.base_size, 1.0);
        assert!((u.aspect - 16.0 / 9.0).abs() < 1e-6);
        assert_eq!(pipeline.current(), &u);
    }

    #[test]
    fn test_projection_follows_aspect() {
        let config = EngineConfig::default();
        let wide = viewport(2000, 1000);
        let tall = viewport(1000, 2000);
        let mut pipeline = UniformPipeline::new(&config, &wide);
        let a = pipeline.update(0.0, &ActivityState::default(), &wide, Vec2::ZERO).view_proj;
        let b = pipeline.update(0.0, &ActivityState::default(), &tall, Vec2::ZERO).view_proj;
        // x scale of the projection is f / aspect.
        assert!((b[0][0] / a[0][0] - 4.0).abs() < 1e-4);
    }
}

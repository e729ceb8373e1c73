//! Engine configuration.
//!
//! Everything the engine needs to know up front, set with `with_*` builder
//! methods or parsed from JSON. Unknown JSON keys are rejected; missing keys
//! keep their defaults.
//!
//! ```
//! use vexfield::config::EngineConfig;
//! use vexfield::field::FieldShape;
//!
//! let config = EngineConfig::new()
//!     .with_particle_count(4_000)
//!     .with_shape(FieldShape::Pulse)
//!     .with_seed(11);
//! assert!(config.validate().is_ok());
//!
//! let json = r#"{ "particle_count": 4000, "shape": "pulse", "seed": 11 }"#;
//! let parsed = EngineConfig::from_json(json).unwrap();
//! assert_eq!(parsed, config);
//! ```

use std::f32::consts::PI;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::activity::DEFAULT_SMOOTHING;
use crate::error::EngineError;
use crate::field::FieldShape;

/// Settings for one engine instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Number of particles to generate.
    pub particle_count: u32,
    /// Field layout and the shader that goes with it.
    pub shape: FieldShape,
    /// Per-frame smoothing coefficient for the activity level, in `(0, 1]`.
    pub smoothing: f32,
    /// Quiet period before a burst of resize notifications is applied.
    pub resize_debounce_ms: u64,
    /// Wait after an orientation change before measuring the surface.
    pub orientation_delay_ms: u64,
    /// Ambient spin of the field about its vertical axis, radians per second.
    pub spin_rate: f32,
    /// Tilt of the field toward the camera, radians.
    pub tilt: f32,
    /// Cap on the device pixel ratio used for the drawable size.
    pub max_pixel_ratio: f32,
    /// Global particle size multiplier.
    pub base_size: f32,
    /// Background color, linear RGB.
    pub clear_color: [f32; 3],
    pub fov_degrees: f32,
    pub camera_distance: f32,
    /// Fixed RNG seed for the particle field. `None` draws from entropy.
    pub seed: Option<u64>,
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON document. The result is validated.
    pub fn from_json(text: &str) -> Result<Self, EngineError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_particle_count(mut self, count: u32) -> Self {
        self.particle_count = count;
        self
    }

    pub fn with_shape(mut self, shape: FieldShape) -> Self {
        self.shape = shape;
        self
    }

    pub fn with_smoothing(mut self, k: f32) -> Self {
        self.smoothing = k;
        self
    }

    pub fn with_resize_debounce(mut self, wait: Duration) -> Self {
        self.resize_debounce_ms = wait.as_millis() as u64;
        self
    }

    pub fn with_orientation_delay(mut self, wait: Duration) -> Self {
        self.orientation_delay_ms = wait.as_millis() as u64;
        self
    }

    pub fn with_spin_rate(mut self, radians_per_sec: f32) -> Self {
        self.spin_rate = radians_per_sec;
        self
    }

    pub fn with_tilt(mut self, radians: f32) -> Self {
        self.tilt = radians;
        self
    }

    pub fn with_max_pixel_ratio(mut self, ratio: f32) -> Self {
        self.max_pixel_ratio = ratio;
        self
    }

    pub fn with_base_size(mut self, size: f32) -> Self {
        self.base_size = size;
        self
    }

    pub fn with_clear_color(mut self, rgb: [f32; 3]) -> Self {
        self.clear_color = rgb;
        self
    }

    /// Set the camera's vertical field of view and distance from the origin.
    pub fn with_camera(mut self, fov_degrees: f32, distance: f32) -> Self {
        self.fov_degrees = fov_degrees;
        self.camera_distance = distance;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    #[inline]
    pub fn resize_debounce(&self) -> Duration {
        Duration::from_millis(self.resize_debounce_ms)
    }

    #[inline]
    pub fn orientation_delay(&self) -> Duration {
        Duration::from_millis(self.orientation_delay_ms)
    }

    /// Check every value is in range.
    pub fn validate(&self) -> Result<(), EngineError> {
        let invalid = |msg: String| Err(EngineError::InvalidConfig(msg));

        if self.particle_count == 0 {
            return invalid("particle_count must be at least 1".into());
        }
        if !(self.smoothing > 0.0 && self.smoothing <= 1.0) {
            return invalid(format!("smoothing must be in (0, 1], got {}", self.smoothing));
        }
        if !(self.max_pixel_ratio.is_finite() && self.max_pixel_ratio > 0.0) {
            return invalid(format!(
                "max_pixel_ratio must be positive, got {}",
                self.max_pixel_ratio
            ));
        }
        if !(self.base_size.is_finite() && self.base_size > 0.0) {
            return invalid(format!("base_size must be positive, got {}", self.base_size));
        }
        if !(self.fov_degrees > 0.0 && self.fov_degrees < 180.0) {
            return invalid(format!("fov_degrees must be in (0, 180), got {}", self.fov_degrees));
        }
        if !(self.camera_distance.is_finite() && self.camera_distance > 0.0) {
            return invalid(format!(
                "camera_distance must be positive, got {}",
                self.camera_distance
            ));
        }
        if !self.spin_rate.is_finite() || !self.tilt.is_finite() {
            return invalid("spin_rate and tilt must be finite".into());
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            particle_count: 8_000,
            shape: FieldShape::Vortex,
            smoothing: DEFAULT_SMOOTHING,
            resize_debounce_ms: 100,
            orientation_delay_ms: 100,
            spin_rate: 0.05,
            tilt: PI * 0.15,
            max_pixel_ratio: 2.0,
            base_size: 1.0,
            // #060609
            clear_color: [0.0018, 0.0018, 0.0027],
            fov_degrees: 60.0,
            camera_distance: 4.0,
            seed: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.resize_debounce(), Duration::from_millis(100));
        assert_eq!(config.orientation_delay(), Duration::from_millis(100));
    }

    #[test]
    fn test_rejects_out_of_range() {
        assert!(EngineConfig::new().with_particle_count(0).validate().is_err());
        assert!(EngineConfig::new().with_smoothing(0.0).validate().is_err());
        assert!(EngineConfig::new().with_smoothing(1.5).validate().is_err());
        assert!(EngineConfig::new().with_smoothing(f32::NAN).validate().is_err());
        assert!(EngineConfig::new().with_max_pixel_ratio(0.0).validate().is_err());
        assert!(EngineConfig::new().with_camera(180.0, 4.0).validate().is_err());
        assert!(EngineConfig::new().with_camera(60.0, -1.0).validate().is_err());
        assert!(EngineConfig::new().with_smoothing(1.0).validate().is_ok());
    }

    #[test]
    fn test_json_partial_document() {
        let json = r#"{ "smoothing": 0.03, "resize_debounce_ms": 250 }"#;
        let config = EngineConfig::from_json(json).unwrap();
        assert_eq!(config.smoothing, 0.03);
        assert_eq!(config.resize_debounce(), Duration::from_millis(250));
        assert_eq!(config.particle_count, 8_000);
    }

    #[test]
    fn test_json_errors() {
        assert!(matches!(
            EngineConfig::from_json(r#"{ "particle_cuont": 10 }"#),
            Err(EngineError::Config(_))
        ));
        assert!(matches!(
            EngineConfig::from_json(r#"{ "particle_count": 0 }"#),
            Err(EngineError::InvalidConfig(_))
        ));
    }
}

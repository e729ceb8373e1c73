//! Particle field generation.
//!
//! The field is built once per engine and never rewritten: every particle's
//! motion is derived in the vertex shader from elapsed time and the particle's
//! random seeds. This module only decides where particles start and what
//! seeds they carry.
//!
//! Two layouts are available through [`FieldShape`]:
//!
//! | Shape | Distribution | Shader |
//! |-------|--------------|--------|
//! | [`FieldShape::Vortex`] | flat disk, dense core, long sparse tail | swirling, pointer-reactive |
//! | [`FieldShape::Pulse`] | sphere, dense core | breathing, pointer ignored |
//!
//! # Example
//!
//! ```
//! use rand::SeedableRng;
//! use vexfield::field::{FieldShape, ParticleField};
//!
//! let mut rng = rand::rngs::StdRng::seed_from_u64(7);
//! let field = ParticleField::generate(1_000, FieldShape::Vortex, &mut rng);
//! assert_eq!(field.len(), 1_000);
//! ```

use std::f32::consts::TAU;

use bytemuck::{Pod, Zeroable};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Smallest size multiplier a particle can draw (inclusive).
pub const SIZE_MIN: f32 = 0.5;
/// Largest size multiplier a particle can draw (exclusive).
pub const SIZE_MAX: f32 = 1.0;

/// Outer radius scale of the vortex disk.
const DISK_RADIUS: f32 = 3.0;
/// Empty hole in the middle of the disk.
const DISK_CORE: f32 = 0.2;
const DISK_THICKNESS: f32 = 0.3;

const SPHERE_RADIUS: f32 = 2.4;
const SPHERE_CORE: f32 = 0.15;

/// Spatial layout and matching shader for the particle field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldShape {
    /// Tilted disk that swirls faster as activity rises and leans toward the pointer.
    #[default]
    Vortex,
    /// Sphere that pulses with activity.
    Pulse,
}

/// One particle as laid out in the instance buffer.
///
/// Matches the vertex attributes declared by the render pipeline:
/// `position` at offset 0, `size` at 12, `seeds` at 16. 32 bytes total.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct ParticleRecord {
    pub position: [f32; 3],
    /// Size multiplier in `[SIZE_MIN, SIZE_MAX)`.
    pub size: f32,
    /// Independent uniform seeds in `[0, 1)` for phase and speed variation.
    pub seeds: [f32; 3],
    pub _pad: f32,
}

/// Immutable set of particles for one engine instance.
#[derive(Debug, Clone)]
pub struct ParticleField {
    shape: FieldShape,
    particles: Vec<ParticleRecord>,
}

impl ParticleField {
    /// Generate `count` particles in the given layout.
    ///
    /// Pass a seeded RNG (e.g. `StdRng::seed_from_u64`) for reproducible output.
    pub fn generate<R: Rng + ?Sized>(count: u32, shape: FieldShape, rng: &mut R) -> Self {
        let particles = (0..count)
            .map(|_| {
                let position = match shape {
                    FieldShape::Vortex => disk_position(rng),
                    FieldShape::Pulse => sphere_position(rng),
                };
                ParticleRecord {
                    position,
                    size: rng.gen_range(SIZE_MIN..SIZE_MAX),
                    seeds: [rng.gen(), rng.gen(), rng.gen()],
                    _pad: 0.0,
                }
            })
            .collect();

        Self { shape, particles }
    }

    #[inline]
    pub fn shape(&self) -> FieldShape {
        self.shape
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Number of instances to draw.
    #[inline]
    pub fn instance_count(&self) -> u32 {
        self.particles.len() as u32
    }

    #[inline]
    pub fn particles(&self) -> &[ParticleRecord] {
        &self.particles
    }

    /// Raw bytes for the GPU instance buffer.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.particles)
    }
}

/// Disk with radius weighted toward the center by a product of two uniforms.
/// Inner particles get more vertical spread than the outer tail.
fn disk_position<R: Rng + ?Sized>(rng: &mut R) -> [f32; 3] {
    let radius = rng.gen::<f32>() * rng.gen::<f32>() * DISK_RADIUS + DISK_CORE;
    let theta = rng.gen::<f32>() * TAU;
    let falloff = 1.0 - radius / (DISK_RADIUS + DISK_CORE);
    let spread = falloff * (rng.gen::<f32>() - 0.5) * DISK_THICKNESS;

    [radius * theta.cos(), spread, radius * theta.sin()]
}

/// Uniform direction on the sphere, center-biased radius.
fn sphere_position<R: Rng + ?Sized>(rng: &mut R) -> [f32; 3] {
    let radius = SPHERE_CORE + SPHERE_RADIUS * rng.gen::<f32>() * rng.gen::<f32>();
    let z = rng.gen::<f32>() * 2.0 - 1.0;
    let phi = rng.gen::<f32>() * TAU;
    let ring = (1.0 - z * z).max(0.0).sqrt();

    [radius * ring * phi.cos(), radius * ring * phi.sin(), radius * z]
}

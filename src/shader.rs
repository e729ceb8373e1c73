//! WGSL programs for the particle field.
//!
//! Both shapes share the uniform block, vertex output and fragment stage in
//! `common.wgsl`; each adds its own `vs_main`.

use crate::field::FieldShape;

pub const VORTEX_SOURCE: &str = concat!(
    include_str!("shaders/common.wgsl"),
    "\n",
    include_str!("shaders/vortex.wgsl")
);
pub const PULSE_SOURCE: &str = concat!(
    include_str!("shaders/common.wgsl"),
    "\n",
    include_str!("shaders/pulse.wgsl")
);

pub const VERTEX_ENTRY: &str = "vs_main";
pub const FRAGMENT_ENTRY: &str = "fs_main";

/// Vertices per particle instance (two triangles).
pub const VERTICES_PER_PARTICLE: u32 = 6;

/// Program source for a field shape.
pub fn source_for(shape: FieldShape) -> &'static str {
    match shape {
        FieldShape::Vortex => VORTEX_SOURCE,
        FieldShape::Pulse => PULSE_SOURCE,
    }
}

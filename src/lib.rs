//! # vexfield - activity-driven particle field
//!
//! A background visual for conversational interfaces: a few thousand
//! particles drawn on the GPU whose motion responds to a single scalar
//! "activity" level set by the host application.
//!
//! The engine eases toward the requested level every frame, so the caller
//! may change it abruptly (an agent starts typing, a response arrives, an
//! error happens) and the field never jumps.
//!
//! ## Quick Start
//!
//! ```ignore
//! use vexfield::prelude::*;
//!
//! let container = WindowContainer::new(window);
//! let mut engine = Engine::construct(&container, EngineConfig::default())?;
//!
//! // when the user sends a message
//! engine.set_activity(0.8);
//!
//! // in the RedrawRequested handler
//! engine.frame(Instant::now());
//! ```
//!
//! ## Core Concepts
//!
//! ### Mounts and containers
//!
//! A [`Container`] is the surface the engine draws into. It owns a [`Mount`]
//! holding at most one rendering backend and all event subscriptions, knows
//! how to measure itself and how to request a refresh callback.
//! [`WindowContainer`] is the winit implementation; tests use headless ones.
//!
//! Constructing an engine on a mount that is already in use evicts the
//! previous engine first, so a container never shows two fields.
//!
//! ### Activity
//!
//! [`Engine::set_activity`] clamps to `[0, 1]` and sets the target. Each
//! frame the current level moves a fixed fraction of the remaining distance:
//!
//! ```text
//! current += (target - current) * smoothing
//! ```
//!
//! ### Shapes
//!
//! [`FieldShape::Vortex`] is a flattened orbiting disk with pointer
//! parallax; [`FieldShape::Pulse`] is a breathing shell. Both read the same
//! uniform block.
//!
//! ### Viewport
//!
//! Resize notifications are debounced, orientation changes re-measure after
//! a short delay, and the pixel ratio is capped. See [`viewport`].
//!
//! ## Logging
//!
//! The crate logs through the `log` facade. The demo binary installs
//! `env_logger`; set `RUST_LOG=vexfield=debug` for lifecycle detail.

pub mod activity;
pub mod config;
pub mod engine;
pub mod error;
pub mod field;
pub mod gpu;
pub mod mount;
pub mod scheduler;
pub mod shader;
pub mod time;
pub mod uniforms;
pub mod viewport;
pub mod window;

pub use activity::{ActivitySmoother, ActivityState, DEFAULT_SMOOTHING};
pub use config::EngineConfig;
pub use engine::{Engine, EngineLifecycleState, FrameOutcome};
pub use error::{EngineError, FrameError, GpuError};
pub use field::{FieldShape, ParticleField, ParticleRecord};
pub use glam::{Vec2, Vec3};
pub use gpu::GpuBackend;
pub use mount::{
    CancelToken, Container, EventKind, FrameHost, HostEvent, Mount, RenderBackend, SurfaceMetrics,
};
pub use scheduler::LoopState;
pub use uniforms::FrameUniforms;
pub use viewport::ViewportState;
pub use window::WindowContainer;

/// Convenient re-exports for common usage.
///
/// ```ignore
/// use vexfield::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::EngineConfig;
    pub use crate::engine::{Engine, EngineLifecycleState, FrameOutcome};
    pub use crate::error::EngineError;
    pub use crate::field::FieldShape;
    pub use crate::mount::{Container, HostEvent, SurfaceMetrics};
    pub use crate::window::WindowContainer;
    pub use std::time::Instant;
}

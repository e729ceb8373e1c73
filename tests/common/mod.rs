//! Headless container shared by the integration tests.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::{Duration, Instant};

use vexfield::uniforms::FrameUniforms;
use vexfield::{
    Container, EngineConfig, EngineError, FrameError, FrameHost, GpuError, Mount, ParticleField,
    RenderBackend, SurfaceMetrics, ViewportState,
};

/// One display refresh at 60 Hz.
pub const FRAME: Duration = Duration::from_micros(16_667);

/// Counters shared between a container, its backends and the test.
#[derive(Clone, Default)]
pub struct Probe {
    pub frames_requested: Rc<Cell<u32>>,
    pub backends_created: Rc<Cell<u32>>,
    pub releases: Rc<Cell<u32>>,
    pub draws: Rc<Cell<u32>>,
    pub resizes: Rc<RefCell<Vec<(u32, u32)>>>,
    pub last_uniforms: Rc<Cell<Option<FrameUniforms>>>,
    pub uploaded_particles: Rc<Cell<usize>>,
    /// Returned from the next draw instead of success.
    pub next_draw_error: Rc<RefCell<Option<FrameError>>>,
}

pub struct HeadlessBackend {
    probe: Probe,
}

impl RenderBackend for HeadlessBackend {
    fn resize(&mut self, viewport: &ViewportState) {
        self.probe.resizes.borrow_mut().push(viewport.render_size());
    }

    fn write_uniforms(&mut self, uniforms: &FrameUniforms) {
        self.probe.last_uniforms.set(Some(*uniforms));
    }

    fn draw(&mut self) -> Result<(), FrameError> {
        if let Some(e) = self.probe.next_draw_error.borrow_mut().take() {
            return Err(e);
        }
        self.probe.draws.set(self.probe.draws.get() + 1);
        Ok(())
    }

    fn release(&mut self) {
        self.probe.releases.set(self.probe.releases.get() + 1);
    }
}

/// A container with no window and no GPU.
#[derive(Clone)]
pub struct HeadlessContainer {
    mount: Mount<HeadlessBackend>,
    metrics: Rc<Cell<SurfaceMetrics>>,
    visual_viewport: bool,
    fail_creation: Rc<Cell<bool>>,
    pub probe: Probe,
}

impl HeadlessContainer {
    pub fn new(width: u32, height: u32, scale_factor: f64) -> Self {
        Self {
            mount: Mount::new(),
            metrics: Rc::new(Cell::new(SurfaceMetrics::new(width, height, scale_factor))),
            visual_viewport: false,
            fail_creation: Rc::default(),
            probe: Probe::default(),
        }
    }

    /// A container whose host reports visual-viewport resizes.
    pub fn with_visual_viewport(mut self) -> Self {
        self.visual_viewport = true;
        self
    }

    /// Change what the next measurement returns without notifying anyone.
    pub fn set_metrics(&self, metrics: SurfaceMetrics) {
        self.metrics.set(metrics);
    }

    /// Make the next backend creation fail like a missing GPU.
    pub fn fail_next_creation(&self) {
        self.fail_creation.set(true);
    }

    pub fn frames_requested(&self) -> u32 {
        self.probe.frames_requested.get()
    }

    pub fn resizes(&self) -> Vec<(u32, u32)> {
        self.probe.resizes.borrow().clone()
    }
}

impl FrameHost for HeadlessContainer {
    fn request_frame(&self) {
        self.probe
            .frames_requested
            .set(self.probe.frames_requested.get() + 1);
    }
}

impl Container for HeadlessContainer {
    type Backend = HeadlessBackend;

    fn mount(&self) -> &Mount<HeadlessBackend> {
        &self.mount
    }

    fn measure(&self) -> SurfaceMetrics {
        self.metrics.get()
    }

    fn has_visual_viewport(&self) -> bool {
        self.visual_viewport
    }

    fn create_backend(
        &self,
        field: &ParticleField,
        _viewport: &ViewportState,
        _config: &EngineConfig,
    ) -> Result<HeadlessBackend, EngineError> {
        if self.fail_creation.replace(false) {
            return Err(GpuError::NoAdapter.into());
        }
        self.probe
            .backends_created
            .set(self.probe.backends_created.get() + 1);
        self.probe.uploaded_particles.set(field.len());
        Ok(HeadlessBackend {
            probe: self.probe.clone(),
        })
    }
}

/// Default config with a fixed seed and a small field.
pub fn test_config() -> EngineConfig {
    EngineConfig::default().with_particle_count(256).with_seed(7)
}

/// Timestamps for `n` consecutive 60 Hz frames after `start`.
pub fn frames_after(start: Instant, n: u32) -> impl Iterator<Item = Instant> {
    (1..=n).map(move |i| start + FRAME * i)
}

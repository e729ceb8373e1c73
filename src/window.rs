//! winit window as a mounting surface.

use std::sync::Arc;
use std::time::Instant;

use winit::event::WindowEvent;
use winit::window::Window;

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::field::ParticleField;
use crate::gpu::GpuBackend;
use crate::mount::{Container, FrameHost, HostEvent, Mount, SurfaceMetrics};
use crate::viewport::ViewportState;

/// A [`Container`] backed by a winit window.
///
/// Refresh callbacks are `RedrawRequested` events; the host application
/// forwards them to `Engine::frame` and everything else to
/// [`WindowContainer::forward`].
#[derive(Clone)]
pub struct WindowContainer {
    window: Arc<Window>,
    mount: Mount<GpuBackend>,
}

impl WindowContainer {
    pub fn new(window: Arc<Window>) -> Self {
        Self {
            window,
            mount: Mount::new(),
        }
    }

    /// Translate a window event into a host event and dispatch it to the
    /// mount. Returns true if the event was one the engine listens to.
    ///
    /// winit has no orientation notification; a scale factor change is the
    /// closest signal that the surface's metrics are about to settle.
    pub fn forward(&self, event: &WindowEvent, at: Instant) -> bool {
        let host_event = match event {
            WindowEvent::Resized(size) => HostEvent::Resized(SurfaceMetrics::new(
                size.width,
                size.height,
                self.window.scale_factor(),
            )),
            WindowEvent::ScaleFactorChanged { .. } => HostEvent::OrientationChanged,
            WindowEvent::CursorMoved { position, .. } => HostEvent::PointerMoved {
                x: position.x,
                y: position.y,
            },
            _ => return false,
        };
        self.mount.dispatch(host_event, at);
        true
    }
}

impl FrameHost for WindowContainer {
    fn request_frame(&self) {
        self.window.request_redraw();
    }
}

impl Container for WindowContainer {
    type Backend = GpuBackend;

    fn mount(&self) -> &Mount<GpuBackend> {
        &self.mount
    }

    fn measure(&self) -> SurfaceMetrics {
        let size = self.window.inner_size();
        SurfaceMetrics::new(size.width, size.height, self.window.scale_factor())
    }

    fn create_backend(
        &self,
        field: &ParticleField,
        viewport: &ViewportState,
        config: &EngineConfig,
    ) -> Result<GpuBackend, EngineError> {
        let backend = pollster::block_on(GpuBackend::new(
            Arc::clone(&self.window),
            field,
            viewport,
            config,
        ))?;
        Ok(backend)
    }
}

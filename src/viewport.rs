//! Viewport tracking.
//!
//! Resizing the drawable surface means reconfiguring the swapchain and
//! rebuilding the projection, which is too expensive to do for every
//! notification of a drag-resize. The [`ViewportManager`] therefore keeps at
//! most one pending deadline per trigger kind:
//!
//! - **resize** (window and visual viewport): each notification replaces the
//!   pending one and pushes the deadline out by the debounce interval. When
//!   it passes, the last notified size is applied once.
//! - **orientation**: a fixed delay after the notification, then the surface
//!   is measured fresh, since metrics are not final when the event fires.
//!
//! Pointer moves only touch a uniform and are applied immediately.

use std::time::{Duration, Instant};

use glam::Vec2;

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::mount::{HostEvent, SurfaceMetrics};

/// Current drawable surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportState {
    /// Width in physical pixels.
    pub width: u32,
    /// Height in physical pixels.
    pub height: u32,
    /// `width / height` of the last applied measurement.
    pub aspect: f32,
    /// Device pixel ratio used for rendering, after the cap.
    pub pixel_ratio: f32,
    /// Device pixel ratio reported by the host.
    pub scale_factor: f64,
}

impl ViewportState {
    /// Build a state from a measurement. `None` for degenerate sizes.
    pub fn from_metrics(metrics: SurfaceMetrics, max_pixel_ratio: f32) -> Option<Self> {
        if metrics.is_degenerate() {
            return None;
        }
        Some(Self {
            width: metrics.width,
            height: metrics.height,
            aspect: metrics.width as f32 / metrics.height as f32,
            pixel_ratio: (metrics.scale_factor as f32).min(max_pixel_ratio),
            scale_factor: metrics.scale_factor,
        })
    }

    /// Size of the render target once the pixel ratio cap is applied.
    ///
    /// A 2560x1440 surface at scale 3.0 with a cap of 2.0 renders at
    /// 1707x960 and is stretched by the presentation layer.
    pub fn render_size(&self) -> (u32, u32) {
        let scale = self.pixel_ratio as f64 / self.scale_factor;
        if scale >= 1.0 {
            return (self.width, self.height);
        }
        let w = (self.width as f64 * scale).round() as u32;
        let h = (self.height as f64 * scale).round() as u32;
        (w.max(1), h.max(1))
    }

    /// Map a pointer position in physical pixels to `[-1, 1]` on both axes,
    /// y pointing up.
    pub fn normalize_pointer(&self, x: f64, y: f64) -> Vec2 {
        let nx = (x / self.width as f64) * 2.0 - 1.0;
        let ny = -((y / self.height as f64) * 2.0 - 1.0);
        Vec2::new(nx.clamp(-1.0, 1.0) as f32, ny.clamp(-1.0, 1.0) as f32)
    }
}

/// A single-shot deadline carrying the value to apply when it passes.
#[derive(Debug, Clone, Copy)]
struct Deferred<T> {
    due: Instant,
    payload: T,
}

/// Owns [`ViewportState`] and the pointer position.
#[derive(Debug)]
pub struct ViewportManager {
    state: ViewportState,
    pointer: Vec2,
    max_pixel_ratio: f32,
    debounce: Duration,
    orientation_delay: Duration,
    pending_resize: Option<Deferred<SurfaceMetrics>>,
    pending_orientation: Option<Deferred<()>>,
    recomputations: u64,
}

impl ViewportManager {
    /// Start from an initial measurement. A degenerate initial size is an
    /// unusable mount.
    pub fn new(metrics: SurfaceMetrics, config: &EngineConfig) -> Result<Self, EngineError> {
        let state = ViewportState::from_metrics(metrics, config.max_pixel_ratio).ok_or_else(|| {
            EngineError::InvalidMount(format!(
                "surface measures {}x{} at scale {}",
                metrics.width, metrics.height, metrics.scale_factor
            ))
        })?;

        Ok(Self {
            state,
            pointer: Vec2::ZERO,
            max_pixel_ratio: config.max_pixel_ratio,
            debounce: config.resize_debounce(),
            orientation_delay: config.orientation_delay(),
            pending_resize: None,
            pending_orientation: None,
            recomputations: 0,
        })
    }

    #[inline]
    pub fn current(&self) -> &ViewportState {
        &self.state
    }

    /// Normalized pointer position, `(0, 0)` until the first move.
    #[inline]
    pub fn pointer(&self) -> Vec2 {
        self.pointer
    }

    /// How many times the state has been recomputed after construction.
    #[inline]
    pub fn recomputations(&self) -> u64 {
        self.recomputations
    }

    /// Record a host event received at `at`.
    pub fn handle(&mut self, event: &HostEvent, at: Instant) {
        match *event {
            HostEvent::Resized(metrics) | HostEvent::VisualViewportResized(metrics) => {
                self.pending_resize = Some(Deferred {
                    due: at + self.debounce,
                    payload: metrics,
                });
            }
            HostEvent::OrientationChanged => {
                self.pending_orientation = Some(Deferred {
                    due: at + self.orientation_delay,
                    payload: (),
                });
            }
            HostEvent::PointerMoved { x, y } => {
                self.pointer = self.state.normalize_pointer(x, y);
            }
        }
    }

    /// Fire any deadline that has passed by `now`.
    ///
    /// `measure` is called only when an orientation deadline fires. Returns
    /// the new state if anything was recomputed.
    pub fn poll(
        &mut self,
        now: Instant,
        measure: impl FnOnce() -> SurfaceMetrics,
    ) -> Option<ViewportState> {
        let mut changed = false;

        if let Some(pending) = self.pending_resize.filter(|p| p.due <= now) {
            self.pending_resize = None;
            changed |= self.apply(pending.payload);
        }

        if self.pending_orientation.is_some_and(|p| p.due <= now) {
            self.pending_orientation = None;
            changed |= self.apply(measure());
        }

        changed.then_some(self.state)
    }

    /// Earliest pending deadline, for hosts that sleep between events.
    pub fn next_deadline(&self) -> Option<Instant> {
        let resize = self.pending_resize.map(|p| p.due);
        let orientation = self.pending_orientation.map(|p| p.due);
        match (resize, orientation) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Drop every pending deadline without firing it.
    pub fn cancel_pending(&mut self) {
        self.pending_resize = None;
        self.pending_orientation = None;
    }

    fn apply(&mut self, metrics: SurfaceMetrics) -> bool {
        match ViewportState::from_metrics(metrics, self.max_pixel_ratio) {
            Some(state) => {
                self.state = state;
                self.recomputations += 1;
                log::debug!(
                    "viewport {}x{} aspect {:.3} pixel ratio {:.2}",
                    state.width,
                    state.height,
                    state.aspect,
                    state.pixel_ratio
                );
                true
            }
            None => {
                log::debug!("skipping degenerate viewport {}x{}", metrics.width, metrics.height);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> ViewportManager {
        ViewportManager::new(SurfaceMetrics::new(800, 600, 1.0), &EngineConfig::default()).unwrap()
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_initial_state() {
        let vm = manager();
        assert_eq!(vm.current().width, 800);
        assert!((vm.current().aspect - 800.0 / 600.0).abs() < 1e-6);
        assert_eq!(vm.recomputations(), 0);
        assert!(vm.next_deadline().is_none());
    }

    #[test]
    fn test_degenerate_initial_size_is_invalid_mount() {
        let err = ViewportManager::new(SurfaceMetrics::new(0, 600, 1.0), &EngineConfig::default());
        assert!(matches!(err, Err(EngineError::InvalidMount(_))));
    }

    #[test]
    fn test_resize_burst_collapses_to_last() {
        let mut vm = manager();
        let t0 = Instant::now();
        let never = || panic!("resize must not measure");

        for i in 0..10u32 {
            let at = t0 + ms(10 * i as u64);
            vm.handle(&HostEvent::Resized(SurfaceMetrics::new(900 + i, 500 + i, 1.0)), at);
            assert!(vm.poll(at, never).is_none());
        }

        // 90 ms after the last notification: still waiting.
        assert!(vm.poll(t0 + ms(180), never).is_none());

        let state = vm.poll(t0 + ms(190), never).expect("debounce elapsed");
        assert_eq!((state.width, state.height), (909, 509));
        assert_eq!(vm.recomputations(), 1);
        assert!(vm.poll(t0 + ms(1_000), never).is_none());
        assert_eq!(vm.recomputations(), 1);
    }

    #[test]
    fn test_visual_viewport_shares_resize_debounce() {
        let mut vm = manager();
        let t0 = Instant::now();
        vm.handle(&HostEvent::Resized(SurfaceMetrics::new(1000, 700, 1.0)), t0);
        let visual = HostEvent::VisualViewportResized(SurfaceMetrics::new(1000, 420, 1.0));
        vm.handle(&visual, t0 + ms(20));

        let state = vm.poll(t0 + ms(200), || unreachable!()).unwrap();
        assert_eq!(state.height, 420);
        assert_eq!(vm.recomputations(), 1);
    }

    #[test]
    fn test_orientation_measures_after_delay() {
        let mut vm = manager();
        let t0 = Instant::now();
        vm.handle(&HostEvent::OrientationChanged, t0);
        assert_eq!(vm.next_deadline(), Some(t0 + ms(100)));

        assert!(vm.poll(t0 + ms(50), || unreachable!()).is_none());
        let state = vm.poll(t0 + ms(100), || SurfaceMetrics::new(600, 800, 2.0)).unwrap();
        assert_eq!((state.width, state.height), (600, 800));
        assert!((state.aspect - 0.75).abs() < 1e-6);
        assert_eq!(state.pixel_ratio, 2.0);
    }

    #[test]
    fn test_repeated_orientation_replaces_timer() {
        let mut vm = manager();
        let t0 = Instant::now();
        vm.handle(&HostEvent::OrientationChanged, t0);
        vm.handle(&HostEvent::OrientationChanged, t0 + ms(80));

        assert!(vm.poll(t0 + ms(120), || unreachable!()).is_none());
        let mut measured = 0;
        vm.poll(t0 + ms(180), || {
            measured += 1;
            SurfaceMetrics::new(640, 480, 1.0)
        });
        assert_eq!(measured, 1);
        assert_eq!(vm.recomputations(), 1);
    }

    #[test]
    fn test_degenerate_resize_is_skipped() {
        let mut vm = manager();
        let t0 = Instant::now();
        vm.handle(&HostEvent::Resized(SurfaceMetrics::new(0, 0, 1.0)), t0);
        assert!(vm.poll(t0 + ms(500), || unreachable!()).is_none());
        assert_eq!(vm.current().width, 800);
        assert_eq!(vm.recomputations(), 0);

        vm.handle(&HostEvent::Resized(SurfaceMetrics::new(1024, 768, 1.0)), t0 + ms(600));
        assert!(vm.poll(t0 + ms(700), || unreachable!()).is_some());
        assert_eq!(vm.current().width, 1024);
    }

    #[test]
    fn test_pointer_normalization() {
        let mut vm = manager();
        let t0 = Instant::now();

        vm.handle(&HostEvent::PointerMoved { x: 0.0, y: 0.0 }, t0);
        assert_eq!(vm.pointer(), Vec2::new(-1.0, 1.0));

        vm.handle(&HostEvent::PointerMoved { x: 400.0, y: 300.0 }, t0);
        assert_eq!(vm.pointer(), Vec2::ZERO);

        vm.handle(&HostEvent::PointerMoved { x: 800.0, y: 600.0 }, t0);
        assert_eq!(vm.pointer(), Vec2::new(1.0, -1.0));

        vm.handle(&HostEvent::PointerMoved { x: -50.0, y: 9_000.0 }, t0);
        assert_eq!(vm.pointer(), Vec2::new(-1.0, -1.0));

        // Pointer moves never schedule work.
        assert!(vm.next_deadline().is_none());
    }

    #[test]
    fn test_cancel_pending() {
        let mut vm = manager();
        let t0 = Instant::now();
        vm.handle(&HostEvent::Resized(SurfaceMetrics::new(100, 100, 1.0)), t0);
        vm.handle(&HostEvent::OrientationChanged, t0);
        vm.cancel_pending();
        assert!(vm.next_deadline().is_none());
        assert!(vm.poll(t0 + ms(1_000), || unreachable!()).is_none());
    }

    #[test]
    fn test_render_size_caps_pixel_ratio() {
        let metrics = SurfaceMetrics::new(2560, 1440, 3.0);
        let state = ViewportState::from_metrics(metrics, 2.0).unwrap();
        assert_eq!(state.pixel_ratio, 2.0);
        assert_eq!(state.render_size(), (1707, 960));

        let state = ViewportState::from_metrics(SurfaceMetrics::new(1280, 720, 1.0), 2.0).unwrap();
        assert_eq!(state.render_size(), (1280, 720));
    }
}

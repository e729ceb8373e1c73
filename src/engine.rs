//! The particle field engine.
//!
//! [`Engine`] ties the pieces together and owns their lifetimes:
//!
//! 1. [`Engine::construct`] measures the container, generates the field,
//!    creates one rendering backend, attaches it, subscribes to host events
//!    and requests the first frame.
//! 2. The host calls [`Engine::frame`] from every refresh callback and may
//!    call [`Engine::poll`] between frames to fire resize timers.
//! 3. The caller adjusts [`Engine::set_activity`] whenever it likes.
//! 4. [`Engine::dispose`] (or dropping the engine) stops the loop, removes
//!    every subscription and releases the backend. It is idempotent.
//!
//! Constructing a second engine against a mount that still holds a live one
//! evicts the first: its backend is released and its subscriptions removed
//! before the new backend is created, so the mount never holds two surfaces.
//! The evicted engine notices on its next call and finishes disposing itself.

use std::time::Instant;

use glam::Vec2;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::activity::{ActivitySmoother, ActivityState};
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::field::ParticleField;
use crate::mount::{CancelToken, Container, EventKind, OwnerId, RenderBackend, Subscription};
use crate::scheduler::{FrameScheduler, LoopState};
use crate::time::FrameClock;
use crate::uniforms::UniformPipeline;
use crate::viewport::{ViewportManager, ViewportState};

/// Lifecycle of an engine instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineLifecycleState {
    /// Construction in progress.
    Uninitialized,
    /// Attached and ticking.
    Running,
    /// Terminal. Every method is a no-op.
    Disposed,
}

/// What happened in one call to [`Engine::frame`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// The field was drawn.
    Drawn,
    /// The backend could not present this frame; the loop continues.
    Skipped,
    /// The engine is not running. No work was done and no frame requested.
    Halted,
}

/// Activity-driven particle field bound to one container.
pub struct Engine<C: Container> {
    container: C,
    owner: OwnerId,
    state: EngineLifecycleState,
    field: Option<ParticleField>,
    activity: ActivitySmoother,
    viewport: ViewportManager,
    uniforms: UniformPipeline,
    clock: FrameClock,
    scheduler: FrameScheduler,
    subscriptions: Vec<Subscription>,
}

impl<C: Container> Engine<C> {
    /// Build and start an engine on `container`.
    ///
    /// Fails if the configuration is invalid, the surface has no area, or no
    /// GPU context can be created. On failure nothing stays attached and no
    /// subscriptions remain for this instance.
    ///
    /// Any engine already on the mount is evicted before the backend is
    /// created, so a failed remount leaves the mount empty and the previous
    /// engine disposed.
    pub fn construct(container: &C, config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;

        let mount = container.mount();
        let viewport = ViewportManager::new(container.measure(), &config)?;

        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let field = ParticleField::generate(config.particle_count, config.shape, &mut rng);

        if let Some(previous) = mount.evict() {
            log::info!("evicting engine {:?} from its mount", previous);
        }

        let owner = mount.allocate_owner();
        let backend = container.create_backend(&field, viewport.current(), &config)?;
        let token = CancelToken::new();
        mount.attach(owner, backend, token.clone());

        let subscriptions = EventKind::ALL
            .iter()
            .filter(|&&kind| {
                kind != EventKind::VisualViewportResize || container.has_visual_viewport()
            })
            .map(|&kind| mount.subscribe(owner, kind))
            .collect();

        let mut engine = Self {
            container: container.clone(),
            owner,
            state: EngineLifecycleState::Uninitialized,
            uniforms: UniformPipeline::new(&config, viewport.current()),
            activity: ActivitySmoother::new(config.smoothing),
            viewport,
            field: Some(field),
            clock: FrameClock::new(),
            scheduler: FrameScheduler::new(token),
            subscriptions,
        };

        engine.scheduler.start(&engine.container);
        engine.state = EngineLifecycleState::Running;

        let vp = engine.viewport.current();
        log::info!(
            "engine {:?} running: {} {:?} particles, viewport {}x{}",
            owner,
            config.particle_count,
            config.shape,
            vp.width,
            vp.height
        );

        Ok(engine)
    }

    /// Set the activity level to approach. Clamped to `[0, 1]`; a no-op once
    /// the engine is disposed.
    pub fn set_activity(&mut self, level: f32) {
        if self.state == EngineLifecycleState::Running {
            self.activity.set_target(level);
        }
    }

    /// One refresh callback: drain events, advance time and activity, upload
    /// uniforms, draw, and request the next callback.
    pub fn frame(&mut self, now: Instant) -> FrameOutcome {
        if self.state != EngineLifecycleState::Running {
            return FrameOutcome::Halted;
        }
        if !self.scheduler.begin() {
            self.retire_if_evicted();
            return FrameOutcome::Halted;
        }

        self.poll(now);

        let elapsed = self.clock.update(now);
        self.activity.tick();
        let uniforms = self.uniforms.update(
            elapsed,
            self.activity.state(),
            self.viewport.current(),
            self.viewport.pointer(),
        );

        let viewport = *self.viewport.current();
        let drawn = self.container.mount().with_backend(self.owner, |backend| {
            backend.write_uniforms(uniforms);
            let result = backend.draw();
            if let Err(ref e) = result {
                if e.needs_reconfigure() {
                    backend.resize(&viewport);
                }
            }
            result
        });

        let outcome = match drawn {
            Some(Ok(())) => FrameOutcome::Drawn,
            Some(Err(e)) if e.is_fatal() => {
                log::error!("engine {:?} shutting down: {}", self.owner, e);
                self.dispose();
                return FrameOutcome::Halted;
            }
            Some(Err(e)) => {
                log::warn!("frame skipped: {}", e);
                FrameOutcome::Skipped
            }
            None => {
                self.retire_if_evicted();
                return FrameOutcome::Halted;
            }
        };

        self.scheduler.finish(&self.container);
        outcome
    }

    /// Apply pending host events and fire any viewport deadline that has
    /// passed. Safe to call at any time; frames call it first.
    pub fn poll(&mut self, now: Instant) {
        if self.state != EngineLifecycleState::Running {
            return;
        }
        if self.scheduler.token().is_cancelled() {
            self.retire_if_evicted();
            return;
        }

        // Inboxes are per kind; replay in arrival order across kinds.
        let mut pending: Vec<_> = self.subscriptions.iter().flat_map(|s| s.drain()).collect();
        pending.sort_by_key(|timed| timed.at);
        for timed in &pending {
            self.viewport.handle(&timed.event, timed.at);
        }

        let container = &self.container;
        if let Some(viewport) = self.viewport.poll(now, || container.measure()) {
            container
                .mount()
                .with_backend(self.owner, |backend| backend.resize(&viewport));
        }
    }

    /// Stop and release everything. Only the first call has an effect.
    pub fn dispose(&mut self) {
        if self.state == EngineLifecycleState::Disposed {
            return;
        }

        self.scheduler.cancel();
        self.viewport.cancel_pending();

        let mount = self.container.mount();
        for subscription in self.subscriptions.drain(..) {
            mount.unsubscribe(&subscription);
        }
        let released = mount.release(self.owner);
        self.field = None;
        self.state = EngineLifecycleState::Disposed;

        log::info!(
            "engine {:?} disposed{}",
            self.owner,
            if released { "" } else { " (already detached)" }
        );
    }

    /// Earliest time [`Engine::poll`] has work to do, if any.
    pub fn next_deadline(&self) -> Option<Instant> {
        match self.state {
            EngineLifecycleState::Running => self.viewport.next_deadline(),
            _ => None,
        }
    }

    #[inline]
    pub fn state(&self) -> EngineLifecycleState {
        self.state
    }

    #[inline]
    pub fn loop_state(&self) -> LoopState {
        self.scheduler.state()
    }

    #[inline]
    pub fn activity(&self) -> &ActivityState {
        self.activity.state()
    }

    #[inline]
    pub fn viewport(&self) -> &ViewportState {
        self.viewport.current()
    }

    /// Number of viewport recomputations since construction.
    #[inline]
    pub fn viewport_recomputations(&self) -> u64 {
        self.viewport.recomputations()
    }

    #[inline]
    pub fn pointer(&self) -> Vec2 {
        self.viewport.pointer()
    }

    /// The particle field, until disposal.
    #[inline]
    pub fn field(&self) -> Option<&ParticleField> {
        self.field.as_ref()
    }

    /// Frames rendered since construction.
    #[inline]
    pub fn frames(&self) -> u64 {
        self.clock.frame()
    }

    /// Frames per second, recalculated every half second.
    #[inline]
    pub fn fps(&self) -> f32 {
        self.clock.fps()
    }

    /// Whether this engine currently holds its container's surface.
    pub fn is_attached(&self) -> bool {
        self.container.mount().attached_owner() == Some(self.owner)
    }

    /// If another engine took the mount, finish disposing this one.
    fn retire_if_evicted(&mut self) {
        if self.state == EngineLifecycleState::Running && !self.is_attached() {
            log::debug!("engine {:?} was evicted, disposing", self.owner);
            self.dispose();
        }
    }
}

impl<C: Container> Drop for Engine<C> {
    fn drop(&mut self) {
        self.dispose();
    }
}

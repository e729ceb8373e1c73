//! Mounting surfaces and host events.
//!
//! A [`Mount`] is the caller-owned region an engine draws into. It holds at
//! most one attached rendering backend and the registry of event
//! subscriptions, so "how many surfaces are attached" and "how many listeners
//! are live" are both answerable from one place.
//!
//! Hosts push [`HostEvent`]s into the mount with [`Mount::dispatch`]. Each
//! subscription owns an inbox; the subscribing engine drains it at the start
//! of its next poll or frame, so an event is always observed before the next
//! tick that could depend on it.
//!
//! The seams to a concrete platform are three traits:
//! - [`RenderBackend`] - a GPU context bound to the surface (see `gpu::GpuBackend`)
//! - [`FrameHost`] - something that can call back once per display refresh
//! - [`Container`] - ties the two together with a mount and a way to measure it

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Instant;

use crate::config::EngineConfig;
use crate::error::{EngineError, FrameError};
use crate::field::ParticleField;
use crate::uniforms::FrameUniforms;
use crate::viewport::ViewportState;

/// Raw surface measurement as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceMetrics {
    /// Width in physical pixels.
    pub width: u32,
    /// Height in physical pixels.
    pub height: u32,
    /// Physical pixels per logical pixel.
    pub scale_factor: f64,
}

impl SurfaceMetrics {
    pub fn new(width: u32, height: u32, scale_factor: f64) -> Self {
        Self {
            width,
            height,
            scale_factor,
        }
    }

    /// True during layout thrash or while minimized.
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.width == 0 || self.height == 0 || !(self.scale_factor > 0.0)
    }
}

/// Notifications a host forwards to the engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HostEvent {
    /// Window or surface resized.
    Resized(SurfaceMetrics),
    /// The visual viewport changed (on-screen keyboard, browser chrome).
    VisualViewportResized(SurfaceMetrics),
    /// Device orientation changed. Metrics are not final yet.
    OrientationChanged,
    /// Pointer moved, in physical pixels from the top-left corner.
    PointerMoved { x: f64, y: f64 },
}

impl HostEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            HostEvent::Resized(_) => EventKind::Resize,
            HostEvent::VisualViewportResized(_) => EventKind::VisualViewportResize,
            HostEvent::OrientationChanged => EventKind::OrientationChange,
            HostEvent::PointerMoved { .. } => EventKind::PointerMove,
        }
    }
}

/// Event categories a subscription can listen to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Resize,
    VisualViewportResize,
    OrientationChange,
    PointerMove,
}

impl EventKind {
    pub const ALL: [EventKind; 4] = [
        EventKind::Resize,
        EventKind::VisualViewportResize,
        EventKind::OrientationChange,
        EventKind::PointerMove,
    ];
}

/// A host event with the time it was dispatched.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimedEvent {
    pub event: HostEvent,
    pub at: Instant,
}

/// Identifies the engine that holds an attachment or subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OwnerId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Inbox = Rc<RefCell<VecDeque<TimedEvent>>>;

/// Handle returned by [`Mount::subscribe`]. Pass it back to
/// [`Mount::unsubscribe`] to stop delivery.
#[derive(Debug)]
pub struct Subscription {
    id: SubscriptionId,
    inbox: Inbox,
}

impl Subscription {
    /// Take every event delivered since the last drain, oldest first.
    pub fn drain(&self) -> Vec<TimedEvent> {
        self.inbox.borrow_mut().drain(..).collect()
    }
}

/// Shared cancellation flag between a render loop and whoever may stop it.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Rc<Cell<bool>>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn cancel(&self) {
        self.0.set(true);
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.0.get()
    }
}

/// A GPU rendering context attached to a mounting surface.
pub trait RenderBackend {
    /// Reconfigure the drawable surface and projection for a new viewport.
    fn resize(&mut self, viewport: &ViewportState);

    /// Copy this frame's uniform block to the GPU.
    fn write_uniforms(&mut self, uniforms: &FrameUniforms);

    /// Issue one draw of the particle field.
    fn draw(&mut self) -> Result<(), FrameError>;

    /// Release GPU-side resources and detach from the surface. Called exactly
    /// once, when the backend leaves the mount.
    fn release(&mut self);
}

/// Something that can invoke the engine once per display refresh.
pub trait FrameHost {
    /// Ask for one more refresh callback.
    fn request_frame(&self);
}

/// A mounting surface an engine can be constructed against.
pub trait Container: FrameHost + Clone {
    type Backend: RenderBackend;

    fn mount(&self) -> &Mount<Self::Backend>;

    /// Current surface size. Prefers the visual viewport when the host has one.
    fn measure(&self) -> SurfaceMetrics;

    /// Whether the host reports visual-viewport resizes.
    fn has_visual_viewport(&self) -> bool {
        false
    }

    /// Create exactly one rendering context for this surface and upload the field.
    fn create_backend(
        &self,
        field: &ParticleField,
        viewport: &ViewportState,
        config: &EngineConfig,
    ) -> Result<Self::Backend, EngineError>;
}

struct Attachment<B> {
    owner: OwnerId,
    backend: B,
    token: CancelToken,
}

struct Listener {
    id: SubscriptionId,
    owner: OwnerId,
    kind: EventKind,
    inbox: Inbox,
}

struct MountState<B> {
    next_owner: u64,
    next_subscription: u64,
    attached: Option<Attachment<B>>,
    listeners: Vec<Listener>,
}

/// Attachment slot and event registry for one mounting surface.
///
/// Cloning yields another handle to the same mount.
pub struct Mount<B> {
    state: Rc<RefCell<MountState<B>>>,
}

impl<B> Clone for Mount<B> {
    fn clone(&self) -> Self {
        Self {
            state: Rc::clone(&self.state),
        }
    }
}

impl<B: RenderBackend> Mount<B> {
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(MountState {
                next_owner: 0,
                next_subscription: 0,
                attached: None,
                listeners: Vec::new(),
            })),
        }
    }

    /// Number of rendering surfaces attached. Never more than one.
    pub fn attached_surfaces(&self) -> usize {
        usize::from(self.state.borrow().attached.is_some())
    }

    /// Number of live event subscriptions across all owners.
    pub fn subscription_count(&self) -> usize {
        self.state.borrow().listeners.len()
    }

    /// Owner of the attached backend, if any.
    pub fn attached_owner(&self) -> Option<OwnerId> {
        self.state.borrow().attached.as_ref().map(|a| a.owner)
    }

    /// Deliver an event to every subscription of its kind.
    pub fn dispatch(&self, event: HostEvent, at: Instant) {
        let kind = event.kind();
        let state = self.state.borrow();
        for listener in state.listeners.iter().filter(|l| l.kind == kind) {
            listener.inbox.borrow_mut().push_back(TimedEvent { event, at });
        }
    }

    pub(crate) fn allocate_owner(&self) -> OwnerId {
        let mut state = self.state.borrow_mut();
        state.next_owner += 1;
        OwnerId(state.next_owner)
    }

    /// Remove whatever is attached: its loop is cancelled, its subscriptions
    /// dropped and its backend released. Returns the evicted owner.
    pub(crate) fn evict(&self) -> Option<OwnerId> {
        let attachment = {
            let mut state = self.state.borrow_mut();
            let attachment = state.attached.take()?;
            state.listeners.retain(|l| l.owner != attachment.owner);
            attachment
        };
        let Attachment {
            owner,
            mut backend,
            token,
        } = attachment;
        token.cancel();
        backend.release();
        Some(owner)
    }

    /// Attach a backend. The slot must be empty; call [`Mount::evict`] first.
    pub(crate) fn attach(&self, owner: OwnerId, backend: B, token: CancelToken) {
        let previous = self.state.borrow_mut().attached.replace(Attachment {
            owner,
            backend,
            token,
        });
        if let Some(mut previous) = previous {
            previous.token.cancel();
            previous.backend.release();
        }
    }

    /// Detach and release `owner`'s backend. No-op if `owner` is not attached.
    pub(crate) fn release(&self, owner: OwnerId) -> bool {
        let attachment = {
            let mut state = self.state.borrow_mut();
            match state.attached {
                Some(ref a) if a.owner == owner => state.attached.take(),
                _ => None,
            }
        };
        match attachment {
            Some(mut attachment) => {
                attachment.backend.release();
                true
            }
            None => false,
        }
    }

    /// Run `f` against `owner`'s backend. `None` if `owner` is not attached.
    pub(crate) fn with_backend<R>(
        &self,
        owner: OwnerId,
        f: impl FnOnce(&mut B) -> R,
    ) -> Option<R> {
        let mut state = self.state.borrow_mut();
        match state.attached {
            Some(ref mut a) if a.owner == owner => Some(f(&mut a.backend)),
            _ => None,
        }
    }

    pub(crate) fn subscribe(&self, owner: OwnerId, kind: EventKind) -> Subscription {
        let mut state = self.state.borrow_mut();
        state.next_subscription += 1;
        let id = SubscriptionId(state.next_subscription);
        let inbox: Inbox = Rc::default();
        state.listeners.push(Listener {
            id,
            owner,
            kind,
            inbox: Rc::clone(&inbox),
        });
        Subscription { id, inbox }
    }

    /// Stop delivery to `subscription`. Returns false if it was already gone.
    pub(crate) fn unsubscribe(&self, subscription: &Subscription) -> bool {
        let mut state = self.state.borrow_mut();
        let before = state.listeners.len();
        state.listeners.retain(|l| l.id != subscription.id);
        subscription.inbox.borrow_mut().clear();
        state.listeners.len() != before
    }
}

impl<B: RenderBackend> Default for Mount<B> {
    fn default() -> Self {
        Self::new()
    }
}

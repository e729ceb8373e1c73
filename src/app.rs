//! Demo host: a winit window with a simulated conversational agent.
//!
//! Keys:
//! - `Enter` sends a message. The agent "thinks", then "responds", then idles.
//! - `E` simulates an error.
//! - `0`..`9` set the activity level directly.
//! - `Escape` closes the window.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use vexfield::{Engine, EngineConfig, EngineError, FrameOutcome, WindowContainer};
use winit::application::ApplicationHandler;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

/// Activity while the agent works on a message.
const THINKING_LEVEL: f32 = 0.8;
/// Activity while the response streams in.
const RESPONDING_LEVEL: f32 = 0.3;
/// How long the agent thinks before responding.
const THINKING_TIME: Duration = Duration::from_millis(1500);
/// How long a response streams before the agent goes idle.
const RESPONDING_TIME: Duration = Duration::from_secs(2);

#[derive(Debug)]
pub enum AppError {
    EventLoop(winit::error::EventLoopError),
    Window(winit::error::OsError),
    Engine(EngineError),
    Io(std::io::Error),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::EventLoop(e) => write!(f, "event loop error: {}", e),
            AppError::Window(e) => write!(f, "failed to create window: {}", e),
            AppError::Engine(e) => write!(f, "{}", e),
            AppError::Io(e) => write!(f, "failed to read config: {}", e),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::EventLoop(e) => Some(e),
            AppError::Window(e) => Some(e),
            AppError::Engine(e) => Some(e),
            AppError::Io(e) => Some(e),
        }
    }
}

impl From<winit::error::EventLoopError> for AppError {
    fn from(e: winit::error::EventLoopError) -> Self {
        AppError::EventLoop(e)
    }
}

impl From<winit::error::OsError> for AppError {
    fn from(e: winit::error::OsError) -> Self {
        AppError::Window(e)
    }
}

impl From<EngineError> for AppError {
    fn from(e: EngineError) -> Self {
        AppError::Engine(e)
    }
}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        AppError::Io(e)
    }
}

/// What the simulated agent is doing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AgentPhase {
    Idle,
    Thinking { since: Instant },
    Responding { since: Instant },
    Failed,
    /// Level chosen by hand; held until the next message.
    Manual(f32),
}

impl AgentPhase {
    /// Activity level for this phase.
    pub fn level(&self) -> f32 {
        match *self {
            AgentPhase::Idle | AgentPhase::Failed => 0.0,
            AgentPhase::Thinking { .. } => THINKING_LEVEL,
            AgentPhase::Responding { .. } => RESPONDING_LEVEL,
            AgentPhase::Manual(level) => level,
        }
    }

    /// When this phase ends on its own.
    pub fn deadline(&self) -> Option<Instant> {
        match *self {
            AgentPhase::Thinking { since } => Some(since + THINKING_TIME),
            AgentPhase::Responding { since } => Some(since + RESPONDING_TIME),
            _ => None,
        }
    }

    /// Advance timed phases whose deadline has passed.
    pub fn advance(self, now: Instant) -> Self {
        match self.deadline() {
            Some(deadline) if now >= deadline => {
                let next = match self {
                    AgentPhase::Thinking { .. } => AgentPhase::Responding { since: deadline },
                    _ => AgentPhase::Idle,
                };
                next.advance(now)
            }
            _ => self,
        }
    }
}

/// Map a key press to the phase it starts, if any.
fn phase_for_key(key: KeyCode, now: Instant) -> Option<AgentPhase> {
    let digit = match key {
        KeyCode::Enter | KeyCode::NumpadEnter => {
            return Some(AgentPhase::Thinking { since: now });
        }
        KeyCode::KeyE => return Some(AgentPhase::Failed),
        KeyCode::Digit0 => 0,
        KeyCode::Digit1 => 1,
        KeyCode::Digit2 => 2,
        KeyCode::Digit3 => 3,
        KeyCode::Digit4 => 4,
        KeyCode::Digit5 => 5,
        KeyCode::Digit6 => 6,
        KeyCode::Digit7 => 7,
        KeyCode::Digit8 => 8,
        KeyCode::Digit9 => 9,
        _ => return None,
    };
    Some(AgentPhase::Manual(digit as f32 / 9.0))
}

pub struct App {
    config: EngineConfig,
    window: Option<Arc<Window>>,
    container: Option<WindowContainer>,
    engine: Option<Engine<WindowContainer>>,
    phase: AgentPhase,
    error: Option<AppError>,
}

impl App {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            window: None,
            container: None,
            engine: None,
            phase: AgentPhase::Idle,
            error: None,
        }
    }

    /// The error that stopped the event loop, if any.
    pub fn take_error(&mut self) -> Option<AppError> {
        self.error.take()
    }

    fn start(&mut self, event_loop: &ActiveEventLoop) -> Result<(), AppError> {
        let window_attrs = Window::default_attributes()
            .with_title("vexfield")
            .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));

        let window = Arc::new(event_loop.create_window(window_attrs)?);
        let container = WindowContainer::new(Arc::clone(&window));
        let engine = Engine::construct(&container, self.config.clone())?;

        self.window = Some(window);
        self.container = Some(container);
        self.engine = Some(engine);
        Ok(())
    }

    fn set_phase(&mut self, phase: AgentPhase) {
        if phase != self.phase {
            log::info!("agent: {:?} -> {:?}", self.phase, phase);
        }
        self.phase = phase;
        if let Some(engine) = &mut self.engine {
            engine.set_activity(phase.level());
        }
    }

    fn on_key(&mut self, event: &KeyEvent, event_loop: &ActiveEventLoop) {
        if event.state != ElementState::Pressed || event.repeat {
            return;
        }
        let PhysicalKey::Code(code) = event.physical_key else {
            return;
        };
        if code == KeyCode::Escape {
            event_loop.exit();
            return;
        }
        if let Some(phase) = phase_for_key(code, Instant::now()) {
            self.set_phase(phase);
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.start(event_loop) {
            self.error = Some(e);
            event_loop.exit();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let now = Instant::now();
        if let Some(container) = &self.container {
            container.forward(&event, now);
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::KeyboardInput { ref event, .. } => {
                self.on_key(event, event_loop);
            }
            WindowEvent::RedrawRequested => {
                let Some(engine) = &mut self.engine else {
                    return;
                };
                if engine.frame(now) == FrameOutcome::Halted {
                    log::error!("engine halted");
                    event_loop.exit();
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let now = Instant::now();
        let phase = self.phase.advance(now);
        if phase != self.phase {
            self.set_phase(phase);
        }

        let Some(engine) = &mut self.engine else {
            return;
        };
        engine.poll(now);

        let wake = [engine.next_deadline(), self.phase.deadline()]
            .into_iter()
            .flatten()
            .min();
        event_loop.set_control_flow(match wake {
            Some(at) => ControlFlow::WaitUntil(at),
            None => ControlFlow::Wait,
        });
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(mut engine) = self.engine.take() {
            engine.dispose();
            log::info!("rendered {} frames, {:.1} fps", engine.frames(), engine.fps());
        }
    }
}

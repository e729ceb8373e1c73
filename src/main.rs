mod app;

use std::process::ExitCode;

use vexfield::EngineConfig;
use winit::event_loop::{ControlFlow, EventLoop};

use crate::app::{App, AppError};

fn load_config() -> Result<EngineConfig, AppError> {
    match std::env::args().nth(1) {
        Some(path) => {
            let text = std::fs::read_to_string(&path)?;
            let config = EngineConfig::from_json(&text)?;
            log::info!("loaded config from {}", path);
            Ok(config)
        }
        None => Ok(EngineConfig::default()),
    }
}

fn run() -> Result<(), AppError> {
    let config = load_config()?;

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = App::new(config);
    event_loop.run_app(&mut app)?;

    match app.take_error() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

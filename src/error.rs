//! Error types for vexfield.
//!
//! Construction is the only fallible public operation: a failure there is
//! permanent for that engine instance. Per-frame surface errors are reported
//! as [`FrameError`] and handled inside the render loop.

use std::fmt;

/// Errors that can occur during GPU initialization.
#[derive(Debug)]
pub enum GpuError {
    /// Failed to create a surface for rendering.
    SurfaceCreation(wgpu::CreateSurfaceError),
    /// No compatible GPU adapter found.
    NoAdapter,
    /// Failed to create GPU device.
    DeviceCreation(wgpu::RequestDeviceError),
    /// The surface reports no usable texture format for this adapter.
    UnsupportedSurface,
}

impl fmt::Display for GpuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GpuError::SurfaceCreation(e) => write!(f, "Failed to create GPU surface: {}", e),
            GpuError::NoAdapter => write!(
                f,
                "No compatible GPU adapter found. Ensure your system has a GPU with WebGPU/Vulkan/Metal/DX12 support."
            ),
            GpuError::DeviceCreation(e) => write!(f, "Failed to create GPU device: {}", e),
            GpuError::UnsupportedSurface => {
                write!(f, "Surface is not compatible with the selected GPU adapter")
            }
        }
    }
}

impl std::error::Error for GpuError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GpuError::SurfaceCreation(e) => Some(e),
            GpuError::DeviceCreation(e) => Some(e),
            _ => None,
        }
    }
}

impl From<wgpu::CreateSurfaceError> for GpuError {
    fn from(e: wgpu::CreateSurfaceError) -> Self {
        GpuError::SurfaceCreation(e)
    }
}

impl From<wgpu::RequestDeviceError> for GpuError {
    fn from(e: wgpu::RequestDeviceError) -> Self {
        GpuError::DeviceCreation(e)
    }
}

/// Errors that can occur when constructing an engine.
#[derive(Debug)]
pub enum EngineError {
    /// GPU initialization failed.
    Gpu(GpuError),
    /// The mounting surface cannot host a rendering context.
    InvalidMount(String),
    /// A configuration value is out of range.
    InvalidConfig(String),
    /// A configuration document could not be parsed.
    Config(serde_json::Error),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::Gpu(e) => write!(f, "GPU error: {}", e),
            EngineError::InvalidMount(msg) => write!(f, "Invalid mounting surface: {}", msg),
            EngineError::InvalidConfig(msg) => write!(f, "Invalid engine configuration: {}", msg),
            EngineError::Config(e) => write!(f, "Failed to parse engine configuration: {}", e),
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EngineError::Gpu(e) => Some(e),
            EngineError::Config(e) => Some(e),
            _ => None,
        }
    }
}

impl From<GpuError> for EngineError {
    fn from(e: GpuError) -> Self {
        EngineError::Gpu(e)
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(e: serde_json::Error) -> Self {
        EngineError::Config(e)
    }
}

/// Errors a backend can report for a single frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    /// The surface was lost and must be reconfigured.
    Lost,
    /// The surface no longer matches the window and must be reconfigured.
    Outdated,
    /// Acquiring the next texture took too long. The frame is skipped.
    Timeout,
    /// The GPU ran out of memory. Fatal for the engine.
    OutOfMemory,
    /// Any other backend failure.
    Other(String),
}

impl FrameError {
    /// Whether reconfiguring the surface is the fix.
    pub fn needs_reconfigure(&self) -> bool {
        matches!(self, FrameError::Lost | FrameError::Outdated)
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, FrameError::OutOfMemory)
    }
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameError::Lost => write!(f, "surface lost"),
            FrameError::Outdated => write!(f, "surface outdated"),
            FrameError::Timeout => write!(f, "timed out acquiring surface texture"),
            FrameError::OutOfMemory => write!(f, "out of GPU memory"),
            FrameError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for FrameError {}

impl From<wgpu::SurfaceError> for FrameError {
    fn from(e: wgpu::SurfaceError) -> Self {
        match e {
            wgpu::SurfaceError::Lost => FrameError::Lost,
            wgpu::SurfaceError::Outdated => FrameError::Outdated,
            wgpu::SurfaceError::Timeout => FrameError::Timeout,
            wgpu::SurfaceError::OutOfMemory => FrameError::OutOfMemory,
            #[allow(unreachable_patterns)]
            other => FrameError::Other(other.to_string()),
        }
    }
}

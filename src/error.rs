//! Error types for the starfield engine.
//!
//! Setup failures are fatal to engine construction and surface
//! synchronously from [`Starfield::run`](crate::Starfield::run); the
//! frame loop never starts half-initialized. Runtime anomalies are
//! tolerated instead of crashing the loop.

use std::fmt;

/// Errors that can occur while initializing the GPU.
#[derive(Debug)]
pub enum GpuError {
    /// Failed to create a surface for rendering.
    SurfaceCreation(wgpu::CreateSurfaceError),
    /// No compatible GPU adapter found.
    NoAdapter,
    /// Failed to create GPU device.
    DeviceCreation(wgpu::RequestDeviceError),
}

impl fmt::Display for GpuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GpuError::SurfaceCreation(e) => write!(f, "Failed to create GPU surface: {}", e),
            GpuError::NoAdapter => write!(f, "No compatible GPU adapter found. Ensure your system has a GPU with Vulkan/Metal/DX12 support."),
            GpuError::DeviceCreation(e) => write!(f, "Failed to create GPU device: {}", e),
        }
    }
}

impl std::error::Error for GpuError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GpuError::SurfaceCreation(e) => Some(e),
            GpuError::DeviceCreation(e) => Some(e),
            GpuError::NoAdapter => None,
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

/// Errors that can occur when building and running a starfield.
#[derive(Debug)]
pub enum StarfieldError {
    /// Failed to create the event loop.
    EventLoop(winit::error::EventLoopError),
    /// Failed to create the window.
    Window(winit::error::OsError),
    /// GPU initialization failed.
    Gpu(GpuError),
    /// The configuration cannot produce a valid starfield.
    InvalidConfig(String),
}

impl fmt::Display for StarfieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StarfieldError::EventLoop(e) => write!(f, "Failed to create event loop: {}", e),
            StarfieldError::Window(e) => write!(f, "Failed to create window: {}", e),
            StarfieldError::Gpu(e) => write!(f, "GPU error: {}", e),
            StarfieldError::InvalidConfig(msg) => write!(f, "Invalid configuration: {}", msg),
        }
    }
}

impl std::error::Error for StarfieldError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StarfieldError::EventLoop(e) => Some(e),
            StarfieldError::Window(e) => Some(e),
            StarfieldError::Gpu(e) => Some(e),
            StarfieldError::InvalidConfig(_) => None,
        }
    }
}

impl From<winit::error::EventLoopError> for StarfieldError {
    fn from(e: winit::error::EventLoopError) -> Self {
        StarfieldError::EventLoop(e)
    }
}

impl From<winit::error::OsError> for StarfieldError {
    fn from(e: winit::error::OsError) -> Self {
        StarfieldError::Window(e)
    }
}

impl From<GpuError> for StarfieldError {
    fn from(e: GpuError) -> Self {
        StarfieldError::Gpu(e)
    }
}

use iced_wgpu::wgpu;
use thiserror::Error;

use super::shaders::ShaderStage;

/// A shader stage the driver rejected. `log` is the driver's diagnostic text.
#[derive(Debug, Clone, Error)]
#[error("{stage} shader compilation failed: {log}")]
pub struct CompileError {
    pub stage: ShaderStage,
    pub log: String,
}

/// Vertex and fragment stages compiled but could not be linked into a program.
#[derive(Debug, Clone, Error)]
#[error("Shader program link failed: {log}")]
pub struct LinkError {
    pub log: String,
}

#[derive(Debug, Error)]
pub enum GpuError {
    #[error("Failed to find suitable GPU adapter")]
    AdapterNotFound,

    #[error("Failed to request device: {0}")]
    DeviceRequest(#[from] wgpu::RequestDeviceError),

    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    Link(#[from] LinkError),

    #[error("Texture error: {0}")]
    Texture(String),

    #[error("Adjustment pass failed: {0}")]
    Render(String),

    #[error("Surface readback failed: {0}")]
    Readback(String),
}

impl GpuError {
    /// The drawing context itself could not be acquired
    pub fn is_resource_acquisition(&self) -> bool {
        matches!(self, GpuError::AdapterNotFound | GpuError::DeviceRequest(_))
    }
}

pub type Result<T> = std::result::Result<T, GpuError>;

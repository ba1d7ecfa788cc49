/// GPU-accelerated adjustment pipeline
///
/// Real-time brightness, exposure and contrast using wgpu and WGSL shaders.
///
/// Architecture:
/// - `context.rs` - adapter/device ownership and resource accounting
/// - `shaders.rs` - WGSL sources, per-stage compile, program link
/// - `geometry.rs` - full-screen quad buffers
/// - `texture.rs` - source texture, render surface, readback
/// - `uniforms.rs` - parameter binder
/// - `pipeline.rs` - the render session tying the above together

pub mod context;
pub mod error;
pub mod geometry;
pub mod pipeline;
pub mod resources;
pub mod shaders;
pub mod texture;
pub mod uniforms;

#[cfg(test)]
mod tests;

pub use context::{is_gpu_available, GpuConfig, GpuContext};
pub use error::{CompileError, GpuError, LinkError, Result};
pub use pipeline::RenderSession;
pub use resources::ResourceCounts;
pub use shaders::{ShaderProgram, ShaderStage};

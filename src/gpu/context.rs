/// wgpu device ownership
///
/// One `GpuContext` outlives every editing session. Sessions allocate their
/// shaders, buffers and textures from it and release them on drop.

// Use wgpu from iced to avoid dependency conflicts
use iced_wgpu::wgpu;
use log::{debug, info};
use std::sync::Arc;

use super::error::{GpuError, Result};
use super::resources::{ResourceCounts, ResourceGuard, ResourceKind, ResourceTracker};

/// Settings used when requesting the adapter
#[derive(Debug, Clone)]
pub struct GpuConfig {
    pub power_preference: wgpu::PowerPreference,
    /// Allow a software adapter (e.g. on CI machines)
    pub force_fallback_adapter: bool,
}

impl Default for GpuConfig {
    fn default() -> Self {
        Self {
            power_preference: wgpu::PowerPreference::HighPerformance,
            force_fallback_adapter: false,
        }
    }
}

fn create_instance() -> wgpu::Instance {
    wgpu::Instance::new(wgpu::InstanceDescriptor {
        backends: wgpu::Backends::all(),
        ..Default::default()
    })
}

/// Check if an adapter exists without creating a device
pub fn is_gpu_available() -> bool {
    let instance = create_instance();
    pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
        power_preference: wgpu::PowerPreference::HighPerformance,
        compatible_surface: None,
        force_fallback_adapter: false,
    }))
    .is_some()
}

pub struct GpuContext {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    adapter_info: wgpu::AdapterInfo,
    tracker: Arc<ResourceTracker>,
}

// Manual Debug implementation (wgpu types don't implement Debug)
impl std::fmt::Debug for GpuContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GpuContext")
            .field("adapter", &self.adapter_info.name)
            .field("backend", &self.adapter_info.backend)
            .field("resources", &self.tracker.snapshot())
            .finish_non_exhaustive()
    }
}

impl GpuContext {
    /// Acquire adapter, device and queue, blocking the calling thread
    pub fn new(config: &GpuConfig) -> Result<Self> {
        pollster::block_on(Self::request(config))
    }

    /// Async variant of `new`
    pub async fn request(config: &GpuConfig) -> Result<Self> {
        let instance = create_instance();

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: config.power_preference,
                compatible_surface: None,
                force_fallback_adapter: config.force_fallback_adapter,
            })
            .await
            .ok_or(GpuError::AdapterNotFound)?;

        let adapter_info = adapter.get_info();

        // Downlevel limits keep GL/WebGL-class adapters usable; texture size
        // still goes as high as the adapter allows.
        let limits = wgpu::Limits::downlevel_defaults().using_resolution(adapter.limits());

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Tone Editor Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: limits,
                },
                None,
            )
            .await?;

        info!(
            "GPU ready: {} ({:?}, {:?})",
            adapter_info.name, adapter_info.device_type, adapter_info.backend
        );
        debug!(
            "Max 2D texture dimension: {}",
            device.limits().max_texture_dimension_2d
        );

        Ok(Self {
            device,
            queue,
            adapter_info,
            tracker: ResourceTracker::new(),
        })
    }

    pub fn adapter_info(&self) -> &wgpu::AdapterInfo {
        &self.adapter_info
    }

    /// Live GPU objects allocated through this context
    pub fn resources(&self) -> ResourceCounts {
        self.tracker.snapshot()
    }

    pub(crate) fn track(&self, kind: ResourceKind) -> ResourceGuard {
        self.tracker.acquire(kind)
    }

    /// Run `f` inside a validation error scope.
    ///
    /// Returns the value together with the validation message the device
    /// reported while `f` ran, if any.
    pub(crate) fn validated<T>(&self, f: impl FnOnce(&wgpu::Device) -> T) -> (T, Option<String>) {
        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let value = f(&self.device);
        let error = pollster::block_on(self.device.pop_error_scope());
        (value, error.map(|e| e.to_string()))
    }
}

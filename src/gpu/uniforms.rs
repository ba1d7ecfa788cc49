//! Parameter binder.
//!
//! Uniform buffer and bind group are created once when the program links.
//! `bind` only writes new values into that buffer; it does no range mapping
//! and no clamping (see `state::edit::SliderValues::to_parameters`).

use bytemuck::{Pod, Zeroable};
use iced_wgpu::wgpu;
use log::trace;

use super::context::GpuContext;
use super::resources::{ResourceGuard, ResourceKind};
use super::shaders::{bindings, ShaderProgram};
use crate::state::edit::AdjustmentParameters;

/// Must match the WGSL `Adjustments` struct (16 bytes)
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct AdjustmentUniform {
    pub brightness: f32,
    pub exposure: f32,
    pub contrast: f32,
    padding: f32,
}

impl From<&AdjustmentParameters> for AdjustmentUniform {
    fn from(params: &AdjustmentParameters) -> Self {
        Self {
            brightness: params.brightness,
            exposure: params.exposure,
            contrast: params.contrast,
            padding: 0.0,
        }
    }
}

/// Cached uniform handles of a linked program
pub struct UniformBindings {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    _guard: ResourceGuard,
}

impl UniformBindings {
    pub(crate) fn layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Adjustments Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: bindings::ADJUSTMENTS_BINDING,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: wgpu::BufferSize::new(
                        std::mem::size_of::<AdjustmentUniform>() as u64,
                    ),
                },
                count: None,
            }],
        })
    }

    pub(crate) fn new(ctx: &GpuContext, layout: &wgpu::BindGroupLayout) -> Self {
        use wgpu::util::DeviceExt;

        let initial = AdjustmentUniform::from(&AdjustmentParameters::default());
        let buffer = ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Adjustments Uniform Buffer"),
            contents: bytemuck::bytes_of(&initial),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Adjustments Bind Group"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: bindings::ADJUSTMENTS_BINDING,
                resource: buffer.as_entire_binding(),
            }],
        });

        Self {
            buffer,
            bind_group,
            _guard: ctx.track(ResourceKind::Buffer),
        }
    }

    pub(crate) fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}

/// Write `params` into the program's uniforms ahead of the next draw
pub fn bind(ctx: &GpuContext, program: &ShaderProgram, params: &AdjustmentParameters) {
    let uniform = AdjustmentUniform::from(params);
    trace!(
        "Binding brightness {:.2}, exposure {:.2}, contrast {:.2}",
        uniform.brightness,
        uniform.exposure,
        uniform.contrast
    );
    ctx.queue
        .write_buffer(&program.uniforms().buffer, 0, bytemuck::bytes_of(&uniform));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_layout_is_16_bytes() {
        assert_eq!(std::mem::size_of::<AdjustmentUniform>(), 16);
    }

    #[test]
    fn test_values_pass_through_unscaled() {
        let params = AdjustmentParameters::new(-4.0, 9.5, 0.25);
        let uniform = AdjustmentUniform::from(&params);
        assert_eq!(uniform.brightness, -4.0);
        assert_eq!(uniform.exposure, 9.5);
        assert_eq!(uniform.contrast, 0.25);
    }

    #[test]
    fn test_field_order_matches_wgsl() {
        let uniform = AdjustmentUniform::from(&AdjustmentParameters::new(1.0, 2.0, 3.0));
        let floats: &[f32] = bytemuck::cast_slice(bytemuck::bytes_of(&uniform));
        assert_eq!(floats, &[1.0, 2.0, 3.0, 0.0]);
    }
}

//! Full-screen quad geometry.
//!
//! Two triangles spanning NDC [-1, 1]² with texture coordinates spanning
//! [0, 1]². The data is constant; a session uploads it once and reuses it for
//! every draw.

use iced_wgpu::wgpu;
use wgpu::util::DeviceExt;

use super::context::GpuContext;
use super::resources::{ResourceGuard, ResourceKind};

pub const VERTEX_COUNT: u32 = 6;

pub const QUAD_POSITIONS: [[f32; 2]; 6] = [
    [-1.0, -1.0],
    [1.0, -1.0],
    [-1.0, 1.0],
    [-1.0, 1.0],
    [1.0, -1.0],
    [1.0, 1.0],
];

pub const QUAD_TEX_COORDS: [[f32; 2]; 6] = [
    [0.0, 0.0],
    [1.0, 0.0],
    [0.0, 1.0],
    [0.0, 1.0],
    [1.0, 0.0],
    [1.0, 1.0],
];

/// Shader locations of the two vertex attributes
pub const POSITION_LOCATION: u32 = 0;
pub const TEX_COORD_LOCATION: u32 = 1;

const POSITION_ATTRIBUTES: [wgpu::VertexAttribute; 1] =
    wgpu::vertex_attr_array![POSITION_LOCATION => Float32x2];
const TEX_COORD_ATTRIBUTES: [wgpu::VertexAttribute; 1] =
    wgpu::vertex_attr_array![TEX_COORD_LOCATION => Float32x2];

/// Vertex buffers for the quad, one per attribute
pub struct GeometryBuffers {
    positions: wgpu::Buffer,
    tex_coords: wgpu::Buffer,
    _guards: [ResourceGuard; 2],
}

impl GeometryBuffers {
    pub fn upload(ctx: &GpuContext) -> Self {
        let positions = ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Quad Positions"),
            contents: bytemuck::cast_slice(&QUAD_POSITIONS),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let tex_coords = ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Quad Texture Coordinates"),
            contents: bytemuck::cast_slice(&QUAD_TEX_COORDS),
            usage: wgpu::BufferUsages::VERTEX,
        });

        Self {
            positions,
            tex_coords,
            _guards: [
                ctx.track(ResourceKind::Buffer),
                ctx.track(ResourceKind::Buffer),
            ],
        }
    }

    /// Buffer layouts in slot order: positions, then texture coordinates
    pub fn layouts() -> [wgpu::VertexBufferLayout<'static>; 2] {
        let stride = std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress;
        [
            wgpu::VertexBufferLayout {
                array_stride: stride,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &POSITION_ATTRIBUTES,
            },
            wgpu::VertexBufferLayout {
                array_stride: stride,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &TEX_COORD_ATTRIBUTES,
            },
        ]
    }

    pub(crate) fn set_on<'a>(&'a self, pass: &mut wgpu::RenderPass<'a>) {
        pass.set_vertex_buffer(0, self.positions.slice(..));
        pass.set_vertex_buffer(1, self.tex_coords.slice(..));
    }
}

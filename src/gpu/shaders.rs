/// WGSL sources and the shader program lifecycle
///
/// The two stages are separate modules so each one compiles (and fails) on
/// its own:
/// - `VERTEX_SHADER` passes the quad through and forwards texture coordinates
/// - `FRAGMENT_SHADER` samples the source and applies the adjustment
///
/// `compile` turns one source into a `Shader`, `link` turns a vertex and a
/// fragment `Shader` into a `ShaderProgram`. Neither retries: the sources are
/// static, so a failure on one runtime is a failure every time.

use iced_wgpu::wgpu;
use log::{debug, error};
use std::fmt;

use super::context::GpuContext;
use super::error::{CompileError, LinkError};
use super::geometry::GeometryBuffers;
use super::resources::{ResourceGuard, ResourceKind};
use super::texture::SURFACE_FORMAT;
use super::uniforms::UniformBindings;

/// Bind group / binding numbers shared between Rust and WGSL.
/// The WGSL below hard-codes the same numbers.
pub mod bindings {
    /// Group 0: source texture + sampler
    pub const TEXTURE_GROUP: u32 = 0;
    pub const TEXTURE_BINDING: u32 = 0;
    pub const SAMPLER_BINDING: u32 = 1;

    /// Group 1: adjustment uniforms
    pub const UNIFORM_GROUP: u32 = 1;
    pub const ADJUSTMENTS_BINDING: u32 = 0;
}

pub const VERTEX_ENTRY: &str = "vs_main";
pub const FRAGMENT_ENTRY: &str = "fs_main";

pub const VERTEX_SHADER: &str = r#"
struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) tex_coords: vec2<f32>,
}

@vertex
fn vs_main(
    @location(0) position: vec2<f32>,
    @location(1) tex_coords: vec2<f32>,
) -> VertexOutput {
    var output: VertexOutput;
    output.clip_position = vec4<f32>(position, 0.0, 1.0);
    output.tex_coords = tex_coords;
    return output;
}
"#;

pub const FRAGMENT_SHADER: &str = r#"
struct Adjustments {
    brightness: f32,
    exposure: f32,
    contrast: f32,
    padding: f32,
}

@group(0) @binding(0)
var source_texture: texture_2d<f32>;

@group(0) @binding(1)
var source_sampler: sampler;

@group(1) @binding(0)
var<uniform> adjustments: Adjustments;

@fragment
fn fs_main(@location(0) tex_coords: vec2<f32>) -> @location(0) vec4<f32> {
    // Quad coordinates are bottom-left origin, texture rows are top-left origin
    let flipped = vec2<f32>(tex_coords.x, 1.0 - tex_coords.y);
    let texel = textureSample(source_texture, source_sampler, flipped);

    // Order is fixed: contrast around mid-gray, then brightness, then exposure
    var rgb = (texel.rgb - vec3<f32>(0.5)) * adjustments.contrast + vec3<f32>(0.5);
    rgb = rgb + vec3<f32>(adjustments.brightness);
    rgb = rgb * adjustments.exposure;

    return vec4<f32>(clamp(rgb, vec3<f32>(0.0), vec3<f32>(1.0)), texel.a);
}
"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    pub fn entry_point(self) -> &'static str {
        match self {
            ShaderStage::Vertex => VERTEX_ENTRY,
            ShaderStage::Fragment => FRAGMENT_ENTRY,
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => write!(f, "vertex"),
            ShaderStage::Fragment => write!(f, "fragment"),
        }
    }
}

/// One compiled stage
pub struct Shader {
    stage: ShaderStage,
    module: wgpu::ShaderModule,
    _guard: ResourceGuard,
}

impl fmt::Debug for Shader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Shader")
            .field("stage", &self.stage)
            .finish_non_exhaustive()
    }
}

/// Compile one WGSL stage.
///
/// On failure the half-built module is dropped before returning.
pub fn compile(ctx: &GpuContext, source: &str, stage: ShaderStage) -> Result<Shader, CompileError> {
    let label = format!("Tone {} shader", stage);
    let (module, failure) = ctx.validated(|device| {
        device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(label.as_str()),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        })
    });

    if let Some(log) = failure {
        drop(module);
        error!("{} shader failed to compile:\n{}", stage, log);
        return Err(CompileError { stage, log });
    }

    debug!("Compiled {} shader", stage);
    Ok(Shader {
        stage,
        module,
        _guard: ctx.track(ResourceKind::Shader),
    })
}

/// Linked vertex + fragment pipeline with its uniform handles
///
/// Owns the compiled stages; everything is released together on drop.
pub struct ShaderProgram {
    pipeline: wgpu::RenderPipeline,
    texture_layout: wgpu::BindGroupLayout,
    uniforms: UniformBindings,
    _vertex: Shader,
    _fragment: Shader,
    _guard: ResourceGuard,
}

impl fmt::Debug for ShaderProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShaderProgram").finish_non_exhaustive()
    }
}

/// Link two compiled stages into a program.
///
/// Stage mismatches and interface errors both surface as `LinkError`.
pub fn link(ctx: &GpuContext, vertex: Shader, fragment: Shader) -> Result<ShaderProgram, LinkError> {
    if vertex.stage != ShaderStage::Vertex || fragment.stage != ShaderStage::Fragment {
        let log = format!(
            "expected vertex + fragment stages, got {} + {}",
            vertex.stage, fragment.stage
        );
        error!("Shader program failed to link: {}", log);
        return Err(LinkError { log });
    }

    let texture_layout = ctx.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("Source Texture Layout"),
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: bindings::TEXTURE_BINDING,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: bindings::SAMPLER_BINDING,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
    });

    let uniform_layout = UniformBindings::layout(&ctx.device);

    let pipeline_layout = ctx.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Tone Pipeline Layout"),
        bind_group_layouts: &[&texture_layout, &uniform_layout],
        push_constant_ranges: &[],
    });

    let vertex_buffers = GeometryBuffers::layouts();
    let (pipeline, failure) = ctx.validated(|device| {
        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Tone Render Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &vertex.module,
                entry_point: VERTEX_ENTRY,
                buffers: &vertex_buffers,
            },
            fragment: Some(wgpu::FragmentState {
                module: &fragment.module,
                entry_point: FRAGMENT_ENTRY,
                targets: &[Some(wgpu::ColorTargetState {
                    format: SURFACE_FORMAT,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                unclipped_depth: false,
                polygon_mode: wgpu::PolygonMode::Fill,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
        })
    });

    if let Some(log) = failure {
        drop(pipeline);
        error!("Shader program failed to link:\n{}", log);
        return Err(LinkError { log });
    }

    // Uniform handles are resolved here once and reused for every draw
    let uniforms = UniformBindings::new(ctx, &uniform_layout);

    debug!("Linked shader program");
    Ok(ShaderProgram {
        pipeline,
        texture_layout,
        uniforms,
        _vertex: vertex,
        _fragment: fragment,
        _guard: ctx.track(ResourceKind::Program),
    })
}

impl ShaderProgram {
    /// Compile the built-in stages and link them
    pub fn build(ctx: &GpuContext) -> Result<Self, super::GpuError> {
        let vertex = compile(ctx, VERTEX_SHADER, ShaderStage::Vertex)?;
        let fragment = compile(ctx, FRAGMENT_SHADER, ShaderStage::Fragment)?;
        Ok(link(ctx, vertex, fragment)?)
    }

    pub(crate) fn pipeline(&self) -> &wgpu::RenderPipeline {
        &self.pipeline
    }

    pub(crate) fn texture_layout(&self) -> &wgpu::BindGroupLayout {
        &self.texture_layout
    }

    pub fn uniforms(&self) -> &UniformBindings {
        &self.uniforms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sources_declare_entry_points() {
        assert!(VERTEX_SHADER.contains(&format!("fn {}(", VERTEX_ENTRY)));
        assert!(FRAGMENT_SHADER.contains(&format!("fn {}(", FRAGMENT_ENTRY)));
        assert_eq!(ShaderStage::Vertex.entry_point(), "vs_main");
        assert_eq!(ShaderStage::Fragment.entry_point(), "fs_main");
    }

    #[test]
    fn test_fragment_bindings_match_constants() {
        let texture = format!(
            "@group({}) @binding({})\nvar source_texture",
            bindings::TEXTURE_GROUP,
            bindings::TEXTURE_BINDING
        );
        let sampler = format!(
            "@group({}) @binding({})\nvar source_sampler",
            bindings::TEXTURE_GROUP,
            bindings::SAMPLER_BINDING
        );
        let uniforms = format!(
            "@group({}) @binding({})\nvar<uniform> adjustments",
            bindings::UNIFORM_GROUP,
            bindings::ADJUSTMENTS_BINDING
        );
        assert!(FRAGMENT_SHADER.contains(&texture));
        assert!(FRAGMENT_SHADER.contains(&sampler));
        assert!(FRAGMENT_SHADER.contains(&uniforms));
    }

    #[test]
    fn test_fragment_applies_contrast_before_brightness_before_exposure() {
        let contrast = FRAGMENT_SHADER.find("* adjustments.contrast").unwrap();
        let brightness = FRAGMENT_SHADER.find("+ vec3<f32>(adjustments.brightness)").unwrap();
        let exposure = FRAGMENT_SHADER.find("* adjustments.exposure").unwrap();
        assert!(contrast < brightness);
        assert!(brightness < exposure);
    }

    #[test]
    fn test_stage_display() {
        assert_eq!(ShaderStage::Vertex.to_string(), "vertex");
        assert_eq!(ShaderStage::Fragment.to_string(), "fragment");
    }
}

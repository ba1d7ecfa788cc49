/// Render session for one loaded image
///
/// This module owns everything the adjustment pass needs for one image:
/// - Shader program (with its cached uniform handles)
/// - Quad geometry buffers
/// - Source texture and its bind group
/// - Render surface at the image's native size
///
/// Creating a `RenderSession` acquires all of it; dropping it releases all of
/// it. A failure halfway through construction drops whatever was already
/// created, so no partial session is ever observable.

use iced_wgpu::wgpu;
use image::RgbaImage;
use log::{debug, error, info};

use super::context::GpuContext;
use super::error::{GpuError, Result};
use super::geometry::{GeometryBuffers, VERTEX_COUNT};
use super::shaders::{bindings, ShaderProgram};
use super::texture::{RenderSurface, SourceTexture};
use super::uniforms;
use crate::state::edit::AdjustmentParameters;

pub struct RenderSession {
    program: ShaderProgram,
    geometry: GeometryBuffers,
    texture: SourceTexture,
    texture_bind_group: wgpu::BindGroup,
    surface: RenderSurface,
}

// Manual Debug implementation (wgpu types don't implement Debug)
impl std::fmt::Debug for RenderSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderSession")
            .field("width", &self.surface.width)
            .field("height", &self.surface.height)
            .finish_non_exhaustive()
    }
}

impl RenderSession {
    /// Build program, geometry, texture and surface for `image`
    pub fn new(ctx: &GpuContext, image: &RgbaImage) -> Result<Self> {
        let program = ShaderProgram::build(ctx)?;
        let geometry = GeometryBuffers::upload(ctx);
        let texture = SourceTexture::upload(ctx, image)?;
        let surface = RenderSurface::new(ctx, texture.width, texture.height)?;

        let texture_bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Source Texture Bind Group"),
            layout: program.texture_layout(),
            entries: &[
                wgpu::BindGroupEntry {
                    binding: bindings::TEXTURE_BINDING,
                    resource: wgpu::BindingResource::TextureView(texture.view()),
                },
                wgpu::BindGroupEntry {
                    binding: bindings::SAMPLER_BINDING,
                    resource: wgpu::BindingResource::Sampler(texture.sampler()),
                },
            ],
        });

        info!(
            "Render session ready at {}x{}",
            surface.width, surface.height
        );

        Ok(Self {
            program,
            geometry,
            texture,
            texture_bind_group,
            surface,
        })
    }

    /// Native size of the loaded image (and of the surface)
    pub fn dimensions(&self) -> (u32, u32) {
        self.surface.dimensions()
    }

    pub fn surface(&self) -> &RenderSurface {
        &self.surface
    }

    /// Bind `params` and draw the quad once into the surface.
    ///
    /// Validation errors raised while encoding are returned and nothing is
    /// submitted.
    pub fn render(&self, ctx: &GpuContext, params: &AdjustmentParameters) -> Result<()> {
        let (commands, failure) = ctx.validated(|device| {
            uniforms::bind(ctx, &self.program, params);

            let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Adjustment Encoder"),
            });
            self.encode_pass(&mut encoder);
            encoder.finish()
        });

        if let Some(log) = failure {
            drop(commands);
            error!("Adjustment pass failed: {}", log);
            return Err(GpuError::Render(log));
        }

        ctx.queue.submit(Some(commands));
        debug!(
            "Rendered {}x{} with {:?}",
            self.texture.width, self.texture.height, params
        );
        Ok(())
    }

    fn encode_pass(&self, encoder: &mut wgpu::CommandEncoder) {
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Adjustment Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: self.surface.view(),
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        render_pass.set_viewport(
            0.0,
            0.0,
            self.surface.width as f32,
            self.surface.height as f32,
            0.0,
            1.0,
        );
        render_pass.set_pipeline(self.program.pipeline());
        render_pass.set_bind_group(bindings::TEXTURE_GROUP, &self.texture_bind_group, &[]);
        render_pass.set_bind_group(
            bindings::UNIFORM_GROUP,
            self.program.uniforms().bind_group(),
            &[],
        );
        self.geometry.set_on(&mut render_pass);
        render_pass.draw(0..VERTEX_COUNT, 0..1);
    }

    /// Full-resolution adjusted raster
    pub fn read_surface(&self, ctx: &GpuContext) -> Result<RgbaImage> {
        self.surface.read_back(ctx)
    }
}

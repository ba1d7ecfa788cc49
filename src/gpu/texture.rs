//! Source texture and render surface.
//!
//! The source texture is an exact-size RGBA8 copy of the loaded image, sampled
//! nearest-neighbour with clamp-to-edge. The render surface is the offscreen
//! target the adjustment pass draws into, always at the source's native size.

use iced_wgpu::wgpu;
use image::RgbaImage;
use log::debug;

use super::context::GpuContext;
use super::error::{GpuError, Result};
use super::resources::{ResourceGuard, ResourceKind};

/// Stored RGB encoding, no sRGB decode on sample
pub const SOURCE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;
/// Stored RGB encoding, no sRGB encode on write; writes clamp to [0, 1]
pub const SURFACE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

const BYTES_PER_PIXEL: u32 = 4;

/// Sampler settings for the source: no interpolation, no wrapping.
/// Zoomed-in previews show hard texel edges because of this.
pub fn sampler_descriptor() -> wgpu::SamplerDescriptor<'static> {
    wgpu::SamplerDescriptor {
        label: Some("Source Sampler (nearest)"),
        address_mode_u: wgpu::AddressMode::ClampToEdge,
        address_mode_v: wgpu::AddressMode::ClampToEdge,
        address_mode_w: wgpu::AddressMode::ClampToEdge,
        mag_filter: wgpu::FilterMode::Nearest,
        min_filter: wgpu::FilterMode::Nearest,
        mipmap_filter: wgpu::FilterMode::Nearest,
        ..Default::default()
    }
}

fn check_dimensions(ctx: &GpuContext, width: u32, height: u32) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(GpuError::Texture(format!(
            "Invalid dimensions {}x{}: image is empty",
            width, height
        )));
    }
    let max = ctx.device.limits().max_texture_dimension_2d;
    if width > max || height > max {
        return Err(GpuError::Texture(format!(
            "Image {}x{} exceeds the device texture limit of {}",
            width, height, max
        )));
    }
    Ok(())
}

/// GPU-resident copy of the loaded image
pub struct SourceTexture {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    sampler: wgpu::Sampler,
    pub width: u32,
    pub height: u32,
    _guard: ResourceGuard,
}

impl SourceTexture {
    /// Upload an RGBA8 image at its native size
    pub fn upload(ctx: &GpuContext, image: &RgbaImage) -> Result<Self> {
        let (width, height) = image.dimensions();
        check_dimensions(ctx, width, height)?;

        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };

        let texture = ctx.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Source Texture (RGBA8)"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: SOURCE_FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        ctx.queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            image.as_raw(),
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(BYTES_PER_PIXEL * width),
                rows_per_image: Some(height),
            },
            size,
        );
        debug!("Uploaded {}x{} source texture", width, height);

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = ctx.device.create_sampler(&sampler_descriptor());

        Ok(Self {
            texture,
            view,
            sampler,
            width,
            height,
            _guard: ctx.track(ResourceKind::Texture),
        })
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    pub fn sampler(&self) -> &wgpu::Sampler {
        &self.sampler
    }
}

/// Offscreen render target, same size as the source
pub struct RenderSurface {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    pub width: u32,
    pub height: u32,
    _guard: ResourceGuard,
}

impl RenderSurface {
    pub fn new(ctx: &GpuContext, width: u32, height: u32) -> Result<Self> {
        check_dimensions(ctx, width, height)?;

        let texture = ctx.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Render Surface"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: SURFACE_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        Ok(Self {
            texture,
            view,
            width,
            height,
            _guard: ctx.track(ResourceKind::Surface),
        })
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub(crate) fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    /// Copy the surface back to the CPU
    pub fn read_back(&self, ctx: &GpuContext) -> Result<RgbaImage> {
        // Rows must be copied with 256-byte aligned stride
        let bytes_per_row = self.width * BYTES_PER_PIXEL;
        let padded_bytes_per_row = (bytes_per_row + wgpu::COPY_BYTES_PER_ROW_ALIGNMENT - 1)
            & !(wgpu::COPY_BYTES_PER_ROW_ALIGNMENT - 1);
        let buffer_size = (padded_bytes_per_row * self.height) as u64;

        let output_buffer = ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Surface Readback Buffer"),
            size: buffer_size,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let mut encoder = ctx.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Readback Encoder"),
        });
        encoder.copy_texture_to_buffer(
            wgpu::ImageCopyTexture {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::ImageCopyBuffer {
                buffer: &output_buffer,
                layout: wgpu::ImageDataLayout {
                    offset: 0,
                    bytes_per_row: Some(padded_bytes_per_row),
                    rows_per_image: Some(self.height),
                },
            },
            wgpu::Extent3d {
                width: self.width,
                height: self.height,
                depth_or_array_layers: 1,
            },
        );
        ctx.queue.submit(Some(encoder.finish()));

        let buffer_slice = output_buffer.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
            // Receiver outlives the poll below
            let _ = tx.send(result);
        });
        ctx.device.poll(wgpu::Maintain::Wait);
        rx.recv()
            .map_err(|e| GpuError::Readback(e.to_string()))?
            .map_err(|e| GpuError::Readback(e.to_string()))?;

        let data = buffer_slice.get_mapped_range();
        let mut pixels = Vec::with_capacity((bytes_per_row * self.height) as usize);
        for row in data.chunks_exact(padded_bytes_per_row as usize) {
            pixels.extend_from_slice(&row[..bytes_per_row as usize]);
        }
        drop(data);
        output_buffer.unmap();

        RgbaImage::from_raw(self.width, self.height, pixels)
            .ok_or_else(|| GpuError::Readback("readback size mismatch".to_string()))
    }
}

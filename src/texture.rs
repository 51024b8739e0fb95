use std::path::Path;

use crate::gpu::GpuContext;

/// How texel values are interpreted by the shader.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextureKind {
    /// Colors, stored sRGB and linearized on sampling.
    Color,
    /// Raw vectors such as a normal map, sampled as-is.
    Data,
}

impl TextureKind {
    pub fn format(self) -> wgpu::TextureFormat {
        match self {
            TextureKind::Color => wgpu::TextureFormat::Rgba8UnormSrgb,
            TextureKind::Data => wgpu::TextureFormat::Rgba8Unorm,
        }
    }
}

/// Texel of a normal map whose normals all point straight out of the surface.
pub const FLAT_NORMAL: [u8; 4] = [128, 128, 255, 255];

/// A GPU texture that can be bound to shaders.
#[derive(Debug)]
pub struct Texture {
    #[allow(dead_code)]
    pub(crate) texture: wgpu::Texture,
    pub(crate) view: wgpu::TextureView,
    pub(crate) sampler: wgpu::Sampler,
    pub width: u32,
    pub height: u32,
}

impl Texture {
    /// Create a texture from raw RGBA data.
    pub fn from_rgba(
        gpu: &GpuContext,
        data: &[u8],
        width: u32,
        height: u32,
        kind: TextureKind,
        label: &str,
    ) -> Self {
        use wgpu::util::DeviceExt;

        let texture = gpu.device.create_texture_with_data(
            &gpu.queue,
            &wgpu::TextureDescriptor {
                label: Some(label),
                size: wgpu::Extent3d {
                    width,
                    height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: kind.format(),
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            data,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        // Bilinear, tiling in both directions
        let sampler = gpu.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(&format!("{} Sampler", label)),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        Self {
            texture,
            view,
            sampler,
            width,
            height,
        }
    }

    /// Load a texture from an image file.
    ///
    /// Paletted and grayscale images are expanded to RGBA.
    pub fn from_file(
        gpu: &GpuContext,
        path: impl AsRef<Path>,
        kind: TextureKind,
    ) -> Result<Self, image::ImageError> {
        let path = path.as_ref();
        let img = image::open(path)?.to_rgba8();
        let (width, height) = img.dimensions();
        Ok(Self::from_rgba(
            gpu,
            &img,
            width,
            height,
            kind,
            &path.display().to_string(),
        ))
    }

    /// Loads a texture, logging and returning `None` on failure.
    ///
    /// A missing texture is not fatal; the renderer substitutes a fallback.
    pub fn load(gpu: &GpuContext, path: impl AsRef<Path>, kind: TextureKind) -> Option<Self> {
        let path = path.as_ref();
        match Self::from_file(gpu, path, kind) {
            Ok(texture) => {
                log::info!(
                    "loaded texture {} ({}x{})",
                    path.display(),
                    texture.width,
                    texture.height
                );
                Some(texture)
            }
            Err(e) => {
                log::error!("unable to load texture {}: {}", path.display(), e);
                None
            }
        }
    }

    /// A 1x1 texture of a single texel.
    pub fn solid(gpu: &GpuContext, texel: [u8; 4], kind: TextureKind, label: &str) -> Self {
        Self::from_rgba(gpu, &texel, 1, 1, kind, label)
    }

    /// Stand-in for a missing color texture.
    pub fn white(gpu: &GpuContext) -> Self {
        Self::solid(gpu, [255, 255, 255, 255], TextureKind::Color, "Fallback White Texture")
    }

    /// Stand-in for a missing normal map.
    pub fn flat_normal_map(gpu: &GpuContext) -> Self {
        Self::solid(gpu, FLAT_NORMAL, TextureKind::Data, "Fallback Flat Normal Map")
    }
}

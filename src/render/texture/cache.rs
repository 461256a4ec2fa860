//! Upload-once cache of decoded images, keyed by image key.

use std::collections::HashMap;

use crate::assets::texture::{ColorSpace, TextureImage};

/// A sampled 2D texture on the GPU.
pub struct GpuTexture {
    #[allow(dead_code)]
    texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub width: u32,
    pub height: u32,
}

impl GpuTexture {
    pub fn upload(device: &wgpu::Device, queue: &wgpu::Queue, image: &TextureImage) -> Self {
        let format = match image.color_space {
            ColorSpace::Srgb => wgpu::TextureFormat::Rgba8UnormSrgb,
            ColorSpace::Linear => wgpu::TextureFormat::Rgba8Unorm,
        };
        let size = wgpu::Extent3d {
            width: image.width,
            height: image.height,
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(&image.key),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &image.rgba,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * image.width),
                rows_per_image: Some(image.height),
            },
            size,
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            texture,
            view,
            width: image.width,
            height: image.height,
        }
    }
}

struct CacheEntry {
    texture: GpuTexture,
    last_used: u64,
}

/// GPU textures keyed by [`TextureImage::key`].
#[derive(Default)]
pub struct TextureCache {
    entries: HashMap<String, CacheEntry>,
    frame: u64,
}

impl TextureCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new frame for usage tracking
    pub fn begin_frame(&mut self) {
        self.frame += 1;
    }

    /// The GPU copy of `image`, uploading it on first use.
    pub fn get_or_upload(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        image: &TextureImage,
    ) -> &GpuTexture {
        let frame = self.frame;
        let entry = self.entries.entry(image.key.clone()).or_insert_with(|| {
            log::debug!("Uploading texture {} ({}x{})", image.key, image.width, image.height);
            CacheEntry {
                texture: GpuTexture::upload(device, queue, image),
                last_used: frame,
            }
        });
        entry.last_used = frame;
        &entry.texture
    }

    /// Mark a cached texture as still in use
    pub fn touch(&mut self, key: &str) {
        if let Some(entry) = self.entries.get_mut(key) {
            entry.last_used = self.frame;
        }
    }

    /// Drop textures unused for more than `max_age` frames. Bind groups keep
    /// their own references, so this only releases the cache's hold.
    pub fn evict_unused(&mut self, max_age: u64) -> usize {
        let frame = self.frame;
        let before = self.entries.len();
        self.entries.retain(|_, e| frame.saturating_sub(e.last_used) <= max_age);
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

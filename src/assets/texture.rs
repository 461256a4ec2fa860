//! Decoded RGBA8 images shared between materials, decals and the GPU cache.

use std::sync::Arc;

use crate::core::{Error, Result};

/// How the renderer should interpret texel values.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ColorSpace {
    /// Colour data (base colour maps, stickers)
    Srgb,
    /// Raw data (the dissolve noise)
    Linear,
}

/// An RGBA8 image with a stable cache key.
///
/// Two images with the same key are the same texture as far as the material
/// pipeline and the GPU cache are concerned.
#[derive(Clone, Debug, PartialEq)]
pub struct TextureImage {
    pub key: String,
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
    pub color_space: ColorSpace,
}

/// Shared handle to a decoded image.
pub type TextureHandle = Arc<TextureImage>;

/// Key of the 1x1 white stand-in for "no texture"
pub const FALLBACK_KEY: &str = "fallback:white";

/// Largest width or height the GPU is guaranteed to accept
/// (`wgpu::Limits::default().max_texture_dimension_2d`)
pub const MAX_TEXTURE_DIMENSION: u32 = 8192;

impl TextureImage {
    /// Wrap raw RGBA8 texels, checking the buffer length.
    pub fn new(
        key: impl Into<String>,
        width: u32,
        height: u32,
        rgba: Vec<u8>,
        color_space: ColorSpace,
    ) -> Result<Self> {
        let expected = width as usize * height as usize * 4;
        if width == 0 || height == 0 || rgba.len() != expected {
            return Err(Error::Asset(format!(
                "image {}x{} needs {} bytes, got {}",
                width, height, expected, rgba.len()
            )));
        }
        if width > MAX_TEXTURE_DIMENSION || height > MAX_TEXTURE_DIMENSION {
            return Err(Error::Asset(format!(
                "image {}x{} exceeds {} texels per side",
                width, height, MAX_TEXTURE_DIMENSION
            )));
        }
        Ok(Self {
            key: key.into(),
            width,
            height,
            rgba,
            color_space,
        })
    }

    /// 1x1 image of a single colour
    pub fn solid(key: impl Into<String>, rgba: [u8; 4]) -> Self {
        Self {
            key: key.into(),
            width: 1,
            height: 1,
            rgba: rgba.to_vec(),
            color_space: ColorSpace::Srgb,
        }
    }

    /// Opaque white stand-in used wherever a material has no map
    pub fn fallback() -> TextureHandle {
        Arc::new(Self::solid(FALLBACK_KEY, [255, 255, 255, 255]))
    }

    /// Decode PNG/JPEG (or any format the `image` crate recognises).
    pub fn decode(key: impl Into<String>, bytes: &[u8]) -> Result<Self> {
        let decoded = image::load_from_memory(bytes)?.to_rgba8();
        Self::from_rgba8(key, decoded, ColorSpace::Srgb)
    }

    /// Take ownership of a decoded image, shrinking it to fit
    /// [`MAX_TEXTURE_DIMENSION`] while keeping its aspect ratio.
    pub fn from_rgba8(key: impl Into<String>, image: image::RgbaImage, color_space: ColorSpace) -> Result<Self> {
        let key = key.into();
        let (width, height) = image.dimensions();
        let image = match fit_dimensions(width, height) {
            Some((w, h)) => {
                log::warn!("Downscaling {} from {}x{} to {}x{}", key, width, height, w, h);
                image::imageops::resize(&image, w, h, image::imageops::FilterType::Triangle)
            }
            None => image,
        };
        let (width, height) = image.dimensions();
        Self::new(key, width, height, image.into_raw(), color_space)
    }

    /// Texel at (x, y), wrapping out-of-range coordinates.
    pub fn texel(&self, x: u32, y: u32) -> [u8; 4] {
        let x = x % self.width;
        let y = y % self.height;
        let i = ((y * self.width + x) * 4) as usize;
        [self.rgba[i], self.rgba[i + 1], self.rgba[i + 2], self.rgba[i + 3]]
    }

    /// True when any texel is not fully opaque
    pub fn has_alpha(&self) -> bool {
        self.rgba.chunks_exact(4).any(|t| t[3] < 255)
    }

    pub fn is_fallback(&self) -> bool {
        self.key == FALLBACK_KEY
    }
}

/// Target size for an image larger than the GPU limit, `None` if it fits.
fn fit_dimensions(width: u32, height: u32) -> Option<(u32, u32)> {
    let largest = width.max(height);
    if largest <= MAX_TEXTURE_DIMENSION {
        return None;
    }
    let scale = MAX_TEXTURE_DIMENSION as f64 / largest as f64;
    let shrink = |v: u32| ((v as f64 * scale).round() as u32).clamp(1, MAX_TEXTURE_DIMENSION);
    Some((shrink(width), shrink(height)))
}

/// Identity comparison used by the material pipeline
pub fn same_texture(a: &TextureImage, b: &TextureImage) -> bool {
    a.key == b.key
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_short_buffer() {
        assert!(TextureImage::new("t", 2, 2, vec![0; 15], ColorSpace::Srgb).is_err());
        assert!(TextureImage::new("t", 0, 2, vec![], ColorSpace::Srgb).is_err());
        assert!(TextureImage::new("t", 2, 2, vec![0; 16], ColorSpace::Srgb).is_ok());
    }

    #[test]
    fn test_fallback_is_opaque_white() {
        let white = TextureImage::fallback();
        assert!(white.is_fallback());
        assert_eq!(white.texel(0, 0), [255, 255, 255, 255]);
        assert_eq!(white.texel(5, 9), [255, 255, 255, 255]);
        assert!(!white.has_alpha());
    }

    #[test]
    fn test_decode_png() {
        let mut img = image::RgbaImage::new(3, 2);
        img.put_pixel(2, 1, image::Rgba([10, 20, 30, 40]));
        let mut bytes = Vec::new();
        img.write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();

        let tex = TextureImage::decode("png", &bytes).unwrap();
        assert_eq!((tex.width, tex.height), (3, 2));
        assert_eq!(tex.texel(2, 1), [10, 20, 30, 40]);
        assert!(tex.has_alpha());
    }

    #[test]
    fn test_new_rejects_oversized() {
        let side = MAX_TEXTURE_DIMENSION + 1;
        let result = TextureImage::new("wide", side, 1, vec![0; side as usize * 4], ColorSpace::Srgb);
        assert!(matches!(result, Err(Error::Asset(_))));
    }

    #[test]
    fn test_decode_downscales_oversized() {
        let img = image::RgbaImage::from_pixel(9000, 2, image::Rgba([200, 100, 50, 255]));
        let mut bytes = Vec::new();
        img.write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();

        let tex = TextureImage::decode("wide.png", &bytes).unwrap();
        assert_eq!(tex.width, MAX_TEXTURE_DIMENSION);
        assert_eq!(tex.height, 2);
        let texel = tex.texel(100, 1);
        for (got, want) in texel.iter().zip([200u8, 100, 50, 255]) {
            assert!(got.abs_diff(want) <= 1, "{:?}", texel);
        }
    }

    #[test]
    fn test_fit_dimensions() {
        assert_eq!(fit_dimensions(1024, 512), None);
        assert_eq!(fit_dimensions(MAX_TEXTURE_DIMENSION, 1), None);
        assert_eq!(fit_dimensions(16384, 4096), Some((8192, 2048)));
        assert_eq!(fit_dimensions(20000, 1), Some((8192, 1)));
    }

    #[test]
    fn test_decode_garbage_fails() {
        assert!(matches!(
            TextureImage::decode("bad", b"definitely not an image"),
            Err(Error::Image(_))
        ));
    }

    #[test]
    fn test_identity_is_by_key() {
        let a = TextureImage::solid("a", [1, 2, 3, 4]);
        let a2 = TextureImage::solid("a", [9, 9, 9, 9]);
        let b = TextureImage::solid("b", [1, 2, 3, 4]);
        assert!(same_texture(&a, &a2));
        assert!(!same_texture(&a, &b));
    }
}

//! Image loading utilities for texture data
//!
//! Mesh textures are decoded once at scene build. A texture that is not given,
//! cannot be read or cannot be decoded is replaced by a 1×1 placeholder.

use crate::assets::source::AssetSource;
use crate::assets::AssetError;

/// Placeholder pixel for a missing color texture (bright pink)
pub const COLOR_PLACEHOLDER: [u8; 4] = [255, 0, 190, 255];

/// Placeholder pixel for a missing normal map (flat, pointing along +Z)
pub const NORMAL_PLACEHOLDER: [u8; 4] = [127, 127, 255, 255];

/// Decoded image data ready for GPU upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    /// Raw RGBA pixel data
    pub data: Vec<u8>,
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Number of color channels (always 4 for RGBA)
    pub channels: u8,
}

impl ImageData {
    /// Decode an encoded image (PNG) from memory
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, AssetError> {
        let img = image::load_from_memory(bytes)
            .map_err(|e| AssetError::LoadFailed(format!("Failed to decode image: {}", e)))?;

        let rgba_img = img.to_rgba8();
        let (width, height) = rgba_img.dimensions();

        log::debug!("Decoded image {}x{}", width, height);

        Ok(Self {
            data: rgba_img.into_raw(),
            width,
            height,
            channels: 4,
        })
    }

    /// Load and decode an image through an asset source
    pub fn load(assets: &dyn AssetSource, path: &str) -> Result<Self, AssetError> {
        let bytes = assets.read_bytes(path)?;
        let image = Self::from_bytes(&bytes)?;
        log::info!("Loaded image {}x{} from {}", image.width, image.height, path);
        Ok(image)
    }

    /// Load an optional image, substituting a 1×1 `placeholder` pixel on any failure
    pub fn load_or_placeholder(assets: &dyn AssetSource, path: Option<&str>, placeholder: [u8; 4]) -> Self {
        let Some(path) = path else {
            return Self::solid_color(1, 1, placeholder);
        };

        Self::load(assets, path).unwrap_or_else(|e| {
            log::warn!("Texture {} unavailable ({}), using placeholder", path, e);
            Self::solid_color(1, 1, placeholder)
        })
    }

    /// Create a solid color image
    pub fn solid_color(width: u32, height: u32, color: [u8; 4]) -> Self {
        let pixel_count = (width * height) as usize;
        let data = color.repeat(pixel_count);

        Self {
            data,
            width,
            height,
            channels: 4,
        }
    }

    /// Get the size of the image data in bytes
    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::source::MemorySource;

    fn encode_png(width: u32, height: u32, pixel: [u8; 4]) -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba(pixel));
        let mut bytes = Vec::new();
        img.write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
            .expect("encode png");
        bytes
    }

    #[test]
    fn test_solid_color() {
        let image = ImageData::solid_color(2, 3, [1, 2, 3, 4]);
        assert_eq!(image.size_bytes(), 24);
        assert_eq!(&image.data[20..24], &[1, 2, 3, 4]);
    }

    #[test]
    fn test_decodes_png_through_source() {
        let mut assets = MemorySource::new();
        assets.insert_bytes("textures/wood.png", encode_png(4, 2, [10, 20, 30, 255]));

        let image = ImageData::load_or_placeholder(&assets, Some("textures/wood.png"), COLOR_PLACEHOLDER);
        assert_eq!((image.width, image.height), (4, 2));
        assert_eq!(&image.data[0..4], &[10, 20, 30, 255]);
    }

    #[test]
    fn test_missing_texture_uses_placeholder() {
        let assets = MemorySource::new();

        let color = ImageData::load_or_placeholder(&assets, Some("missing.png"), COLOR_PLACEHOLDER);
        assert_eq!(color, ImageData::solid_color(1, 1, COLOR_PLACEHOLDER));

        let normal = ImageData::load_or_placeholder(&assets, None, NORMAL_PLACEHOLDER);
        assert_eq!(normal.data, NORMAL_PLACEHOLDER.to_vec());
    }

    #[test]
    fn test_undecodable_texture_uses_placeholder() {
        let mut assets = MemorySource::new();
        assets.insert_bytes("broken.png", b"not a png".to_vec());

        let image = ImageData::load_or_placeholder(&assets, Some("broken.png"), NORMAL_PLACEHOLDER);
        assert_eq!(image.data, NORMAL_PLACEHOLDER.to_vec());
    }
}

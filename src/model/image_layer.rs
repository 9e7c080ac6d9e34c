//! Raster images placed on the canvas (background or image objects).

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use image::RgbaImage;
use serde::{Deserialize, Serialize};

/// A decoded image and where it came from.
///
/// Only the source reference and dimensions are serialized; pixels are kept in
/// memory so the PNG export can rasterize them.
#[derive(Clone, Serialize, Deserialize)]
pub struct ImageLayer {
    /// File path or URL the image was loaded from
    pub source: String,
    pub width: u32,
    pub height: u32,
    #[serde(skip)]
    pixels: Option<Arc<RgbaImage>>,
}

impl ImageLayer {
    /// Create a layer without pixel data (e.g. when restoring a saved scene).
    pub fn unloaded(source: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            source: source.into(),
            width,
            height,
            pixels: None,
        }
    }

    /// Wrap already decoded pixels.
    pub fn from_rgba(source: impl Into<String>, pixels: RgbaImage) -> Self {
        let (width, height) = pixels.dimensions();
        Self {
            source: source.into(),
            width,
            height,
            pixels: Some(Arc::new(pixels)),
        }
    }

    /// Decode an image file from disk.
    pub fn open(path: &Path) -> Result<Self, image::ImageError> {
        let pixels = image::open(path)?.to_rgba8();
        log::debug!(
            "Loaded image {:?} ({}x{})",
            path,
            pixels.width(),
            pixels.height()
        );
        Ok(Self::from_rgba(path.to_string_lossy(), pixels))
    }

    /// Decode an encoded image (PNG, JPEG, ...) held in memory.
    pub fn from_bytes(source: impl Into<String>, bytes: &[u8]) -> Result<Self, image::ImageError> {
        let pixels = image::load_from_memory(bytes)?.to_rgba8();
        Ok(Self::from_rgba(source, pixels))
    }

    /// Decoded pixels, if available.
    pub fn pixels(&self) -> Option<&RgbaImage> {
        self.pixels.as_deref()
    }

    pub fn is_loaded(&self) -> bool {
        self.pixels.is_some()
    }

    /// Try to decode the pixels from `source` if they are missing.
    pub fn ensure_loaded(&mut self) -> Result<(), image::ImageError> {
        if self.pixels.is_none() {
            let pixels = image::open(&self.source)?.to_rgba8();
            self.width = pixels.width();
            self.height = pixels.height();
            self.pixels = Some(Arc::new(pixels));
        }
        Ok(())
    }

    /// File name component of the source, used as the COCO image file name.
    pub fn file_name(&self) -> String {
        let trimmed = self.source.split(['?', '#']).next().unwrap_or(&self.source);
        trimmed
            .rsplit(['/', '\\'])
            .next()
            .filter(|name| !name.is_empty())
            .unwrap_or(trimmed)
            .to_string()
    }
}

impl fmt::Debug for ImageLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageLayer")
            .field("source", &self.source)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("loaded", &self.is_loaded())
            .finish()
    }
}

impl PartialEq for ImageLayer {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source && self.width == other.width && self.height == other.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_name() {
        let layer = ImageLayer::unloaded("https://example.com/img/street.jpg?token=1", 10, 10);
        assert_eq!(layer.file_name(), "street.jpg");

        let layer = ImageLayer::unloaded("C:\\data\\scene.png", 10, 10);
        assert_eq!(layer.file_name(), "scene.png");
    }

    #[test]
    fn test_from_bytes_roundtrip() {
        let img = RgbaImage::from_pixel(4, 3, image::Rgba([10, 20, 30, 255]));
        let mut bytes = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();

        let layer = ImageLayer::from_bytes("mem.png", &bytes).unwrap();
        assert_eq!((layer.width, layer.height), (4, 3));
        assert!(layer.is_loaded());
    }

    #[test]
    fn test_equality_ignores_pixels() {
        let loaded = ImageLayer::from_rgba("a.png", RgbaImage::new(2, 2));
        let unloaded = ImageLayer::unloaded("a.png", 2, 2);
        assert_eq!(loaded, unloaded);
    }
}

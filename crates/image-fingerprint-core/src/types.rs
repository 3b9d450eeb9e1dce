use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Image formats the codec layer accepts and produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImageFormat {
    Jpeg,
    Png,
    WebP,
}

impl ImageFormat {
    /// Determine format from file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            "webp" => Some(Self::WebP),
            _ => None,
        }
    }

    /// Determine format from a declared MIME type
    pub fn from_mime(mime: &str) -> Option<Self> {
        // Ignore parameters such as "; charset=binary"
        let essence = mime.split(';').next().unwrap_or("").trim();
        match essence.to_lowercase().as_str() {
            "image/jpeg" | "image/jpg" => Some(Self::Jpeg),
            "image/png" => Some(Self::Png),
            "image/webp" => Some(Self::WebP),
            _ => None,
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::WebP => "image/webp",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::WebP => "webp",
        }
    }
}

/// A decoded raster image: tightly packed, row-major RGB or RGBA bytes.
///
/// Construction validates that `pixels.len() == width * height * channels`
/// and that `channels` is 3 or 4, so every operation downstream can index
/// the buffer without further checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    width: u32,
    height: u32,
    channels: u8,
    pixels: Vec<u8>,
}

impl DecodedImage {
    /// Create an image from raw parts, rejecting malformed buffers
    pub fn new(width: u32, height: u32, channels: u8, pixels: Vec<u8>) -> Result<Self> {
        let image = Self {
            width,
            height,
            channels,
            pixels,
        };
        image.validate()?;
        Ok(image)
    }

    /// Check the channel count and buffer length invariants
    pub fn validate(&self) -> Result<()> {
        if self.channels != 3 && self.channels != 4 {
            return Err(Error::InvalidImage(format!(
                "unsupported channel count {} (expected 3 or 4)",
                self.channels
            )));
        }

        let expected = (self.width as u64)
            .checked_mul(self.height as u64)
            .and_then(|n| n.checked_mul(self.channels as u64))
            .ok_or_else(|| {
                Error::InvalidImage(format!(
                    "dimensions {}x{} overflow the pixel buffer size",
                    self.width, self.height
                ))
            })?;

        if self.pixels.len() as u64 != expected {
            return Err(Error::InvalidImage(format!(
                "buffer holds {} bytes but {}x{}x{} requires {}",
                self.pixels.len(),
                self.width,
                self.height,
                self.channels,
                expected
            )));
        }

        Ok(())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    pub fn has_alpha(&self) -> bool {
        self.channels == 4
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }

    /// Bytes of one row
    pub fn row(&self, y: u32) -> &[u8] {
        let stride = self.stride();
        let start = y as usize * stride;
        &self.pixels[start..start + stride]
    }

    /// Channel bytes of the pixel at `(x, y)`
    pub fn pixel(&self, x: u32, y: u32) -> &[u8] {
        let channels = self.channels as usize;
        let start = y as usize * self.stride() + x as usize * channels;
        &self.pixels[start..start + channels]
    }

    /// Number of bytes in one row
    pub fn stride(&self) -> usize {
        self.width as usize * self.channels as usize
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_bad_channels() {
        let err = DecodedImage::new(1, 1, 2, vec![0, 0]).unwrap_err();
        assert!(matches!(err, Error::InvalidImage(_)));
    }

    #[test]
    fn test_new_rejects_length_mismatch() {
        let err = DecodedImage::new(2, 2, 3, vec![0; 11]).unwrap_err();
        assert!(matches!(err, Error::InvalidImage(_)));
    }

    #[test]
    fn test_pixel_and_row_access() {
        // 2x2 RGB, each pixel tagged by its index
        let pixels = vec![0, 0, 0, 1, 1, 1, 2, 2, 2, 3, 3, 3];
        let img = DecodedImage::new(2, 2, 3, pixels).unwrap();

        assert_eq!(img.pixel(1, 0), &[1, 1, 1]);
        assert_eq!(img.pixel(0, 1), &[2, 2, 2]);
        assert_eq!(img.row(1), &[2, 2, 2, 3, 3, 3]);
        assert_eq!(img.stride(), 6);
        assert!(!img.has_alpha());
    }

    #[test]
    fn test_format_lookup() {
        assert_eq!(ImageFormat::from_extension("JPEG"), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::from_extension("tiff"), None);
        assert_eq!(
            ImageFormat::from_mime("image/webp; charset=binary"),
            Some(ImageFormat::WebP)
        );
        assert_eq!(ImageFormat::from_mime("text/plain"), None);
        assert_eq!(ImageFormat::Png.mime_type(), "image/png");
    }
}

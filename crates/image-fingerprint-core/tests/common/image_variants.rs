//! A utility for creating controlled image variants
//! for testing purposes.

use image_fingerprint_core::codec::{decode, encode};
use image_fingerprint_core::{DecodedImage, ImageFormat};

pub struct ImageVariant {
    base: DecodedImage,
}

impl ImageVariant {
    pub fn new(base: DecodedImage) -> Self {
        Self { base }
    }

    pub fn base(&self) -> &DecodedImage {
        &self.base
    }

    /// Round-trip the base image through JPEG at `quality`
    pub fn jpeg(&self, quality: u8) -> DecodedImage {
        self.reencode(ImageFormat::Jpeg, Some(quality))
    }

    /// Round-trip the base image through a lossless format
    pub fn lossless(&self, format: ImageFormat) -> DecodedImage {
        self.reencode(format, None)
    }

    fn reencode(&self, format: ImageFormat, quality: Option<u8>) -> DecodedImage {
        let bytes = encode(&self.base, format, quality).unwrap();
        decode(&bytes).unwrap()
    }
}

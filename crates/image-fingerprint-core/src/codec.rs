//! Conversion between encoded image bytes and [`DecodedImage`] buffers.
//!
//! Only JPEG, PNG and WebP are accepted. Decoded images with an alpha channel
//! become 4-channel RGBA, everything else 3-channel RGB.

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::codecs::webp::WebPEncoder;
use image::{DynamicImage, ExtendedColorType, ImageEncoder, RgbImage, RgbaImage};
use log::debug;
use std::borrow::Cow;

use crate::error::{Error, Result};
use crate::types::{DecodedImage, ImageFormat};

/// Quality used for JPEG output when the caller gives none
pub const DEFAULT_JPEG_QUALITY: u8 = 90;

fn to_codec_format(format: ImageFormat) -> image::ImageFormat {
    match format {
        ImageFormat::Jpeg => image::ImageFormat::Jpeg,
        ImageFormat::Png => image::ImageFormat::Png,
        ImageFormat::WebP => image::ImageFormat::WebP,
    }
}

/// Identify the format of encoded bytes from their magic number
pub fn sniff_format(bytes: &[u8]) -> Result<ImageFormat> {
    let format = image::guess_format(bytes)
        .map_err(|e| Error::UnsupportedFormat(format!("unrecognised image data ({})", e)))?;

    match format {
        image::ImageFormat::Jpeg => Ok(ImageFormat::Jpeg),
        image::ImageFormat::Png => Ok(ImageFormat::Png),
        image::ImageFormat::WebP => Ok(ImageFormat::WebP),
        other => Err(Error::UnsupportedFormat(format!("{:?}", other))),
    }
}

/// Decode JPEG, PNG or WebP bytes
pub fn decode(bytes: &[u8]) -> Result<DecodedImage> {
    let format = sniff_format(bytes)?;
    let img = image::load_from_memory_with_format(bytes, to_codec_format(format))
        .map_err(|e| Error::Decode(e.to_string()))?;

    debug!(
        "Decoded {:?} image: {}x{} ({:?})",
        format,
        img.width(),
        img.height(),
        img.color()
    );
    from_dynamic(img)
}

/// Decode bytes whose MIME type was declared by the sender.
///
/// The declared type must be supported and must agree with the data itself.
pub fn decode_with_mime(bytes: &[u8], mime: &str) -> Result<DecodedImage> {
    let declared = ImageFormat::from_mime(mime)
        .ok_or_else(|| Error::UnsupportedFormat(mime.to_string()))?;
    let actual = sniff_format(bytes)?;

    if declared != actual {
        return Err(Error::Decode(format!(
            "declared {} but data is {}",
            declared.mime_type(),
            actual.mime_type()
        )));
    }

    decode(bytes)
}

/// Convert an `image` crate buffer into RGB or RGBA bytes
pub fn from_dynamic(img: DynamicImage) -> Result<DecodedImage> {
    if img.color().has_alpha() {
        let rgba = img.into_rgba8();
        let (width, height) = rgba.dimensions();
        DecodedImage::new(width, height, 4, rgba.into_raw())
    } else {
        let rgb = img.into_rgb8();
        let (width, height) = rgb.dimensions();
        DecodedImage::new(width, height, 3, rgb.into_raw())
    }
}

/// Copy a [`DecodedImage`] into an `image` crate buffer
pub fn to_dynamic(image: &DecodedImage) -> Result<DynamicImage> {
    let (width, height) = (image.width(), image.height());
    let pixels = image.pixels().to_vec();

    let img = match image.channels() {
        3 => RgbImage::from_raw(width, height, pixels).map(DynamicImage::ImageRgb8),
        4 => RgbaImage::from_raw(width, height, pixels).map(DynamicImage::ImageRgba8),
        _ => None,
    };

    img.ok_or_else(|| {
        Error::InvalidImage(format!(
            "cannot convert {}x{}x{} buffer",
            width,
            height,
            image.channels()
        ))
    })
}

/// RGB bytes of `image`, dropping alpha when present
fn rgb_pixels(image: &DecodedImage) -> Cow<'_, [u8]> {
    if image.has_alpha() {
        Cow::Owned(
            image
                .pixels()
                .chunks_exact(4)
                .flat_map(|p| [p[0], p[1], p[2]])
                .collect(),
        )
    } else {
        Cow::Borrowed(image.pixels())
    }
}

fn color_type(image: &DecodedImage) -> ExtendedColorType {
    if image.has_alpha() {
        ExtendedColorType::Rgba8
    } else {
        ExtendedColorType::Rgb8
    }
}

/// Encode `image` as `format`.
///
/// `quality` (1-100) applies to JPEG only, which also drops alpha. PNG and
/// WebP are written losslessly.
pub fn encode(image: &DecodedImage, format: ImageFormat, quality: Option<u8>) -> Result<Vec<u8>> {
    image.validate()?;

    let (width, height) = (image.width(), image.height());
    let mut out = Vec::new();

    let written = match format {
        ImageFormat::Jpeg => {
            let quality = quality.unwrap_or(DEFAULT_JPEG_QUALITY);
            if !(1..=100).contains(&quality) {
                return Err(Error::Encode(format!(
                    "JPEG quality {} is outside 1-100",
                    quality
                )));
            }
            JpegEncoder::new_with_quality(&mut out, quality).write_image(
                &rgb_pixels(image),
                width,
                height,
                ExtendedColorType::Rgb8,
            )
        }
        ImageFormat::Png => {
            PngEncoder::new(&mut out).write_image(image.pixels(), width, height, color_type(image))
        }
        ImageFormat::WebP => WebPEncoder::new_lossless(&mut out).write_image(
            image.pixels(),
            width,
            height,
            color_type(image),
        ),
    };
    written.map_err(|e| Error::Encode(e.to_string()))?;

    debug!(
        "Encoded {}x{} image as {:?}: {} bytes",
        width,
        height,
        format,
        out.len()
    );
    Ok(out)
}

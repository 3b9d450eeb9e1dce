//! # Boundary Detection Module
//!
//! Finds the smallest axis-aligned rectangle enclosing all foreground pixels
//! of a decoded image and copies that region (plus padding) into a new buffer.
//!
//! ## Classification
//!
//! A pixel is foreground when it is opaque enough (`alpha > alpha_threshold`,
//! RGB images are always opaque) and at least one colour channel is darker
//! than the background threshold (`channel < background_threshold`). Both
//! thresholds are exclusive: a channel equal to `background_threshold` is
//! background, an alpha equal to `alpha_threshold` is transparent.
//!
//! ## Coordinates
//!
//! [`BoundingBox`] is inclusive-exclusive: `max_x` and `max_y` point one past
//! the last included column and row, so `max_x - min_x` is the crop width.
//!
//! ## Blank images
//!
//! An image with no foreground pixel is returned whole rather than as a
//! zero-sized crop.

use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::config::CropOptions;
use crate::error::Result;
use crate::types::DecodedImage;

/// Rectangle in pixel coordinates, `[min_x, max_x) x [min_y, max_y)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: u32,
    pub min_y: u32,
    pub max_x: u32,
    pub max_y: u32,
}

impl BoundingBox {
    /// Box covering an entire `width` x `height` image
    pub fn full(width: u32, height: u32) -> Self {
        Self {
            min_x: 0,
            min_y: 0,
            max_x: width,
            max_y: height,
        }
    }

    pub fn width(&self) -> u32 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> u32 {
        self.max_y - self.min_y
    }

    pub fn is_full(&self, width: u32, height: u32) -> bool {
        *self == Self::full(width, height)
    }

    /// Grow by `padding` on every side, clamped to the image bounds
    pub fn expand(&self, padding: u32, width: u32, height: u32) -> Self {
        Self {
            min_x: self.min_x.saturating_sub(padding),
            min_y: self.min_y.saturating_sub(padding),
            max_x: self.max_x.saturating_add(padding).min(width),
            max_y: self.max_y.saturating_add(padding).min(height),
        }
    }
}

/// Outcome of [`detect_and_crop`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CropResult {
    /// Region of the source image that was copied
    pub bounds: BoundingBox,

    /// Newly allocated pixels of that region
    pub cropped: DecodedImage,

    pub original_width: u32,
    pub original_height: u32,
}

impl CropResult {
    /// Whether the whole image was kept
    pub fn is_fallback(&self) -> bool {
        self.bounds.is_full(self.original_width, self.original_height)
    }
}

#[inline]
fn is_foreground(pixel: &[u8], background_threshold: u8, alpha_threshold: u8) -> bool {
    // RGB images carry no alpha and are treated as opaque
    let opaque = pixel.get(3).map_or(true, |&a| a > alpha_threshold);
    opaque && pixel[..3].iter().any(|&c| c < background_threshold)
}

/// Scan for foreground pixels and return their tight bounding box.
///
/// Returns `Ok(None)` when the image has no foreground at all.
pub fn detect_bounds(
    image: &DecodedImage,
    background_threshold: u8,
    alpha_threshold: u8,
) -> Result<Option<BoundingBox>> {
    image.validate()?;

    let channels = image.channels() as usize;
    let mut bounds: Option<BoundingBox> = None;

    for y in 0..image.height() {
        let row = image.row(y);
        for (x, pixel) in row.chunks_exact(channels).enumerate() {
            if !is_foreground(pixel, background_threshold, alpha_threshold) {
                continue;
            }

            let x = x as u32;
            bounds = Some(match bounds {
                None => BoundingBox {
                    min_x: x,
                    min_y: y,
                    max_x: x + 1,
                    max_y: y + 1,
                },
                Some(b) => BoundingBox {
                    min_x: b.min_x.min(x),
                    min_y: b.min_y, // rows are scanned top to bottom
                    max_x: b.max_x.max(x + 1),
                    max_y: y + 1,
                },
            });
        }
    }

    trace!("Foreground bounds: {:?}", bounds);
    Ok(bounds)
}

/// Copy `bounds` out of `image` into a new buffer, row by row
fn extract(image: &DecodedImage, bounds: &BoundingBox) -> Result<DecodedImage> {
    let channels = image.channels() as usize;
    let start = bounds.min_x as usize * channels;
    let end = bounds.max_x as usize * channels;

    let mut pixels = Vec::with_capacity((end - start) * bounds.height() as usize);
    for y in bounds.min_y..bounds.max_y {
        pixels.extend_from_slice(&image.row(y)[start..end]);
    }

    DecodedImage::new(bounds.width(), bounds.height(), image.channels(), pixels)
}

/// Detect the content region of `image` and crop to it.
///
/// The detected box is grown by `padding` pixels on each side and clamped to
/// the image. If no pixel is foreground the entire image is returned.
pub fn detect_and_crop(
    image: &DecodedImage,
    padding: u32,
    background_threshold: u8,
    alpha_threshold: u8,
) -> Result<CropResult> {
    let (width, height) = (image.width(), image.height());

    let bounds = match detect_bounds(image, background_threshold, alpha_threshold)? {
        Some(content) => content.expand(padding, width, height),
        None => {
            debug!(
                "No foreground found in {}x{} image, keeping whole image",
                width, height
            );
            BoundingBox::full(width, height)
        }
    };

    debug!(
        "Cropping {}x{} image to ({}, {})-({}, {})",
        width, height, bounds.min_x, bounds.min_y, bounds.max_x, bounds.max_y
    );

    Ok(CropResult {
        bounds,
        cropped: extract(image, &bounds)?,
        original_width: width,
        original_height: height,
    })
}

/// [`detect_and_crop`] with parameters taken from [`CropOptions`]
pub fn detect_and_crop_with(image: &DecodedImage, options: &CropOptions) -> Result<CropResult> {
    detect_and_crop(
        image,
        options.padding,
        options.background_threshold,
        options.alpha_threshold,
    )
}

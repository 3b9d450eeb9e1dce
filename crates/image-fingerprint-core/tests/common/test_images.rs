//! Synthetic test images built in memory, so tests need no fixtures on disk.

use image_fingerprint_core::DecodedImage;

pub const WHITE: [u8; 3] = [255, 255, 255];
pub const BLACK: [u8; 3] = [0, 0, 0];

/// Deterministic fine-grained texture in 0..=16
fn texture(x: u32, y: u32) -> u8 {
    ((x * 7 + y * 13) % 17) as u8
}

/// Build an image from a per-pixel colour function
pub fn render<F>(width: u32, height: u32, channels: u8, colour: F) -> DecodedImage
where
    F: Fn(u32, u32) -> [u8; 4],
{
    let mut pixels = Vec::with_capacity((width * height * channels as u32) as usize);
    for y in 0..height {
        for x in 0..width {
            let rgba = colour(x, y);
            pixels.extend_from_slice(&rgba[..channels as usize]);
        }
    }
    DecodedImage::new(width, height, channels, pixels).unwrap()
}

/// White canvas with a filled square covering `[x0, x0+side) x [y0, y0+side)`
pub fn square_on_white(size: u32, x0: u32, y0: u32, side: u32, channels: u8) -> DecodedImage {
    render(size, size, channels, |x, y| {
        let inside = (x0..x0 + side).contains(&x) && (y0..y0 + side).contains(&y);
        let [r, g, b] = if inside { BLACK } else { WHITE };
        [r, g, b, 255]
    })
}

/// Single-colour image
pub fn solid(width: u32, height: u32, channels: u8, rgba: [u8; 4]) -> DecodedImage {
    render(width, height, channels, |_, _| rgba)
}

/// "Photo" of a 4x4 checkerboard of warm highlights and cool shadows
pub fn checker_photo(width: u32, height: u32) -> DecodedImage {
    let (block_w, block_h) = (width / 4, height / 4);
    render(width, height, 3, |x, y| {
        let t = texture(x, y);
        if (x / block_w + y / block_h) % 2 == 1 {
            [200 + t / 2, 180 + t, 160 + t, 255]
        } else {
            [40 + t, 60 + t, 90 + t / 2, 255]
        }
    })
}

/// "Photo" of a dark landscape on the left and bright sky on the right
pub fn split_photo(width: u32, height: u32) -> DecodedImage {
    render(width, height, 3, |x, y| {
        let t = texture(y, x);
        if x >= width / 2 {
            [170 + t, 200 + t, 230 + t, 255]
        } else {
            [50 + t, 80 + t, 30 + t, 255]
        }
    })
}

//! # Perceptual Hashing Module
//!
//! Average hash ("aHash") fingerprints for approximate duplicate detection.
//!
//! ## Overview
//!
//! Perceptual hashing generates "fingerprints" that remain similar for visually similar images,
//! unlike cryptographic hashes where minor changes produce completely different outputs.
//!
//! ## Algorithm
//!
//! 1. Box-filter the image to exactly `grid_size x grid_size` cells. Each cell is the
//!    arithmetic mean of the source pixels it covers. Images smaller than the grid are
//!    upscaled by the same rule, which replicates source pixels.
//! 2. Convert each cell to grayscale: `0.299*R + 0.587*G + 0.114*B` (Rec. 601). Alpha is ignored.
//!    Values are kept as integers in thousandths of a level, rounded half up, so the
//!    comparison below is exact and portable.
//! 3. Take the mean of all cells.
//! 4. Emit one bit per cell, row-major: `1` if the cell is strictly brighter than the mean.
//!
//! ## Limitations
//!
//! This is a coarse average-intensity hash, not a DCT hash. It tolerates resampling and
//! recompression noise but is not invariant to rotation, flips or heavy compression.
//! Hashes are only comparable when produced with the same grid size.
//!
//! ## Hamming Distance Interpretation (8x8 grid)
//!
//! - 0-3: Nearly identical images (same image with minor modifications)
//! - 4-10: Similar images (same subject with moderate differences)
//! - >10: Different images

use log::trace;

use crate::config::{DEFAULT_GRID_SIZE, MAX_GRID_SIZE};
use crate::error::{Error, Result};
use crate::processing::types::PerceptualHash;
use crate::types::DecodedImage;

/// Rec. 601 luma weights applied to R, G and B, in thousandths
pub const LUMA_WEIGHTS: [u64; 3] = [299, 587, 114];

/// Source index range `[start, end)` covered by output cell `cell`.
///
/// Ranges are never empty, so upscaling repeats source pixels.
fn cell_span(cell: u32, grid_size: u32, len: u32) -> (usize, usize) {
    let (cell, grid, len) = (cell as u64, grid_size as u64, len as u64);
    let start = cell * len / grid;
    let end = ((cell + 1) * len).div_ceil(grid).max(start + 1);
    (start as usize, end as usize)
}

/// Downscale to `grid_size x grid_size` grayscale values (0..=255_000), row-major
fn grayscale_grid(image: &DecodedImage, grid_size: u32) -> Vec<u64> {
    let channels = image.channels() as usize;
    let columns: Vec<(usize, usize)> = (0..grid_size)
        .map(|cx| cell_span(cx, grid_size, image.width()))
        .collect();

    let mut cells = Vec::with_capacity((grid_size * grid_size) as usize);

    for cy in 0..grid_size {
        let (row_start, row_end) = cell_span(cy, grid_size, image.height());

        for &(col_start, col_end) in &columns {
            let mut sums = [0u64; 3];
            for y in row_start..row_end {
                let row = image.row(y as u32);
                for pixel in row[col_start * channels..col_end * channels].chunks_exact(channels) {
                    sums[0] += pixel[0] as u64;
                    sums[1] += pixel[1] as u64;
                    sums[2] += pixel[2] as u64;
                }
            }

            let count = ((row_end - row_start) * (col_end - col_start)) as u64;
            let weighted: u64 = sums.iter().zip(LUMA_WEIGHTS).map(|(&s, w)| s * w).sum();
            cells.push((weighted + count / 2) / count);
        }
    }

    cells
}

/// Compute the average hash of `image` on a `grid_size x grid_size` grid.
///
/// Deterministic: identical buffers always yield identical hashes.
pub fn compute_hash(image: &DecodedImage, grid_size: u32) -> Result<PerceptualHash> {
    image.validate()?;

    if grid_size == 0 {
        return Err(Error::Configuration("grid size must be at least 1".to_string()));
    }
    if grid_size > MAX_GRID_SIZE {
        return Err(Error::Configuration(format!(
            "grid size {} exceeds the maximum of {}",
            grid_size, MAX_GRID_SIZE
        )));
    }

    if image.is_empty() {
        return Err(Error::InvalidImage(format!(
            "cannot hash a {}x{} image",
            image.width(),
            image.height()
        )));
    }

    let cells = grayscale_grid(image, grid_size);

    // value > sum / n, without the division
    let total: u64 = cells.iter().sum();
    let n = cells.len() as u64;
    let hash = PerceptualHash::from_bits(cells.iter().map(|&value| value * n > total));
    trace!(
        "Hashed {}x{} image on {}x{} grid: {}",
        image.width(),
        image.height(),
        grid_size,
        grid_size,
        hash.to_hex()
    );

    Ok(hash)
}

/// Compute the standard 64-bit hash (8x8 grid)
pub fn compute_default_hash(image: &DecodedImage) -> Result<PerceptualHash> {
    compute_hash(image, DEFAULT_GRID_SIZE)
}

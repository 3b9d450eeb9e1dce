//! Pixel-level image analysis for cropping and near-duplicate detection.
//!
//! This library provides three pure, deterministic components:
//! - Boundary detection: crop an image to its non-background content
//! - Perceptual hashing: reduce an image to a fixed-length average-hash fingerprint
//! - Similarity scoring: compare two fingerprints as a percentage
//!
//! plus the surrounding pieces a host needs to use them:
//! - Decoding and encoding JPEG, PNG and WebP bytes
//! - Ranking and grouping many fingerprints in parallel
//!
//! Every function takes its inputs as explicit arguments, never mutates them
//! and keeps no global state, so calls may run concurrently on any thread.
//!
//! ```no_run
//! use image_fingerprint_core::{codec, compute_hash, detect_and_crop, similarity};
//!
//! # fn main() -> image_fingerprint_core::Result<()> {
//! let a = codec::decode(&std::fs::read("a.jpg")?)?;
//! let b = codec::decode(&std::fs::read("b.jpg")?)?;
//!
//! let crop = detect_and_crop(&a, 20, 250, 10)?;
//! println!("content at {:?}", crop.bounds);
//!
//! let score = similarity(&compute_hash(&a, 8)?, &compute_hash(&b, 8)?)?;
//! println!("similarity {}", score);
//! # Ok(())
//! # }
//! ```

// -- Internal Modules --
mod error;

// -- Public Modules --
pub mod boundary;
pub mod codec;
pub mod config;
pub mod deduplication;
pub mod processing;
pub mod types;

// -- Public Re-exports --
pub use boundary::{detect_and_crop, detect_and_crop_with, detect_bounds, BoundingBox, CropResult};
pub use config::*;
pub use deduplication::{find_duplicate_groups, DuplicateGroup};
pub use error::{Error, Result};
pub use processing::{
    compute_default_hash, compute_hash, rank_matches, similarity, Match, PerceptualHash,
    SimilarityScore,
};
pub use types::*;

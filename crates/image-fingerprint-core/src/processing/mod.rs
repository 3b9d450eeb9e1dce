// Core modules
pub mod perceptual;
pub mod similarity;
pub mod types;

// Expose perceptual hash
pub use perceptual::{compute_default_hash, compute_hash, LUMA_WEIGHTS};
pub use types::PerceptualHash;

// Expose similarity scoring
pub use similarity::{rank_matches, similarity, Match, SimilarityScore};

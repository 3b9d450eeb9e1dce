//! Similarity scoring between perceptual hashes

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::Result;
use crate::processing::types::PerceptualHash;

/// Similarity of two hashes as a whole-number percentage in `[0, 100]`
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "RawScore")]
pub struct SimilarityScore {
    percentage: f64,
}

#[derive(Deserialize)]
struct RawScore {
    percentage: f64,
}

impl TryFrom<RawScore> for SimilarityScore {
    type Error = String;

    fn try_from(raw: RawScore) -> core::result::Result<Self, String> {
        if !(0.0..=100.0).contains(&raw.percentage) {
            return Err(format!("similarity {} is outside 0-100", raw.percentage));
        }
        Ok(Self {
            percentage: raw.percentage,
        })
    }
}

impl SimilarityScore {
    pub fn percentage(&self) -> f64 {
        self.percentage
    }

    /// Check if the score reaches `threshold` (0-100)
    pub fn is_at_least(&self, threshold: f64) -> bool {
        self.percentage >= threshold
    }
}

impl fmt::Display for SimilarityScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.percentage)
    }
}

/// Score two hashes: `round((1 - hamming / bits) * 100)`.
///
/// Fails with `HashLengthMismatch` when the hashes come from different grid sizes.
pub fn similarity(a: &PerceptualHash, b: &PerceptualHash) -> Result<SimilarityScore> {
    let distance = a.distance(b)?;

    // Two empty hashes are trivially identical
    let percentage = if a.is_empty() {
        100.0
    } else {
        ((1.0 - distance as f64 / a.len() as f64) * 100.0).round()
    };

    Ok(SimilarityScore { percentage })
}

/// A candidate that scored at or above the requested minimum
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Match {
    /// Position of the candidate in the input slice
    pub index: usize,
    pub score: SimilarityScore,
}

/// Score `query` against every candidate in parallel.
///
/// Returns matches scoring at least `min_score`, best first; equal scores keep
/// input order. Any candidate of a different length fails the whole call.
pub fn rank_matches(
    query: &PerceptualHash,
    candidates: &[PerceptualHash],
    min_score: f64,
) -> Result<Vec<Match>> {
    let scored = candidates
        .par_iter()
        .enumerate()
        .map(|(index, candidate)| similarity(query, candidate).map(|score| Match { index, score }))
        .collect::<Result<Vec<_>>>()?;

    let mut matches: Vec<Match> = scored
        .into_iter()
        .filter(|m| m.score.is_at_least(min_score))
        .collect();

    matches.sort_by(|a, b| {
        b.score
            .percentage
            .total_cmp(&a.score.percentage)
            .then(a.index.cmp(&b.index))
    });

    Ok(matches)
}

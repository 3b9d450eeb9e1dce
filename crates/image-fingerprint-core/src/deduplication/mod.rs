use log::debug;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::processing::{similarity, PerceptualHash};

/// Indices of hashes that are transitively similar to one another
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateGroup {
    /// Positions in the input slice, ascending
    pub members: Vec<usize>,
}

/// Union-find over hash indices; the root of a set is its smallest index
struct DisjointSet {
    parent: Vec<usize>,
}

impl DisjointSet {
    fn new(len: usize) -> Self {
        Self {
            parent: (0..len).collect(),
        }
    }

    fn find(&mut self, mut i: usize) -> usize {
        while self.parent[i] != i {
            // Path halving
            self.parent[i] = self.parent[self.parent[i]];
            i = self.parent[i];
        }
        i
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra != rb {
            let (root, child) = if ra < rb { (ra, rb) } else { (rb, ra) };
            self.parent[child] = root;
        }
    }
}

/// Group hashes whose pairwise similarity reaches `threshold` (0-100).
///
/// Grouping is single-link: A and C share a group when A~B and B~C even if
/// A and C alone fall below the threshold. Groups are ordered by their first
/// member and images without a duplicate are left out.
pub fn find_duplicate_groups(
    hashes: &[PerceptualHash],
    threshold: f64,
) -> Result<Vec<DuplicateGroup>> {
    // Reject mixed grid sizes before doing any pairwise work
    if let Some(first) = hashes.first() {
        if let Some(other) = hashes.iter().find(|h| h.len() != first.len()) {
            return Err(Error::HashLengthMismatch {
                left: first.len(),
                right: other.len(),
            });
        }
    }

    let n = hashes.len();
    let edges = (0..n)
        .into_par_iter()
        .flat_map_iter(|i| (i + 1..n).map(move |j| (i, j)))
        .filter_map(|(i, j)| match similarity(&hashes[i], &hashes[j]) {
            Ok(score) if score.is_at_least(threshold) => Some(Ok((i, j))),
            Ok(_) => None,
            Err(e) => Some(Err(e)),
        })
        .collect::<Result<Vec<_>>>()?;

    debug!(
        "{} of {} pairs reach similarity {}",
        edges.len(),
        n * n.saturating_sub(1) / 2,
        threshold
    );

    let mut sets = DisjointSet::new(n);
    for (i, j) in edges {
        sets.union(i, j);
    }

    let mut groups: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for i in 0..n {
        groups.entry(sets.find(i)).or_default().push(i);
    }

    Ok(groups
        .into_values()
        .filter(|members| members.len() > 1)
        .map(|members| DuplicateGroup { members })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hash_with_ones(ones: usize) -> PerceptualHash {
        PerceptualHash::from_bits((0..64).map(|i| i < ones))
    }

    #[test]
    fn test_groups_near_duplicates() {
        let hashes = vec![
            hash_with_ones(0),  // 0
            hash_with_ones(40), // 1
            hash_with_ones(2),  // 2: 97 vs 0
            hash_with_ones(41), // 3: 98 vs 1
            hash_with_ones(20), // 4: alone
        ];

        let groups = find_duplicate_groups(&hashes, 90.0).unwrap();
        assert_eq!(
            groups,
            vec![
                DuplicateGroup {
                    members: vec![0, 2]
                },
                DuplicateGroup {
                    members: vec![1, 3]
                },
            ]
        );
    }

    #[test]
    fn test_grouping_is_transitive() {
        // 0~1 and 1~2 at 92%, but 0 vs 2 is only 84%
        let hashes = vec![hash_with_ones(0), hash_with_ones(5), hash_with_ones(10)];

        let groups = find_duplicate_groups(&hashes, 90.0).unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].members, vec![0, 1, 2]);
    }

    #[test]
    fn test_no_duplicates() {
        let hashes = vec![hash_with_ones(0), hash_with_ones(32), hash_with_ones(64)];
        assert!(find_duplicate_groups(&hashes, 90.0).unwrap().is_empty());
        assert!(find_duplicate_groups(&[], 90.0).unwrap().is_empty());
    }

    #[test]
    fn test_mixed_lengths_rejected() {
        let hashes = vec![
            hash_with_ones(0),
            PerceptualHash::from_bits(vec![false; 256]),
        ];
        assert!(matches!(
            find_duplicate_groups(&hashes, 90.0),
            Err(Error::HashLengthMismatch {
                left: 64,
                right: 256
            })
        ));
    }
}

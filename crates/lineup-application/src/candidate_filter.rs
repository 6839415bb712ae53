// SPDX-License-Identifier: GPL-3.0-or-later

//! Narrows raw search results to the candidates a query can refer to.

use crate::normalize::normalize;
use lineup_domain::{ArtistQuery, CatalogArtist};
use tracing::debug;

/// Approximate-match settings for [`filter_candidates`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchPolicy {
    pub use_approx: bool,
    /// Candidates are kept when their edit distance equals this value exactly.
    pub approx_distance: usize,
}

impl Default for MatchPolicy {
    fn default() -> Self {
        Self {
            use_approx: false,
            approx_distance: 1,
        }
    }
}

/// Keep the candidates whose normalized name equals the normalized query.
///
/// When none match exactly and approximate matching is enabled, keep the
/// candidates whose edit distance to the query is exactly
/// `policy.approx_distance`. An empty result means the query has no match.
/// Candidate order is preserved.
pub fn filter_candidates(
    query: &ArtistQuery,
    candidates: &[CatalogArtist],
    policy: MatchPolicy,
) -> Vec<CatalogArtist> {
    let wanted = normalize(query.as_str().trim());

    let exact: Vec<CatalogArtist> = candidates
        .iter()
        .filter(|candidate| normalize(candidate.name.trim()) == wanted)
        .cloned()
        .collect();

    if !exact.is_empty() || !policy.use_approx {
        return exact;
    }

    let approx: Vec<CatalogArtist> = candidates
        .iter()
        .filter(|candidate| {
            levenshtein_distance(&normalize(candidate.name.trim()), &wanted)
                == policy.approx_distance
        })
        .cloned()
        .collect();

    if !approx.is_empty() {
        debug!(
            target: "resolver",
            query = %query,
            distance = policy.approx_distance,
            matches = ?approx.iter().map(|c| c.name.as_str()).collect::<Vec<_>>(),
            "falling back to approximate name matches"
        );
    }

    approx
}

/// Character-level Levenshtein distance.
pub(crate) fn levenshtein_distance(left: &str, right: &str) -> usize {
    let left_chars: Vec<char> = left.chars().collect();
    let right_chars: Vec<char> = right.chars().collect();

    if left_chars.is_empty() {
        return right_chars.len();
    }
    if right_chars.is_empty() {
        return left_chars.len();
    }

    let mut previous_row: Vec<usize> = (0..=right_chars.len()).collect();
    let mut current_row: Vec<usize> = vec![0; right_chars.len() + 1];

    for (left_index, left_char) in left_chars.iter().enumerate() {
        current_row[0] = left_index + 1;
        for (right_index, right_char) in right_chars.iter().enumerate() {
            let insert_cost = current_row[right_index] + 1;
            let delete_cost = previous_row[right_index + 1] + 1;
            let replace_cost = previous_row[right_index] + usize::from(left_char != right_char);
            current_row[right_index + 1] = insert_cost.min(delete_cost).min(replace_cost);
        }
        std::mem::swap(&mut previous_row, &mut current_row);
    }

    previous_row[right_chars.len()]
}

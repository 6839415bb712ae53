// SPDX-License-Identifier: GPL-3.0-or-later

//! Disambiguation of filtered candidates.
//!
//! A query with exactly one candidate resolves immediately. Several
//! candidates are either deferred to the genre pass, settled by popularity,
//! or skipped, depending on the [`ResolverPolicy`]. Deferred groups are
//! judged only after the whole first pass has completed, against a
//! [`GenreSnapshot`] of the artists that resolved unambiguously.

use crate::genre_profile::GenreSnapshot;
use crate::normalize::{normalize_genre, CountryPrefixes};
use lineup_domain::{ArtistQuery, CatalogArtist};
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolverPolicy {
    pub pick_higher_popularity: bool,
    pub pick_genre_proximity: bool,
}

impl Default for ResolverPolicy {
    fn default() -> Self {
        Self {
            pick_higher_popularity: true,
            pick_genre_proximity: true,
        }
    }
}

/// Ambiguous candidates awaiting the genre pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeferredGroup {
    pub query: ArtistQuery,
    pub candidates: Vec<CatalogArtist>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SkipReason {
    /// Nothing survived name filtering.
    NoMatch,
    /// Several candidates and no policy could pick one.
    Ambiguous { candidates: Vec<String> },
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::NoMatch => write!(f, "no match"),
            SkipReason::Ambiguous { candidates } => {
                write!(f, "ambiguous between {}", candidates.join(", "))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionOutcome {
    Resolved(CatalogArtist),
    Deferred(DeferredGroup),
    Skipped(SkipReason),
}

#[derive(Debug, Clone, Default)]
pub struct AmbiguityResolver {
    policy: ResolverPolicy,
}

impl AmbiguityResolver {
    pub fn new(policy: ResolverPolicy) -> Self {
        Self { policy }
    }

    /// First-pass decision for the filtered candidates of one query.
    pub fn resolve(
        &self,
        query: &ArtistQuery,
        mut candidates: Vec<CatalogArtist>,
    ) -> ResolutionOutcome {
        match candidates.len() {
            0 => ResolutionOutcome::Skipped(SkipReason::NoMatch),
            1 => ResolutionOutcome::Resolved(candidates.remove(0)),
            _ if self.policy.pick_genre_proximity => ResolutionOutcome::Deferred(DeferredGroup {
                query: query.clone(),
                candidates,
            }),
            _ if self.policy.pick_higher_popularity => {
                match most_popular(&candidates) {
                    Some(artist) => ResolutionOutcome::Resolved(artist.clone()),
                    None => ResolutionOutcome::Skipped(SkipReason::NoMatch),
                }
            }
            _ => ResolutionOutcome::Skipped(ambiguous(&candidates)),
        }
    }

    /// Second-pass decision for a deferred group.
    ///
    /// The candidate sharing the most genres with `profile` wins; ties on a
    /// non-zero overlap go to the most popular of the tied candidates. With
    /// no overlap at all the whole group falls back to popularity when that
    /// policy is enabled. Otherwise the group is skipped as ambiguous.
    pub fn resolve_deferred(
        &self,
        group: DeferredGroup,
        profile: &GenreSnapshot,
        prefixes: &CountryPrefixes,
    ) -> Result<CatalogArtist, SkipReason> {
        let overlaps: Vec<usize> = group
            .candidates
            .iter()
            .map(|candidate| genre_overlap(candidate, profile, prefixes))
            .collect();

        let max_overlap = overlaps.iter().copied().max().unwrap_or(0);

        debug!(
            target: "resolver",
            query = %group.query,
            overlaps = ?group
                .candidates
                .iter()
                .zip(&overlaps)
                .map(|(c, o)| format!("{}={}", c.id, o))
                .collect::<Vec<_>>(),
            "genre pass"
        );

        if max_overlap > 0 {
            let tied: Vec<CatalogArtist> = group
                .candidates
                .iter()
                .zip(&overlaps)
                .filter(|(_, overlap)| **overlap == max_overlap)
                .map(|(candidate, _)| candidate.clone())
                .collect();

            return most_popular(&tied)
                .cloned()
                .ok_or_else(|| ambiguous(&group.candidates));
        }

        if self.policy.pick_higher_popularity {
            if let Some(artist) = most_popular(&group.candidates) {
                return Ok(artist.clone());
            }
        }

        Err(ambiguous(&group.candidates))
    }
}

/// Number of the candidate's distinct normalized genres present in `profile`.
pub fn genre_overlap(
    candidate: &CatalogArtist,
    profile: &GenreSnapshot,
    prefixes: &CountryPrefixes,
) -> usize {
    candidate
        .genres
        .iter()
        .map(|genre| normalize_genre(genre, prefixes))
        .collect::<BTreeSet<_>>()
        .iter()
        .filter(|genre| profile.contains(genre))
        .count()
}

/// Highest popularity; the earliest candidate wins ties.
fn most_popular(candidates: &[CatalogArtist]) -> Option<&CatalogArtist> {
    candidates.iter().reduce(|best, candidate| {
        if candidate.popularity > best.popularity {
            candidate
        } else {
            best
        }
    })
}

fn ambiguous(candidates: &[CatalogArtist]) -> SkipReason {
    SkipReason::Ambiguous {
        candidates: candidates
            .iter()
            .map(|candidate| format!("{} ({})", candidate.name, candidate.id))
            .collect(),
    }
}

// SPDX-License-Identifier: GPL-3.0-or-later

use crate::normalize::{normalize_genre, CountryPrefixes};
use lineup_domain::CatalogArtist;
use std::collections::{BTreeMap, BTreeSet};

/// Running multiset of the normalized genres of every artist resolved in the
/// first pass of one sync run. Counts only ever grow.
#[derive(Debug, Clone, Default)]
pub struct GenreProfileAccumulator {
    counts: BTreeMap<String, usize>,
}

impl GenreProfileAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert every genre of a resolved artist.
    pub fn add(&mut self, artist: &CatalogArtist, prefixes: &CountryPrefixes) {
        for genre in &artist.genres {
            let genre = normalize_genre(genre, prefixes);
            if genre.is_empty() {
                continue;
            }
            *self.counts.entry(genre).or_insert(0) += 1;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Distinct genres present so far.
    pub fn snapshot(&self) -> GenreSnapshot {
        GenreSnapshot(self.counts.keys().cloned().collect())
    }
}

/// Immutable set of genres handed from the first pass to the second.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenreSnapshot(BTreeSet<String>);

impl GenreSnapshot {
    pub fn contains(&self, genre: &str) -> bool {
        self.0.contains(genre)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for GenreSnapshot {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

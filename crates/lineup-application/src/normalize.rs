// SPDX-License-Identifier: GPL-3.0-or-later

//! Canonical forms for artist names and genre tags.

use std::collections::HashSet;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Fold case, decompose to base glyphs and drop combining marks.
///
/// Case folding runs first: lowercasing can itself produce combining marks
/// ("İ" lowercases to "i\u{307}"), which the decomposition step then drops.
pub fn normalize(value: &str) -> String {
    value
        .to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect()
}

/// Country/locale tokens stripped from the front of genre tags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CountryPrefixes(HashSet<String>);

impl CountryPrefixes {
    pub fn new<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(
            prefixes
                .into_iter()
                .map(|prefix| normalize(prefix.as_ref().trim()))
                .filter(|prefix| !prefix.is_empty())
                .collect(),
        )
    }

    pub fn contains(&self, token: &str) -> bool {
        self.0.contains(token)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Normalize a genre tag and strip one leading country prefix.
///
/// The prefix must be a whole token followed by whitespace, so
/// "swedish death metal" becomes "death metal" while "swedish" and
/// "swedishness" stay untouched.
pub fn normalize_genre(genre: &str, prefixes: &CountryPrefixes) -> String {
    let normalized = normalize(genre);
    if let Some((first, rest)) = normalized.split_once(char::is_whitespace) {
        let rest = rest.trim_start();
        if !rest.is_empty() && prefixes.contains(first) {
            return rest.to_string();
        }
    }
    normalized
}

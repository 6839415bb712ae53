// SPDX-License-Identifier: GPL-3.0-or-later

use crate::catalog::{CatalogResult, CatalogService};
use lineup_domain::{CatalogArtist, TrackRef};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::trace;

/// Fetches the top tracks of resolved artists.
pub struct TrackCollector {
    catalog: Arc<dyn CatalogService>,
}

impl TrackCollector {
    pub fn new(catalog: Arc<dyn CatalogService>) -> Self {
        Self { catalog }
    }

    /// The first `top_n` top tracks of `artist`, minus any URI already in the
    /// playlist (`existing`) or collected earlier in the run
    /// (`already_collected`), in the catalog's ranking order.
    ///
    /// The caller must merge the returned URIs into `already_collected`
    /// before collecting the next artist.
    pub async fn collect(
        &self,
        artist: &CatalogArtist,
        top_n: usize,
        existing: &HashSet<String>,
        already_collected: &HashSet<String>,
    ) -> CatalogResult<Vec<TrackRef>> {
        let top_tracks = self.catalog.top_tracks(&artist.id).await?;

        let mut seen = HashSet::new();
        let tracks: Vec<TrackRef> = top_tracks
            .into_iter()
            .take(top_n)
            .filter(|track| {
                !existing.contains(&track.uri)
                    && !already_collected.contains(&track.uri)
                    && seen.insert(track.uri.clone())
            })
            .collect();

        trace!(
            target: "sync",
            artist = %artist.id,
            new_tracks = tracks.len(),
            "collected top tracks"
        );

        Ok(tracks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FakeCatalog;

    fn uris(tracks: &[TrackRef]) -> Vec<&str> {
        tracks.iter().map(|t| t.uri.as_str()).collect()
    }

    #[tokio::test]
    async fn takes_top_n_in_ranking_order() {
        let catalog = FakeCatalog::new()
            .with_top_tracks("elder", ["e1", "e2", "e3", "e4"]);
        let collector = TrackCollector::new(Arc::new(catalog));
        let artist = CatalogArtist::new("elder", "Elder", 50);

        let tracks = collector
            .collect(&artist, 3, &HashSet::new(), &HashSet::new())
            .await
            .unwrap();

        assert_eq!(uris(&tracks), vec!["e1", "e2", "e3"]);
    }

    #[tokio::test]
    async fn filters_existing_and_already_collected() {
        let catalog = FakeCatalog::new().with_top_tracks("elder", ["e1", "e2", "e3"]);
        let collector = TrackCollector::new(Arc::new(catalog));
        let artist = CatalogArtist::new("elder", "Elder", 50);

        let existing: HashSet<String> = ["e1".to_string()].into();
        let collected: HashSet<String> = ["e3".to_string()].into();

        let tracks = collector
            .collect(&artist, 3, &existing, &collected)
            .await
            .unwrap();

        assert_eq!(uris(&tracks), vec!["e2"]);
    }

    #[tokio::test]
    async fn intersecting_artists_never_duplicate() {
        let catalog = FakeCatalog::new()
            .with_top_tracks("a", ["split-1", "a1", "a2"])
            .with_top_tracks("b", ["b1", "split-1", "b2"]);
        let collector = TrackCollector::new(Arc::new(catalog));

        let mut collected = HashSet::new();
        let mut output = Vec::new();
        for id in ["a", "b"] {
            let artist = CatalogArtist::new(id, id, 10);
            let tracks = collector
                .collect(&artist, 3, &HashSet::new(), &collected)
                .await
                .unwrap();
            collected.extend(tracks.iter().map(|t| t.uri.clone()));
            output.extend(tracks);
        }

        assert_eq!(uris(&output), vec!["split-1", "a1", "a2", "b1", "b2"]);
    }

    #[tokio::test]
    async fn unknown_artist_surfaces_remote_error() {
        let collector = TrackCollector::new(Arc::new(FakeCatalog::new()));
        let artist = CatalogArtist::new("ghost", "Ghost", 10);

        let result = collector
            .collect(&artist, 3, &HashSet::new(), &HashSet::new())
            .await;

        assert!(result.is_err());
    }
}

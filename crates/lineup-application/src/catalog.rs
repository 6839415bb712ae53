// SPDX-License-Identifier: GPL-3.0-or-later

//! The catalog operations the sync engine depends on.

use async_trait::async_trait;
use lineup_domain::{ArtistId, CatalogArtist, PlaylistId, PlaylistSummary, TrackRef, Visibility};
use lineup_spotify::{SpotifyClient, SpotifyError};
use tracing::debug;

pub type CatalogResult<T> = Result<T, SpotifyError>;

/// Remote music catalog as seen by the resolver and the sync engine.
///
/// Every call is a single round trip; the engine awaits each one before
/// issuing the next.
#[async_trait]
pub trait CatalogService: Send + Sync {
    /// Ranked artist search.
    async fn search_artists(&self, name: &str, limit: u32) -> CatalogResult<Vec<CatalogArtist>>;

    /// Top tracks of an artist in the catalog's popularity order.
    async fn top_tracks(&self, artist: &ArtistId) -> CatalogResult<Vec<TrackRef>>;

    /// Identifier of the user owning the session.
    async fn current_user_id(&self) -> CatalogResult<String>;

    /// All playlists of the session owner.
    async fn list_playlists(&self) -> CatalogResult<Vec<PlaylistSummary>>;

    async fn create_playlist(
        &self,
        owner_id: &str,
        name: &str,
        visibility: Visibility,
        description: &str,
    ) -> CatalogResult<PlaylistId>;

    /// All tracks currently in the playlist.
    async fn playlist_tracks(&self, playlist: &PlaylistId) -> CatalogResult<Vec<TrackRef>>;

    /// Remove every track from the playlist.
    async fn clear_playlist(&self, playlist: &PlaylistId) -> CatalogResult<()>;

    /// Append one batch of tracks; the batch must not exceed the service limit.
    async fn append_tracks(&self, playlist: &PlaylistId, batch: &[TrackRef]) -> CatalogResult<()>;

    async fn set_description(&self, playlist: &PlaylistId, description: &str) -> CatalogResult<()>;
}

/// [`CatalogService`] backed by the Spotify Web API.
#[derive(Debug, Clone)]
pub struct SpotifyCatalog {
    client: SpotifyClient,
    market: String,
}

impl SpotifyCatalog {
    pub fn new(client: SpotifyClient, market: impl Into<String>) -> Self {
        Self {
            client,
            market: market.into(),
        }
    }
}

#[async_trait]
impl CatalogService for SpotifyCatalog {
    async fn search_artists(&self, name: &str, limit: u32) -> CatalogResult<Vec<CatalogArtist>> {
        let artists = self.client.search_artists(name, limit).await?;
        debug!(target: "spotify", query = name, results = artists.len(), "artist search");
        Ok(artists
            .into_iter()
            .map(|artist| {
                CatalogArtist::new(artist.id, artist.name, artist.popularity.min(100))
                    .with_genres(artist.genres)
            })
            .collect())
    }

    async fn top_tracks(&self, artist: &ArtistId) -> CatalogResult<Vec<TrackRef>> {
        let tracks = self.client.artist_top_tracks(&artist.0, &self.market).await?;
        Ok(tracks
            .into_iter()
            .map(|track| TrackRef::named(track.uri, track.name))
            .collect())
    }

    async fn current_user_id(&self) -> CatalogResult<String> {
        Ok(self.client.current_user().await?.id)
    }

    async fn list_playlists(&self) -> CatalogResult<Vec<PlaylistSummary>> {
        let playlists = self.client.current_user_playlists().await?;
        Ok(playlists
            .into_iter()
            .map(|playlist| PlaylistSummary {
                id: PlaylistId(playlist.id),
                name: playlist.name,
            })
            .collect())
    }

    async fn create_playlist(
        &self,
        owner_id: &str,
        name: &str,
        visibility: Visibility,
        description: &str,
    ) -> CatalogResult<PlaylistId> {
        let playlist = self
            .client
            .create_playlist(owner_id, name, visibility.is_public(), description)
            .await?;
        Ok(PlaylistId(playlist.id))
    }

    async fn playlist_tracks(&self, playlist: &PlaylistId) -> CatalogResult<Vec<TrackRef>> {
        let tracks = self.client.playlist_tracks(&playlist.0).await?;
        Ok(tracks
            .into_iter()
            .filter_map(|track| {
                let uri = track.uri?;
                Some(TrackRef { uri, name: track.name })
            })
            .collect())
    }

    async fn clear_playlist(&self, playlist: &PlaylistId) -> CatalogResult<()> {
        self.client.replace_playlist_tracks(&playlist.0, &[]).await
    }

    async fn append_tracks(&self, playlist: &PlaylistId, batch: &[TrackRef]) -> CatalogResult<()> {
        let uris: Vec<String> = batch.iter().map(|track| track.uri.clone()).collect();
        self.client.add_playlist_tracks(&playlist.0, &uris).await
    }

    async fn set_description(&self, playlist: &PlaylistId, description: &str) -> CatalogResult<()> {
        self.client
            .set_playlist_description(&playlist.0, description)
            .await
    }
}

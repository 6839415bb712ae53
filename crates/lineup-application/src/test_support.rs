// SPDX-License-Identifier: GPL-3.0-or-later

//! In-memory catalog recording every call.

use crate::catalog::{CatalogResult, CatalogService};
use async_trait::async_trait;
use lineup_domain::{ArtistId, CatalogArtist, PlaylistId, PlaylistSummary, TrackRef, Visibility};
use lineup_spotify::SpotifyError;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    Search(String),
    TopTracks(String),
    CurrentUser,
    ListPlaylists,
    Create { name: String, description: String },
    PlaylistTracks(String),
    Clear(String),
    Append { playlist: String, size: usize },
    SetDescription { playlist: String, description: String },
}

impl Call {
    pub(crate) fn is_write(&self) -> bool {
        matches!(
            self,
            Call::Create { .. } | Call::Clear(_) | Call::Append { .. } | Call::SetDescription { .. }
        )
    }
}

#[derive(Debug, Clone)]
struct FakePlaylist {
    id: String,
    name: String,
    tracks: Vec<TrackRef>,
    description: Option<String>,
}

#[derive(Debug, Default)]
struct FakeState {
    search: HashMap<String, Vec<CatalogArtist>>,
    top_tracks: HashMap<String, Vec<TrackRef>>,
    playlists: Vec<FakePlaylist>,
    calls: Vec<Call>,
    appends: usize,
    fail_append_at: Option<usize>,
    fail_search: HashSet<String>,
    fail_description: bool,
    created: usize,
}

#[derive(Debug, Default)]
pub(crate) struct FakeCatalog {
    state: Mutex<FakeState>,
}

fn remote_failure(message: &str) -> SpotifyError {
    SpotifyError::Status {
        status: 500,
        message: message.to_string(),
    }
}

impl FakeCatalog {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_search(self, query: &str, artists: Vec<CatalogArtist>) -> Self {
        self.state
            .lock()
            .unwrap()
            .search
            .insert(query.to_string(), artists);
        self
    }

    pub(crate) fn with_top_tracks<I, S>(self, artist_id: &str, uris: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tracks = uris.into_iter().map(TrackRef::new).collect();
        self.state
            .lock()
            .unwrap()
            .top_tracks
            .insert(artist_id.to_string(), tracks);
        self
    }

    pub(crate) fn with_playlist<I, S>(self, id: &str, name: &str, uris: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.state.lock().unwrap().playlists.push(FakePlaylist {
            id: id.to_string(),
            name: name.to_string(),
            tracks: uris.into_iter().map(TrackRef::new).collect(),
            description: None,
        });
        self
    }

    /// Make the `n`-th append call (1-based) fail.
    pub(crate) fn failing_append(self, n: usize) -> Self {
        self.state.lock().unwrap().fail_append_at = Some(n);
        self
    }

    pub(crate) fn failing_search(self, query: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .fail_search
            .insert(query.to_string());
        self
    }

    pub(crate) fn failing_description(self) -> Self {
        self.state.lock().unwrap().fail_description = true;
        self
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub(crate) fn append_sizes(&self) -> Vec<usize> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Append { size, .. } => Some(size),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn playlist_uris(&self, name: &str) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .playlists
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.tracks.iter().map(|t| t.uri.clone()).collect())
            .unwrap_or_default()
    }

    pub(crate) fn playlist_description(&self, name: &str) -> Option<String> {
        self.state
            .lock()
            .unwrap()
            .playlists
            .iter()
            .find(|p| p.name == name)
            .and_then(|p| p.description.clone())
    }

    pub(crate) fn playlist_count(&self) -> usize {
        self.state.lock().unwrap().playlists.len()
    }

    fn record(&self, call: Call) {
        self.state.lock().unwrap().calls.push(call);
    }
}

#[async_trait]
impl CatalogService for FakeCatalog {
    async fn search_artists(&self, name: &str, limit: u32) -> CatalogResult<Vec<CatalogArtist>> {
        self.record(Call::Search(name.to_string()));
        let state = self.state.lock().unwrap();
        if state.fail_search.contains(name) {
            return Err(remote_failure("search failed"));
        }
        Ok(state
            .search
            .get(name)
            .map(|artists| artists.iter().take(limit as usize).cloned().collect())
            .unwrap_or_default())
    }

    async fn top_tracks(&self, artist: &ArtistId) -> CatalogResult<Vec<TrackRef>> {
        self.record(Call::TopTracks(artist.0.clone()));
        self.state
            .lock()
            .unwrap()
            .top_tracks
            .get(&artist.0)
            .cloned()
            .ok_or_else(|| SpotifyError::NotFound(artist.0.clone()))
    }

    async fn current_user_id(&self) -> CatalogResult<String> {
        self.record(Call::CurrentUser);
        Ok("owner".to_string())
    }

    async fn list_playlists(&self) -> CatalogResult<Vec<PlaylistSummary>> {
        self.record(Call::ListPlaylists);
        Ok(self
            .state
            .lock()
            .unwrap()
            .playlists
            .iter()
            .map(|p| PlaylistSummary {
                id: PlaylistId(p.id.clone()),
                name: p.name.clone(),
            })
            .collect())
    }

    async fn create_playlist(
        &self,
        _owner_id: &str,
        name: &str,
        _visibility: Visibility,
        description: &str,
    ) -> CatalogResult<PlaylistId> {
        self.record(Call::Create {
            name: name.to_string(),
            description: description.to_string(),
        });
        let mut state = self.state.lock().unwrap();
        state.created += 1;
        let id = format!("created-{}", state.created);
        state.playlists.push(FakePlaylist {
            id: id.clone(),
            name: name.to_string(),
            tracks: Vec::new(),
            description: Some(description.to_string()),
        });
        Ok(PlaylistId(id))
    }

    async fn playlist_tracks(&self, playlist: &PlaylistId) -> CatalogResult<Vec<TrackRef>> {
        self.record(Call::PlaylistTracks(playlist.0.clone()));
        self.state
            .lock()
            .unwrap()
            .playlists
            .iter()
            .find(|p| p.id == playlist.0)
            .map(|p| p.tracks.clone())
            .ok_or_else(|| SpotifyError::NotFound(playlist.0.clone()))
    }

    async fn clear_playlist(&self, playlist: &PlaylistId) -> CatalogResult<()> {
        self.record(Call::Clear(playlist.0.clone()));
        let mut state = self.state.lock().unwrap();
        let target = state
            .playlists
            .iter_mut()
            .find(|p| p.id == playlist.0)
            .ok_or_else(|| SpotifyError::NotFound(playlist.0.clone()))?;
        target.tracks.clear();
        Ok(())
    }

    async fn append_tracks(&self, playlist: &PlaylistId, batch: &[TrackRef]) -> CatalogResult<()> {
        self.record(Call::Append {
            playlist: playlist.0.clone(),
            size: batch.len(),
        });
        let mut state = self.state.lock().unwrap();
        state.appends += 1;
        if state.fail_append_at == Some(state.appends) {
            return Err(remote_failure("append failed"));
        }
        let target = state
            .playlists
            .iter_mut()
            .find(|p| p.id == playlist.0)
            .ok_or_else(|| SpotifyError::NotFound(playlist.0.clone()))?;
        target.tracks.extend(batch.iter().cloned());
        Ok(())
    }

    async fn set_description(&self, playlist: &PlaylistId, description: &str) -> CatalogResult<()> {
        self.record(Call::SetDescription {
            playlist: playlist.0.clone(),
            description: description.to_string(),
        });
        let mut state = self.state.lock().unwrap();
        if state.fail_description {
            return Err(remote_failure("description update failed"));
        }
        if let Some(target) = state.playlists.iter_mut().find(|p| p.id == playlist.0) {
            target.description = Some(description.to_string());
        }
        Ok(())
    }
}

// SPDX-License-Identifier: GPL-3.0-or-later

use serde::{Deserialize, Serialize};

/// Full artist object as returned by search.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ArtistObject {
    /// Spotify artist ID.
    pub id: String,
    /// Artist name.
    pub name: String,
    /// Popularity (0-100).
    #[serde(default)]
    pub popularity: u8,
    /// Genre tags (e.g., ["stoner rock", "swedish doom metal"]).
    #[serde(default)]
    pub genres: Vec<String>,
}

/// Track object (top tracks, playlist items).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrackObject {
    #[serde(default)]
    pub id: Option<String>,
    pub uri: String,
    pub name: String,
}

/// Paging wrapper used by every list endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paging<T> {
    pub items: Vec<T>,
    /// Absolute URL of the next page, if any.
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub total: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtistSearchResponse {
    pub artists: Paging<ArtistObject>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopTracksResponse {
    pub tracks: Vec<TrackObject>,
}

/// Playlist as listed under the current user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimplifiedPlaylist {
    pub id: String,
    pub name: String,
}

/// Playlist item wrapper; `track` is null for removed or unavailable items.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistItem {
    #[serde(default)]
    pub track: Option<PlaylistTrack>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlaylistTrack {
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct CreatePlaylistRequest<'a> {
    pub name: &'a str,
    pub public: bool,
    pub description: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct UrisRequest<'a> {
    pub uris: &'a [String],
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct DescriptionRequest<'a> {
    pub description: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct SnapshotResponse {
    #[allow(dead_code)]
    pub snapshot_id: String,
}

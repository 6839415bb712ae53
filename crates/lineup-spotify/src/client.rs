// SPDX-License-Identifier: GPL-3.0-or-later

use crate::error::{Result, SpotifyError};
use crate::models::{
    ArtistObject, ArtistSearchResponse, CreatePlaylistRequest, DescriptionRequest, Paging,
    PlaylistItem, PlaylistTrack, SimplifiedPlaylist, SnapshotResponse, TopTracksResponse,
    TrackObject, UrisRequest, UserProfile,
};
use crate::pacer::RequestPacer;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, trace, warn};
use url::Url;

const SPOTIFY_API_BASE: &str = "https://api.spotify.com/v1";
const USER_AGENT: &str = concat!("lineup-sync/", env!("CARGO_PKG_VERSION"));

/// Largest batch the playlist item endpoints accept.
pub const MAX_TRACKS_PER_REQUEST: usize = 100;

const PLAYLISTS_PAGE_SIZE: u32 = 50;

/// Spotify Web API client with rate limiting.
#[derive(Debug, Clone)]
pub struct SpotifyClient {
    client: Client,
    base_url: String,
    access_token: Option<String>,
    pacer: RequestPacer,
}

impl SpotifyClient {
    /// Create a client for the public API with the given bearer token.
    pub fn new(access_token: impl Into<String>) -> Result<Self> {
        Self::builder().access_token(access_token).build()
    }

    /// Create a client builder for custom configuration.
    pub fn builder() -> SpotifyClientBuilder {
        SpotifyClientBuilder::default()
    }

    /// Profile of the user owning the access token.
    pub async fn current_user(&self) -> Result<UserProfile> {
        let url = self.endpoint("me")?;
        self.get(url.as_str()).await
    }

    /// Search for artists by name.
    ///
    /// # Example
    /// ```no_run
    /// # use lineup_spotify::SpotifyClient;
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let client = SpotifyClient::new("token")?;
    /// let artists = client.search_artists("Khan", 10).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn search_artists(&self, name: &str, limit: u32) -> Result<Vec<ArtistObject>> {
        let mut url = self.endpoint("search")?;
        url.query_pairs_mut()
            .append_pair("q", &format!("artist:{}", name))
            .append_pair("type", "artist")
            .append_pair("limit", &limit.clamp(1, 50).to_string());

        let response: ArtistSearchResponse = self.get(url.as_str()).await?;
        Ok(response.artists.items)
    }

    /// Top tracks of an artist, in Spotify's ranking order.
    pub async fn artist_top_tracks(
        &self,
        artist_id: &str,
        market: &str,
    ) -> Result<Vec<TrackObject>> {
        let mut url = self.endpoint(&format!("artists/{}/top-tracks", artist_id))?;
        url.query_pairs_mut().append_pair("market", market);

        let response: TopTracksResponse = self.get(url.as_str()).await?;
        Ok(response.tracks)
    }

    /// Every playlist of the current user, following pagination.
    pub async fn current_user_playlists(&self) -> Result<Vec<SimplifiedPlaylist>> {
        let mut url = self.endpoint("me/playlists")?;
        url.query_pairs_mut()
            .append_pair("limit", &PLAYLISTS_PAGE_SIZE.to_string());

        self.get_all_pages(url.to_string()).await
    }

    /// Create a playlist owned by `user_id`; returns the new playlist.
    pub async fn create_playlist(
        &self,
        user_id: &str,
        name: &str,
        public: bool,
        description: &str,
    ) -> Result<SimplifiedPlaylist> {
        let url = self.endpoint(&format!("users/{}/playlists", user_id))?;
        let body = CreatePlaylistRequest {
            name,
            public,
            description,
        };
        self.send_json(Method::POST, url.as_str(), &body).await
    }

    /// Every track currently in a playlist, following pagination.
    ///
    /// Items whose track is null (removed from the catalog) are skipped.
    pub async fn playlist_tracks(&self, playlist_id: &str) -> Result<Vec<PlaylistTrack>> {
        let mut url = self.endpoint(&format!("playlists/{}/tracks", playlist_id))?;
        url.query_pairs_mut()
            .append_pair("limit", &MAX_TRACKS_PER_REQUEST.to_string())
            .append_pair("fields", "items(track(uri,name)),next");

        let items: Vec<PlaylistItem> = self.get_all_pages(url.to_string()).await?;
        Ok(items
            .into_iter()
            .filter_map(|item| item.track)
            .filter(|track| track.uri.is_some())
            .collect())
    }

    /// Replace the playlist contents; an empty slice clears it.
    pub async fn replace_playlist_tracks(&self, playlist_id: &str, uris: &[String]) -> Result<()> {
        check_batch_size(uris)?;
        let url = self.endpoint(&format!("playlists/{}/tracks", playlist_id))?;
        let _: SnapshotResponse = self
            .send_json(Method::PUT, url.as_str(), &UrisRequest { uris })
            .await?;
        Ok(())
    }

    /// Append tracks at the end of the playlist.
    pub async fn add_playlist_tracks(&self, playlist_id: &str, uris: &[String]) -> Result<()> {
        check_batch_size(uris)?;
        if uris.is_empty() {
            return Ok(());
        }
        let url = self.endpoint(&format!("playlists/{}/tracks", playlist_id))?;
        let _: SnapshotResponse = self
            .send_json(Method::POST, url.as_str(), &UrisRequest { uris })
            .await?;
        Ok(())
    }

    pub async fn set_playlist_description(
        &self,
        playlist_id: &str,
        description: &str,
    ) -> Result<()> {
        let url = self.endpoint(&format!("playlists/{}", playlist_id))?;
        let request = self
            .request(Method::PUT, url.as_str())
            .json(&DescriptionRequest { description });
        // Playlist detail changes answer with an empty 200 body.
        self.execute(request).await.map(|_| ())
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        Url::parse(&format!("{}/{}", self.base_url, path))
            .map_err(|e| SpotifyError::InvalidRequest(e.to_string()))
    }

    async fn get_all_pages<T: DeserializeOwned>(&self, first_page: String) -> Result<Vec<T>> {
        let mut items = Vec::new();
        let mut next = Some(first_page);

        while let Some(url) = next {
            let page: Paging<T> = self.get(&url).await?;
            items.extend(page.items);
            next = page.next;
        }

        Ok(items)
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let request = self.client.request(method, url);
        match &self.access_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn get<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let body = self.execute(self.request(Method::GET, url)).await?;
        parse_body(&body)
    }

    async fn send_json<B: Serialize, T: DeserializeOwned>(
        &self,
        method: Method,
        url: &str,
        body: &B,
    ) -> Result<T> {
        let body = self.execute(self.request(method, url).json(body)).await?;
        parse_body(&body)
    }

    /// Send one paced request and map error statuses; returns the body text.
    async fn execute(&self, request: RequestBuilder) -> Result<String> {
        let mut slot = self.pacer.acquire().await;

        let request = request.build()?;
        let url = request.url().to_string();
        trace!(target: "spotify", method = %request.method(), %url, "sending request");

        let response = self.client.execute(request).await?;
        let status = response.status();
        debug!(target: "spotify", %status, %url, "response received");

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(SpotifyError::Unauthorized)
            }
            StatusCode::NOT_FOUND => return Err(SpotifyError::NotFound(url)),
            StatusCode::TOO_MANY_REQUESTS => {
                let retry_after = retry_after(response.headers());
                if let Some(delay) = retry_after {
                    slot.back_off(delay);
                }
                warn!(target: "spotify", ?retry_after, %url, "rate limited");
                return Err(SpotifyError::RateLimited { retry_after });
            }
            _ => {}
        }

        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| {
                    status
                        .canonical_reason()
                        .unwrap_or("unknown error")
                        .to_string()
                });
            return Err(SpotifyError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        trace!(target: "spotify", bytes = body.len(), "response body read");
        Ok(body)
    }
}

/// `Retry-After` as delay-seconds; HTTP-date values are not used by this API.
fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

fn parse_body<T: DeserializeOwned>(body: &str) -> Result<T> {
    serde_json::from_str(body)
        .map_err(|e| SpotifyError::InvalidResponse(format!("cannot decode response: {}", e)))
}

fn check_batch_size(uris: &[String]) -> Result<()> {
    if uris.len() > MAX_TRACKS_PER_REQUEST {
        return Err(SpotifyError::InvalidRequest(format!(
            "{} tracks exceed the per-request limit of {}",
            uris.len(),
            MAX_TRACKS_PER_REQUEST
        )));
    }
    Ok(())
}

/// Builder for configuring a Spotify client.
#[derive(Debug)]
pub struct SpotifyClientBuilder {
    base_url: String,
    access_token: Option<String>,
    timeout: Duration,
    min_request_interval: Duration,
}

impl Default for SpotifyClientBuilder {
    fn default() -> Self {
        Self {
            base_url: SPOTIFY_API_BASE.to_string(),
            access_token: None,
            timeout: Duration::from_secs(30),
            min_request_interval: Duration::from_millis(100),
        }
    }
}

impl SpotifyClientBuilder {
    /// Set a custom base URL (useful for testing with mock servers).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Bearer token sent with every request.
    pub fn access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    /// Set request timeout duration.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the minimum interval between two requests.
    pub fn min_request_interval(mut self, interval: Duration) -> Self {
        self.min_request_interval = interval;
        self
    }

    /// Build the Spotify client.
    pub fn build(self) -> Result<SpotifyClient> {
        let client = Client::builder()
            .timeout(self.timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(SpotifyClient {
            client,
            base_url: self.base_url,
            access_token: self.access_token,
            pacer: RequestPacer::new(self.min_request_interval),
        })
    }
}

// SPDX-License-Identifier: GPL-3.0-or-later

//! Spotify Web API client covering the calls a lineup sync needs.
//!
//! The client expects a pre-authenticated bearer token and issues requests
//! one at a time, spaced by a minimum interval and any `Retry-After` the
//! API sends back.

pub mod client;
#[cfg(test)]
mod client_tests;
pub mod error;
pub mod models;
pub mod pacer;

pub use client::{SpotifyClient, SpotifyClientBuilder, MAX_TRACKS_PER_REQUEST};
pub use error::{Result, SpotifyError};
pub use models::{ArtistObject, PlaylistTrack, SimplifiedPlaylist, TrackObject, UserProfile};

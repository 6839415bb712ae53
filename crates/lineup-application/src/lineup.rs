// SPDX-License-Identifier: GPL-3.0-or-later

//! Loading and validation of lineup files.

use lineup_domain::{Lineup, LineupEntry};
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum LineupError {
    #[error("failed to read lineup file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse lineup file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("lineup contains no playlists")]
    Empty,
}

/// Read a lineup JSON file (`{"playlists": [{"playlistName": .., "artists": [..]}]}`).
///
/// Only the document shape is checked here; entries are validated one by
/// one when they are synced so that a bad entry does not block the others.
pub fn load_lineup(path: impl AsRef<Path>) -> Result<Lineup, LineupError> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).map_err(|source| LineupError::Io {
        path: path.display().to_string(),
        source,
    })?;

    let lineup: Lineup = serde_json::from_str(&raw)?;
    if lineup.playlists.is_empty() {
        return Err(LineupError::Empty);
    }

    info!(
        target: "sync",
        path = %path.display(),
        playlists = lineup.playlists.len(),
        "lineup loaded"
    );
    Ok(lineup)
}

/// Reject entries that cannot be synced: blank playlist name, no artists,
/// or a blank artist name.
pub fn validate_entry(entry: &LineupEntry) -> Result<(), String> {
    if entry.playlist_name.trim().is_empty() {
        return Err("playlist name is empty".to_string());
    }
    if entry.artists.is_empty() {
        return Err(format!("playlist '{}' has no artists", entry.playlist_name));
    }
    if let Some(position) = entry.artists.iter().position(|artist| artist.is_blank()) {
        return Err(format!(
            "playlist '{}' has an empty artist name at position {}",
            entry.playlist_name, position
        ));
    }
    Ok(())
}

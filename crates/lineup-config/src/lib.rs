// SPDX-License-Identifier: GPL-3.0-or-later
use std::path::Path;

use anyhow::Result;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Upper bound the catalog accepts for a single append request.
pub const MAX_COMMIT_BATCH_SIZE: usize = 100;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    pub base_url: String,
    /// Pre-authenticated bearer token.
    pub access_token: Option<String>,
    pub market: String,
    pub timeout_secs: u64,
    pub min_request_interval_ms: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.spotify.com/v1".to_string(),
            access_token: None,
            market: "US".to_string(),
            timeout_secs: 30,
            min_request_interval_ms: 100,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    pub pick_higher_popularity: bool,
    pub pick_genre_proximity: bool,
    pub use_approx_match: bool,
    pub approx_match_distance: usize,
    pub search_limit: u32,
    /// Leading genre tokens stripped before genres are compared
    /// ("swedish death metal" -> "death metal").
    pub country_prefixes: Vec<String>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            pick_higher_popularity: true,
            pick_genre_proximity: true,
            use_approx_match: false,
            approx_match_distance: 1,
            search_limit: 10,
            country_prefixes: default_country_prefixes(),
        }
    }
}

fn default_country_prefixes() -> Vec<String> {
    [
        "american",
        "argentine",
        "australian",
        "austrian",
        "belgian",
        "brazilian",
        "british",
        "canadian",
        "chilean",
        "czech",
        "danish",
        "dutch",
        "english",
        "finnish",
        "french",
        "german",
        "greek",
        "irish",
        "italian",
        "japanese",
        "mexican",
        "norwegian",
        "polish",
        "portuguese",
        "russian",
        "scottish",
        "spanish",
        "swedish",
        "swiss",
        "uk",
        "ukrainian",
        "us",
    ]
    .into_iter()
    .map(str::to_string)
    .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    pub clear_before_sync: bool,
    pub top_tracks_per_artist: usize,
    pub commit_batch_size: usize,
    pub public: bool,
    pub continue_on_error: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            clear_before_sync: false,
            top_tracks_per_artist: 3,
            commit_batch_size: MAX_COMMIT_BATCH_SIZE,
            public: true,
            continue_on_error: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub json: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    pub catalog: CatalogConfig,
    pub resolver: ResolverConfig,
    pub sync: SyncConfig,
    pub telemetry: TelemetryConfig,
}

/// Load configuration from defaults, optional TOML file, and environment overrides (prefix: LINEUP_).
pub fn load(config_path: Option<&Path>) -> Result<AppConfig> {
    let mut figment = Figment::from(Serialized::defaults(AppConfig::default()));

    if let Some(path) = config_path {
        figment = figment.merge(Toml::file(path));
    }

    figment = figment.merge(Env::prefixed("LINEUP_").split("__"));

    let config: AppConfig = figment.extract()?;
    info!(target: "config", "configuration loaded");
    Ok(config)
}

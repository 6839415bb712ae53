// SPDX-License-Identifier: GPL-3.0-or-later

use std::time::Duration;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SpotifyError>;

/// Failure of a single Web API call.
#[derive(Debug, Error)]
pub enum SpotifyError {
    /// Transport-level failure (connect, timeout, TLS, body read).
    #[error("request to Spotify failed: {0}")]
    Http(#[from] reqwest::Error),

    /// 429; `retry_after` comes from the `Retry-After` header when present.
    #[error("rate limited by Spotify{}", retry_hint(.retry_after))]
    RateLimited { retry_after: Option<Duration> },

    /// 401 or 403.
    #[error("access token missing, expired or lacking scope")]
    Unauthorized,

    #[error("not found: {0}")]
    NotFound(String),

    /// Any other non-2xx answer.
    #[error("Spotify answered {status}: {message}")]
    Status { status: u16, message: String },

    #[error("unexpected response body: {0}")]
    InvalidResponse(String),

    /// Rejected locally before anything was sent.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

fn retry_hint(retry_after: &Option<Duration>) -> String {
    retry_after
        .map(|delay| format!(", retry after {}s", delay.as_secs()))
        .unwrap_or_default()
}

impl SpotifyError {
    /// Whether repeating the same call later may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            SpotifyError::Http(e) => e.is_timeout() || e.is_connect(),
            SpotifyError::RateLimited { .. } => true,
            SpotifyError::Status { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

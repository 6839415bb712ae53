// SPDX-License-Identifier: GPL-3.0-or-later

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use lineup_application::{
    load_lineup, ArtistStatus, PlaylistRun, PlaylistSyncEngine, SpotifyCatalog, SyncSettings,
};
use lineup_config::{load as load_config, CatalogConfig, TelemetryConfig};
use lineup_spotify::SpotifyClient;
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Sync festival lineups into Spotify playlists.
#[derive(Debug, Parser)]
#[command(name = "lineup-sync", version, about)]
struct Args {
    /// JSON file with the playlists and their artists
    #[arg(long, value_name = "FILE")]
    lineup: PathBuf,

    /// TOML configuration file
    #[arg(long, value_name = "FILE", env = "LINEUP_CONFIG")]
    config: Option<PathBuf>,

    /// Resolve artists and collect tracks without writing to any playlist
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();

    let config = load_config(args.config.as_deref())?;
    init_tracing(&config.telemetry);

    let lineup = load_lineup(&args.lineup)?;
    let client = build_client(&config.catalog)?;
    let catalog = Arc::new(SpotifyCatalog::new(client, config.catalog.market.clone()));

    let mut settings = SyncSettings::from_config(&config);
    settings.dry_run = args.dry_run;
    let engine = PlaylistSyncEngine::new(catalog, settings);

    info!(
        target: "cli",
        playlists = lineup.playlists.len(),
        dry_run = args.dry_run,
        "starting lineup sync"
    );

    let runs = tokio::select! {
        runs = engine.sync_lineup(&lineup, config.sync.continue_on_error) => runs,
        _ = tokio::signal::ctrl_c() => {
            warn!(target: "cli", "interrupted, playlists may be partially updated");
            return Ok(ExitCode::from(130));
        }
    };

    print!("{}", summarize(&runs));

    if runs.len() < lineup.playlists.len() || runs.iter().any(|run| run.result.is_err()) {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

fn init_tracing(telemetry: &TelemetryConfig) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&telemetry.log_level));

    let fmt_layer = if telemetry.json {
        fmt::layer()
            .json()
            .with_target(true)
            .with_writer(std::io::stderr)
            .boxed()
    } else {
        fmt::layer()
            .with_target(true)
            .with_level(true)
            .with_writer(std::io::stderr)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

fn build_client(catalog: &CatalogConfig) -> Result<SpotifyClient> {
    let token = catalog
        .access_token
        .as_deref()
        .filter(|token| !token.trim().is_empty())
        .ok_or_else(|| {
            anyhow!(
                "no access token configured \
                 (set catalog.access_token or LINEUP_CATALOG__ACCESS_TOKEN)"
            )
        })?;

    SpotifyClient::builder()
        .base_url(catalog.base_url.as_str())
        .access_token(token)
        .timeout(Duration::from_secs(catalog.timeout_secs))
        .min_request_interval(Duration::from_millis(catalog.min_request_interval_ms))
        .build()
        .context("failed to build Spotify client")
}

/// One line per playlist, followed by the skipped artists.
fn summarize(runs: &[PlaylistRun]) -> String {
    let mut out = String::new();
    for run in runs {
        match &run.result {
            Ok(report) => {
                let verb = if report.dry_run { "would add" } else { "added" };
                out.push_str(&format!(
                    "{}: {} {} track(s), {} resolved, {} skipped{}\n",
                    run.playlist_name,
                    verb,
                    report.tracks.len(),
                    report.resolved_count(),
                    report.skipped_count(),
                    if report.created { " (created)" } else { "" },
                ));
                if !report.created && report.batches_committed > 0 && !report.description_updated {
                    out.push_str("  description not updated\n");
                }
                for outcome in report.outcomes.iter().filter(|o| !o.is_resolved()) {
                    if let ArtistStatus::Skipped { reason, .. } = &outcome.status {
                        out.push_str(&format!("  skipped {}: {}\n", outcome.query, reason));
                    }
                }
            }
            Err(e) => out.push_str(&format!("{}: FAILED: {}\n", run.playlist_name, e)),
        }
    }
    out
}

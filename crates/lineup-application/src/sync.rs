// SPDX-License-Identifier: GPL-3.0-or-later

//! Playlist sync: locate or create the target playlist, resolve every
//! artist of a lineup entry in two passes, and commit the new tracks.
//!
//! Pass 1 walks the artists in input order. Unambiguous artists are resolved
//! on the spot, feed the run's genre profile, and have their top tracks
//! collected. Ambiguous artists are parked. Pass 2 judges the parked groups
//! against a snapshot of the profile taken after pass 1, so the result for
//! an ambiguous artist depends on every unambiguous artist of the entry but
//! never on another ambiguous one.

use crate::candidate_filter::{filter_candidates, MatchPolicy};
use crate::catalog::{CatalogResult, CatalogService};
use crate::genre_profile::GenreProfileAccumulator;
use crate::lineup::validate_entry;
use crate::normalize::CountryPrefixes;
use crate::resolver::{
    AmbiguityResolver, DeferredGroup, ResolutionOutcome, ResolverPolicy, SkipReason,
};
use crate::track_collector::TrackCollector;
use chrono::NaiveDate;
use lineup_config::{AppConfig, MAX_COMMIT_BATCH_SIZE};
use lineup_domain::{
    ArtistId, ArtistQuery, CatalogArtist, Lineup, LineupEntry, PlaylistId, PlaylistTarget,
    TrackRef, Visibility,
};
use lineup_spotify::SpotifyError;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, warn};

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("malformed input: {0}")]
    MalformedInput(String),

    #[error("catalog call failed: {0}")]
    Remote(#[from] SpotifyError),

    #[error("commit batch {batch} failed after {committed} batch(es) were applied: {source}")]
    Commit {
        batch: usize,
        committed: usize,
        source: SpotifyError,
    },
}

impl SyncError {
    /// Whether the underlying catalog failure may go away on a later run.
    pub fn is_transient(&self) -> bool {
        match self {
            SyncError::MalformedInput(_) => false,
            SyncError::Remote(source) | SyncError::Commit { source, .. } => source.is_transient(),
        }
    }
}

/// Knobs of one sync run, usually derived from [`AppConfig`].
#[derive(Debug, Clone)]
pub struct SyncSettings {
    pub resolver: ResolverPolicy,
    pub matching: MatchPolicy,
    pub country_prefixes: CountryPrefixes,
    pub search_limit: u32,
    pub top_tracks_per_artist: usize,
    pub commit_batch_size: usize,
    pub clear_before_sync: bool,
    pub visibility: Visibility,
    /// Resolve and collect without creating, clearing or writing playlists.
    pub dry_run: bool,
}

impl SyncSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            resolver: ResolverPolicy {
                pick_higher_popularity: config.resolver.pick_higher_popularity,
                pick_genre_proximity: config.resolver.pick_genre_proximity,
            },
            matching: MatchPolicy {
                use_approx: config.resolver.use_approx_match,
                approx_distance: config.resolver.approx_match_distance,
            },
            country_prefixes: CountryPrefixes::new(&config.resolver.country_prefixes),
            search_limit: config.resolver.search_limit,
            top_tracks_per_artist: config.sync.top_tracks_per_artist,
            commit_batch_size: config.sync.commit_batch_size,
            clear_before_sync: config.sync.clear_before_sync,
            visibility: if config.sync.public {
                Visibility::Public
            } else {
                Visibility::Private
            },
            dry_run: false,
        }
        .sanitized()
    }

    /// Clamp out-of-range values instead of rejecting them.
    pub fn sanitized(mut self) -> Self {
        if !(1..=MAX_COMMIT_BATCH_SIZE).contains(&self.commit_batch_size) {
            let clamped = self.commit_batch_size.clamp(1, MAX_COMMIT_BATCH_SIZE);
            warn!(
                target: "sync",
                value = self.commit_batch_size,
                clamped,
                "commit_batch_size out of range, clamping"
            );
            self.commit_batch_size = clamped;
        }
        if self.top_tracks_per_artist == 0 {
            warn!(target: "sync", "top_tracks_per_artist is 0, using 1");
            self.top_tracks_per_artist = 1;
        }
        if self.search_limit == 0 {
            warn!(target: "sync", "search_limit is 0, using 1");
            self.search_limit = 1;
        }
        self
    }
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionPass {
    First,
    Second,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ArtistStatus {
    Resolved {
        artist_id: ArtistId,
        artist_name: String,
        pass: ResolutionPass,
    },
    Skipped {
        reason: SkipReason,
        pass: ResolutionPass,
    },
}

/// What happened to one artist of the lineup entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtistOutcome {
    pub query: ArtistQuery,
    #[serde(flatten)]
    pub status: ArtistStatus,
    pub tracks_added: usize,
}

impl ArtistOutcome {
    pub fn is_resolved(&self) -> bool {
        matches!(self.status, ArtistStatus::Resolved { .. })
    }

    pub fn resolved_id(&self) -> Option<&ArtistId> {
        match &self.status {
            ArtistStatus::Resolved { artist_id, .. } => Some(artist_id),
            ArtistStatus::Skipped { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub playlist_name: String,
    /// `None` only for a dry run against a playlist that does not exist yet.
    pub playlist_id: Option<PlaylistId>,
    pub created: bool,
    pub cleared: bool,
    pub dry_run: bool,
    /// One entry per input artist, in input order.
    pub outcomes: Vec<ArtistOutcome>,
    /// New tracks in commit order.
    pub tracks: Vec<TrackRef>,
    pub batches_committed: usize,
    /// An existing playlist's description was refreshed after the commit.
    pub description_updated: bool,
}

impl SyncReport {
    pub fn resolved_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_resolved()).count()
    }

    pub fn skipped_count(&self) -> usize {
        self.outcomes.len() - self.resolved_count()
    }
}

/// Result of one lineup entry within a batch.
#[derive(Debug)]
pub struct PlaylistRun {
    pub playlist_name: String,
    pub result: Result<SyncReport, SyncError>,
}

/// Run-scoped mutable state; dropped when the run ends.
struct SyncRun<'a> {
    existing: &'a HashSet<String>,
    collected: HashSet<String>,
    tracks: Vec<TrackRef>,
    profile: GenreProfileAccumulator,
    outcomes: Vec<Option<ArtistOutcome>>,
    pending: Vec<(usize, DeferredGroup)>,
}

impl<'a> SyncRun<'a> {
    fn new(existing: &'a HashSet<String>, artists: usize) -> Self {
        Self {
            existing,
            collected: HashSet::new(),
            tracks: Vec::new(),
            profile: GenreProfileAccumulator::new(),
            outcomes: vec![None; artists],
            pending: Vec::new(),
        }
    }
}

pub struct PlaylistSyncEngine {
    catalog: Arc<dyn CatalogService>,
    settings: SyncSettings,
    resolver: AmbiguityResolver,
    collector: TrackCollector,
}

impl PlaylistSyncEngine {
    pub fn new(catalog: Arc<dyn CatalogService>, settings: SyncSettings) -> Self {
        let settings = settings.sanitized();
        Self {
            resolver: AmbiguityResolver::new(settings.resolver),
            collector: TrackCollector::new(Arc::clone(&catalog)),
            catalog,
            settings,
        }
    }

    /// Sync every entry of the lineup in order.
    ///
    /// A failed entry stops the batch unless `continue_on_error` is set.
    pub async fn sync_lineup(
        &self,
        lineup: &Lineup,
        continue_on_error: bool,
    ) -> Vec<PlaylistRun> {
        let mut runs = Vec::with_capacity(lineup.playlists.len());

        for entry in &lineup.playlists {
            let result = self.sync(entry).await;
            let failed = result.is_err();
            if let Err(e) = &result {
                error!(
                    target: "sync",
                    playlist = %entry.playlist_name,
                    error = %e,
                    transient = e.is_transient(),
                    "playlist sync failed"
                );
            }
            runs.push(PlaylistRun {
                playlist_name: entry.playlist_name.clone(),
                result,
            });
            if failed && !continue_on_error {
                warn!(target: "sync", "stopping batch after failed playlist");
                break;
            }
        }

        runs
    }

    /// Sync one lineup entry into its playlist.
    pub async fn sync(&self, entry: &LineupEntry) -> Result<SyncReport, SyncError> {
        validate_entry(entry).map_err(SyncError::MalformedInput)?;

        info!(
            target: "sync",
            playlist = %entry.playlist_name,
            artists = entry.artists.len(),
            dry_run = self.settings.dry_run,
            "syncing playlist"
        );

        let (target, cleared) = self.prepare_target(entry).await?;
        let no_tracks = HashSet::new();
        let existing = target
            .as_ref()
            .map(|t| &t.existing_tracks)
            .unwrap_or(&no_tracks);

        let mut run = SyncRun::new(existing, entry.artists.len());
        self.first_pass(entry, &mut run).await?;
        self.second_pass(&mut run).await?;

        let SyncRun {
            tracks, outcomes, ..
        } = run;
        let outcomes: Vec<ArtistOutcome> = outcomes.into_iter().flatten().collect();

        let mut batches_committed = 0;
        let mut description_updated = false;
        if let (Some(target), false) = (&target, self.settings.dry_run) {
            batches_committed = self.commit(&target.id, &tracks).await?;

            if !target.created && !tracks.is_empty() {
                description_updated = self
                    .update_description(&target.id, entry.source.as_deref())
                    .await;
            }
        }

        let report = SyncReport {
            playlist_name: entry.playlist_name.clone(),
            playlist_id: target.as_ref().map(|t| t.id.clone()),
            created: target.as_ref().is_some_and(|t| t.created),
            cleared,
            dry_run: self.settings.dry_run,
            outcomes,
            tracks,
            batches_committed,
            description_updated,
        };

        info!(
            target: "sync",
            playlist = %report.playlist_name,
            resolved = report.resolved_count(),
            skipped = report.skipped_count(),
            tracks_added = report.tracks.len(),
            batches = report.batches_committed,
            "finished updating playlist"
        );

        Ok(report)
    }

    /// Tracks are already committed at this point, so a failure is only logged.
    async fn update_description(&self, playlist: &PlaylistId, source: Option<&str>) -> bool {
        let description = describe("Updated", today(), source);
        match self.catalog.set_description(playlist, &description).await {
            Ok(()) => true,
            Err(e) => {
                warn!(
                    target: "sync",
                    playlist = %playlist,
                    error = %e,
                    "failed to update playlist description"
                );
                false
            }
        }
    }

    /// Locate-or-create, then clear or read the current contents.
    ///
    /// Returns `None` only in dry-run mode when the playlist does not exist.
    async fn prepare_target(
        &self,
        entry: &LineupEntry,
    ) -> Result<(Option<PlaylistTarget>, bool), SyncError> {
        let wanted = entry.playlist_name.to_lowercase();
        let found = self
            .catalog
            .list_playlists()
            .await?
            .into_iter()
            .find(|summary| summary.name.to_lowercase() == wanted);

        let Some(summary) = found else {
            if self.settings.dry_run {
                info!(
                    target: "sync",
                    playlist = %entry.playlist_name,
                    "playlist does not exist (dry run, not creating)"
                );
                return Ok((None, false));
            }

            info!(target: "sync", playlist = %entry.playlist_name, "creating new playlist");
            let owner = self.catalog.current_user_id().await?;
            let description = describe("Generated", today(), entry.source.as_deref());
            let id = self
                .catalog
                .create_playlist(
                    &owner,
                    &entry.playlist_name,
                    self.settings.visibility,
                    &description,
                )
                .await?;

            return Ok((
                Some(PlaylistTarget {
                    id,
                    name: entry.playlist_name.clone(),
                    existing_tracks: HashSet::new(),
                    created: true,
                }),
                false,
            ));
        };

        info!(
            target: "sync",
            playlist = %summary.name,
            id = %summary.id,
            "playlist already exists"
        );

        let (existing_tracks, cleared) = if self.settings.clear_before_sync {
            if self.settings.dry_run {
                debug!(target: "sync", "dry run, not clearing playlist");
            } else {
                self.catalog.clear_playlist(&summary.id).await?;
                info!(target: "sync", playlist = %summary.name, "playlist cleared");
            }
            (HashSet::new(), true)
        } else {
            let tracks = self.catalog.playlist_tracks(&summary.id).await?;
            debug!(
                target: "sync",
                playlist = %summary.name,
                existing = tracks.len(),
                "checking for missing tracks"
            );
            (tracks.into_iter().map(|t| t.uri).collect(), false)
        };

        Ok((
            Some(PlaylistTarget {
                id: summary.id,
                name: summary.name,
                existing_tracks,
                created: false,
            }),
            cleared,
        ))
    }

    async fn first_pass(&self, entry: &LineupEntry, run: &mut SyncRun<'_>) -> CatalogResult<()> {
        for (index, raw) in entry.artists.iter().enumerate() {
            let query = ArtistQuery::new(raw.as_str().trim());
            let results = self
                .catalog
                .search_artists(query.as_str(), self.settings.search_limit)
                .await?;
            let candidates = filter_candidates(&query, &results, self.settings.matching);

            match self.resolver.resolve(&query, candidates) {
                ResolutionOutcome::Resolved(artist) => {
                    run.profile.add(&artist, &self.settings.country_prefixes);
                    let added = self.collect_tracks(run, &artist).await?;
                    run.outcomes[index] =
                        Some(resolved(query, &artist, ResolutionPass::First, added));
                }
                ResolutionOutcome::Deferred(group) => {
                    debug!(
                        target: "resolver",
                        query = %query,
                        candidates = ?group
                            .candidates
                            .iter()
                            .map(|c| c.id.0.as_str())
                            .collect::<Vec<_>>(),
                        "ambiguous artist deferred to genre pass"
                    );
                    run.pending.push((index, group));
                }
                ResolutionOutcome::Skipped(reason) => {
                    run.outcomes[index] = Some(skipped(query, reason, ResolutionPass::First));
                }
            }
        }
        Ok(())
    }

    async fn second_pass(&self, run: &mut SyncRun<'_>) -> CatalogResult<()> {
        if run.pending.is_empty() {
            return Ok(());
        }

        let snapshot = run.profile.snapshot();
        debug!(
            target: "resolver",
            deferred = run.pending.len(),
            profile = ?snapshot.iter().collect::<Vec<_>>(),
            "starting genre pass"
        );

        for (index, group) in std::mem::take(&mut run.pending) {
            let query = group.query.clone();
            let outcome = match self.resolver.resolve_deferred(
                group,
                &snapshot,
                &self.settings.country_prefixes,
            ) {
                Ok(artist) => {
                    let added = self.collect_tracks(run, &artist).await?;
                    resolved(query, &artist, ResolutionPass::Second, added)
                }
                Err(reason) => skipped(query, reason, ResolutionPass::Second),
            };
            run.outcomes[index] = Some(outcome);
        }
        Ok(())
    }

    async fn collect_tracks(
        &self,
        run: &mut SyncRun<'_>,
        artist: &CatalogArtist,
    ) -> CatalogResult<usize> {
        let tracks = self
            .collector
            .collect(
                artist,
                self.settings.top_tracks_per_artist,
                run.existing,
                &run.collected,
            )
            .await?;
        let added = tracks.len();
        run.collected.extend(tracks.iter().map(|t| t.uri.clone()));
        run.tracks.extend(tracks);
        Ok(added)
    }

    /// Append `tracks` in order, in batches of `commit_batch_size`.
    ///
    /// Batches already appended stay in place when a later one fails.
    async fn commit(&self, playlist: &PlaylistId, tracks: &[TrackRef]) -> Result<usize, SyncError> {
        let mut committed = 0;
        for (index, batch) in tracks.chunks(self.settings.commit_batch_size).enumerate() {
            self.catalog
                .append_tracks(playlist, batch)
                .await
                .map_err(|source| SyncError::Commit {
                    batch: index + 1,
                    committed,
                    source,
                })?;
            committed += 1;
            info!(
                target: "sync",
                playlist = %playlist,
                batch = index + 1,
                size = batch.len(),
                "added batch to playlist"
            );
        }
        Ok(committed)
    }
}

fn resolved(
    query: ArtistQuery,
    artist: &CatalogArtist,
    pass: ResolutionPass,
    added: usize,
) -> ArtistOutcome {
    info!(
        target: "resolver",
        query = %query,
        artist_id = %artist.id,
        artist = %artist.name,
        popularity = artist.popularity,
        pass = ?pass,
        tracks_added = added,
        "artist resolved"
    );
    ArtistOutcome {
        query,
        status: ArtistStatus::Resolved {
            artist_id: artist.id.clone(),
            artist_name: artist.name.clone(),
            pass,
        },
        tracks_added: added,
    }
}

fn skipped(query: ArtistQuery, reason: SkipReason, pass: ResolutionPass) -> ArtistOutcome {
    warn!(target: "resolver", query = %query, reason = %reason, pass = ?pass, "artist skipped");
    ArtistOutcome {
        query,
        status: ArtistStatus::Skipped { reason, pass },
        tracks_added: 0,
    }
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

fn describe(verb: &str, date: NaiveDate, source: Option<&str>) -> String {
    let mut description = format!("{} automatically on {}.", verb, date.format("%Y-%m-%d"));
    if let Some(source) = source {
        description.push_str(&format!(" Source: {}", source));
    }
    description
}

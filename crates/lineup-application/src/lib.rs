// SPDX-License-Identifier: GPL-3.0-or-later

//! Artist resolution and playlist sync.
//!
//! A lineup entry is resolved artist by artist against the catalog: exact
//! (or approximate) name filtering, then disambiguation by popularity or by
//! genre proximity to the other artists of the same playlist. The top tracks
//! of every resolved artist are committed to the target playlist.

pub mod candidate_filter;
pub mod catalog;
pub mod genre_profile;
pub mod lineup;
pub mod normalize;
pub mod resolver;
pub mod sync;
pub mod track_collector;

#[cfg(test)]
mod test_support;

pub use candidate_filter::{filter_candidates, MatchPolicy};
pub use catalog::{CatalogResult, CatalogService, SpotifyCatalog};
pub use genre_profile::{GenreProfileAccumulator, GenreSnapshot};
pub use lineup::{load_lineup, validate_entry, LineupError};
pub use normalize::{normalize, normalize_genre, CountryPrefixes};
pub use resolver::{AmbiguityResolver, DeferredGroup, ResolutionOutcome, ResolverPolicy, SkipReason};
pub use sync::{
    ArtistOutcome, ArtistStatus, PlaylistRun, PlaylistSyncEngine, ResolutionPass, SyncError,
    SyncReport, SyncSettings,
};
pub use track_collector::TrackCollector;

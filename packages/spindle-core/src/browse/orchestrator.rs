//! Fallback strategies for turning (artist, album, track) names into playback.
//!
//! Each [`Strategy`] is a fixed path shape under the library root plus the
//! action to trigger at its end. Strategies run strictly in table order; within
//! a strategy, every combination of name variants is tried until one plays.
//! The whole call runs under the [`BrowseSerializer`] with an end-to-end budget
//! that starts once the lock is held.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::controller::Zone;
use crate::error::{SpindleError, SpindleResult};
use crate::protocol_constants::{ALBUMS_TITLE, ARTISTS_TITLE, PLAY_NOW, QUEUE, TRACKS_TITLE};
use crate::services::ZoneRegistry;

use super::navigator::{Navigate, NavigationOutcome};
use super::serializer::BrowseSerializer;
use super::variants::{album_variants, artist_variants};

/// A variable level of a strategy path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyLevel {
    Artist,
    Album,
    Track,
}

/// One (root list, path shape, action) combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Strategy {
    pub name: &'static str,
    /// Library list the path starts from.
    pub root: &'static str,
    /// Variable titles below the root, in path order.
    pub levels: &'static [StrategyLevel],
    /// Action to trigger at the end, or `None` for the default action.
    pub action: Option<&'static str>,
}

use StrategyLevel::{Album, Artist, Track};

/// Strategies for playing an album, in the order they are tried.
pub const PLAY_ALBUM_STRATEGIES: [Strategy; 3] = [
    Strategy {
        name: "artists_default",
        root: ARTISTS_TITLE,
        levels: &[Artist, Album],
        action: None,
    },
    Strategy {
        name: "artists_play_now",
        root: ARTISTS_TITLE,
        levels: &[Artist, Album],
        action: Some(PLAY_NOW),
    },
    Strategy {
        name: "albums_play_now",
        root: ALBUMS_TITLE,
        levels: &[Album],
        action: Some(PLAY_NOW),
    },
];

/// Strategies for appending an album to the queue.
pub const ALBUM_QUEUE_STRATEGIES: [Strategy; 2] = [
    Strategy {
        name: "artists_queue",
        root: ARTISTS_TITLE,
        levels: &[Artist, Album],
        action: Some(QUEUE),
    },
    Strategy {
        name: "albums_queue",
        root: ALBUMS_TITLE,
        levels: &[Album],
        action: Some(QUEUE),
    },
];

const ALBUM_TRACK_STRATEGIES: [Strategy; 2] = [
    Strategy {
        name: "artists_track_play_now",
        root: ARTISTS_TITLE,
        levels: &[Artist, Album, Track],
        action: Some(PLAY_NOW),
    },
    Strategy {
        name: "albums_track_play_now",
        root: ALBUMS_TITLE,
        levels: &[Album, Track],
        action: Some(PLAY_NOW),
    },
];

const TRACK_STRATEGIES: [Strategy; 1] = [Strategy {
    name: "tracks_play_now",
    root: TRACKS_TITLE,
    levels: &[Track],
    action: Some(PLAY_NOW),
}];

/// Diagnostic record of one navigation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchAttempt {
    pub strategy: &'static str,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub track: Option<String>,
    pub success: bool,
    pub elapsed: Duration,
    pub error: Option<String>,
}

impl MatchAttempt {
    fn log(&self) {
        tracing::debug!(
            strategy = self.strategy,
            artist = self.artist.as_deref(),
            album = self.album.as_deref(),
            track = self.track.as_deref(),
            success = self.success,
            elapsed_ms = self.elapsed.as_millis() as u64,
            error = self.error.as_deref(),
            "match_attempt"
        );
    }
}

/// Successful match returned to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayMatch {
    pub success: bool,
    pub zone_id: String,
    pub zone_name: String,
    pub strategy: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_artist: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_album: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_track: Option<String>,
    /// Action entry the controller finally triggered.
    pub action: Option<String>,
    /// Navigation attempts made, including the successful one.
    pub attempts: usize,
}

/// Result of a raw path navigation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BrowseOutcome {
    pub success: bool,
    pub zone_id: String,
    #[serde(flatten)]
    pub outcome: NavigationOutcome,
}

/// Variant candidates for each strategy level.
struct Candidates {
    artists: Vec<String>,
    albums: Vec<String>,
    tracks: Vec<String>,
}

impl Candidates {
    fn for_level(&self, level: StrategyLevel) -> &[String] {
        match level {
            Artist => &self.artists,
            Album => &self.albums,
            Track => &self.tracks,
        }
    }
}

/// Moves `indices` to the next combination that differs at or before `pos`.
///
/// Returns false once every combination has been visited.
fn advance(indices: &mut [usize], lens: &[usize], mut pos: usize) -> bool {
    for later in indices.iter_mut().skip(pos + 1) {
        *later = 0;
    }
    loop {
        indices[pos] += 1;
        if indices[pos] < lens[pos] {
            return true;
        }
        indices[pos] = 0;
        if pos == 0 {
            return false;
        }
        pos -= 1;
    }
}

fn required(field: &str, value: &str) -> SpindleResult<()> {
    if value.trim().is_empty() {
        return Err(SpindleError::InvalidRequest(format!(
            "{} must not be empty",
            field
        )));
    }
    Ok(())
}

/// Runs playback strategies through the browse serializer.
pub struct PlayAlbumOrchestrator {
    registry: Arc<ZoneRegistry>,
    serializer: Arc<BrowseSerializer>,
    navigator: Arc<dyn Navigate>,
    library_path: Vec<String>,
    budget: Duration,
}

impl PlayAlbumOrchestrator {
    pub fn new(
        registry: Arc<ZoneRegistry>,
        serializer: Arc<BrowseSerializer>,
        navigator: Arc<dyn Navigate>,
        library_path: Vec<String>,
        budget: Duration,
    ) -> Self {
        Self {
            registry,
            serializer,
            navigator,
            library_path,
            budget,
        }
    }

    /// Plays an album, trying [`PLAY_ALBUM_STRATEGIES`] in order.
    ///
    /// # Errors
    ///
    /// - [`SpindleError::NotConnected`] without a controller session
    /// - [`SpindleError::ZoneNotFound`] if the zone reference does not resolve
    /// - [`SpindleError::InvalidRequest`] for a blank artist or album
    /// - [`SpindleError::AllStrategiesExhausted`] if nothing matched
    /// - [`SpindleError::Timeout`] if the budget ran out
    pub async fn play_album(
        &self,
        zone_ref: Option<&str>,
        artist: &str,
        album: &str,
    ) -> SpindleResult<PlayMatch> {
        required("artist", artist)?;
        required("album", album)?;
        let zone = self.resolve_zone(zone_ref)?;
        let candidates = Candidates {
            artists: artist_variants(artist),
            albums: album_variants(album),
            tracks: Vec::new(),
        };
        log::info!(
            "[PlayAlbum] \"{}\" / \"{}\" on {} ({} x {} variants)",
            artist,
            album,
            zone.display_name,
            candidates.artists.len(),
            candidates.albums.len()
        );

        self.serialized(
            "play_album",
            self.run_strategies(&zone, &PLAY_ALBUM_STRATEGIES, &candidates),
        )
        .await
    }

    /// Appends an album to the zone's queue.
    pub async fn queue_album(
        &self,
        zone_ref: Option<&str>,
        artist: &str,
        album: &str,
    ) -> SpindleResult<PlayMatch> {
        required("artist", artist)?;
        required("album", album)?;
        let zone = self.resolve_zone(zone_ref)?;
        let candidates = Candidates {
            artists: artist_variants(artist),
            albums: album_variants(album),
            tracks: Vec::new(),
        };
        log::info!(
            "[QueueAlbum] \"{}\" / \"{}\" on {}",
            artist,
            album,
            zone.display_name
        );

        self.serialized(
            "queue_album",
            self.run_strategies(&zone, &ALBUM_QUEUE_STRATEGIES, &candidates),
        )
        .await
    }

    /// Plays a single track.
    ///
    /// With an album, the track is looked up on the album page (by artist,
    /// then in the flat album list); without one, in the flat track list.
    /// A blank artist skips the artist-rooted strategy. Track titles are used
    /// verbatim.
    pub async fn play_track(
        &self,
        zone_ref: Option<&str>,
        artist: &str,
        album: Option<&str>,
        track: &str,
    ) -> SpindleResult<PlayMatch> {
        required("track_title", track)?;
        let album = album.map(str::trim).filter(|a| !a.is_empty());
        let zone = self.resolve_zone(zone_ref)?;

        let artists = if artist.trim().is_empty() {
            Vec::new()
        } else {
            artist_variants(artist)
        };
        let candidates = Candidates {
            artists,
            albums: album.map(album_variants).unwrap_or_default(),
            tracks: vec![track.trim().to_string()],
        };
        let strategies: &[Strategy] = if album.is_some() {
            &ALBUM_TRACK_STRATEGIES
        } else {
            &TRACK_STRATEGIES
        };
        log::info!(
            "[PlayTrack] \"{}\" ({:?}) on {}",
            track,
            album,
            zone.display_name
        );

        self.serialized(
            "play_track",
            self.run_strategies(&zone, strategies, &candidates),
        )
        .await
    }

    /// Navigates an explicit path from the hierarchy root, then triggers `action`.
    ///
    /// The path is used as given, without the configured library prefix.
    pub async fn browse(
        &self,
        zone_ref: Option<&str>,
        path: &[String],
        action: Option<&str>,
    ) -> SpindleResult<BrowseOutcome> {
        if path.is_empty() {
            return Err(SpindleError::InvalidRequest("path must not be empty".into()));
        }
        let zone = self.resolve_zone(zone_ref)?;
        let action = action.map(str::trim).filter(|a| !a.is_empty());

        let outcome = self
            .serialized(
                "browse",
                self.navigator.browse_path(&zone.zone_id, path, action),
            )
            .await?;

        Ok(BrowseOutcome {
            success: true,
            zone_id: zone.zone_id,
            outcome,
        })
    }

    fn resolve_zone(&self, zone_ref: Option<&str>) -> SpindleResult<Zone> {
        if !self.registry.is_connected() {
            return Err(SpindleError::NotConnected);
        }
        self.registry.resolve(zone_ref)
    }

    /// Runs `work` under the browse lock, bounded by the budget.
    ///
    /// On expiry the cursor is left where it is; the next traversal starts
    /// with its own root reset.
    async fn serialized<T>(
        &self,
        operation: &str,
        work: impl Future<Output = SpindleResult<T>>,
    ) -> SpindleResult<T> {
        let queued = Instant::now();
        self.serializer
            .with_lock(async {
                let waited = queued.elapsed();
                if waited > Duration::from_millis(100) {
                    log::debug!(
                        "[Orchestrator] {} waited {} ms for the browse lock",
                        operation,
                        waited.as_millis()
                    );
                }

                match tokio::time::timeout(self.budget, work).await {
                    Ok(result) => result,
                    Err(_) => {
                        log::warn!(
                            "[Orchestrator] {} exceeded its {} ms budget",
                            operation,
                            self.budget.as_millis()
                        );
                        Err(SpindleError::Timeout {
                            budget_ms: self.budget.as_millis() as u64,
                        })
                    }
                }
            })
            .await
    }

    fn strategy_path(&self, strategy: &Strategy, values: &[&String]) -> Vec<String> {
        self.library_path
            .iter()
            .cloned()
            .chain(std::iter::once(strategy.root.to_string()))
            .chain(values.iter().map(|v| v.to_string()))
            .collect()
    }

    async fn run_strategies(
        &self,
        zone: &Zone,
        strategies: &[Strategy],
        candidates: &Candidates,
    ) -> SpindleResult<PlayMatch> {
        // Path levels before the first variable title.
        let prefix_len = self.library_path.len() + 1;
        let mut attempts = 0;
        let mut last_error: Option<String> = None;

        for strategy in strategies {
            let choices: Vec<&[String]> = strategy
                .levels
                .iter()
                .map(|level| candidates.for_level(*level))
                .collect();
            if choices.is_empty() || choices.iter().any(|c| c.is_empty()) {
                log::debug!("[Orchestrator] Skipping {}: no candidates", strategy.name);
                continue;
            }
            let lens: Vec<usize> = choices.iter().map(|c| c.len()).collect();
            let last = lens.len() - 1;
            let mut indices = vec![0; lens.len()];
            let started = Instant::now();

            let matched = loop {
                let values: Vec<&String> = indices
                    .iter()
                    .zip(&choices)
                    .map(|(&i, choice)| &choice[i])
                    .collect();
                let path = self.strategy_path(strategy, &values);

                let attempt_started = Instant::now();
                let result = self
                    .navigator
                    .browse_path(&zone.zone_id, &path, strategy.action)
                    .await;
                attempts += 1;

                let value_for = |wanted: StrategyLevel| {
                    strategy
                        .levels
                        .iter()
                        .position(|l| *l == wanted)
                        .map(|i| values[i].clone())
                };
                let attempt = MatchAttempt {
                    strategy: strategy.name,
                    artist: value_for(Artist),
                    album: value_for(Album),
                    track: value_for(Track),
                    success: result.is_ok(),
                    elapsed: attempt_started.elapsed(),
                    error: result.as_ref().err().map(ToString::to_string),
                };
                attempt.log();

                match result {
                    Ok(outcome) => break Some((attempt, outcome)),
                    Err(err) => {
                        // A miss at a variable level rules out every combination
                        // sharing the titles up to that level.
                        let pos = match &err {
                            SpindleError::PathNotFound { level, .. } if *level < prefix_len => {
                                log::debug!(
                                    "[Orchestrator] {} unavailable: {}",
                                    strategy.name,
                                    err
                                );
                                last_error = Some(err.to_string());
                                break None;
                            }
                            SpindleError::PathNotFound { level, .. } => {
                                (level - prefix_len).min(last)
                            }
                            _ => last,
                        };
                        last_error = Some(err.to_string());
                        if !advance(&mut indices, &lens, pos) {
                            break None;
                        }
                    }
                }
            };

            let elapsed_ms = started.elapsed().as_millis();
            match matched {
                Some((attempt, outcome)) => {
                    log::info!(
                        "[Orchestrator] Strategy {} matched in {} ms ({} attempt(s) total)",
                        strategy.name,
                        elapsed_ms,
                        attempts
                    );
                    return Ok(PlayMatch {
                        success: true,
                        zone_id: zone.zone_id.clone(),
                        zone_name: zone.display_name.clone(),
                        strategy: strategy.name,
                        matched_artist: attempt.artist,
                        matched_album: attempt.album,
                        matched_track: attempt.track,
                        action: outcome.action,
                        attempts,
                    });
                }
                None => log::info!(
                    "[Orchestrator] Strategy {} exhausted after {} ms",
                    strategy.name,
                    elapsed_ms
                ),
            }
        }

        Err(SpindleError::AllStrategiesExhausted {
            attempts,
            last_error: last_error.unwrap_or_else(|| "no strategy was applicable".to_string()),
        })
    }
}
